use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (gapcm ",
    env!("GAPCM_VERSION"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Tools for inspecting, decoding and encoding GA PCM streams",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a GA PCM stream into headerless 8-bit PCM.
    Decode(DecodeArgs),

    /// Encode headerless 8-bit PCM into a GA PCM stream.
    Encode(EncodeArgs),

    /// Print the stream header.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input GA PCM stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path for headerless 8-bit PCM (use "-" for stdout).
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the channel count. 1: mono, 2: stereo.
    #[arg(short, long, value_name = "1|2", value_parser = clap::value_parser!(u16).range(1..=2))]
    pub channels: Option<u16>,

    /// Override the loop start position in blocks.
    #[arg(short, long, value_name = "BLOCKS", value_parser = parse_u32)]
    pub mark: Option<u32>,

    /// Override the length between stream start and loop end in frames.
    /// `-1` for maximum.
    #[arg(short = 'n', long, value_name = "FRAMES", allow_negative_numbers = true, value_parser = parse_length)]
    pub length: Option<u32>,

    /// Override the artificial silence length in blocks.
    #[arg(short, long, value_name = "BLOCKS", value_parser = parse_u8)]
    pub pregap: Option<u8>,

    /// Print the header in a friendly format.
    #[arg(short, long)]
    pub info: bool,

    /// Count of loops to write. `0` stops at the mark, `-1` for 65535.
    #[arg(short, long = "loop", value_name = "COUNT", default_value = "2", allow_negative_numbers = true, value_parser = parse_loop)]
    pub loop_count: u16,

    /// Include samples after the loop end.
    #[arg(short, long)]
    pub trail: bool,

    /// Write signed instead of unsigned 8-bit PCM.
    #[arg(long)]
    pub signed: bool,
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Input headerless 8-bit PCM (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path for the GA PCM stream (use "-" for stdout).
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Channel count. 1: mono, 2: stereo.
    #[arg(short, long, value_name = "1|2", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=2))]
    pub channels: u16,

    /// Echo pans for channels 3 to 8. Low nibble: left, high nibble: right.
    #[arg(long, value_name = "LEVEL", num_args = 6, value_parser = parse_u8)]
    pub echo_pans: Option<Vec<u8>>,

    /// Echo delay in ticks.
    #[arg(long, value_name = "TICKS", default_value_t = 0, value_parser = parse_u8)]
    pub echo_delay: u8,

    /// Echo levels for channel pairs 3 and 4 to 7 and 8.
    #[arg(long, value_name = "LEVEL", num_args = 3, value_parser = parse_u8)]
    pub echo_levels: Option<Vec<u8>>,

    /// First echo delay in ticks.
    #[arg(long, value_name = "TICKS", default_value_t = 0, value_parser = parse_u8)]
    pub echo_pregap: u8,

    /// Loop start position in blocks.
    #[arg(short, long, value_name = "BLOCKS", default_value_t = 0, value_parser = parse_u32)]
    pub mark: u32,

    /// Length between stream start and loop end in frames. `-1` for maximum.
    /// Measured from the input when omitted.
    #[arg(short = 'n', long, value_name = "FRAMES", allow_negative_numbers = true, value_parser = parse_length)]
    pub length: Option<u32>,

    /// Artificial silence length in blocks.
    #[arg(short, long, value_name = "BLOCKS", default_value_t = 0, value_parser = parse_u8)]
    pub pregap: u8,

    /// Include samples after the loop end.
    #[arg(short, long)]
    pub trail: bool,

    /// Read signed instead of unsigned 8-bit PCM.
    #[arg(long)]
    pub signed: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input GA PCM stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print a single header field.
    #[arg(long, value_enum)]
    pub field: Option<HeaderField>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ReportFormat {
    /// Fixed-width text summary.
    Plain,
    /// YAML document.
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum HeaderField {
    /// 1: mono, 2: stereo.
    Channels,
    /// Echo pans for channels 3 to 8.
    EchoPans,
    /// Echo delay in ticks.
    EchoDelay,
    /// Echo levels for channel pairs 3 and 4 to 7 and 8.
    EchoLevels,
    /// First echo delay in ticks.
    EchoPregap,
    /// Loop start position in blocks.
    Mark,
    /// Length between stream start and loop end in frames.
    Length,
    /// Artificial silence length in blocks.
    Pregap,
}

/// Splits an optional `0x` prefix off a numeric argument.
fn radix_of(s: &str) -> (&str, u32) {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    }
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let (digits, radix) = radix_of(s);
    u8::from_str_radix(digits, radix).map_err(|e| format!("expected a value in [0, 255]: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let (digits, radix) = radix_of(s);
    u32::from_str_radix(digits, radix).map_err(|e| format!("expected a 32-bit value: {e}"))
}

fn parse_length(s: &str) -> Result<u32, String> {
    if s == "-1" { Ok(u32::MAX) } else { parse_u32(s) }
}

fn parse_loop(s: &str) -> Result<u16, String> {
    if s == "-1" {
        return Ok(u16::MAX);
    }
    let (digits, radix) = radix_of(s);
    u16::from_str_radix(digits, radix).map_err(|e| format!("expected a value in [0, 65535]: {e}"))
}
