use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::decode::cmd_decode;
use cli::encode::cmd_encode;
use cli::info::cmd_info;

mod cli;
mod input;
mod output;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let multi = MultiProgress::new();
    let pb = init_logging(&cli, &multi)?;

    match cli.command {
        Commands::Decode(ref args) => cmd_decode(args, &cli, pb)?,
        Commands::Encode(ref args) => cmd_encode(args, &cli, pb)?,
        Commands::Info(ref args) => cmd_info(args, &cli, pb)?,
    }

    Ok(())
}

/// Installs the global logger. With `--progress`, records are routed through
/// `multi` so they print above the bars, and `multi` is handed back for the
/// commands to draw on.
fn init_logging<'a>(cli: &Cli, multi: &'a MultiProgress) -> Result<Option<&'a MultiProgress>> {
    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(cli.loglevel.to_level_filter());

    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                let ts = buf.timestamp().to_string();
                writeln!(buf, "{}", json_record(&ts, record))
            });
        }
    }

    if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Ok(Some(multi))
    } else {
        env_builder.try_init()?;
        Ok(None)
    }
}

/// One log record as a single-line JSON object.
fn json_record(ts: &str, record: &log::Record) -> serde_json::Value {
    serde_json::json!({
        "ts": ts,
        "lvl": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}
