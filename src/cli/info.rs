use anyhow::{Context, Result};
use indicatif::MultiProgress;
use serde::Serialize;

use super::command::{Cli, HeaderField, InfoArgs, ReportFormat};
use crate::input::InputReader;
use gapcm::structs::header::Header;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, _multi: Option<&MultiProgress>) -> Result<()> {
    log::debug!("Reading header: {}", args.input.display());

    let mut source = InputReader::new(&args.input)?;
    let header = Header::read_from(&mut source)
        .with_context(|| format!("{}", args.input.display()))?;

    let error = header.validate().err();
    if let Some(ref e) = error {
        if cli.strict {
            return Err(anyhow::anyhow!("{}: {e}", args.input.display()));
        }
        log::warn!("{}: {e}", args.input.display());
    }

    let text = match (args.field, args.format) {
        (Some(field), _) => field_value(&header, field),
        (None, ReportFormat::Plain) => header.to_string(),
        (None, ReportFormat::Yaml) => {
            let report = HeaderReport::new(&header, error.map(|e| e.to_string()));
            serde_yaml_ng::to_string(&report)?
        }
    };
    println!("{}", text.trim_end());

    Ok(())
}

fn field_value(header: &Header, field: HeaderField) -> String {
    let p = &header.echo_pans;
    let l = &header.echo_levels;
    match field {
        HeaderField::Channels => header.channel_count().to_string(),
        HeaderField::EchoPans => format!(
            "{:02x} {:02x} {:02x} {:02x} {:02x} {:02x}",
            p[0], p[1], p[2], p[3], p[4], p[5]
        ),
        HeaderField::EchoDelay => header.echo_delay.to_string(),
        HeaderField::EchoLevels => format!("{} {} {}", l[0], l[1], l[2]),
        HeaderField::EchoPregap => header.echo_pregap.to_string(),
        HeaderField::Mark => header.mark.to_string(),
        HeaderField::Length => header.length.to_string(),
        HeaderField::Pregap => header.pregap.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct HeaderReport {
    channels: usize,
    mark: u32,
    length: u32,
    echo_pans: [u8; 6],
    echo_pregap: u8,
    echo_delay: u8,
    echo_levels: [u8; 3],
    pregap: u8,
    samples: SampleCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Derived consumer sample counts.
#[derive(Debug, Serialize)]
struct SampleCounts {
    pregap: u64,
    intro: u64,
    r#loop: u64,
}

impl HeaderReport {
    fn new(header: &Header, error: Option<String>) -> Self {
        Self {
            channels: header.channel_count(),
            mark: header.mark,
            length: header.length,
            echo_pans: header.echo_pans,
            echo_pregap: header.echo_pregap,
            echo_delay: header.echo_delay,
            echo_levels: header.echo_levels,
            pregap: header.pregap,
            samples: SampleCounts {
                pregap: header.pregap_samples(),
                intro: header.mark_samples(),
                r#loop: header.loop_samples(),
            },
            error,
        }
    }
}
