use anyhow::{bail, Context};
use clap::Parser;
use generator::profile::{build_igc_log, GeneratorConfig};
use igccore::telemetry::ConversionMetrics;
use log::{error, warn};
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use workflow::config::ConverterConfig;
use workflow::output::{default_file_name, write_guarded, WriteOutcome};
use workflow::runner::{ConversionResult, Runner};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "IGC to KML converter for flight logs, so they can be viewed on a 3D globe"
)]
struct Args {
    /// Input IGC file(s)
    #[arg(required_unless_present = "generate")]
    inputs: Vec<PathBuf>,
    /// Output file name (default: YYYY_MM_DD_HHMM_<launch site>.kml)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Overwrite the output file if it exists
    #[arg(short, long, default_value_t = false)]
    force: bool,
    /// Pilot name shown in the document title
    #[arg(long)]
    pilot: Option<String>,
    /// Horizontal speed unit: km/h, knots, mph or m/s
    #[arg(long)]
    speed_unit: Option<String>,
    /// Vertical speed unit: m/s, ft/min, km/h, knots or mph
    #[arg(long)]
    vario_unit: Option<String>,
    /// Altitude unit for labels: m or ft
    #[arg(long)]
    altitude_unit: Option<String>,
    /// Add a folder colored by time since the first fix
    #[arg(long, default_value_t = false)]
    elapsed: bool,
    /// Load converter settings from YAML; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Append a JSON line describing every written document
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write a synthetic IGC log to this path and exit
    #[arg(long)]
    generate: Option<PathBuf>,
}

impl Args {
    fn converter_config(&self) -> anyhow::Result<ConverterConfig> {
        let mut config = if let Some(path) = self.config.as_ref() {
            ConverterConfig::load(path)?
        } else {
            ConverterConfig::default()
        };
        if let Some(unit) = self.speed_unit.as_ref() {
            config.units.horizontal = unit.clone();
        }
        if let Some(unit) = self.vario_unit.as_ref() {
            config.units.vertical = unit.clone();
        }
        if let Some(unit) = self.altitude_unit.as_ref() {
            config.units.altitude = unit.clone();
        }
        if self.pilot.is_some() {
            config.pilot = self.pilot.clone();
        }
        if self.elapsed {
            config.render.include_elapsed = true;
        }
        Ok(config)
    }
}

fn append_report(
    report: &Path,
    input: &Path,
    output: &Path,
    result: &ConversionResult,
) -> anyhow::Result<()> {
    let line = json!({
        "input": input.display().to_string(),
        "output": output.display().to_string(),
        "samples": result.sample_count,
        "start": result.start.to_string(),
        "duration_s": result.duration_seconds,
        "metadata": result.metadata,
    });
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report)
        .with_context(|| format!("opening report {}", report.display()))?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn convert_one(runner: &Runner, input: &Path, args: &Args) -> anyhow::Result<WriteOutcome> {
    let result = runner.convert_file(input)?;
    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(default_file_name(
            result.start,
            result.metadata.launch_site_or_unknown(),
        ))
    });

    let outcome = write_guarded(&output, &result.kml, args.force)?;
    if let (WriteOutcome::Written(path), Some(report)) = (&outcome, args.report.as_ref()) {
        // the document is already on disk, so a report failure does not fail the input
        if let Err(err) = append_report(report, input, path, &result) {
            warn!("{}: report not updated: {:#}", input.display(), err);
        }
    }
    Ok(outcome)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.generate.as_ref() {
        let config = GeneratorConfig {
            pilot: args.pilot.clone(),
            ..Default::default()
        };
        let mut contents = build_igc_log(&config).join("\r\n");
        contents.push_str("\r\n");
        fs::write(path, contents)
            .with_context(|| format!("writing synthetic log {}", path.display()))?;
        println!("Synthetic flight log written to {}", path.display());
        return Ok(());
    }

    let runner = Runner::new(args.converter_config()?)?;
    if args.output.is_some() && args.inputs.len() > 1 {
        warn!("--output is shared by {} inputs", args.inputs.len());
    }

    let metrics = ConversionMetrics::new();
    for input in &args.inputs {
        match convert_one(&runner, input, &args) {
            Ok(WriteOutcome::Written(path)) => {
                metrics.record_converted();
                println!("{} -> {}", input.display(), path.display());
            }
            Ok(WriteOutcome::Skipped(path)) => {
                metrics.record_skipped();
                println!(
                    "Can not save kml file, because it already exists: {}",
                    path.display()
                );
            }
            Err(err) => {
                metrics.record_failed();
                error!("{}: {:#}", input.display(), err);
            }
        }
    }

    let counts = metrics.snapshot();
    println!(
        "Converted {}, skipped {}, failed {}",
        counts.converted, counts.skipped, counts.failed
    );
    if counts.failed > 0 {
        bail!("{} of {} inputs failed", counts.failed, counts.total());
    }
    Ok(())
}
