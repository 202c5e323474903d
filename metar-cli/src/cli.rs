use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select};
use metar_core::{
    Config, MetarReport, OutputFormat, Report, ReportKind, WeatherReport,
    components::SkyCondition,
    decoder, parser::{detect_kind, parser_from_config},
};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "metar", version, about = "Decode METAR, SPECI and TAF reports")]
pub struct Cli {
    /// Log decoding details to stderr (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode one or more raw reports.
    Decode {
        /// Raw report text, e.g. "METAR KJFK 151251Z 28016KT 10SM FEW250 22/12 A3015".
        #[arg(required = true)]
        reports: Vec<String>,

        /// Print JSON instead of the configured output format.
        #[arg(long)]
        json: bool,

        /// Force the report kind instead of detecting it: metar, speci or taf.
        #[arg(long)]
        kind: Option<String>,

        /// Fail on groups that cannot be decoded.
        #[arg(long)]
        strict: bool,
    },

    /// Decode a present-weather code such as "-SHRA" or "VCTS".
    Weather { code: String },

    /// Decode a single sky-condition group such as "BKN025CB".
    Sky { code: String },

    /// Interactively edit the decoder configuration.
    Configure,

    /// Show the configuration file path and its values.
    Config,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Decode {
                reports,
                json,
                kind,
                strict,
            } => {
                let mut config = Config::load()?;
                config.strict |= strict;
                let format = if json { OutputFormat::Json } else { config.output };
                let forced = kind
                    .map(|k| ReportKind::try_from(k.to_uppercase().as_str()))
                    .transpose()?;

                for raw in &reports {
                    let kind = forced.unwrap_or_else(|| detect_kind(raw));
                    debug!(%kind, "decoding report");
                    let report = parser_from_config(kind, &config)
                        .parse(raw)
                        .with_context(|| format!("Failed to decode report: {raw}"))?;
                    print_report(&report, format, &config)?;
                }
            }
            Command::Weather { code } => {
                println!("{code}: {}", decoder::decode_weather(&code));
            }
            Command::Sky { code } => {
                let layer = SkyCondition::parse(&code.to_uppercase())
                    .with_context(|| format!("Failed to decode sky condition: {code}"))?;
                println!("{code}: {layer}");
            }
            Command::Configure => configure()?,
            Command::Config => {
                let path = Config::config_file_path()?;
                let config = Config::load()?;
                println!("# {}", path.display());
                print!("{}", config.to_toml()?);
            }
        }

        Ok(())
    }
}

fn print_report(report: &WeatherReport, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
            println!("{json}");
        }
        OutputFormat::Summary => {
            println!("{}", report.summary());
            if let Some(metar) = report.as_metar() {
                print_observation_extras(metar, config);
            }
            println!();
        }
    }
    Ok(())
}

fn print_observation_extras(metar: &MetarReport, config: &Config) {
    if !metar.is_current_within(Utc::now(), config.metar_max_age_hours) {
        println!("  (older than {} hours)", config.metar_max_age_hours);
    }
    let (Some(elevation), Some(pressure)) = (config.elevation_feet, metar.pressure()) else {
        return;
    };
    println!("  Pressure altitude: {:.0} ft", pressure.pressure_altitude_at(elevation));
    if let Some(oat) = metar.temperature().and_then(|t| t.celsius()) {
        println!("  Density altitude: {:.0} ft", pressure.density_altitude_at(elevation, oat));
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.metar_max_age_hours = CustomType::<i64>::new("Hours before an observation is stale:")
        .with_default(config.metar_max_age_hours)
        .with_validator(|hours: &i64| {
            Ok(if *hours > 0 {
                inquire::validator::Validation::Valid
            } else {
                inquire::validator::Validation::Invalid("Must be at least one hour".into())
            })
        })
        .prompt()?;

    config.strict = Confirm::new("Reject reports with undecodable groups?")
        .with_default(config.strict)
        .prompt()?;

    let formats = OutputFormat::all().to_vec();
    let current = formats.iter().position(|f| *f == config.output).unwrap_or(0);
    config.output = Select::new("Default output format:", formats)
        .with_starting_cursor(current)
        .prompt()?;

    config.elevation_feet = CustomType::<f64>::new("Field elevation in feet (Esc to skip):")
        .prompt_skippable()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
