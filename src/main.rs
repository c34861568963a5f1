mod config;
mod health;
mod metrics;
mod probe;
mod protocol;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

use config::GroupSize;
use health::Verdict;
use metrics::{Tags, DEFAULT_MEASUREMENT};
use probe::{Probe, ProbeError, Report};
use status::MysqlStatusSource;

/// Galera node health probe.
///
/// Prints one InfluxDB line with the node's workload counters, followed by a
/// diagnostic line per problem found, and exits 0 (OK), 1 (WARNING) or
/// 2 (CRITICAL).
#[derive(Debug, Parser)]
#[command(name = "galera-check", version)]
struct Cli {
    /// Configuration file with hostname, username and password (JSON or .toml)
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Expected number of nodes in the replication group (at least 2)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    cluster_size: Option<GroupSize>,

    /// Influx measurement name
    #[arg(long, value_name = "NAME", default_value = DEFAULT_MEASUREMENT)]
    measurement: String,

    /// Log more to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let verdict = match run(&cli).await {
        Ok(report) => {
            for line in report.render() {
                println!("{line}");
            }
            report.verdict()
        }
        Err(e) => {
            error!(error = ?e, "Probe failed");
            println!("{e:#}");
            // Configuration problems are critical as well
            e.downcast_ref::<ProbeError>()
                .map_or(Verdict::Critical, ProbeError::verdict)
        }
    };

    verdict.into()
}

async fn run(cli: &Cli) -> anyhow::Result<Report> {
    let config = config::load_config(&cli.config)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;

    let mut tags = Tags::new();
    tags.insert("hostname", config.hostname.as_str());

    let probe = Probe::new(cli.measurement.as_str(), tags);
    let source = MysqlStatusSource::new(config);
    let report = probe.run(&source, cli.cluster_size).await?;
    Ok(report)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    // stdout carries the check output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}
