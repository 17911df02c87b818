mod config;

use std::io;

use anyhow::Context;
use clap::{App, Arg};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fraglog::analyzer::report::SessionReport;
use fraglog::analyzer::session::SessionModel;
use fraglog::ingest_file;

use crate::config::StatsConfig;

fn cli() -> App<'static, 'static> {
    App::new("fragstat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Prints kill matrices and player summaries from a Half-Life server log")
        .arg(
            Arg::with_name("LOGFILE")
                .help("Path to the server log (default: L0226001.log)")
                .index(1),
        )
        .arg(
            Arg::with_name("LOGFILE_FLAG")
                .help("Path to the server log")
                .long("logfile")
                .takes_value(true)
                .conflicts_with("LOGFILE"),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("Path to a TOML config file (default: fragstat.toml if present)")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ORDER")
                .help("Order of players in the matrices")
                .long("order")
                .takes_value(true)
                .possible_values(&["first-seen", "alphabetical"]),
        )
        .arg(
            Arg::with_name("VERBOSE")
                .help("Log every player creation and map change")
                .short("v")
                .long("verbose"),
        )
        .arg(
            Arg::with_name("GENERATE_CONFIG")
                .help("Print a commented default config file and exit")
                .long("generate-config"),
        )
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    if matches.is_present("GENERATE_CONFIG") {
        print!("{}", StatsConfig::generate_default_toml());
        return Ok(());
    }

    let mut config = StatsConfig::discover(matches.value_of("CONFIG"))?;
    config.apply_cli_overrides(&matches)?;

    init_tracing(&config.log_level);

    let mut model = SessionModel::new();
    let stats = ingest_file(&config.logfile, &mut model)
        .with_context(|| format!("could not process {}", config.logfile.display()))?;
    info!(
        "processed {} lines ({} events) from {}",
        stats.lines,
        stats.events,
        config.logfile.display()
    );

    let report = SessionReport::build(&model, config.player_order);
    report.log_summary();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report
        .write_matrices(&mut out)
        .context("failed to write matrices")?;

    if !model.anomalies().is_empty() {
        warn!(
            "{} events referenced players that never connected",
            model.anomalies().len()
        );
    }

    Ok(())
}
