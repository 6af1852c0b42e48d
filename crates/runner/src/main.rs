use relay_clock::SystemClock;
use relay_runner::{Bootstrap, RunnerConfig, Session};
use std::sync::Arc;

fn print_help() {
    eprintln!(
        r#"relay - serialized venue session runner

USAGE:
    relay [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config_path: Option<String> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => match args.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            },
            other => {
                eprintln!("Unknown argument: {other}");
                print_help();
                std::process::exit(1);
            }
        }
    }

    let config = match config_path {
        Some(path) => {
            log::info!("Loading configuration from: {path}");
            RunnerConfig::from_file(&path)?
        }
        None => RunnerConfig::default(),
    };

    let bootstrap = Bootstrap::simulated(&config, Arc::new(SystemClock::new()))?;
    let mut session = Session::new(bootstrap, config);
    let report = session.run_startup().await?;

    for (code, candles) in &report.charts {
        log::info!("{code}: {} candle(s)", candles.len());
    }
    for holding in session.bootstrap().mirror.holdings() {
        log::info!(
            "Holding {} x{} @ {} (net {})",
            holding.code,
            holding.quantity,
            holding.purchase_price,
            holding.net_profit()
        );
    }
    for (name, entity, error) in &report.failures {
        log::warn!("{name} [{entity}]: {error}");
    }

    session.shutdown().await;
    Ok(())
}
