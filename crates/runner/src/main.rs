use hermes_runner::{PaperSession, load_config, load_default_config};
use log::info;

fn print_help() {
    eprintln!(
        r#"Hermes - per-instrument forecasting trader (paper venue)

USAGE:
    hermes [OPTIONS]

OPTIONS:
    --config <PATH>     Load session configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run a 10 minute session with the embedded defaults
    hermes

    # Run with a config file
    hermes --config session.json

    # Show every forecast
    RUST_LOG=debug hermes
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            load_config(&path)?
        }
        None => load_default_config()?,
    };
    config.validate()?;

    let session = PaperSession::from_config(&config);
    let report = session.orchestrator.run().await?;

    for line in report.to_string().lines() {
        info!("{}", line);
    }
    Ok(())
}
