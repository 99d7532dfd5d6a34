use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so generated-file listings on stdout stay clean.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("qrsmith=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = qrsmith::Cli::parse();
    if let Err(err) = qrsmith::run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
