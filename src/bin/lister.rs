use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Concurrently list all object keys across a set of buckets and emit a
/// single JSON array of [bucket, key] pairs on stdout.
#[derive(Parser)]
#[command(name = "lister")]
#[command(version, about = "List objects across buckets concurrently", long_about = None)]
struct Cli {
    /// Semicolon-delimited bucket names ("bucket1;bucket2;bucket3")
    buckets: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // A missing, empty or surplus argument is a usage error with exit code 1
    let raw = match rgw_bench::cli::single_nonempty_arg(&cli.buckets) {
        Some(raw) => raw.to_string(),
        None => {
            eprintln!("Usage: lister \"bucket1;bucket2;bucket3\"");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(raw))
}

async fn async_main(raw: String) -> Result<()> {
    let config = rgw_bench::config::load_from_env()?;
    rgw_bench::cli::commands::cmd_list(&config, &raw).await
}
