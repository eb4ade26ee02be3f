use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Concurrently provision N buckets, each with a fresh Barbican secret bound
/// as its default SSE-KMS encryption key, printing the bucket names.
#[derive(Parser)]
#[command(name = "preparer")]
#[command(version, about = "Provision SSE-KMS encrypted buckets", long_about = None)]
struct Cli {
    /// Number of buckets to provision
    #[arg(default_value = "1")]
    count: usize,
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

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli.count))
}

async fn async_main(count: usize) -> Result<()> {
    let config = rgw_bench::config::load_from_env()?;
    rgw_bench::cli::commands::cmd_prepare(&config, count).await
}
