use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tenant_migration::{Config, IndexAttemptOutcome, RunSummary, TenantMigrationModule};

/// Run the tenant migrations enabled in the configuration file
#[derive(Debug, Parser)]
#[command(name = "tenant-migrate", version)]
struct Cli {
    /// Path to the YAML configuration
    #[arg(short, long, default_value = "config/tenant-migrate.yaml")]
    config: PathBuf,

    /// Debug-level logs (RUST_LOG still wins when set)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// No logs at all
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        let fallback = if cli.verbose { "debug" } else { "info" };
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &RunSummary) {
    if let Some(report) = &summary.provisioning {
        for attempt in &report.attempts {
            match &attempt.outcome {
                IndexAttemptOutcome::Created { index_name } => println!(
                    "{}\t{}.{}\t{}\tok",
                    attempt.tenant, attempt.database, attempt.collection, index_name
                ),
                IndexAttemptOutcome::Rejected { reason, .. } => println!(
                    "{}\t{}.{}\t{}\trejected: {}",
                    attempt.tenant,
                    attempt.database,
                    attempt.collection,
                    attempt.spec.effective_name(),
                    reason
                ),
            }
        }
        println!(
            "indexes: {} created, {} rejected",
            report.created(),
            report.rejected()
        );
    }

    for upsert in &summary.upserts {
        println!(
            "{}\t{}.{}\t{} stores ({} inserted, {} updated)",
            upsert.tenant,
            upsert.database,
            upsert.collection,
            upsert.processed,
            upsert.inserted,
            upsert.updated
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = Config::load(Some(cli.config.as_path()))?;
    let module = TenantMigrationModule::new(config);

    let summary = module.run().await?;
    print_summary(&summary);
    Ok(())
}
