//! campaign-rewards operator CLI.
//!
//! Computes earnings, records performance snapshots, and inspects metric
//! history against the configured storage backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use campaign_rewards::config::{RewardsConfig, StorageBackend};
use campaign_rewards::domain::{RewardRule, SubmissionId, UserId, calculate_earnings};
use campaign_rewards::persistence;
use campaign_rewards::service::RewardService;
use campaign_rewards::telemetry;

#[derive(Parser)]
#[command(name = "campaign-rewards")]
#[command(about = "Reward accounting for restaurant influencer campaigns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute earnings for a view count without touching storage
    Calculate {
        /// Observed views
        #[arg(long)]
        views: u64,

        /// Amount paid per milestone
        #[arg(long)]
        reward_amount: Decimal,

        /// Views per milestone
        #[arg(long, allow_negative_numbers = true)]
        reward_views: i64,
    },

    /// Record a performance snapshot for an approved submission
    Record {
        /// Submission UUID
        #[arg(long)]
        submission: uuid::Uuid,

        /// Observed total views
        #[arg(long)]
        views: u64,

        /// Observed total likes
        #[arg(long, default_value = "0")]
        likes: u64,

        /// UUID of the recording administrator
        #[arg(long)]
        recorded_by: uuid::Uuid,
    },

    /// Print a submission's snapshot history
    History {
        /// Submission UUID
        #[arg(long)]
        submission: uuid::Uuid,
    },

    /// Print an influencer's earnings summary
    Earnings {
        /// Influencer UUID
        #[arg(long)]
        influencer: uuid::Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RewardsConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to load configuration")?;
    telemetry::init_tracing(config.log_format)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize tracing")?;

    match cli.command {
        Commands::Calculate {
            views,
            reward_amount,
            reward_views,
        } => {
            let rule = RewardRule {
                reward_amount,
                reward_views,
            };
            let earnings = calculate_earnings(views, &rule)?;
            println!("{earnings}");
        }
        Commands::Record {
            submission,
            views,
            likes,
            recorded_by,
        } => {
            let service = connect(&config).await?;
            let (metric, updated) = service
                .record_performance_snapshot(
                    SubmissionId::from_uuid(submission),
                    views,
                    likes,
                    UserId::from_uuid(recorded_by),
                )
                .await?;
            print_json(&serde_json::json!({
                "metric": metric,
                "submission": updated,
            }))?;
        }
        Commands::History { submission } => {
            let service = connect(&config).await?;
            let history = service
                .metric_history(SubmissionId::from_uuid(submission))
                .await?;
            print_json(&history)?;
        }
        Commands::Earnings { influencer } => {
            let service = connect(&config).await?;
            let summary = service
                .influencer_earnings(UserId::from_uuid(influencer))
                .await?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

async fn connect(config: &RewardsConfig) -> Result<RewardService> {
    require_durable_backend(config)?;
    let storage = persistence::connect(config)
        .await
        .context("failed to open storage")?;
    Ok(RewardService::new(storage))
}

/// Storage commands read state written by earlier runs, which a fresh
/// in-memory store never has.
fn require_durable_backend(config: &RewardsConfig) -> Result<()> {
    if config.storage_backend == StorageBackend::Memory {
        anyhow::bail!(
            "this command needs persistent storage; set STORAGE_BACKEND=postgres and DATABASE_URL"
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
