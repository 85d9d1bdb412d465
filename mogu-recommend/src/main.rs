use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use mogu_recommend::generator::SnapshotGenerator;
use mogu_recommend::pipeline::{self, streams};
use mogu_recommend::report;
use mogu_recommend::{AppConfig, Snapshot};
use mogu_shared::telemetry::{init_tracing, timed_stage};
use mogu_shared::AppError;

#[derive(Parser)]
#[command(name = "mogu-recommend")]
#[command(about = "Group-buy recommendations from a marketplace snapshot")]
struct Cli {
    /// Random seed for every stage
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic snapshot
    Generate {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        users: Option<usize>,
        #[arg(long)]
        posts: Option<usize>,
    },
    /// Train on a snapshot and rank posts for one user
    Recommend {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Target user; a seeded random pick when omitted
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long)]
        top_k: Option<usize>,
    },
}

fn main() -> ExitCode {
    init_tracing("mogu-recommend");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            match e.downcast_ref::<AppError>() {
                Some(app) => ExitCode::from(app.error_code().exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    match cli.command {
        Command::Generate { out, users, posts } => {
            if let Some(n) = users {
                config.generator.num_users = n;
            }
            if let Some(n) = posts {
                config.generator.num_posts = n;
            }
            let dir = out.unwrap_or_else(|| config.snapshot_dir.clone());

            let mut rng = pipeline::stream_rng(config.seed, streams::GENERATOR);
            let snapshot = timed_stage("generate", || {
                SnapshotGenerator::new(&config.generator, Utc::now()).generate(&mut rng)
            })?;
            snapshot.save(&dir)?;
        }
        Command::Recommend {
            snapshot,
            out,
            user,
            top_k,
        } => {
            if let Some(dir) = snapshot {
                config.snapshot_dir = dir;
            }
            if let Some(dir) = out {
                config.output_dir = dir;
            }
            if let Some(k) = top_k {
                config.top_k = k;
            }
            config.validate()?;

            let snapshot = timed_stage("load", || Snapshot::load(&config.snapshot_dir))?;
            let trained = pipeline::train(&snapshot, &config, Utc::now())?;
            report::write_diagnostics(&config.output_dir, &trained.diagnostics)?;

            let user_id = match user {
                Some(id) => id,
                None => pipeline::pick_user(&snapshot, config.seed)
                    .ok_or_else(|| AppError::bad_request("snapshot has no users to recommend for"))?,
            };
            tracing::info!(%user_id, picked = user.is_none(), "target user");

            let recommendations = timed_stage("recommend", || {
                trained
                    .recommender(&snapshot, config.exclude_own_posts)
                    .recommend(user_id, config.top_k)
            })?;
            report::write_recommendations(&config.output_dir, config.top_k, user_id, &recommendations)?;
        }
    }
    Ok(())
}
