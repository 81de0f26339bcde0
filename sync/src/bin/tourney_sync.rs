use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use database::{
    DatabaseConfig, MemoryStore, RemoteStore, ResultService, SqliteKeyValueStore, SqliteStore,
};
use sync::{Connectivity, DrainOutcome, OfflineContext, Submitted, SyncConfig};
use types::{Announcement, MatchResult, NewAction, PlayerStatus, ResultPatch, Standings};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Params {
    /// YAML file with sync settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Remote store SQLite URL. Falls back to DATABASE_URL, then the config file.
    #[arg(short, long)]
    database: Option<String>,
    /// Local device storage SQLite URL.
    #[arg(short, long)]
    local: Option<String>,
    #[arg(short, long, default_value_t = 1)]
    tournament: i64,
    /// Treat the remote store as unreachable.
    #[arg(long)]
    offline: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a match result.
    Record {
        #[arg(long)]
        round: u32,
        player1: i64,
        score1: i32,
        player2: i64,
        score2: i32,
    },
    /// Correct the scores of a recorded result.
    Correct {
        result_id: Uuid,
        score1: i32,
        score2: i32,
    },
    Announce {
        message: String,
    },
    /// Change a player's status in the tournament.
    Status {
        player: i64,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Replay pending actions now.
    Sync,
    Pending,
    Standings,
    /// Remove the tournament's cached data and pending actions.
    Clear,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StatusArg {
    Active,
    Paused,
    Withdrawn,
}

impl From<StatusArg> for PlayerStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => PlayerStatus::Active,
            StatusArg::Paused => PlayerStatus::Paused,
            StatusArg::Withdrawn => PlayerStatus::Withdrawn,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = match &args.config {
        Some(path) => SyncConfig::from_yaml_file(path)?,
        None => SyncConfig::default(),
    };

    let store: Arc<dyn RemoteStore> = if args.offline {
        let unreachable = MemoryStore::new();
        unreachable.set_available(false);
        Arc::new(unreachable)
    } else {
        let remote = DatabaseConfig::from_cli_or_env_or_yaml(
            args.database.clone(),
            config.database_url.clone(),
        );
        let remote_pool = remote.create_pool_with_retry(&config.connect_retry).await?;
        let store = SqliteStore::new(remote_pool);
        store.run_migrations().await?;
        Arc::new(store)
    };

    let local_url = args
        .local
        .clone()
        .or_else(|| config.local_storage_url.clone())
        .unwrap_or_else(|| "tourney_local.db".to_string());
    let local_pool = DatabaseConfig::new(local_url)
        .create_pool_with_retry(&config.connect_retry)
        .await?;
    let storage = Arc::new(SqliteKeyValueStore::new(local_pool));
    storage.run_migrations().await?;

    let connectivity = Connectivity::from_reachable(!args.offline);
    let context = OfflineContext::new(
        args.tournament,
        connectivity,
        store.clone(),
        storage,
        &config,
    );
    context.hydrate().await;

    let t = args.tournament;
    match args.command {
        Command::Record {
            round,
            player1,
            score1,
            player2,
            score2,
        } => {
            let result = MatchResult::new(t, round, (player1, score1), (player2, score2));
            println!("{} ({})", result, result.id);
            report(context.submit(NewAction::add_result(&result)?).await);
        }
        Command::Correct {
            result_id,
            score1,
            score2,
        } => {
            let action = NewAction::update_result(result_id, &ResultPatch::scores(score1, score2))?;
            report(context.submit(action).await);
        }
        Command::Announce { message } => {
            let action = NewAction::add_announcement(&Announcement::new(t, message))?;
            report(context.submit(action).await);
        }
        Command::Status { player, status } => {
            let action = NewAction::update_player_status(t, player, status.into())?;
            report(context.submit(action).await);
        }
        Command::Sync => match context.force_sync().await? {
            DrainOutcome::Completed(report) => {
                println!(
                    "applied {}, retrying {}, dropped {}",
                    report.applied.len(),
                    report.retained.len(),
                    report.dropped.len()
                );
                for failed in report.retained.iter().chain(&report.dropped) {
                    println!("  {}: {}", failed.action, failed.error);
                }
            }
            other => println!("{other:?}"),
        },
        Command::Pending => {
            let pending = context.pending_actions().await;
            if pending.is_empty() {
                println!("No pending actions");
            }
            for action in pending {
                println!("{action}");
            }
        }
        Command::Standings => {
            let stats = ResultService::new(store).stored_stats(t).await?;
            println!("{}", Standings::from_stats(&stats));
        }
        Command::Clear => {
            context.clear_cache().await;
            println!("Cleared offline data for tournament {t}");
        }
    }
    Ok(())
}

fn report(submitted: Submitted) {
    match submitted {
        Submitted::Applied => println!("Saved"),
        Submitted::Queued(action) => println!("Queued for sync: {action}"),
        Submitted::Deferred { action, error } => {
            println!("Save failed ({error}), queued for sync: {action}")
        }
    }
}
