//! Bot-vs-bot simulator: hosts one game in a `GameStore` and lets the autopilot play it.

use clap::{Parser, ValueEnum};
use holdem_engine::agents::{BotAgent, BotProfile, Difficulty};
use holdem_engine::config::{GameConfig, SessionConfig};
use holdem_engine::events::{GameEvent, HandRecord};
use holdem_engine::session::{Autopilot, AutopilotExit, GameStore};
use std::error::Error;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holdem-sim")]
#[command(about = "Play a no-limit hold'em game between bots", version = holdem_engine::VERSION)]
struct Args {
    /// Number of seats
    #[arg(short, long, default_value = "6")]
    seats: usize,

    /// Stop after this many hands (default: until one seat has every chip)
    #[arg(long)]
    hands: Option<u64>,

    /// Bot difficulty for every seat
    #[arg(long, default_value = "medium")]
    difficulty: Level,

    /// Deck seed; bots derive their seeds from it
    #[arg(long)]
    seed: Option<u64>,

    /// JSON game config; command-line flags override its seed
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-decision time budget in milliseconds
    #[arg(long, default_value = "2000")]
    budget_ms: u64,

    /// Print each hand record as a JSON line
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Medium => Difficulty::Medium,
            Level::Hard => Difficulty::Hard,
            Level::Expert => Difficulty::Expert,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::from_path(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let session = SessionConfig::default()
        .with_decision_budget_ms(args.budget_ms)
        .with_max_hands(args.hands);

    let store = GameStore::new();
    let stacks = vec![config.starting_stack; args.seats];
    let handle = store.create_game(config, &stacks, session)?;
    info!(game = %handle.id(), seats = args.seats, "simulation starting");

    let mut autopilot = Autopilot::new(handle.clone());
    for seat in 0..args.seats {
        let mut profile = BotProfile::for_difficulty(args.difficulty.into());
        if let Some(seed) = args.seed {
            profile = profile.with_seed(seed.wrapping_add(seat as u64 + 1));
        }
        autopilot = autopilot.with_agent(seat, Box::new(BotAgent::new(profile)));
    }

    let mut events = handle.subscribe();
    let json = args.json;
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(GameEvent::HandComplete { summary }) => {
                    let record = HandRecord::from_summary(&summary);
                    if json {
                        match serde_json::to_string(&record) {
                            Ok(line) => println!("{line}"),
                            Err(err) => warn!(error = %err, "could not encode hand record"),
                        }
                    }
                }
                Ok(GameEvent::GameOver { .. }) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "event stream lagged"),
            }
        }
    });

    let exit = autopilot.spawn().await??;
    let view = handle.public_view(None).await;
    store.quit(handle.id())?;
    printer.await?;

    match exit {
        AutopilotExit::GameOver { winner } => info!(?winner, hands = view.hand_number, "game over"),
        AutopilotExit::HandLimit => info!(hands = view.hand_number, "hand limit reached"),
        AutopilotExit::Cancelled => info!("cancelled"),
    }
    for seat in &view.seats {
        println!("{:>4} {:<8} {:>8} {}", seat.seat, seat.name, seat.stack, seat.status.label());
    }
    Ok(())
}
