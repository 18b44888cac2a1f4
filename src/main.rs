//! Crypto Racer headless entry point
//!
//! Connects the development wallet, pays the entry fee, and plays one session
//! on the autopilot at the real tick rate.
//!
//! Usage: `crypto-racer [config.json] [store.json]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crypto_racer::highscores::format_date;
use crypto_racer::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use crypto_racer::platform::{Clock, Controls, SystemClock, TickDriver};
use crypto_racer::wallet::{DevWallet, PaymentProvider};
use crypto_racer::{Game, GameConfig};

/// Demo account used by the development wallet
const DEMO_ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
/// Chain the development wallet starts on (forces a switch + register)
const DEMO_START_CHAIN: u64 = 1;
/// Stop watching the autopilot after this long
const DEMO_TIME_LIMIT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Crypto Racer (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let store_path = args.next().map(PathBuf::from);

    if let Err(e) = run(config_path, store_path).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: Option<PathBuf>, store_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = GameConfig::load(config_path.as_deref()).context("loading config")?;

    let store: Arc<dyn KeyValueStore> = match store_path {
        Some(path) => Arc::new(JsonFileStore::open(&path).context("opening store")?),
        None => Arc::new(MemoryStore::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let wallet: Arc<dyn PaymentProvider> = Arc::new(DevWallet::new(DEMO_ACCOUNT, DEMO_START_CHAIN));

    let mut game = Game::new(config, Some(wallet), store, clock.clone()).await;
    println!("Best score so far: {}", game.best_score());

    let account = game.connect().await?;
    println!("Connected {} on {}", account, game.config().chain_name);

    let record = game.pay().await?;
    println!(
        "Paid {} {} (tx {}...)",
        record.amount,
        game.config().currency,
        &record.tx_hash[..10.min(record.tx_hash.len())]
    );

    game.start()?;
    let driver = TickDriver::from_config(game.config());
    let outcome = tokio::time::timeout(DEMO_TIME_LIMIT, driver.run(&mut game, Controls::Autopilot)).await;
    let end = match outcome {
        Ok(Some(end)) => end,
        Ok(None) => anyhow::bail!("session was not active"),
        Err(_) => {
            log::info!("Autopilot still racing after {:?}, ending the session", DEMO_TIME_LIMIT);
            game.end_session().context("session was not active")?
        }
    };

    let summary = end.summary;
    println!(
        "Finished after {} ticks: score {}, distance {:.0}",
        summary.ticks, summary.score, summary.distance
    );
    if summary.near_personal_best() {
        println!("New personal best territory! (previous best {})", summary.previous_best);
    }

    let report = end.persistence.await.context("score persistence task")?;
    game.apply_report(&report);

    let now = clock.now_millis();
    println!("Leaderboard:");
    for (rank, entry) in game.leaderboard().iter().enumerate() {
        println!(
            "{:>2}. {:<14} {:>8}  {}",
            rank + 1,
            entry.shortened_address,
            entry.score,
            format_date(entry.timestamp_ms, now)
        );
    }

    Ok(())
}
