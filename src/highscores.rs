//! Best score and leaderboard persistence
//!
//! The best score is a single private value. The leaderboard is one indexed
//! entry per account, overwritten on every finished session, so it shows each
//! account's most recent score. Everything here is best-effort: failures are
//! logged and never interrupt play.

use serde::{Deserialize, Serialize};

use crate::persistence::{BEST_SCORE_KEY, KeyValueStore, RACER_PREFIX, StoreError, racer_key};
use crate::shorten_address;
use crate::sim::SessionSummary;

/// Maximum number of leaderboard entries shown
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// One account's latest score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display form of the account (`0x1234...abcd`)
    #[serde(rename = "address")]
    pub shortened_address: String,
    pub score: u64,
    /// Unix timestamp (ms) when submitted
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

impl LeaderboardEntry {
    pub fn new(account: &str, score: u64, timestamp_ms: u64) -> Self {
        Self {
            shortened_address: shorten_address(account),
            score,
            timestamp_ms,
        }
    }
}

/// Sort descending by score and keep the top entries
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(MAX_LEADERBOARD_ENTRIES);
    entries
}

/// Load the stored best score (0 when missing or unreadable)
pub async fn load_best_score(store: &dyn KeyValueStore) -> u64 {
    match store.get(BEST_SCORE_KEY).await {
        Ok(Some(value)) => match value.trim().parse::<u64>() {
            Ok(best) => {
                log::info!("Loaded best score {}", best);
                best
            }
            Err(e) => {
                log::warn!("Ignoring unreadable best score {:?}: {}", value, e);
                0
            }
        },
        Ok(None) => {
            log::info!("No saved best score");
            0
        }
        Err(e) => {
            log::warn!("Failed to load best score: {}", e);
            0
        }
    }
}

pub async fn save_best_score(store: &dyn KeyValueStore, score: u64) -> Result<(), StoreError> {
    store.set(BEST_SCORE_KEY, &score.to_string(), false).await
}

/// Write (or overwrite) an account's leaderboard entry
pub async fn submit_entry(
    store: &dyn KeyValueStore,
    account: &str,
    score: u64,
    timestamp_ms: u64,
) -> Result<(), StoreError> {
    let entry = LeaderboardEntry::new(account, score, timestamp_ms);
    let json = serde_json::to_string(&entry)?;
    store.set(&racer_key(account), &json, true).await
}

/// Read every indexed racer entry, dropping any that fail to load or parse
pub async fn load_leaderboard(
    store: &dyn KeyValueStore,
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let keys = store.list(RACER_PREFIX, true).await?;
    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        match store.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<LeaderboardEntry>(&json) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::debug!("Skipping malformed entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => log::debug!("Skipping unreadable entry {}: {}", key, e),
        }
    }
    let entries = rank_entries(entries);
    log::info!("Loaded leaderboard ({} entries)", entries.len());
    Ok(entries)
}

/// What end-of-session persistence managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    /// A new best score was written
    pub best_saved: bool,
    /// The account's leaderboard entry was written
    pub entry_submitted: bool,
    /// Freshly reloaded leaderboard, when the submit and reload succeeded
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

/// Persist the outcome of a finished session.
///
/// The best score is written only when it was beaten. The leaderboard entry
/// is written whenever an account is connected. Neither write depends on the
/// other succeeding.
pub async fn persist_session_end(
    store: &dyn KeyValueStore,
    summary: &SessionSummary,
    account: Option<&str>,
    now_ms: u64,
) -> PersistReport {
    let mut report = PersistReport::default();

    if summary.is_new_best() {
        match save_best_score(store, summary.score).await {
            Ok(()) => report.best_saved = true,
            Err(e) => log::warn!("Failed to save best score: {}", e),
        }
    }

    if let Some(account) = account {
        match submit_entry(store, account, summary.score, now_ms).await {
            Ok(()) => {
                report.entry_submitted = true;
                match load_leaderboard(store).await {
                    Ok(entries) => report.leaderboard = Some(entries),
                    Err(e) => log::warn!("Failed to reload leaderboard: {}", e),
                }
            }
            Err(e) => log::warn!("Failed to submit score: {}", e),
        }
    }

    report
}

/// Format a timestamp relative to `now_ms` for leaderboard display
pub fn format_date(timestamp_ms: u64, now_ms: u64) -> String {
    let diff_mins = now_ms.saturating_sub(timestamp_ms) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        if diff_days == 1 {
            "Yesterday".to_string()
        } else if diff_days < 7 {
            format!("{} days ago", diff_days)
        } else {
            chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
                .map(|date| date.format("%-m/%-d/%y").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", diff_hours)
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", diff_mins)
        }
    } else {
        "Just now".to_string()
    }
}
