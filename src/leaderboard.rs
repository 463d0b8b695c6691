//! Remote leaderboard
//!
//! Scores are kept per mode, once all-time and once per ISO week. The backend
//! is a trait so the browser build can point it at a hosted database while
//! the bundled `StoredLeaderboard` keeps everything in a key-value store.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::persistence::KeyValueStore;
use crate::sim::Mode;

/// Longest accepted player name (in characters, after trimming)
pub const MAX_NAME_LEN: usize = 20;
/// Entries shown per board
pub const TOP_LIMIT: usize = 10;
/// Entries kept per stored board; lower scores fall off
const MAX_STORED: usize = 100;

const MS_PER_DAY: f64 = 86_400_000.0;

/// One submitted score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    pub mode: Mode,
    /// Submission time (ms since the Unix epoch)
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "allTime")]
    AllTime,
}

/// Storage path of a board
pub fn board_path(mode: Mode, timeframe: Timeframe, now_ms: f64) -> String {
    match timeframe {
        Timeframe::AllTime => format!("leaderboard/{}/allTime", mode.as_str()),
        Timeframe::Weekly => format!("leaderboard/{}/weekly/{}", mode.as_str(), year_week_id(now_ms)),
    }
}

/// ISO-8601 week id (`YYYY_WW`, UTC) of a Unix timestamp in ms
pub fn year_week_id(now_ms: f64) -> String {
    let days = (now_ms / MS_PER_DAY).floor() as i64;
    // 1970-01-01 was a Thursday; Monday = 0
    let weekday = (days + 3).rem_euclid(7);
    // The week belongs to the year of its Thursday
    let thursday = days - weekday + 3;
    let year = year_of_day(thursday);
    let week = (thursday - days_from_civil(year, 1, 1)) / 7 + 1;
    format!("{year}_{week:02}")
}

/// Days since the epoch of a proleptic Gregorian date
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn year_of_day(days: i64) -> i64 {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    // Years here start in March
    let january_or_february = mp >= 10;
    yoe + era * 400 + i64::from(january_or_february)
}

/// Leaderboard storage backend
#[allow(async_fn_in_trait)]
pub trait LeaderboardBackend {
    /// Record an entry on both the all-time and the weekly board
    async fn submit(&self, entry: LeaderboardEntry) -> Result<(), LeaderboardError>;

    /// Up to `limit` best entries, ascending by score
    async fn fetch_top(
        &self,
        mode: Mode,
        timeframe: Timeframe,
        now_ms: f64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

/// Backend keeping one JSON list per board path in a key-value store
#[derive(Debug)]
pub struct StoredLeaderboard<S> {
    store: S,
}

impl<S: KeyValueStore> StoredLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load(&self, path: &str) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        match self.store.get(path)? {
            Some(json) => Ok(serde_json::from_str(&json).map_err(crate::error::StorageError::from)?),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, path: &str, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        let mut entries = self.load(path)?;
        entries.push(entry.clone());
        entries.sort_by_key(|e| e.score);
        if entries.len() > MAX_STORED {
            entries.drain(..entries.len() - MAX_STORED);
        }
        let json = serde_json::to_string(&entries).map_err(crate::error::StorageError::from)?;
        self.store.set(path, &json)?;
        Ok(())
    }
}

impl<S: KeyValueStore> LeaderboardBackend for StoredLeaderboard<S> {
    async fn submit(&self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        for timeframe in [Timeframe::AllTime, Timeframe::Weekly] {
            let path = board_path(entry.mode, timeframe, entry.timestamp);
            self.append(&path, &entry)?;
        }
        Ok(())
    }

    async fn fetch_top(
        &self,
        mode: Mode,
        timeframe: Timeframe,
        now_ms: f64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.load(&board_path(mode, timeframe, now_ms))?;
        entries.sort_by_key(|e| e.score);
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

/// Trimmed, non-empty, bounded player name
pub fn validate_name(name: &str) -> Result<String, LeaderboardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeaderboardError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LeaderboardError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(name.to_string())
}

/// Player-facing status line for a submission outcome
pub fn status_message(result: &Result<(), LeaderboardError>) -> String {
    match result {
        Ok(()) => "Submitted!".to_string(),
        Err(err @ (LeaderboardError::EmptyName | LeaderboardError::NameTooLong { .. })) => {
            let text = err.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => text,
            }
        }
        Err(LeaderboardError::Unavailable) => "Leaderboard unavailable".to_string(),
        Err(_) => "Failed to submit score.".to_string(),
    }
}

/// Leaderboard client used by the UI
pub struct Leaderboard<B> {
    backend: B,
}

impl<B: LeaderboardBackend> Leaderboard<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Validate and submit; errors are logged and returned
    pub async fn try_submit(&self, name: &str, score: u64, mode: Mode, now_ms: f64) -> Result<(), LeaderboardError> {
        let name = validate_name(name)?;
        let entry = LeaderboardEntry {
            name,
            score,
            mode,
            timestamp: now_ms,
        };
        match self.backend.submit(entry).await {
            Ok(()) => {
                log::info!("Submitted {} score {}", mode.as_str(), score);
                Ok(())
            }
            Err(err) => {
                log::error!("Error submitting score: {err}");
                Err(err)
            }
        }
    }

    /// Submit and return the status line to show the player
    pub async fn submit_score(&self, name: &str, score: u64, mode: Mode, now_ms: f64) -> String {
        status_message(&self.try_submit(name, score, mode, now_ms).await)
    }

    /// Best entries first
    pub async fn top_scores(
        &self,
        mode: Mode,
        timeframe: Timeframe,
        now_ms: f64,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.backend.fetch_top(mode, timeframe, now_ms, TOP_LIMIT).await?;
        entries.reverse();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use pollster::block_on;

    /// 2026-10-18T00:00:00Z
    const NOW: f64 = 1_792_281_600_000.0;

    struct OfflineBackend;

    impl LeaderboardBackend for OfflineBackend {
        async fn submit(&self, _entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Backend("offline".into()))
        }

        async fn fetch_top(
            &self,
            _mode: Mode,
            _timeframe: Timeframe,
            _now_ms: f64,
            _limit: usize,
        ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Err(LeaderboardError::Unavailable)
        }
    }

    #[test]
    fn test_year_week_id() {
        assert_eq!(year_week_id(NOW), "2026_42");
        // Friday Jan 1 belongs to the last week of the previous year
        assert_eq!(year_week_id(1_609_459_200_000.0), "2020_53");
        // Monday Dec 30 belongs to week 1 of the next year
        assert_eq!(year_week_id(1_735_516_800_000.0), "2025_01");
        assert_eq!(year_week_id(1_767_225_600_000.0), "2026_01");
    }

    #[test]
    fn test_board_paths() {
        assert_eq!(board_path(Mode::Hard, Timeframe::AllTime, NOW), "leaderboard/hard/allTime");
        assert_eq!(board_path(Mode::Easy, Timeframe::Weekly, NOW), "leaderboard/easy/weekly/2026_42");
    }

    #[test]
    fn test_name_validation() {
        assert!(matches!(validate_name("   "), Err(LeaderboardError::EmptyName)));
        assert!(matches!(
            validate_name(&"x".repeat(21)),
            Err(LeaderboardError::NameTooLong { max: 20 })
        ));
        assert_eq!(validate_name("  ace ").unwrap(), "ace");
    }

    #[test]
    fn test_top_scores_descending() {
        let board = Leaderboard::new(StoredLeaderboard::new(MemoryStore::new()));
        for (i, score) in [5u64, 40, 12, 7, 33, 1, 90, 18, 25, 3, 60, 2].into_iter().enumerate() {
            let status = block_on(board.submit_score(&format!("p{i}"), score, Mode::Hard, NOW));
            assert_eq!(status, "Submitted!");
        }

        let top = block_on(board.top_scores(Mode::Hard, Timeframe::AllTime, NOW)).unwrap();
        let scores: Vec<u64> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 60, 40, 33, 25, 18, 12, 7, 5, 3]);

        let weekly = block_on(board.top_scores(Mode::Hard, Timeframe::Weekly, NOW)).unwrap();
        assert_eq!(weekly.len(), TOP_LIMIT);
        assert!(block_on(board.top_scores(Mode::Easy, Timeframe::AllTime, NOW)).unwrap().is_empty());
    }

    #[test]
    fn test_weekly_board_rolls_over() {
        let board = Leaderboard::new(StoredLeaderboard::new(MemoryStore::new()));
        block_on(board.submit_score("ace", 10, Mode::Easy, NOW));
        let next_week = NOW + 7.0 * MS_PER_DAY;
        assert!(block_on(board.top_scores(Mode::Easy, Timeframe::Weekly, next_week)).unwrap().is_empty());
        assert_eq!(block_on(board.top_scores(Mode::Easy, Timeframe::AllTime, next_week)).unwrap().len(), 1);
    }

    #[test]
    fn test_status_messages() {
        let board = Leaderboard::new(StoredLeaderboard::new(MemoryStore::new()));
        assert_eq!(block_on(board.submit_score(" ", 10, Mode::Hard, NOW)), "Please enter a name");

        let offline = Leaderboard::new(OfflineBackend);
        assert_eq!(block_on(offline.submit_score("ace", 10, Mode::Hard, NOW)), "Failed to submit score.");
        assert!(matches!(
            block_on(offline.top_scores(Mode::Hard, Timeframe::AllTime, NOW)),
            Err(LeaderboardError::Unavailable)
        ));
    }

    #[test]
    fn test_corrupt_board_is_an_error() {
        let store = MemoryStore::new();
        store.set("leaderboard/hard/allTime", "{oops").unwrap();
        let board = Leaderboard::new(StoredLeaderboard::new(store));
        assert!(matches!(
            block_on(board.top_scores(Mode::Hard, Timeframe::AllTime, NOW)),
            Err(LeaderboardError::Storage(_))
        ));
    }
}
