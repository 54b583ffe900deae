//! Best-of-3 leaderboard
//!
//! Persisted as a bare JSON array in the key-value store. Anything unreadable
//! (missing key, bad JSON, not an array) loads as an empty ranking.

use serde::{Deserialize, Serialize};

use crate::format_time;
use crate::platform::storage::KeyValueStore;

/// How finished runs are ordered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScoringRule {
    /// Highest `max(0, time_limit - time) + pickups * pickup_weight` first
    Composite { pickup_weight: f32 },
    /// Fastest time first; more pickups breaks ties
    FastestTime,
}

impl ScoringRule {
    /// Composite score of a run
    pub fn composite_score(time_limit: f32, time: f32, pickups: u32, pickup_weight: f32) -> f32 {
        (time_limit - time).max(0.0) + pickups as f32 * pickup_weight
    }

    /// Ordering of two entries (`Less` ranks higher)
    fn compare(&self, a: &RankEntry, b: &RankEntry, time_limit: f32) -> std::cmp::Ordering {
        match *self {
            ScoringRule::FastestTime => a
                .time
                .total_cmp(&b.time)
                .then_with(|| b.pickups.cmp(&a.pickups)),
            ScoringRule::Composite { pickup_weight } => {
                let sa = Self::composite_score(time_limit, a.time, a.pickups, pickup_weight);
                let sb = Self::composite_score(time_limit, b.time, b.pickups, pickup_weight);
                sb.total_cmp(&sa)
            }
        }
    }
}

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub name: String,
    /// Finish time (seconds)
    pub time: f32,
    /// Bows collected
    #[serde(rename = "score")]
    pub pickups: u32,
}

impl RankEntry {
    pub fn new(name: impl Into<String>, time: f32, pickups: u32) -> Self {
        Self {
            name: name.into(),
            time,
            pickups,
        }
    }

    /// One leaderboard line: name, time and bow count
    pub fn display(&self) -> String {
        format!("{} — {} — {} bows", self.name, format_time(self.time), self.pickups)
    }
}

/// The leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<RankEntry>,
    pub rule: ScoringRule,
    pub capacity: usize,
    /// Needed by the composite rule
    pub time_limit: f32,
}

impl Ranking {
    /// Create empty leaderboard
    pub fn new(rule: ScoringRule, capacity: usize, time_limit: f32) -> Self {
        Self {
            entries: Vec::new(),
            rule,
            capacity,
            time_limit,
        }
    }

    /// Add a run, re-sort and keep the best `capacity`.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn submit_result(&mut self, entry: RankEntry) -> Option<usize> {
        self.entries.push(entry);
        let submitted = self.entries.len() - 1;

        // Stable sort: equal scores keep insertion order
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        let (rule, limit) = (self.rule, self.time_limit);
        order.sort_by(|&a, &b| rule.compare(&self.entries[a], &self.entries[b], limit));

        let rank = order.iter().position(|&i| i == submitted);
        let mut sorted: Vec<RankEntry> = order
            .into_iter()
            .map(|i| self.entries[i].clone())
            .collect();
        sorted.truncate(self.capacity);
        self.entries = sorted;

        rank.filter(|&r| r < self.capacity).map(|r| r + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current leader
    pub fn best(&self) -> Option<&RankEntry> {
        self.entries.first()
    }

    /// Replace the entries with whatever the store holds under `key`
    pub fn load(&mut self, store: &dyn KeyValueStore, key: &str) {
        self.entries = Self::read_entries(store, key);
        log::info!("Loaded {} ranking entries", self.entries.len());
    }

    /// Read stored entries, treating anything unreadable as empty
    pub fn read_entries(store: &dyn KeyValueStore, key: &str) -> Vec<RankEntry> {
        let Some(json) = store.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<RankEntry>>(&json) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring unreadable ranking under {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Save entries to the store
    pub fn save(&self, store: &mut dyn KeyValueStore, key: &str) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => match store.set(key, &json) {
                Ok(()) => log::info!("Ranking saved ({} entries)", self.entries.len()),
                Err(e) => log::warn!("Failed to save ranking: {}", e),
            },
            Err(e) => log::warn!("Failed to encode ranking: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    const KEY: &str = "top3";

    fn composite() -> Ranking {
        Ranking::new(ScoringRule::Composite { pickup_weight: 0.11 }, 3, 60.0)
    }

    #[test]
    fn test_composite_score_example() {
        let score = ScoringRule::composite_score(60.0, 45.0, 5, 0.11);
        assert!((score - 15.55).abs() < 1e-4);
        // Slower than the limit only counts pickups
        let late = ScoringRule::composite_score(60.0, 75.0, 2, 0.11);
        assert!((late - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_keeps_top_three_by_composite() {
        let mut ranking = composite();
        ranking.submit_result(RankEntry::new("slow", 55.0, 0)); // 5.0
        ranking.submit_result(RankEntry::new("fast", 30.0, 0)); // 30.0
        ranking.submit_result(RankEntry::new("collector", 45.0, 5)); // 15.55
        let rank = ranking.submit_result(RankEntry::new("mid", 40.0, 1)); // 20.11

        assert_eq!(rank, Some(2));
        let names: Vec<_> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "mid", "collector"]);
    }

    #[test]
    fn test_pickups_can_beat_time() {
        let mut ranking = composite();
        ranking.submit_result(RankEntry::new("quick", 40.0, 0)); // 20.0
        ranking.submit_result(RankEntry::new("greedy", 40.5, 11)); // 19.5 + 1.21
        assert_eq!(ranking.best().unwrap().name, "greedy");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut ranking = composite();
        ranking.submit_result(RankEntry::new("first", 50.0, 0));
        let rank = ranking.submit_result(RankEntry::new("second", 50.0, 0));
        assert_eq!(rank, Some(2));
        assert_eq!(ranking.entries[0].name, "first");
    }

    #[test]
    fn test_result_off_the_board() {
        let mut ranking = composite();
        for (i, t) in [10.0, 20.0, 30.0].iter().enumerate() {
            ranking.submit_result(RankEntry::new(format!("p{i}"), *t, 0));
        }
        assert_eq!(ranking.submit_result(RankEntry::new("late", 59.0, 0)), None);
        assert_eq!(ranking.entries.len(), 3);
        assert!(ranking.entries.iter().all(|e| e.name != "late"));
    }

    #[test]
    fn test_fastest_time_rule() {
        let mut ranking = Ranking::new(ScoringRule::FastestTime, 3, 60.0);
        ranking.submit_result(RankEntry::new("a", 42.0, 1));
        ranking.submit_result(RankEntry::new("b", 40.0, 0));
        ranking.submit_result(RankEntry::new("c", 42.0, 9));
        let names: Vec<_> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_load_tolerates_bad_data() {
        let mut store = MemoryStore::new();
        let mut ranking = composite();

        // Missing
        ranking.load(&store, KEY);
        assert!(ranking.is_empty());

        // Corrupt
        store.set(KEY, "{{{").unwrap();
        ranking.load(&store, KEY);
        assert!(ranking.is_empty());

        // Valid JSON, not an array
        store.set(KEY, r#"{"name":"x"}"#).unwrap();
        ranking.load(&store, KEY);
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut ranking = composite();
        ranking.submit_result(RankEntry::new("Ana", 41.2, 7));
        ranking.save(&mut store, KEY);

        let raw = store.get(KEY).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"score\":7"));

        let mut reloaded = composite();
        reloaded.load(&store, KEY);
        assert_eq!(reloaded.entries, ranking.entries);
    }

    #[test]
    fn test_display() {
        let entry = RankEntry::new("Ana", 41.2, 7);
        assert_eq!(entry.display(), "Ana — 41.20s — 7 bows");
    }
}
