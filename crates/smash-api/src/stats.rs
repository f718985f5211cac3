//! Monthly statistics

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{Difficulty, EntityKind};

/// One smashed or missed item in a month's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub title: String,
    pub difficulty: Difficulty,
    pub kind: EntityKind,
    pub at: DateTime<Local>,
}

/// Aggregates for one `YYYY-MM` month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    #[serde(default)]
    pub smashed_count: u32,
    #[serde(default)]
    pub missed_count: u32,
    #[serde(default)]
    pub smashed_items: Vec<StatItem>,
    #[serde(default)]
    pub missed_items: Vec<StatItem>,
}

impl MonthlyStats {
    /// Count a smash and keep at most `limit` recent items
    pub fn record_smashed(&mut self, item: StatItem, limit: usize) {
        self.smashed_count = self.smashed_count.saturating_add(1);
        push_bounded(&mut self.smashed_items, item, limit);
    }

    /// Count a miss and keep at most `limit` recent items
    pub fn record_missed(&mut self, item: StatItem, limit: usize) {
        self.missed_count = self.missed_count.saturating_add(1);
        push_bounded(&mut self.missed_items, item, limit);
    }

    /// Drop the oldest items beyond `limit`. Counts are kept.
    pub fn trim(&mut self, limit: usize) {
        keep_latest(&mut self.smashed_items, limit);
        keep_latest(&mut self.missed_items, limit);
    }

    /// Smashed share of all recorded outcomes, if any
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.smashed_count + self.missed_count;
        if total == 0 {
            None
        } else {
            Some(self.smashed_count as f64 / total as f64)
        }
    }
}

fn push_bounded(items: &mut Vec<StatItem>, item: StatItem, limit: usize) {
    items.push(item);
    keep_latest(items, limit);
}

fn keep_latest(items: &mut Vec<StatItem>, limit: usize) {
    if items.len() > limit {
        let excess = items.len() - limit;
        items.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> StatItem {
        StatItem {
            title: format!("bug {}", n),
            difficulty: Difficulty::Easy,
            kind: EntityKind::Task,
            at: Local::now(),
        }
    }

    #[test]
    fn item_lists_stay_bounded() {
        let mut stats = MonthlyStats::default();
        for n in 0..250 {
            stats.record_smashed(item(n), 200);
        }

        assert_eq!(stats.smashed_count, 250);
        assert_eq!(stats.smashed_items.len(), 200);
        // Oldest entries are dropped first
        assert_eq!(stats.smashed_items[0].title, "bug 50");
        assert_eq!(stats.smashed_items[199].title, "bug 249");
    }

    #[test]
    fn trim_keeps_counts_and_latest_items() {
        let mut stats = MonthlyStats::default();
        for n in 0..10 {
            stats.record_missed(item(n), 200);
        }

        stats.trim(4);
        assert_eq!(stats.missed_count, 10);
        assert_eq!(stats.missed_items.len(), 4);
        assert_eq!(stats.missed_items[0].title, "bug 6");
    }

    #[test]
    fn success_rate() {
        let mut stats = MonthlyStats::default();
        assert_eq!(stats.success_rate(), None);

        stats.record_smashed(item(1), 200);
        stats.record_smashed(item(2), 200);
        stats.record_smashed(item(3), 200);
        stats.record_missed(item(4), 200);
        assert_eq!(stats.success_rate(), Some(0.75));
    }
}
