use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::moderation::models::{Category, ModerationResult};
use crate::shared::constants::SAFETY_TREND_CAPACITY;

/// Rolling per-user moderation counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub user_id: String,
    pub total_items: i64,
    pub flagged_items: i64,
    pub category_counts: BTreeMap<Category, i64>,
    /// Most recent safety scores, oldest first
    pub trend: VecDeque<i32>,
    pub updated_at: DateTime<Utc>,
}

impl SafetyMetrics {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_items: 0,
            flagged_items: 0,
            category_counts: BTreeMap::new(),
            trend: VecDeque::with_capacity(SAFETY_TREND_CAPACITY),
            updated_at: Utc::now(),
        }
    }

    /// Share of unflagged items as a 0-100 integer, derived from the counters
    pub fn safety_score(&self) -> i32 {
        if self.total_items <= 0 {
            return 100;
        }
        let flagged = self.flagged_items.clamp(0, self.total_items) as f64;
        (100.0 * (1.0 - flagged / self.total_items as f64)).round() as i32
    }

    /// Count a newly moderated item
    pub fn record(&mut self, result: &ModerationResult) {
        self.total_items += 1;
        self.apply(result, 1);
        self.push_trend();
    }

    /// Replace the contribution of `previous` with `current` for the same
    /// item (human review, or an edit re-moderated)
    pub fn revise(&mut self, previous: &ModerationResult, current: &ModerationResult) {
        self.apply(previous, -1);
        self.apply(current, 1);
        self.push_trend();
    }

    fn apply(&mut self, result: &ModerationResult, delta: i64) {
        if result.is_flagged() {
            self.flagged_items = (self.flagged_items + delta).max(0);
        }
        for category in result.categories.iter().filter(|c| **c != Category::Safe) {
            let count = self.category_counts.entry(*category).or_insert(0);
            *count = (*count + delta).max(0);
        }
        self.category_counts.retain(|_, count| *count > 0);
    }

    fn push_trend(&mut self) {
        if self.trend.len() == SAFETY_TREND_CAPACITY {
            self.trend.pop_front();
        }
        self.trend.push_back(self.safety_score());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::{
        ContentType, CreateModerationResult, Decision, Severity,
    };
    use std::collections::BTreeSet;

    fn result(decision: Decision, categories: &[Category]) -> ModerationResult {
        CreateModerationResult {
            content_id: "post-1".to_string(),
            user_id: "author-1".to_string(),
            content_type: ContentType::Text,
            decision,
            severity: Severity::Medium,
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            confidence: 0.8,
            overall_score: 0.5,
            context_aware: false,
            classifier_id: "test".to_string(),
            notes: None,
            feedback_message: None,
            content_fingerprint: String::new(),
        }
        .into()
    }

    #[test]
    fn test_empty_metrics_score_100() {
        assert_eq!(SafetyMetrics::new("u").safety_score(), 100);
    }

    #[test]
    fn test_score_derived_from_counters() {
        let mut metrics = SafetyMetrics::new("u");
        metrics.record(&result(Decision::Approved, &[]));
        metrics.record(&result(Decision::Approved, &[]));
        metrics.record(&result(Decision::Rejected, &[Category::Harassment]));

        assert_eq!(metrics.total_items, 3);
        assert_eq!(metrics.flagged_items, 1);
        assert_eq!(metrics.safety_score(), 67);
        assert_eq!(metrics.category_counts.get(&Category::Harassment), Some(&1));
        assert_eq!(metrics.trend, VecDeque::from([100, 100, 67]));
    }

    #[test]
    fn test_revise_unflags_overturned_item() {
        let mut metrics = SafetyMetrics::new("u");
        let pending = result(Decision::PendingReview, &[Category::Violence]);
        metrics.record(&pending);
        assert_eq!(metrics.safety_score(), 0);

        let approved = result(Decision::Approved, &[Category::Safe]);
        metrics.revise(&pending, &approved);

        assert_eq!(metrics.total_items, 1);
        assert_eq!(metrics.flagged_items, 0);
        assert!(metrics.category_counts.is_empty());
        assert_eq!(metrics.safety_score(), 100);
    }

    #[test]
    fn test_trend_is_bounded() {
        let mut metrics = SafetyMetrics::new("u");
        for _ in 0..(SAFETY_TREND_CAPACITY + 12) {
            metrics.record(&result(Decision::Approved, &[]));
        }

        assert_eq!(metrics.trend.len(), SAFETY_TREND_CAPACITY);
        assert_eq!(metrics.total_items, (SAFETY_TREND_CAPACITY + 12) as i64);
    }
}
