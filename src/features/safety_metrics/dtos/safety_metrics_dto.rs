use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::safety_metrics::models::SafetyMetrics;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafetyMetricsResponseDto {
    pub user_id: String,
    pub total_items: i64,
    pub flagged_items: i64,
    /// 0-100, share of unflagged items
    pub safety_score: i32,
    /// Violation category -> number of current results carrying it
    pub category_counts: BTreeMap<String, i64>,
    /// Recent safety scores, oldest first
    pub trend: Vec<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<SafetyMetrics> for SafetyMetricsResponseDto {
    fn from(metrics: SafetyMetrics) -> Self {
        Self {
            safety_score: metrics.safety_score(),
            user_id: metrics.user_id,
            total_items: metrics.total_items,
            flagged_items: metrics.flagged_items,
            category_counts: metrics
                .category_counts
                .into_iter()
                .map(|(category, count)| (category.as_str().to_string(), count))
                .collect(),
            trend: metrics.trend.into_iter().collect(),
            updated_at: metrics.updated_at,
        }
    }
}
