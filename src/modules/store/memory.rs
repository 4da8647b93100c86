use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ModerationStore;
use crate::core::error::Result;
use crate::features::appeals::models::Appeal;
use crate::features::moderation::models::{ContentItem, ContentType, ModerationResult};
use crate::features::review_queue::models::QueueItem;
use crate::features::safety_metrics::models::SafetyMetrics;

#[derive(Default)]
struct State {
    contents: HashMap<String, ContentItem>,
    /// Append-only result arena
    results: Vec<ModerationResult>,
    result_index: HashMap<Uuid, usize>,
    /// content id -> arena index of the authoritative result
    authoritative: HashMap<String, usize>,
    /// Per content type, in enqueue order
    queues: HashMap<ContentType, Vec<QueueItem>>,
    metrics: HashMap<String, SafetyMetrics>,
    appeals: Vec<Appeal>,
}

impl State {
    fn push_result(&mut self, result: &ModerationResult) {
        let index = self.results.len();
        self.results.push(result.clone());
        self.result_index.insert(result.id, index);
        self.authoritative.insert(result.content_id.clone(), index);
    }

    fn replace_queue_item(&mut self, item: &QueueItem) {
        if let Some(existing) = self
            .queues
            .get_mut(&item.content_type)
            .and_then(|queue| queue.iter_mut().find(|q| q.id == item.id))
        {
            *existing = item.clone();
        }
    }
}

/// Store kept in process memory; contents are lost on restart
#[derive(Default)]
pub struct InMemoryModerationStore {
    state: RwLock<State>,
}

impl InMemoryModerationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModerationStore for InMemoryModerationStore {
    async fn save_content(&self, item: &ContentItem) -> Result<()> {
        let mut state = self.state.write().await;
        state.contents.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>> {
        Ok(self.state.read().await.contents.get(content_id).cloned())
    }

    async fn record_result(&self, result: &ModerationResult) -> Result<()> {
        self.state.write().await.push_result(result);
        Ok(())
    }

    async fn get_result(&self, id: Uuid) -> Result<Option<ModerationResult>> {
        let state = self.state.read().await;
        Ok(state
            .result_index
            .get(&id)
            .and_then(|i| state.results.get(*i))
            .cloned())
    }

    async fn authoritative_result(&self, content_id: &str) -> Result<Option<ModerationResult>> {
        let state = self.state.read().await;
        Ok(state
            .authoritative
            .get(content_id)
            .and_then(|i| state.results.get(*i))
            .cloned())
    }

    async fn result_history(&self, content_id: &str) -> Result<Vec<ModerationResult>> {
        let state = self.state.read().await;
        Ok(state
            .results
            .iter()
            .filter(|r| r.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn insert_queue_item(&self, item: &QueueItem) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .queues
            .entry(item.content_type)
            .or_default()
            .push(item.clone());
        Ok(())
    }

    async fn update_queue_item(&self, item: &QueueItem) -> Result<()> {
        self.state.write().await.replace_queue_item(item);
        Ok(())
    }

    async fn record_review(&self, result: &ModerationResult, item: &QueueItem) -> Result<()> {
        let mut state = self.state.write().await;
        state.push_result(result);
        state.replace_queue_item(item);
        Ok(())
    }

    async fn queue_items_for_content(&self, content_id: &str) -> Result<Vec<QueueItem>> {
        let state = self.state.read().await;
        let mut items: Vec<QueueItem> = state
            .queues
            .values()
            .flatten()
            .filter(|q| q.content_id == content_id)
            .cloned()
            .collect();
        items.sort_by_key(|q| q.enqueued_at);
        Ok(items)
    }

    async fn list_queue(
        &self,
        content_type: ContentType,
        pending_only: bool,
    ) -> Result<Vec<QueueItem>> {
        let state = self.state.read().await;
        Ok(state
            .queues
            .get(&content_type)
            .map(|queue| {
                queue
                    .iter()
                    .filter(|q| !pending_only || !q.reviewed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn pending_count(&self, content_type: ContentType) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .queues
            .get(&content_type)
            .map(|queue| queue.iter().filter(|q| !q.reviewed).count() as i64)
            .unwrap_or(0))
    }

    async fn get_metrics(&self, user_id: &str) -> Result<Option<SafetyMetrics>> {
        Ok(self.state.read().await.metrics.get(user_id).cloned())
    }

    async fn save_metrics(&self, metrics: &SafetyMetrics) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .metrics
            .insert(metrics.user_id.clone(), metrics.clone());
        Ok(())
    }

    async fn insert_appeal(&self, appeal: &Appeal) -> Result<()> {
        self.state.write().await.appeals.push(appeal.clone());
        Ok(())
    }

    async fn appeals_for_result(&self, moderation_id: Uuid) -> Result<Vec<Appeal>> {
        let state = self.state.read().await;
        Ok(state
            .appeals
            .iter()
            .filter(|a| a.moderation_id == moderation_id)
            .cloned()
            .collect())
    }

    async fn appeals_by_user(&self, user_id: &str) -> Result<Vec<Appeal>> {
        let state = self.state.read().await;
        Ok(state
            .appeals
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}
