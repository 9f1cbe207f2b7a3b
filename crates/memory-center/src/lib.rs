//! User memory and execution history.
//!
//! The orchestrator only performs point writes: preferences and
//! autofill values upsert by `(user_id, key)`, execution history is
//! append-only. [`MemoryStore`] is the boundary a real backend
//! implements; [`InMemoryStore`] is the reference implementation used
//! by tests and single-process runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const RECENT_HISTORY_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failed: {0}")]
    Backend(String),
}

/// One stored preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub value: String,
    pub category: String,
    pub updated_at: DateTime<Utc>,
}

/// One past command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub status: String,
    pub log: Value,
    pub created_at: DateTime<Utc>,
}

/// Context blob handed to the planning oracle: what we know about the
/// user plus their most recent commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub preferences: HashMap<String, String>,
    pub recent_history: Vec<HistoryRecap>,
    pub autofill: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecap {
    pub command: String,
    pub status: String,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Upsert a preference by `(user_id, key)`.
    async fn save_item(
        &self,
        user_id: &str,
        key: &str,
        value: &str,
        category: &str,
    ) -> Result<(), StoreError>;

    async fn get_item(&self, user_id: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Append one execution to the user's history.
    async fn save_execution(
        &self,
        user_id: &str,
        command: &str,
        log: Value,
        status: &str,
    ) -> Result<(), StoreError>;

    async fn get_user_context(&self, user_id: &str) -> Result<UserContext, StoreError>;

    /// Upsert an autofill value by `(user_id, field_type)`. Sensitive
    /// values must be masked by the caller before they get here.
    async fn save_autofill(
        &self,
        user_id: &str,
        field_type: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    async fn get_autofill(
        &self,
        user_id: &str,
        field_type: &str,
    ) -> Result<Option<String>, StoreError>;
}

#[derive(Default)]
struct UserMemory {
    preferences: HashMap<String, PreferenceItem>,
    history: Vec<HistoryEntry>,
    autofill: HashMap<String, String>,
}

/// Reference store keyed by user id.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, UserMemory>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn save_item(
        &self,
        user_id: &str,
        key: &str,
        value: &str,
        category: &str,
    ) -> Result<(), StoreError> {
        let mut user = self.users.entry(user_id.to_string()).or_default();
        user.preferences.insert(
            key.to_string(),
            PreferenceItem {
                value: value.to_string(),
                category: category.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_item(&self, user_id: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|user| user.preferences.get(key).map(|item| item.value.clone())))
    }

    async fn save_execution(
        &self,
        user_id: &str,
        command: &str,
        log: Value,
        status: &str,
    ) -> Result<(), StoreError> {
        let mut user = self.users.entry(user_id.to_string()).or_default();
        user.history.push(HistoryEntry {
            command: command.to_string(),
            status: status.to_string(),
            log,
            created_at: Utc::now(),
        });
        tracing::debug!(user_id, command, status, "execution saved");
        Ok(())
    }

    async fn get_user_context(&self, user_id: &str) -> Result<UserContext, StoreError> {
        let mut context = UserContext {
            user_id: user_id.to_string(),
            ..UserContext::default()
        };
        if let Some(user) = self.users.get(user_id) {
            context.preferences = user
                .preferences
                .iter()
                .map(|(k, item)| (k.clone(), item.value.clone()))
                .collect();
            context.recent_history = user
                .history
                .iter()
                .rev()
                .take(RECENT_HISTORY_LIMIT)
                .map(|entry| HistoryRecap {
                    command: entry.command.clone(),
                    status: entry.status.clone(),
                })
                .collect();
            context.autofill = user.autofill.clone();
        }
        Ok(context)
    }

    async fn save_autofill(
        &self,
        user_id: &str,
        field_type: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut user = self.users.entry(user_id.to_string()).or_default();
        user.autofill
            .insert(field_type.to_string(), value.to_string());
        Ok(())
    }

    async fn get_autofill(
        &self,
        user_id: &str,
        field_type: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|user| user.autofill.get(field_type).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn save_item_upserts_by_key() {
        let store = InMemoryStore::new();
        store
            .save_item("u1", "home_city", "Pune", "general")
            .await
            .unwrap();
        store
            .save_item("u1", "home_city", "Mumbai", "general")
            .await
            .unwrap();

        assert_eq!(
            store.get_item("u1", "home_city").await.unwrap(),
            Some("Mumbai".to_string())
        );
        assert_eq!(store.get_item("u2", "home_city").await.unwrap(), None);
    }

    #[tokio::test]
    async fn history_is_append_only_and_recent_first() {
        let store = InMemoryStore::new();
        for i in 0..7 {
            store
                .save_execution("u1", &format!("cmd {}", i), json!([]), "completed")
                .await
                .unwrap();
        }

        let context = store.get_user_context("u1").await.unwrap();
        assert_eq!(context.recent_history.len(), 5);
        assert_eq!(context.recent_history[0].command, "cmd 6");
        assert_eq!(context.recent_history[4].command, "cmd 2");
    }

    #[tokio::test]
    async fn context_collects_all_sections() {
        let store = InMemoryStore::new();
        store
            .save_item("u1", "language", "en", "general")
            .await
            .unwrap();
        store.save_autofill("u1", "email", "al***@example.com").await.unwrap();
        store
            .save_execution("u1", "open docs.rs", json!([]), "completed")
            .await
            .unwrap();

        let context = store.get_user_context("u1").await.unwrap();
        assert_eq!(context.preferences.get("language").unwrap(), "en");
        assert_eq!(context.autofill.get("email").unwrap(), "al***@example.com");
        assert_eq!(
            context.recent_history,
            vec![HistoryRecap {
                command: "open docs.rs".into(),
                status: "completed".into(),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_user_yields_empty_context() {
        let store = InMemoryStore::new();
        let context = store.get_user_context("nobody").await.unwrap();
        assert!(context.preferences.is_empty());
        assert!(context.recent_history.is_empty());
        assert!(context.autofill.is_empty());
    }
}
