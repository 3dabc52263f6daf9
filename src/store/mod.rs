//! Append-only record of completed analyses.
//!
//! The pipeline talks to the [`InteractionStore`] trait so that the
//! in-memory default can be swapped for a persistent backend or a test
//! double.

use crate::models::Interaction;
use async_trait::async_trait;
use std::sync::RwLock;

/// Storage for [`Interaction`]s.
///
/// `record` is the only mutator. Entries are kept in the order `record`
/// was called and are never reordered or removed.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn record(&self, interaction: Interaction) -> Result<(), StoreError>;

    /// Every interaction, oldest first.
    async fn all(&self) -> Result<Vec<Interaction>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("interaction store lock poisoned")]
    LockPoisoned,
}

/// Process-lifetime store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    interactions: RwLock<Vec<Interaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn record(&self, interaction: Interaction) -> Result<(), StoreError> {
        self.interactions
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(interaction);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Interaction>, StoreError> {
        let interactions = self
            .interactions
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(interactions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StructuredResult;
    use std::sync::Arc;

    fn result(summary: &str) -> StructuredResult {
        StructuredResult {
            summary: summary.to_string(),
            explanations: vec![],
            key_findings: vec![],
            recommendations: vec![],
            disclaimer: "d".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_preserves_insertion_order() {
        let store = MemoryStore::new();
        for (i, name) in ["first", "second", "third"].iter().enumerate() {
            store
                .record(Interaction::new(name, result(name), i as u64, 500))
                .await
                .unwrap();
        }

        let all = store.all().await.unwrap();
        let previews: Vec<&str> = all.iter().map(|i| i.report_text_preview.as_str()).collect();
        assert_eq!(previews, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_all_returns_snapshot() {
        let store = MemoryStore::new();
        store
            .record(Interaction::new("a", result("a"), 1, 500))
            .await
            .unwrap();

        let before = store.all().await.unwrap();
        store
            .record(Interaction::new("b", result("b"), 2, 500))
            .await
            .unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_all_kept() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let text = format!("report {}", i);
                    store
                        .record(Interaction::new(&text, result(&text), i, 500))
                        .await
                })
            })
            .collect();

        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        assert_eq!(store.all().await.unwrap().len(), 16);
    }
}
