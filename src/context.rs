use crate::error::app_error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Per-conversation server selection. Each chat channel remembers its own
/// active server, so concurrent channels cannot clobber each other. Written by
/// the select-server command, read by every lookup; a read on a conversation
/// that never selected fails fast with guidance.
#[derive(Default)]
pub struct ServerSelections {
    inner: RwLock<HashMap<String, String>>,
}

impl ServerSelections {
    pub async fn select(&self, conversation_id: &str, server_id: &str) {
        let mut map = self.inner.write().await;
        let previous = map.insert(conversation_id.to_string(), server_id.to_string());
        info!(conversation_id, server_id, ?previous, "server selected");
    }

    pub async fn selected(&self, conversation_id: &str) -> Result<String, AppError> {
        self.inner
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or(AppError::NoActiveServer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_conversation_fails_fast() {
        let selections = ServerSelections::default();
        assert!(matches!(
            selections.selected("channel-1").await,
            Err(AppError::NoActiveServer)
        ));
    }

    #[tokio::test]
    async fn selection_is_returned_and_can_be_replaced() {
        let selections = ServerSelections::default();
        selections.select("channel-1", "srv-a").await;
        assert_eq!(selections.selected("channel-1").await.unwrap(), "srv-a");

        selections.select("channel-1", "srv-b").await;
        assert_eq!(selections.selected("channel-1").await.unwrap(), "srv-b");
    }

    #[tokio::test]
    async fn conversations_do_not_interfere() {
        let selections = ServerSelections::default();
        selections.select("channel-1", "srv-a").await;
        selections.select("channel-2", "srv-b").await;

        assert_eq!(selections.selected("channel-1").await.unwrap(), "srv-a");
        assert_eq!(selections.selected("channel-2").await.unwrap(), "srv-b");
    }
}
