//! Token estimator trait and the in-process approximation.

use crate::types::{Message, MessageRole};
use crate::Result;
use async_trait::async_trait;

/// Token totals for a prompt: assistant turns count as output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageTokens {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[async_trait]
pub trait TokenEstimator: Send + Sync {
    async fn count(&self, text: &str) -> Result<u64>;

    /// Count the system prompt plus every message's flattened text.
    async fn count_messages(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<MessageTokens> {
        let mut totals = MessageTokens::default();
        if !system_prompt.is_empty() {
            totals.input_tokens += self.count(system_prompt).await?;
        }
        for message in messages {
            let tokens = self.count(&message.text()).await?;
            match message.role {
                MessageRole::Assistant => totals.output_tokens += tokens,
                MessageRole::User | MessageRole::System => totals.input_tokens += tokens,
            }
        }
        Ok(totals)
    }

    fn name(&self) -> &'static str;
}

/// Character-ratio approximation, about four characters per token.
#[derive(Debug, Clone)]
pub struct CharacterEstimator {
    chars_per_token: f64,
}

impl CharacterEstimator {
    pub fn new() -> Self {
        Self::with_ratio(4.0)
    }
    pub fn with_ratio(r: f64) -> Self {
        Self { chars_per_token: r }
    }
}

impl Default for CharacterEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenEstimator for CharacterEstimator {
    async fn count(&self, text: &str) -> Result<u64> {
        Ok((text.chars().count() as f64 / self.chars_per_token).ceil() as u64)
    }

    fn name(&self) -> &'static str {
        "character"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn character_estimator_rounds_up() {
        let est = CharacterEstimator::new();
        assert_eq!(est.count("").await.unwrap(), 0);
        assert_eq!(est.count("abc").await.unwrap(), 1);
        assert_eq!(est.count("abcdefgh").await.unwrap(), 2);
        assert_eq!(est.count("abcdefghi").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn count_messages_splits_assistant_output() {
        let est = CharacterEstimator::new();
        let msgs = vec![
            Message::user("12345678"),
            Message::assistant("1234"),
            Message::user("1234"),
        ];
        let totals = est.count_messages("12345678", &msgs).await.unwrap();
        assert_eq!(totals.input_tokens, 2 + 2 + 1);
        assert_eq!(totals.output_tokens, 1);
    }

    #[tokio::test]
    async fn empty_system_prompt_is_skipped() {
        let est = CharacterEstimator::with_ratio(1.0);
        let totals = est
            .count_messages("", &[Message::user("abc")])
            .await
            .unwrap();
        assert_eq!(totals.input_tokens, 3);
    }
}
