//! Request classification: cacheability and sampling temperature.

use crate::types::Message;

pub const TASK_TEMPERATURE: f64 = 0.0;
pub const IDENTITY_TEMPERATURE: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Ordinary work; deterministic and cacheable.
    Task,
    /// Conversational identity question; sampled fresh every time.
    Identity,
}

impl RequestClass {
    pub fn is_cacheable(self) -> bool {
        matches!(self, RequestClass::Task)
    }

    pub fn temperature(self) -> f64 {
        match self {
            RequestClass::Task => TASK_TEMPERATURE,
            RequestClass::Identity => IDENTITY_TEMPERATURE,
        }
    }
}

/// Classifies a message list by phrase matching on plain string content.
/// Block content is never inspected.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    phrases: Vec<String>,
}

impl RequestClassifier {
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn classify(&self, messages: &[Message]) -> RequestClass {
        let identity = messages.iter().filter_map(Message::plain_text).any(|text| {
            let lowered = text.to_lowercase();
            self.phrases.iter().any(|p| lowered.contains(p.as_str()))
        });
        if identity {
            RequestClass::Identity
        } else {
            RequestClass::Task
        }
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(&["who are you".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, MessageContent, MessageRole};

    #[test]
    fn identity_phrase_in_any_message() {
        let c = RequestClassifier::default();
        let msgs = vec![Message::user("hi"), Message::user("So, WHO ARE YOU exactly?")];
        assert_eq!(c.classify(&msgs), RequestClass::Identity);
        assert_eq!(c.classify(&msgs).temperature(), 1.3);
        assert!(!c.classify(&msgs).is_cacheable());
    }

    #[test]
    fn task_request() {
        let c = RequestClassifier::default();
        let class = c.classify(&[Message::user("Write a function to sort a list")]);
        assert_eq!(class, RequestClass::Task);
        assert_eq!(class.temperature(), 0.0);
        assert!(class.is_cacheable());
    }

    #[test]
    fn block_content_is_not_inspected() {
        let c = RequestClassifier::default();
        let msg = Message::with_content(
            MessageRole::User,
            MessageContent::Blocks(vec![ContentBlock::text("who are you")]),
        );
        assert_eq!(c.classify(&[msg]), RequestClass::Task);
    }

    #[test]
    fn custom_phrases_are_case_folded() {
        let c = RequestClassifier::new(&["Introduce Yourself".to_string()]);
        assert_eq!(
            c.classify(&[Message::user("please introduce yourself")]),
            RequestClass::Identity
        );
    }
}
