//! Event mapping (OpenAI-style JSON frame -> wire events)

use serde_json::Value;

/// Provider-neutral content of one decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Content(String),
    Usage {
        prompt_tokens: u64,
        completion_tokens: u64,
    },
}

/// Map a `chat/completions` chunk to zero or more events.
///
/// Empty or null `delta.content` yields nothing. An in-stream
/// `{"error": {...}}` payload is returned as `Err(message)`.
pub fn map_payload(frame: &Value) -> Result<Vec<WireEvent>, String> {
    if let Some(err) = frame.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(message);
    }

    let mut events = Vec::new();
    if let Some(content) = frame
        .pointer("/choices/0/delta/content")
        .and_then(|c| c.as_str())
    {
        if !content.is_empty() {
            events.push(WireEvent::Content(content.to_string()));
        }
    }

    if let Some(usage) = frame.get("usage").filter(|u| u.is_object()) {
        let field = |name: &str| usage.get(name).and_then(|v| v.as_u64()).unwrap_or(0);
        events.push(WireEvent::Usage {
            prompt_tokens: field("prompt_tokens"),
            completion_tokens: field("completion_tokens"),
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_delta() {
        let f = json!({"choices": [{"delta": {"content": "Hel"}}]});
        assert_eq!(map_payload(&f).unwrap(), vec![WireEvent::Content("Hel".into())]);
    }

    #[test]
    fn empty_and_null_content_are_dropped() {
        assert!(map_payload(&json!({"choices": [{"delta": {"content": ""}}]}))
            .unwrap()
            .is_empty());
        assert!(map_payload(&json!({"choices": [{"delta": {"content": null}}]}))
            .unwrap()
            .is_empty());
        assert!(map_payload(&json!({"choices": []})).unwrap().is_empty());
    }

    #[test]
    fn usage_frame_with_null_usage_is_ignored() {
        let f = json!({"choices": [{"delta": {}}], "usage": null});
        assert!(map_payload(&f).unwrap().is_empty());
    }

    #[test]
    fn content_and_usage_in_one_frame() {
        let f = json!({
            "choices": [{"delta": {"content": "!"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 34}
        });
        assert_eq!(
            map_payload(&f).unwrap(),
            vec![
                WireEvent::Content("!".into()),
                WireEvent::Usage { prompt_tokens: 12, completion_tokens: 34 }
            ]
        );
    }

    #[test]
    fn in_stream_error() {
        let f = json!({"error": {"message": "overloaded"}});
        assert_eq!(map_payload(&f).unwrap_err(), "overloaded");
    }
}
