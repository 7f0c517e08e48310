use crate::types::{StreamChunk, UsageChunk};
use crate::Result;
use futures::{Stream, StreamExt};

/// Fully drained chunk stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedResponse {
    pub text: String,
    /// The last usage chunk seen, if any.
    pub usage: Option<UsageChunk>,
}

/// Drain `stream`, concatenating text and keeping the last usage record.
/// The first error aborts collection.
pub async fn collect_response<S>(stream: S) -> Result<CollectedResponse>
where
    S: Stream<Item = Result<StreamChunk>>,
{
    futures::pin_mut!(stream);
    let mut out = CollectedResponse::default();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            StreamChunk::Text { text } => out.text.push_str(&text),
            StreamChunk::Usage(u) => out.usage = Some(u),
        }
    }
    Ok(out)
}

/// Running token and cost totals over a response's usage records.
///
/// Per-increment estimates are summed until the provider's authoritative
/// usage record arrives, which then replaces them. Cache-read cost is kept
/// separately and always added.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageSummary {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    response_cost: f64,
    cache_read_cost: f64,
    authoritative: bool,
}

impl UsageSummary {
    pub fn record(&mut self, usage: &UsageChunk) {
        let cost = usage.total_cost.unwrap_or(0.0);
        if let Some(read) = usage.cache_read_tokens {
            self.cache_read_tokens = read;
            self.cache_read_cost = cost;
        } else if usage.cache_write_tokens.is_some() {
            // Pre-flight input estimate, carries no cost.
            if !self.authoritative {
                self.input_tokens = usage.input_tokens;
            }
        } else if usage.input_tokens > 0 {
            self.input_tokens = usage.input_tokens;
            self.output_tokens = usage.output_tokens;
            self.response_cost = cost;
            self.authoritative = true;
        } else if !self.authoritative {
            self.output_tokens += usage.output_tokens;
            self.response_cost += cost;
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.response_cost + self.cache_read_cost
    }

    /// Whether the totals come from the provider rather than estimates.
    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use futures::stream;

    #[tokio::test]
    async fn concatenates_text_and_keeps_last_usage() {
        let chunks = vec![
            Ok(StreamChunk::Usage(UsageChunk::new(5, 0))),
            Ok(StreamChunk::text("Hel")),
            Ok(StreamChunk::text("lo")),
            Ok(StreamChunk::Usage(UsageChunk::new(5, 2))),
        ];
        let out = collect_response(stream::iter(chunks)).await.unwrap();
        assert_eq!(out.text, "Hello");
        assert_eq!(out.usage, Some(UsageChunk::new(5, 2)));
    }

    #[tokio::test]
    async fn first_error_wins() {
        let chunks = vec![Ok(StreamChunk::text("a")), Err(Error::Cancelled)];
        assert!(matches!(
            collect_response(stream::iter(chunks)).await,
            Err(Error::Cancelled)
        ));
    }

    fn usage(input: u64, output: u64, cost: f64) -> UsageChunk {
        UsageChunk::new(input, output).with_total_cost(cost)
    }

    #[test]
    fn authoritative_usage_replaces_increment_estimates() {
        let mut summary = UsageSummary::default();
        summary.record(&UsageChunk::new(6, 0).with_cache_write_tokens(6));
        summary.record(&usage(0, 2, 0.5));
        summary.record(&usage(0, 3, 0.75));
        assert_eq!((summary.input_tokens, summary.output_tokens), (6, 5));
        assert!((summary.total_cost() - 1.25).abs() < 1e-12);
        assert!(!summary.is_authoritative());

        summary.record(&usage(10, 4, 2.0));
        summary.record(&usage(0, 1, 0.25));
        assert_eq!((summary.input_tokens, summary.output_tokens), (10, 4));
        assert!((summary.total_cost() - 2.0).abs() < 1e-12);
        assert!(summary.is_authoritative());
    }

    #[test]
    fn cache_read_cost_is_added() {
        let mut summary = UsageSummary::default();
        summary.record(&UsageChunk::cache_read(6, 0.1));
        summary.record(&usage(0, 2, 0.5));
        summary.record(&usage(10, 4, 2.0));
        assert_eq!(summary.cache_read_tokens, 6);
        assert!((summary.total_cost() - 2.1).abs() < 1e-12);
    }
}
