//! Benchmarks for streaming pipeline performance
//!
//! This benchmark measures:
//! - SSE line classification
//! - Frame mapping to wire events
//! - Full decode of a chunked response body
//! - Request fingerprinting

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use futures::StreamExt;
use llm_relay::cache::FingerprintGenerator;
use llm_relay::pipeline::{decode_bytes, map_payload, SseDecoder};
use llm_relay::Message;

/// Sample SSE frames (DeepSeek / OpenAI chunk format)
const SSE_FRAMES: &[&str] = &[
    r#"data: {"id":"c1","object":"chat.completion.chunk","created":1694268190,"model":"deepseek-chat","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#,
    r#"data: {"id":"c1","object":"chat.completion.chunk","created":1694268190,"model":"deepseek-chat","choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#,
    r#"data: {"id":"c1","object":"chat.completion.chunk","created":1694268190,"model":"deepseek-chat","choices":[{"index":0,"delta":{"content":" there"},"finish_reason":null}]}"#,
    r#"data: {"id":"c1","object":"chat.completion.chunk","created":1694268190,"model":"deepseek-chat","choices":[{"index":0,"delta":{"content":"!"},"finish_reason":null}]}"#,
    r#"data: {"id":"c1","object":"chat.completion.chunk","created":1694268190,"model":"deepseek-chat","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":9,"completion_tokens":3}}"#,
    "data: [DONE]",
];

fn bench_sse_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_lines");

    let frame = SSE_FRAMES[1];
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("parse_single_line", |b| {
        b.iter(|| SseDecoder::parse_line(black_box(frame)))
    });

    group.bench_function("parse_and_map", |b| {
        b.iter(|| {
            for line in SSE_FRAMES {
                if let Some(llm_relay::pipeline::SseFrame::Data(v)) =
                    SseDecoder::parse_line(black_box(line))
                {
                    let _ = map_payload(&v);
                }
            }
        })
    });

    group.finish();
}

fn bench_decode_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_stream");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let body: String = SSE_FRAMES
        .iter()
        .map(|f| format!("{f}\n\n"))
        .collect::<String>();
    // Split into uneven network-sized reads.
    let reads: Vec<Bytes> = body
        .as_bytes()
        .chunks(97)
        .map(Bytes::copy_from_slice)
        .collect();
    group.throughput(Throughput::Bytes(body.len() as u64));

    group.bench_function("chunked_body", |b| {
        b.to_async(&rt).iter(|| {
            let reads = reads.clone();
            async move {
                let frames: Vec<_> = decode_bytes(reads).collect().await;
                black_box(frames)
            }
        })
    });

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    let messages: Vec<Message> = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("question {i}: explain ownership in detail"))
            } else {
                Message::assistant(format!("answer {i}: ownership moves values between bindings"))
            }
        })
        .collect();
    let generator = FingerprintGenerator::new();

    group.bench_function("twenty_turns", |b| {
        b.iter(|| generator.generate(black_box("You are a Rust tutor."), black_box(&messages)))
    });

    group.finish();
}

criterion_group!(benches, bench_sse_lines, bench_decode_stream, bench_fingerprint);
criterion_main!(benches);
