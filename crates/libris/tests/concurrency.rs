//! Concurrent use of one shared assistant across plain threads.

mod common;

use common::assistant_with;
use libris::{AssistantConfig, ProfileKey, RateLimitConfig, SessionId};
use libris_testing::MockModelClient;
use std::sync::Arc;
use std::thread;

#[test]
fn parallel_sessions_keep_their_memories_apart() {
    let (assistant, _) = assistant_with(
        MockModelClient::new().with_fallback("Final Answer: noted"),
        AssistantConfig::default(),
    );
    let assistant = Arc::new(assistant);

    let names = ["Ana", "Luis", "Sofia", "Pedro"];
    let mut handles = Vec::new();
    for name in names {
        let assistant = Arc::clone(&assistant);
        handles.push(thread::spawn(move || {
            let id = SessionId::parse(&format!("session-{name}")).unwrap();
            for _ in 0..5 {
                assistant.chat(&format!("Me llamo {name} y tengo 30 años"), &id);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for name in names {
        let id = SessionId::parse(&format!("session-{name}")).unwrap();
        let overview = assistant.memory_overview(&id);
        assert_eq!(overview.turn_count, 10);
        assert_eq!(
            overview.profile.get(&ProfileKey::Name).map(String::as_str),
            Some(name)
        );
    }

    let stats = assistant.metrics_snapshot();
    assert_eq!(stats.total_requests, 20);
    assert_eq!(stats.successful_requests, 20);
    assert_eq!(assistant.collector().open_count(), 0);
}

#[test]
fn shared_rate_limit_window_admits_exactly_the_cap() {
    let config = AssistantConfig {
        rate_limit: RateLimitConfig {
            max_requests: 10,
            window_secs: 60,
        },
        ..AssistantConfig::default()
    };
    let (assistant, _) = assistant_with(
        MockModelClient::new().with_fallback("Final Answer: ok"),
        config,
    );
    let assistant = Arc::new(assistant);
    // All threads share one identity, so they compete for the same window.
    let id = SessionId::parse("shared-identity").unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let assistant = Arc::clone(&assistant);
        let id = id.clone();
        handles.push(thread::spawn(move || assistant.chat("hola", &id)));
    }
    let answers: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let admitted = answers.iter().filter(|a| a.as_str() == "ok").count();
    let denied = answers
        .iter()
        .filter(|a| a.contains("too many requests"))
        .count();
    assert_eq!(admitted, 10);
    assert_eq!(denied, 10);
    assert_eq!(assistant.metrics_snapshot().total_requests, 10);
}

#[test]
fn concurrent_chats_produce_consistent_trace_buffers() {
    let (assistant, _) = assistant_with(
        MockModelClient::new().with_fallback(
            "Thought: check the catalog.\nAction: search_books\nAction Input: fiction",
        ),
        AssistantConfig::default(),
    );
    let assistant = Arc::new(assistant);

    let mut handles = Vec::new();
    for n in 0..6 {
        let assistant = Arc::clone(&assistant);
        handles.push(thread::spawn(move || {
            let id = SessionId::parse(&format!("trace-{n}")).unwrap();
            assistant.chat("busco ficcion", &id);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Each request exhausts its 5 iterations, dispatching the tool each time.
    let stats = assistant.metrics_snapshot();
    assert_eq!(stats.total_requests, 6);
    assert_eq!(stats.tool_usage["search_books"], 30);
    assert_eq!(assistant.collector().open_count(), 0);
}
