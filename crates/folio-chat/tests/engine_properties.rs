//! Behavioural properties of the response engine, exercised through the
//! public API only.

use std::sync::Arc;
use std::time::Duration;

use folio_chat::{ChatError, FnDelegate, KnowledgeProfile, ResponseEngine, ResponseRule, RuleTable};

const DEFAULT: &str = "Sorry, I only know about my work.";

fn engine() -> ResponseEngine {
    let rules = RuleTable::new(
        vec![
            ResponseRule::new(["aws"], "R1: aws").unwrap(),
            ResponseRule::new(["cloud"], "R2: cloud").unwrap(),
            ResponseRule::new(["db"], "R3: databases").unwrap(),
            ResponseRule::new(["hi"], "R4: greeting").unwrap(),
        ],
        DEFAULT,
    )
    .unwrap();
    let profile = KnowledgeProfile::new("Ada", "Ada runs cloud infrastructure.").unwrap();
    ResponseEngine::new(rules, profile).with_delegate_timeout(Duration::from_millis(200))
}

// =============================================================================
// Deterministic path
// =============================================================================

#[test]
fn totality_over_awkward_inputs() {
    let engine = engine();
    let long = "lorem ipsum ".repeat(50_000);
    let inputs = [
        "",
        " ",
        "\n\t",
        "!!!???",
        "12345",
        "\u{202e}\u{200b}",
        "\u{130}STANBUL",
        long.as_str(),
    ];
    for input in inputs {
        let reply = engine.respond(input);
        assert!(!reply.is_empty(), "empty reply for {:?}", input);
    }
}

#[test]
fn determinism() {
    let engine = engine();
    for input in ["aws", "cloud", "nothing", ""] {
        let first = engine.respond(input);
        for _ in 0..5 {
            assert_eq!(engine.respond(input), first);
        }
    }
}

#[test]
fn first_match_wins() {
    let engine = engine();
    assert_eq!(engine.respond("aws and cloud questions"), "R1: aws");
    assert_eq!(engine.respond("cloud and aws questions"), "R1: aws");
}

#[test]
fn case_insensitivity() {
    let engine = engine();
    let expected = engine.respond("aws");
    assert_eq!(engine.respond("AWS"), expected);
    assert_eq!(engine.respond("AwS"), expected);
}

#[test]
fn substring_containment() {
    let engine = engine();
    assert_eq!(engine.respond("tell me about your db work"), "R3: databases");
    // Accepted false positives of substring matching.
    assert_eq!(engine.respond("adbdomen"), "R3: databases");
    assert_eq!(engine.respond("history"), "R4: greeting");
}

#[test]
fn fallback_default() {
    let engine = engine();
    assert_eq!(engine.respond("completely unrelated gibberish xyz123"), DEFAULT);
}

#[test]
fn concurrent_readers_share_one_engine() {
    let engine = Arc::new(engine());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let msg = if i % 2 == 0 { "AWS?" } else { "cloud?" };
                (i, engine.respond(msg))
            })
        })
        .collect();
    for handle in handles {
        let (i, reply) = handle.join().unwrap();
        let expected = if i % 2 == 0 { "R1: aws" } else { "R2: cloud" };
        assert_eq!(reply, expected);
    }
}

// =============================================================================
// Delegate path
// =============================================================================

#[tokio::test(start_paused = true)]
async fn delegate_fallback_on_slow_rejection() {
    let delegate = FnDelegate::new("slow-reject", |_prompt: String| async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Err(ChatError::Delegate("rejected".to_string()))
    });
    let engine = engine().with_delegate(Arc::new(delegate));

    let started = tokio::time::Instant::now();
    let reply = engine.respond_async("aws please").await;

    assert_eq!(reply, engine.respond("aws please"));
    assert!(started.elapsed() <= Duration::from_millis(250));
}

#[tokio::test]
async fn delegate_success_path() {
    let delegate = FnDelegate::new("fast", |_prompt: String| async move {
        Ok(Some("custom answer".to_string()))
    });
    let engine = engine().with_delegate(Arc::new(delegate));
    assert_eq!(engine.respond_async("aws please").await, "custom answer");
}

#[tokio::test]
async fn delegate_null_is_no_enhancement() {
    let delegate = FnDelegate::new("null", |_prompt: String| async move { Ok(None) });
    let engine = engine().with_delegate(Arc::new(delegate));
    assert_eq!(engine.respond_async("cloud").await, "R2: cloud");
}

#[tokio::test]
async fn absent_delegate_is_deterministic_path() {
    let engine = engine();
    assert!(engine.delegate().is_none());
    assert_eq!(engine.respond_async("hi there").await, "R4: greeting");
}

#[tokio::test]
async fn overlapping_async_calls_are_independent() {
    let delegate = FnDelegate::new("echo", |prompt: String| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let question = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Question: "))
            .unwrap_or_default()
            .to_string();
        Ok(Some(format!("answer to {}", question)))
    });
    let engine = engine().with_delegate(Arc::new(delegate));

    let (a, b) = tokio::join!(engine.respond_async("first"), engine.respond_async("second"));
    assert_eq!(a, "answer to first");
    assert_eq!(b, "answer to second");
}
