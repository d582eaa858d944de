//! Property-based tests for the queue engine.
//!
//! These verify invariants that must hold for any enqueue sequence:
//!
//! - A filtered dequeue returns the first `max_count` matches in FIFO order
//! - Non-matching elements keep their relative order
//! - Nothing is lost or duplicated between the result and the remainder

use super::*;
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::time::Duration;

fn tagged(element_type: ElementType, seq: usize) -> Element {
    let mut body = Map::new();
    body.insert("seq".to_string(), Value::from(seq));
    Element::new(element_type, body)
}

fn seqs(elements: &[Element]) -> Vec<u64> {
    elements
        .iter()
        .filter_map(|e| e.body["seq"].as_u64())
        .collect()
}

proptest! {
    #[test]
    fn filtered_dequeue_preserves_fifo(
        types in prop::collection::vec(0i64..4, 0..40),
        filter_type in 0i64..4,
        max_count in 0usize..10,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let container = QueueContainer::new();
        let input: Vec<Element> = types
            .iter()
            .enumerate()
            .map(|(seq, t)| tagged(*t, seq))
            .collect();
        for element in &input {
            container.enqueue("prop", element.clone());
        }

        let taken = runtime
            .block_on(container.dequeue(
                "prop",
                Duration::ZERO,
                TypeFilter::Only(filter_type),
                max_count,
                false,
            ))
            .unwrap();
        let remaining = container.get_by_name("prop").unwrap().snapshot().elements;

        let limit = if max_count == 0 { usize::MAX } else { max_count };
        let expected_taken: Vec<Element> = input
            .iter()
            .filter(|e| e.element_type == filter_type)
            .take(limit)
            .cloned()
            .collect();
        let taken_seqs = seqs(&expected_taken);
        let expected_remaining: Vec<u64> = seqs(&input)
            .into_iter()
            .filter(|s| !taken_seqs.contains(s))
            .collect();

        prop_assert_eq!(seqs(&taken), taken_seqs);
        prop_assert_eq!(seqs(&remaining), expected_remaining);
        prop_assert_eq!(taken.len() + remaining.len(), input.len());
    }

    #[test]
    fn cleanup_never_removes_live_elements(
        offsets in prop::collection::vec(prop::option::of(-100i64..100), 0..30),
    ) {
        let now = chrono::Utc::now();
        let container = QueueContainer::new();
        for (seq, offset) in offsets.iter().enumerate() {
            let element = match offset {
                Some(secs) => tagged(1, seq).with_expiration(now + chrono::Duration::seconds(*secs)),
                None => tagged(1, seq),
            };
            container.enqueue("prop", element);
        }

        let removed = container.cleanup(now);
        let expected_removed = offsets.iter().filter(|o| matches!(o, Some(s) if *s <= 0)).count();
        prop_assert_eq!(removed, expected_removed);

        let remaining = container.get_by_name("prop").map(|q| q.snapshot().elements).unwrap_or_default();
        prop_assert!(remaining.iter().all(|e| !e.is_expired(now)));
    }
}
