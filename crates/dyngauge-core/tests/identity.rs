#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dyngauge_core::{MonitorId, Tag, TagList};

fn hash_of(id: &MonitorId) -> u64 {
    let mut h = DefaultHasher::new();
    id.hash(&mut h);
    h.finish()
}

#[test]
fn same_inputs_build_equal_ids() {
    let tags: TagList = [("region", "eu"), ("host", "a")].into_iter().collect();
    let a = MonitorId::builder("requests").with_tags(&tags).build();
    let b = MonitorId::builder("requests").with_tags(&tags).build();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn tag_order_does_not_matter() {
    let a = MonitorId::builder("requests")
        .with_tag("host", "a")
        .with_tag("region", "eu")
        .build();
    let b = MonitorId::builder("requests")
        .with_tag("region", "eu")
        .with_tag("host", "a")
        .build();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn name_or_any_tag_difference_is_a_different_id() {
    let base = MonitorId::builder("requests").with_tag("host", "a").build();
    assert_ne!(base, MonitorId::builder("errors").with_tag("host", "a").build());
    assert_ne!(base, MonitorId::builder("requests").with_tag("host", "b").build());
    assert_ne!(base, MonitorId::of("requests"));
}

#[test]
fn building_does_not_mutate_input_tags() {
    let tags: TagList = vec![Tag::new("host", "a")].into_iter().collect();
    let before = tags.clone();
    let _ = MonitorId::builder("requests").with_tags(&tags).with_tag("extra", "x").build();
    assert_eq!(tags, before);
}
