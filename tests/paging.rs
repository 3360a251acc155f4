#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use vkscope::{params, Error, Page, Params, RemoteError};

/// Every record comes back exactly once, in service order, for any total/page-size mix.
#[test]
fn fetch_all_concatenates_pages_in_order() {
    for &total in &[0usize, 1, 7, 99, 100, 101, 250] {
        for &page_size in &[1usize, 7, 100, 5000] {
            let mock = MockTransport::new().paged("friends.get", people(total));
            let out = mock.client().fetch_all("friends.get", &Params::new(), page_size).unwrap();

            let expected: Vec<i64> = (1..=total as i64).collect();
            assert_eq!(ids(&out), expected, "total={} page_size={}", total, page_size);

            let want_calls = std::cmp::max(1, (total + page_size - 1) / page_size);
            assert_eq!(
                mock.calls_to("friends.get").len(),
                want_calls,
                "request count for total={} page_size={}",
                total,
                page_size
            );
        }
    }
}

#[test]
fn offsets_advance_by_page_size_and_base_params_are_kept() {
    let mock = MockTransport::new().paged("groups.get", people(25));
    let base = params([("user_id", "1"), ("extended", "1")]);
    mock.client().fetch_all("groups.get", &base, 10).unwrap();

    let calls = mock.calls_to("groups.get");
    let offsets: Vec<&str> = calls.iter().map(|p| p["offset"].as_str()).collect();
    assert_eq!(offsets, vec!["0", "10", "20"]);
    for p in &calls {
        assert_eq!(p["count"], "10");
        assert_eq!(p["user_id"], "1");
        assert_eq!(p["extended"], "1");
    }
}

/// Termination is driven by the reported total, so a short final page ends the loop.
#[test]
fn short_final_page_terminates() {
    let mock = MockTransport::new().paged("users.getFollowers", people(1003));
    let out = mock.client().fetch_all("users.getFollowers", &Params::new(), 1000).unwrap();
    assert_eq!(out.len(), 1003);
    assert_eq!(mock.calls().len(), 2);
}

#[test]
fn missing_items_and_count_mean_an_empty_collection() {
    let mock = MockTransport::new().respond("friends.get", |_| json!({}));
    let out = mock.client().fetch_all("friends.get", &Params::new(), 100).unwrap();
    assert!(out.is_empty());
    assert_eq!(mock.calls().len(), 1, "total 0 must stop after the first request");

    let page = Page::from_response(&json!({ "count": 5 }), 40);
    assert_eq!(page, Page { items: vec![], total: 5, offset: 40 });
}

#[test]
fn zero_page_size_is_clamped() {
    let mock = MockTransport::new().paged("friends.get", people(3));
    let out = mock.client().fetch_all("friends.get", &Params::new(), 0).unwrap();
    assert_eq!(ids(&out), vec![1, 2, 3]);
    assert_eq!(mock.calls().len(), 3);
}

/// A failing page fails the whole fetch; no partial collection is returned.
#[test]
fn failure_mid_collection_is_propagated() {
    let items = people(30);
    let mock = MockTransport::new().route("friends.get", move |p| {
        if p["offset"] == "20" {
            Ok(json!({ "error": { "error_code": 6, "error_msg": "Too many requests per second" } }))
        } else {
            Ok(json!({ "response": page_of(&items, p) }))
        }
    });
    let err = mock.client().fetch_all("friends.get", &Params::new(), 10).unwrap_err();
    match err {
        Error::Remote(RemoteError::Service { code, .. }) => assert_eq!(code, 6),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.calls_to("friends.get").len(), 3, "no requests after the failing page");
}
