#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use vkscope::{PeopleFilter, Record};

fn crowd() -> Vec<Record> {
    vec![
        rec(json!({ "id": 1, "sex": 2, "city": { "title": "Rome" }, "bdate": "1.1.1990" })),
        rec(json!({ "id": 2, "sex": 1, "city": { "title": "Milan" } })),
        rec(json!({ "id": 3, "sex": 2 })),
        rec(json!({ "id": 4, "sex": 1, "city": { "title": "Rome" }, "bdate": "5.5.1985" })),
    ]
}

#[test]
fn no_rules_keep_everything_in_order() {
    assert_eq!(ids(&PeopleFilter::new().apply(crowd())), vec![1, 2, 3, 4]);
}

/// A filter keeps records whose field equals any listed value.
#[test]
fn multi_value_filter() {
    let f = PeopleFilter::new().filter("/city/title", "Milan, Rome");
    assert_eq!(ids(&f.apply(crowd())), vec![1, 2, 4]);

    let f = PeopleFilter::new().filter("sex", "1");
    assert_eq!(ids(&f.apply(crowd())), vec![2, 4], "numbers match their decimal text");
}

#[test]
fn every_filter_must_hold() {
    let f = PeopleFilter::new().filter("sex", "1").filter("/city/title", "Rome");
    assert_eq!(ids(&f.apply(crowd())), vec![4]);
}

/// Reversed filters drop the matching records.
#[test]
fn reverse_drops_matches() {
    let f = PeopleFilter::new().filter("/city/title", "Rome").reverse(true);
    assert_eq!(ids(&f.apply(crowd())), vec![2, 3]);

    let f = PeopleFilter::new().filter("/city/title", "Rome,Milan").reverse(true);
    assert_eq!(ids(&f.apply(crowd())), vec![3], "a record without the field is kept");
}

/// Numbers sort numerically, text lexically; records missing the key go last in input order.
#[test]
fn sort_by_field() {
    let people = vec![
        rec(json!({ "id": 1, "followers_count": 30 })),
        rec(json!({ "id": 2 })),
        rec(json!({ "id": 3, "followers_count": 4 })),
        rec(json!({ "id": 4, "followers_count": 100 })),
        rec(json!({ "id": 5 })),
    ];
    let f = PeopleFilter::new().sort_by("followers_count");
    assert_eq!(ids(&f.apply(people)), vec![3, 1, 4, 2, 5]);

    let f = PeopleFilter::new().sort_by("/city/title");
    assert_eq!(ids(&f.apply(crowd())), vec![2, 1, 4, 3], "ties keep input order");
}

#[test]
fn filter_then_sort() {
    let f = PeopleFilter::new().filter("sex", "2,1").sort_by("bdate");
    assert_eq!(ids(&f.apply(crowd())), vec![1, 4, 2, 3]);
}

#[test]
fn parse_command_line_filters() {
    let f = PeopleFilter::new().parse_filter("sex=1,2").unwrap();
    assert_eq!(f.filters, vec![("sex".to_string(), vec!["1".to_string(), "2".to_string()])]);
    assert!(PeopleFilter::new().parse_filter("sex").is_none(), "missing '='");
    assert!(PeopleFilter::new().parse_filter("=1").is_none(), "empty key");
}

/// Gifts are read for the resolved id in a single large page.
#[test]
fn gifts_resolve_then_page() {
    let gifts = vec![json!({ "id": 10, "from_id": 7 }), json!({ "id": 11, "from_id": 8 })];
    let mock = MockTransport::new().users(&[("durov", 1)]).paged("gifts.get", gifts);
    let got = mock.client().gifts("durov").unwrap();
    assert_eq!(ids(&got), vec![10, 11]);

    let calls = mock.calls_to("gifts.get");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["user_id"], "1");
    assert_eq!(calls[0]["count"], "100000");
}
