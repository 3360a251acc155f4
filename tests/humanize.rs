#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use vkscope::{human_readable_group, human_readable_post, human_readable_sub, human_readable_user};

#[test]
fn user_profile_is_flattened() {
    let mut user = rec(json!({
        "id": 1,
        "first_name": "Pavel",
        "sex": 2,
        "status": "",
        "city": { "id": 2, "title": "Saint Petersburg" },
        "country": { "id": 1, "title": "Russia" },
        "last_seen": { "time": 1_600_000_000, "platform": 7 },
        "schools": [{ "id": "1", "name": "Gymnasium", "year_from": 1990, "city": 2 }],
        "universities": [{ "id": 1, "name": "SPbU", "graduation": 2006, "faculty_name": "Philology", "chair": 3 }],
    }));
    human_readable_user(&mut user);

    assert_eq!(
        user,
        rec(json!({
            "id": 1,
            "first_name": "Pavel",
            "sex": "male",
            "city": "Saint Petersburg",
            "country": "Russia",
            "last_seen": "2020-09-13T12:26:40Z",
            "schools": [{ "name": "Gymnasium", "year_from": 1990 }],
            "universities": [{ "name": "SPbU", "graduation": 2006, "faculty_name": "Philology" }],
        }))
    );
}

#[test]
fn unknown_sex_is_dropped_with_other_empties() {
    let mut user = rec(json!({ "id": 3, "sex": 0, "bdate": "" }));
    human_readable_user(&mut user);
    assert_eq!(user, rec(json!({ "id": 3 })));
}

/// `is_closed = 0` is meaningful and must not be cleared as empty.
#[test]
fn group_privacy_labels() {
    for (closed, label) in [(0, "open"), (1, "closed"), (2, "private")] {
        let mut group = rec(json!({ "id": 1, "name": "VK API", "is_closed": closed, "description": "" }));
        human_readable_group(&mut group);
        assert_eq!(group, rec(json!({ "id": 1, "name": "VK API", "is_closed": label })));
    }
}

#[test]
fn subscriptions_dispatch_on_type() {
    let mut profile = rec(json!({ "id": 1, "type": "profile", "sex": 1 }));
    let mut page = rec(json!({ "id": 2, "type": "page", "is_closed": 0 }));
    human_readable_sub(&mut profile);
    human_readable_sub(&mut page);
    assert_eq!(profile.get("sex"), Some(&json!("female")));
    assert_eq!(page.get("is_closed"), Some(&json!("open")));
}

#[test]
fn post_dates_become_rfc3339() {
    let mut post = rec(json!({ "id": 9, "date": 0, "edited": 1_600_000_000, "text": "hi", "copy_history": [] }));
    human_readable_post(&mut post);
    assert_eq!(post, rec(json!({ "id": 9, "edited": "2020-09-13T12:26:40Z", "text": "hi" })));
}
