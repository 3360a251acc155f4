//! Human-readable reshaping of profile, community and post records.
//! Pure data transformation; nothing here talks to the network.

use crate::record::{clear_empty, Record};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn rfc3339(ts: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(ts).ok()?.format(&Rfc3339).ok()
}

fn title_in_place(rec: &mut Record, key: &str) {
    let title = rec.get(key).and_then(|v| v.get("title")).cloned();
    if let Some(t) = title {
        rec.insert(key.to_string(), t);
    }
}

fn timestamp_in_place(rec: &mut Record, key: &str) {
    if let Some(v) = rec.get_mut(key) {
        if let Some(s) = v.as_i64().and_then(rfc3339) {
            *v = Value::String(s);
        }
    }
}

/// Keep only `keys` of every object in the array at `key`.
fn reduce_list_in_place(rec: &mut Record, key: &str, keys: &[&str]) {
    let Some(Value::Array(items)) = rec.get_mut(key) else { return };
    for item in items.iter_mut() {
        if let Value::Object(obj) = item {
            let mut kept = Map::new();
            for k in keys {
                if let Some(v) = obj.get(*k) {
                    kept.insert(k.to_string(), v.clone());
                }
            }
            *obj = kept;
        }
    }
}

pub fn human_readable_user(rec: &mut Record) {
    clear_empty(rec);
    title_in_place(rec, "country");
    title_in_place(rec, "city");

    let seen = rec.get("last_seen").and_then(|v| v.get("time")).and_then(|t| t.as_i64());
    if let Some(s) = seen.and_then(rfc3339) {
        rec.insert("last_seen".to_string(), Value::String(s));
    }

    let sex = rec.get("sex").and_then(|s| s.as_i64());
    match sex {
        Some(2) => { rec.insert("sex".to_string(), Value::from("male")); }
        Some(1) => { rec.insert("sex".to_string(), Value::from("female")); }
        _ => {}
    }

    reduce_list_in_place(rec, "schools", &["name", "year_from", "year_to"]);
    reduce_list_in_place(rec, "universities", &["name", "graduation", "faculty_name"]);
}

pub fn human_readable_group(rec: &mut Record) {
    if let Some(closed) = rec.get("is_closed").and_then(|v| v.as_i64()) {
        let label = match closed {
            0 => "open",
            1 => "closed",
            _ => "private",
        };
        rec.insert("is_closed".to_string(), Value::from(label));
    }
    clear_empty(rec);
    title_in_place(rec, "country");
    title_in_place(rec, "city");
}

/// Subscriptions mix profiles and communities.
pub fn human_readable_sub(rec: &mut Record) {
    if rec.get("type").and_then(|t| t.as_str()) == Some("profile") {
        human_readable_user(rec);
    } else {
        human_readable_group(rec);
    }
}

pub fn human_readable_post(rec: &mut Record) {
    clear_empty(rec);
    timestamp_in_place(rec, "date");
    timestamp_in_place(rec, "edited");
}
