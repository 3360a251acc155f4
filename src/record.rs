//! Schema-less records and the small helpers that normalize them.

use serde_json::{Map, Value};
use std::fmt::Write;

/// One entity (person, group, subscription, post) as returned by the API.
pub type Record = Map<String, Value>;

/// All pages of one query, concatenated in service order.
pub type Collection = Vec<Record>;

pub const ID_FIELD: &str = "id";

/// Empty string, empty array, empty object, null and numeric zero count as absent.
/// Boolean `false` does not.
pub fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(_) => false,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Drop top-level empty fields in place.
pub fn clear_empty(rec: &mut Record) {
    rec.retain(|_, v| !is_empty_value(v));
}

/// Drop the named fields in place.
pub fn strip_fields(rec: &mut Record, fields: &[String]) {
    rec.retain(|k, _| !fields.iter().any(|f| f == k));
}

/// Convert a JSON value into a record; non-objects become `{}`.
pub fn into_record(v: Value) -> Record {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

/// Collect the objects of a JSON array (non-objects are skipped).
pub fn records_from(v: Option<&Value>) -> Vec<Record> {
    v.and_then(|x| x.as_array())
        .map(|items| items.iter().filter_map(|x| x.as_object().cloned()).collect())
        .unwrap_or_default()
}

/// The `id` field rendered as a string key (numbers and strings both accepted).
pub fn identifier(rec: &Record) -> Option<String> {
    match rec.get(ID_FIELD)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// `{id}` projection of a record.
pub fn project_id(rec: &Record) -> Record {
    let mut out = Map::new();
    if let Some(id) = rec.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }
    out
}

/// Value behind a JSON pointer (`/city/title`, `/schools/0/name`, `/a~1b`).
/// The first segment is looked up in the record; the rest goes through
/// [`Value::pointer`], so array indices and `~0`/`~1` escapes resolve.
pub fn value_at<'a>(rec: &'a Record, pointer: &str) -> Option<&'a Value> {
    let path = pointer.strip_prefix('/').unwrap_or(pointer);
    let (head, rest) = match path.find('/') {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    };
    let head = head.replace("~1", "/").replace("~0", "~");
    let root = rec.get(&head)?;
    if rest.is_empty() { Some(root) } else { root.pointer(rest) }
}

/// Integer behind a JSON pointer (`/date`, `/last_seen/time`).
pub fn timestamp_at(rec: &Record, pointer: &str) -> Option<i64> {
    value_at(rec, pointer)?.as_i64()
}

/// Canonical text form: object keys sorted at every depth, so two records with the
/// same fields and values produce the same string regardless of map ordering.
pub fn canonical_key(rec: &Record) -> String {
    let mut out = String::with_capacity(128);
    write_canonical_object(rec, &mut out);
    out
}

fn write_canonical_object(map: &Map<String, Value>, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    out.push('{');
    for (i, k) in keys.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}:", Value::String((*k).clone()));
        write_canonical(&map[k.as_str()], out);
    }
    out.push('}');
}

fn write_canonical(v: &Value, out: &mut String) {
    match v {
        Value::Object(m) => write_canonical_object(m, out),
        Value::Array(items) => {
            out.push('[');
            for (i, x) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(x, out);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}
