//! Sorting and attribute filters over people lists (friends, followers, likes).

use crate::record::{value_at, Record};
use serde_json::Value;
use std::cmp::Ordering;

/// Keep a record when, for every filter, its attribute equals one of the listed
/// values. `reverse` flips each test: records holding any listed value are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeopleFilter {
    pub sort_by: Option<String>,
    pub filters: Vec<(String, Vec<String>)>,
    pub reverse: bool,
}

impl PeopleFilter {
    pub fn new() -> Self { Self::default() }

    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort_by = Some(key.into());
        self
    }

    /// `values` is comma separated (`"1,2"`).
    pub fn filter(mut self, key: impl Into<String>, values: &str) -> Self {
        let values = values.split(',').map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect();
        self.filters.push((key.into(), values));
        self
    }

    pub fn reverse(mut self, yes: bool) -> Self {
        self.reverse = yes;
        self
    }

    /// Parse `key=v1,v2` as used on the command line.
    pub fn parse_filter(self, raw: &str) -> Option<Self> {
        let (key, values) = raw.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(self.filter(key, values))
    }

    pub fn matches(&self, rec: &Record) -> bool {
        self.filters.iter().all(|(key, values)| {
            let found = value_at(rec, key).and_then(as_text);
            let hit = found.map_or(false, |v| values.iter().any(|x| *x == v));
            hit != self.reverse
        })
    }

    /// Filter, then stable-sort. Records missing the sort key go last.
    pub fn apply(&self, people: Vec<Record>) -> Vec<Record> {
        let mut out: Vec<Record> = people.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(key) = &self.sort_by {
            out.sort_by(|a, b| compare_values(value_at(a, key), value_at(b, key)));
        }
        out
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => match (as_text(x), as_text(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
