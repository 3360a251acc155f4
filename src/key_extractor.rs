use serde_json::Value;
use std::sync::Arc;

use crate::record::{value_at, Record};

/// Key used when the ranked attribute is absent.
pub const UNKNOWN_KEY: &str = "Unknown";

/// A reusable statistics key extractor with built-ins for profile fields,
/// plus JSON-pointer and custom extractors.
///
/// A record may contribute zero, one or many keys: `School` yields one key per
/// entry of `schools` and nothing for a record without schools.
#[derive(Clone)]
pub enum StatKey {
    City,
    Country,
    University,
    School,
    Pointer(String),
    ByValue(Arc<dyn Fn(&Record) -> Vec<String> + Send + Sync>),
}

impl StatKey {
    pub fn pointer(ptr: impl Into<String>) -> Self { Self::Pointer(ptr.into()) }
    pub fn by_value(f: impl Fn(&Record) -> Vec<String> + Send + Sync + 'static) -> Self {
        Self::ByValue(Arc::new(f))
    }

    /// Accepts the short and long names used on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('/') {
            return Some(Self::Pointer(s.to_string()));
        }
        match s.to_lowercase().as_str() {
            "city" | "c" => Some(Self::City),
            "country" | "co" => Some(Self::Country),
            "university" | "u" => Some(Self::University),
            "school" | "s" => Some(Self::School),
            _ => None,
        }
    }

    pub fn keys(&self, rec: &Record) -> Vec<String> {
        match self {
            StatKey::City => vec![pointer_key(rec, "/city/title")],
            StatKey::Country => vec![pointer_key(rec, "/country/title")],
            StatKey::University => vec![pointer_key(rec, "/university_name")],
            StatKey::School => rec
                .get("schools")
                .and_then(|s| s.as_array())
                .map(|schools| schools.iter().map(|s| scalar_key(s.get("name"))).collect())
                .unwrap_or_default(),
            StatKey::Pointer(ptr) => vec![pointer_key(rec, ptr)],
            StatKey::ByValue(f) => f(rec),
        }
    }
}

fn pointer_key(rec: &Record, ptr: &str) -> String {
    scalar_key(value_at(rec, ptr))
}

fn scalar_key(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => UNKNOWN_KEY.to_string(),
    }
}
