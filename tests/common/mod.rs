#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vkscope::{Params, RemoteError, Transport, VkClient};

type Handler = Box<dyn Fn(&Params) -> Result<Value, RemoteError> + Send + Sync>;

#[derive(Default)]
struct Inner {
    routes: HashMap<String, Handler>,
    files: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<(String, Params)>>,
}

/// In-memory transport: per-method handlers plus a log of every call made.
/// Clone it before handing it to a client to keep a handle on the call log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that returns the full response body (envelope included).
    pub fn route(mut self, method: &str, f: impl Fn(&Params) -> Result<Value, RemoteError> + Send + Sync + 'static) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("configure the mock before cloning it")
            .routes
            .insert(method.to_string(), Box::new(f));
        self
    }

    /// Register a handler that returns a payload wrapped as `{"response": ...}`.
    pub fn respond(self, method: &str, f: impl Fn(&Params) -> Value + Send + Sync + 'static) -> Self {
        self.route(method, move |p| Ok(json!({ "response": f(p) })))
    }

    /// Serve `items` as an offset/count paginated collection.
    pub fn paged(self, method: &str, items: Vec<Value>) -> Self {
        self.respond(method, move |p| page_of(&items, p))
    }

    /// `users.get` resolving screen names to ids; unknown names yield `[]`.
    pub fn users(self, names: &[(&str, i64)]) -> Self {
        let names: HashMap<String, i64> = names.iter().map(|(n, id)| (n.to_string(), *id)).collect();
        self.respond("users.get", move |p| {
            let wanted = p.get("user_ids").cloned().unwrap_or_default();
            let found: Vec<Value> = wanted
                .split(',')
                .filter_map(|n| names.get(n).map(|id| json!({ "id": id, "first_name": "Ivan", "last_name": n })))
                .collect();
            Value::Array(found)
        })
    }

    pub fn file(mut self, url: &str, bytes: &[u8]) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("configure the mock before cloning it")
            .files
            .insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Params> {
        self.calls().into_iter().filter(|(m, _)| m == method).map(|(_, p)| p).collect()
    }

    pub fn client(&self) -> VkClient {
        VkClient::new(self.clone())
    }
}

impl Transport for MockTransport {
    fn call(&self, method: &str, params: &Params) -> Result<Value, RemoteError> {
        self.inner.calls.lock().unwrap().push((method.to_string(), params.clone()));
        match self.inner.routes.get(method) {
            Some(h) => h(params),
            None => Err(RemoteError::Status { status: 404, method: method.to_string() }),
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        self.inner
            .files
            .get(url)
            .cloned()
            .ok_or_else(|| RemoteError::Status { status: 404, method: url.to_string() })
    }
}

/// One page of `items` for the request's `offset`/`count`.
pub fn page_of(items: &[Value], p: &Params) -> Value {
    let offset: usize = p.get("offset").and_then(|s| s.parse().ok()).unwrap_or(0);
    let count: usize = p.get("count").and_then(|s| s.parse().ok()).unwrap_or(items.len());
    let end = (offset + count).min(items.len());
    let slice = if offset < end { items[offset..end].to_vec() } else { Vec::new() };
    json!({ "count": items.len(), "items": slice })
}

/// `n` people with ids `1..=n`.
pub fn people(n: usize) -> Vec<Value> {
    (1..=n).map(|i| json!({ "id": i, "first_name": format!("P{}", i) })).collect()
}

/// A newest-first wall: post `i` has id `i` and `date = timestamps[i]`.
pub fn wall(timestamps: &[i64]) -> Vec<Value> {
    timestamps.iter().enumerate().map(|(i, ts)| json!({ "id": i, "date": ts })).collect()
}

pub fn ids(records: &[vkscope::Record]) -> Vec<i64> {
    records.iter().filter_map(|r| r.get("id").and_then(|v| v.as_i64())).collect()
}

pub fn rec(v: Value) -> vkscope::Record {
    v.as_object().cloned().expect("object literal")
}
