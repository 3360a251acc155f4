//! Concurrency helpers: per-user fetches run in parallel, at most `limit` in flight.
//! Each user's query owns its accumulator; nothing is shared between them.

use crate::client::VkClient;
use crate::error::Result;
use crate::progress::ProgressScope;
use rayon::prelude::*;

/// Map `f` over `users`, at most `limit` at a time. Output order follows `users`.
/// The first failure fails the whole call.
pub fn map_users_limited<T, F>(users: &[String], limit: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Sync + Fn(&str) -> Result<T>,
{
    if limit <= 1 {
        return users.iter().map(|u| f(u.as_str())).collect();
    }
    let mut out = Vec::with_capacity(users.len());
    for chunk in users.chunks(limit) {
        let part = chunk.par_iter().map(|u| f(u.as_str())).collect::<Result<Vec<T>>>()?;
        out.extend(part);
    }
    Ok(out)
}

/// Like [`map_users_limited`] but every user gets its own outcome.
pub fn map_users_isolated<T, F>(users: &[String], limit: usize, f: F) -> Vec<(String, Result<T>)>
where
    T: Send,
    F: Sync + Fn(&str) -> Result<T>,
{
    let mut out = Vec::with_capacity(users.len());
    for chunk in users.chunks(limit.max(1)) {
        let part: Vec<(String, Result<T>)> = chunk.par_iter().map(|u| (u.clone(), f(u.as_str()))).collect();
        out.extend(part);
    }
    out
}

impl VkClient {
    /// Run a per-user query for every user with the configured concurrency and
    /// an optional progress bar.
    pub fn for_each_user<T, F>(&self, users: &[String], label: &str, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Sync + Fn(&VkClient, &str) -> Result<T>,
    {
        let pb = ProgressScope::users(self.opts.progress, label, users.len());
        let out = map_users_limited(users, self.opts.user_concurrency, |u| {
            let r = f(self, u);
            pb.tick();
            r
        })?;
        pb.finish(format!("{} done", label));
        Ok(out)
    }

    /// Per-user outcomes; one user's failure does not affect the others.
    pub fn for_each_user_isolated<T, F>(&self, users: &[String], f: F) -> Vec<(String, Result<T>)>
    where
        T: Send,
        F: Sync + Fn(&VkClient, &str) -> Result<T>,
    {
        map_users_isolated(users, self.opts.user_concurrency, |u| f(self, u))
    }
}
