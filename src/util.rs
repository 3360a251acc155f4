use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

// -------- field exclusions from env --------

/// Merge extra excluded field names from `VK_EXCLUDE_FIELDS` into `target` (in-place).
/// Entries are comma/semicolon/space separated; the result is trimmed, sorted and deduped.
pub fn merge_extra_exclusions(target: &mut Vec<String>) {
    if let Ok(s) = std::env::var("VK_EXCLUDE_FIELDS") {
        for raw in s.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            let n = raw.trim();
            if !n.is_empty() {
                target.push(n.to_string());
            }
        }
    }
    for s in target.iter_mut() {
        *s = s.trim().to_string();
    }
    target.retain(|s| !s.is_empty());
    target.sort();
    target.dedup();
}

/// Split a comma separated field list, dropping blanks.
pub fn split_fields(s: &str) -> Vec<String> {
    s.split(',')
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string())
        .collect()
}

// -------- robust create/rename with backoff --------

/// Transient errors seen on network shares and under AV/backup filter drivers.
fn is_retriable_io_error(e: &io::Error) -> bool {
    if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) {
        return true;
    }
    // Windows: access denied, sharing violation, lock violation, device not ready.
    matches!(e.raw_os_error(), Some(5) | Some(21) | Some(32) | Some(33))
}

fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

/// Create a file with retries/backoff for transient errors.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, || File::create(path))
}

/// Promote `tmp` to `dest`, falling back to copy+remove when rename is refused.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    match with_backoff(20, 50, || fs::rename(tmp, dest)) {
        Ok(()) => Ok(()),
        Err(_) => {
            with_backoff(20, 50, || fs::copy(tmp, dest))
                .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
            with_backoff(20, 50, || fs::remove_file(tmp))
                .with_context(|| format!("remove {}", tmp.display()))?;
            Ok(())
        }
    }
}
