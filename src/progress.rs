//! Progress bars for multi-user fetches and photo downloads.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const USERS_TEMPLATE: &str = "{spinner:.green} {msg} {pos}/{len} users [{bar:.cyan/blue}] elapsed: {elapsed_precise}";
const DOWNLOADS_TEMPLATE: &str =
    "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  eta: {eta_precise}";

fn styled(total: u64, template: &str, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// A bar that only exists when progress output is enabled.
pub struct ProgressScope {
    pb: Option<ProgressBar>,
}

impl ProgressScope {
    /// One tick per user processed.
    pub fn users(enabled: bool, label: &str, total: usize) -> Self {
        Self { pb: enabled.then(|| styled(total as u64, USERS_TEMPLATE, label)) }
    }

    /// One tick per file attempted.
    pub fn downloads(enabled: bool, total: usize) -> Self {
        Self { pb: enabled.then(|| styled(total as u64, DOWNLOADS_TEMPLATE, "Downloading photos")) }
    }

    #[inline]
    pub fn tick(&self) {
        if let Some(pb) = &self.pb {
            pb.inc(1);
        }
    }

    pub fn finish(&self, msg: impl Into<String>) {
        if let Some(pb) = &self.pb {
            pb.finish_with_message(msg.into());
        }
    }
}
