//! Best-effort parallel photo download on a small dedicated worker pool.

use crate::client::VkClient;
use crate::error::{Error, Result};
use crate::progress::ProgressScope;
use crate::util::create_with_backoff;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of a download batch. `ok` is the AND of every transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub ok: bool,
    pub saved: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/// Last path segment without the query, with `.jpg` appended unless already present.
pub fn file_name_for_url(url: &str) -> String {
    let no_query = url.split('?').next().unwrap_or(url);
    let last = no_query.rsplit('/').next().unwrap_or(no_query);
    let stem = if last.is_empty() { "photo" } else { last };
    if stem.to_ascii_lowercase().ends_with(".jpg") {
        stem.to_string()
    } else {
        format!("{}.jpg", stem)
    }
}

impl VkClient {
    /// Download every URL into `dir` on a pool of `download_workers` threads.
    /// Every URL is attempted; the pool is torn down before this returns.
    pub fn download_all(&self, urls: &[String], dir: &Path) -> Result<DownloadReport> {
        fs::create_dir_all(dir)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.opts.download_workers)
            .thread_name(|i| format!("vk-download-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("download pool: {}", e)))?;

        let pb = ProgressScope::downloads(self.opts.progress, urls.len());
        let saved = Mutex::new(Vec::<PathBuf>::new());
        let failed = Mutex::new(Vec::<String>::new());

        pool.install(|| {
            urls.par_iter().for_each(|url| {
                let path = dir.join(file_name_for_url(url));
                match self.download_one(url, &path) {
                    Ok(()) => {
                        tracing::info!(%url, "downloaded");
                        saved.lock().push(path);
                    }
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "download failed");
                        failed.lock().push(url.clone());
                    }
                }
                pb.tick();
            });
        });
        drop(pool);

        let mut saved = saved.into_inner();
        saved.sort();
        let failed = failed.into_inner();
        pb.finish("downloads done");
        if !failed.is_empty() {
            tracing::warn!(failed = failed.len(), "not all files were downloaded");
        }
        Ok(DownloadReport { ok: failed.is_empty(), saved, failed })
    }

    fn download_one(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.transport().download(url)?;
        let mut f = create_with_backoff(path, 16, 50)?;
        f.write_all(&bytes)?;
        f.flush()?;
        Ok(())
    }

    /// All photos of a profile into `dir` (defaults to a directory named after the user).
    pub fn save_pictures(&self, domain: &str, dir: Option<&Path>) -> Result<DownloadReport> {
        let target = match dir {
            Some(d) => d.to_path_buf(),
            None => PathBuf::from(crate::client::strip_site_prefix(domain)),
        };
        let urls = self.all_photo_urls(domain)?;
        self.download_all(&urls, &target)
    }
}
