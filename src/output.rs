//! Output writers: JSON array, NDJSON and zstd-compressed NDJSON, to a file or stdout.
//! Files are written to a temp sibling and promoted atomically.

use crate::record::Record;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use zstd::stream::write::Encoder as ZstdEncoder;

/// Output format for record collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json { pretty: bool },
    Jsonl,
    JsonlZst,
}

impl OutputFormat {
    /// Pick a format from a file extension (`.jsonl`, `.ndjson`, `.zst`); JSON otherwise.
    pub fn for_path(path: &Path, pretty: bool) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("zst") => OutputFormat::JsonlZst,
            Some("jsonl") | Some("ndjson") => OutputFormat::Jsonl,
            _ => OutputFormat::Json { pretty },
        }
    }
}

pub fn write_records_to<W: Write>(mut w: W, records: &[Record], format: OutputFormat) -> Result<W> {
    match format {
        OutputFormat::Json { pretty: true } => {
            serde_json::to_writer_pretty(&mut w, records)?;
            w.write_all(b"\n")?;
        }
        OutputFormat::Json { pretty: false } => {
            serde_json::to_writer(&mut w, records)?;
            w.write_all(b"\n")?;
        }
        OutputFormat::Jsonl | OutputFormat::JsonlZst => {
            for rec in records {
                serde_json::to_writer(&mut w, rec)?;
                w.write_all(b"\n")?;
            }
        }
    }
    Ok(w)
}

/// Write `records` to `out` (stdout when `None`).
pub fn write_records(records: &[Record], out: Option<&Path>, format: OutputFormat, write_buf: usize) -> Result<()> {
    let Some(path) = out else {
        let stdout = io::stdout();
        let mut w = write_records_to(BufWriter::with_capacity(write_buf, stdout.lock()), records, format)?;
        w.flush()?;
        return Ok(());
    };

    let tmp = path.with_extension("inprogress");
    let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let buffered = BufWriter::with_capacity(write_buf, file);
    match format {
        OutputFormat::JsonlZst => {
            let enc = ZstdEncoder::new(buffered, 19)?;
            let enc = write_records_to(enc, records, format)?;
            let mut inner = enc.finish()?;
            inner.flush()?;
        }
        _ => {
            let mut w = write_records_to(buffered, records, format)?;
            w.flush()?;
        }
    }
    replace_file_atomic_backoff(&tmp, path)?;
    tracing::info!(path = %path.display(), records = records.len(), "written");
    Ok(())
}

/// Ranking as an ordered JSON object (`{"Rome": 3, "Paris": 1}`), highest count first.
pub fn ranking_to_value(ranking: &[(String, u64)]) -> Value {
    let mut obj = Map::new();
    for (k, v) in ranking {
        obj.insert(k.clone(), Value::from(*v));
    }
    Value::Object(obj)
}

pub fn write_ranking(ranking: &[(String, u64)], out: Option<&Path>, pretty: bool) -> Result<()> {
    let value = ranking_to_value(ranking);
    let text = if pretty { serde_json::to_string_pretty(&value)? } else { serde_json::to_string(&value)? };
    match out {
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(text.as_bytes())?;
            lock.write_all(b"\n")?;
            lock.flush()?;
        }
        Some(path) => {
            let tmp = path.with_extension("inprogress");
            let mut f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
            f.write_all(text.as_bytes())?;
            f.write_all(b"\n")?;
            f.flush()?;
            drop(f);
            replace_file_atomic_backoff(&tmp, path)?;
        }
    }
    Ok(())
}
