//! Timestamp-windowed paging over newest-first feeds (wall posts).
//!
//! The per-page index math lives in [`scan_page`], a pure function over the page's
//! timestamps. [`WindowedPages`] drives it as a pull-based state machine:
//!
//! `FetchingPage -> Scanning -> Yielding -> (ContinuePaging | WindowExhausted | SourceExhausted)`
//!
//! Paging stops as soon as the window is provably exhausted, the limit is consumed,
//! or the source runs dry.

use crate::client::{canonical_user, strip_site_prefix, UserRef, VkClient};
use crate::error::Result;
use crate::record::{timestamp_at, Record};
use crate::transport::Params;
use std::mem;
use std::ops::Range;

/// Service ceiling for `wall.get`.
pub const WALL_PAGE_MAX: usize = 100;

/// Optional `[start, end]` bounds over a unix timestamp field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Window {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self { Self { start, end } }
    pub fn unbounded() -> Self { Self::default() }
    pub fn since(start: i64) -> Self { Self { start: Some(start), end: None } }
    pub fn until(end: i64) -> Self { Self { start: None, end: Some(end) } }
    pub fn between(start: i64, end: i64) -> Self { Self { start: Some(start), end: Some(end) } }

    pub fn contains(&self, ts: i64) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Outcome of scanning one page: the slice to yield and whether paging must stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageScan {
    pub range: Range<usize>,
    pub exhausted: bool,
}

impl PageScan {
    fn take(range: Range<usize>) -> Self { Self { range, exhausted: false } }
    fn last(range: Range<usize>) -> Self { Self { range, exhausted: true } }
}

/// Decide which part of a newest-first page falls inside `window`.
///
/// `remaining` is the unconsumed result limit (`None` = unlimited). The returned
/// range never exceeds it.
pub fn scan_page(ts: &[i64], window: &Window, remaining: Option<usize>) -> PageScan {
    let n = ts.len();
    match (window.start, window.end) {
        (None, None) => match remaining {
            Some(r) if r <= n => PageScan::last(0..r),
            _ => PageScan::take(0..n),
        },

        (Some(start), None) => {
            // Last index that is still new enough.
            let Some(i) = ts.iter().rposition(|&t| t >= start) else {
                return PageScan::last(0..0);
            };
            // The newest `r` in-window records, so chunks stay contiguous across pages.
            if let Some(r) = remaining {
                if r < i + 1 {
                    return PageScan::last(0..r);
                }
            }
            // Anything after `i` is older than `start`; so is every later page.
            PageScan { range: 0..i + 1, exhausted: i + 1 < n }
        }

        (None, Some(end)) => {
            // First index that is old enough.
            let Some(i) = ts.iter().position(|&t| t <= end) else {
                return PageScan::take(n..n);
            };
            match remaining {
                Some(r) if r < n - i => PageScan::last(i..i + r),
                _ => PageScan::take(i..n),
            }
        }

        (Some(start), Some(end)) => {
            let end_idx = ts.iter().position(|&t| t <= end);
            // Exclusive upper bound: first record older than `start`.
            let first_old = ts.iter().position(|&t| t < start);
            let mut exhausted = first_old.is_some();
            let Some(lo) = end_idx else {
                return PageScan { range: n..n, exhausted };
            };
            let hi = first_old.unwrap_or(n).max(lo);
            let mut range = lo..hi;
            if let Some(r) = remaining {
                if range.len() > r {
                    range = lo..lo + r;
                    exhausted = true;
                }
            }
            PageScan { range, exhausted }
        }
    }
}

/// Paging state. Terminal states yield `None` forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingState {
    FetchingPage,
    Scanning,
    Yielding,
    ContinuePaging,
    WindowExhausted,
    SourceExhausted,
    Failed,
}

/// Lazy, finite, non-restartable sequence of in-window chunks.
pub struct WindowedPages {
    client: VkClient,
    method: String,
    base: Params,
    ts_pointer: String,
    window: Window,
    remaining: Option<usize>,
    page_size: usize,

    state: PagingState,
    offset: u64,
    total: u64,
    page: Vec<Record>,
    pending: Vec<Record>,
    window_done: bool,
}

impl WindowedPages {
    pub fn new(
        client: VkClient,
        method: impl Into<String>,
        base: Params,
        ts_pointer: impl Into<String>,
        window: Window,
        limit: Option<usize>,
    ) -> Self {
        let page_size = match limit {
            Some(l) if l > 0 => l.min(WALL_PAGE_MAX),
            _ => WALL_PAGE_MAX,
        };
        Self {
            client,
            method: method.into(),
            base,
            ts_pointer: ts_pointer.into(),
            window,
            remaining: limit,
            page_size,
            state: if limit == Some(0) { PagingState::WindowExhausted } else { PagingState::FetchingPage },
            offset: 0,
            total: 0,
            page: Vec::new(),
            pending: Vec::new(),
            window_done: false,
        }
    }

    /// Override the per-request page size (clamped to at least 1).
    pub fn page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }

    /// Start from a non-zero offset.
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn state(&self) -> PagingState {
        self.state
    }

    /// Number of records requested past so far (the next request's offset).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn step(&mut self) -> Option<Result<Vec<Record>>> {
        match self.state {
            PagingState::FetchingPage => {
                match self.client.fetch_page(&self.method, &self.base, self.offset, self.page_size) {
                    Ok(page) => {
                        self.offset += page.items.len() as u64;
                        self.total = page.total;
                        if page.items.is_empty() {
                            self.state = PagingState::SourceExhausted;
                        } else {
                            self.page = page.items;
                            self.state = PagingState::Scanning;
                        }
                        None
                    }
                    Err(e) => {
                        self.state = PagingState::Failed;
                        Some(Err(e))
                    }
                }
            }
            PagingState::Scanning => {
                let ts: Vec<i64> = self
                    .page
                    .iter()
                    .map(|r| timestamp_at(r, &self.ts_pointer).unwrap_or(0))
                    .collect();
                let scan = scan_page(&ts, &self.window, self.remaining);
                let mut page = mem::take(&mut self.page);
                let end = scan.range.end.min(page.len());
                let start = scan.range.start.min(end);
                page.truncate(end);
                self.pending = page.split_off(start);
                self.window_done = scan.exhausted;
                self.state = PagingState::Yielding;
                None
            }
            PagingState::Yielding => {
                let chunk = mem::take(&mut self.pending);
                if let Some(r) = self.remaining.as_mut() {
                    *r = r.saturating_sub(chunk.len());
                }
                self.state = if self.window_done || self.remaining == Some(0) {
                    PagingState::WindowExhausted
                } else if self.offset >= self.total {
                    PagingState::SourceExhausted
                } else {
                    PagingState::ContinuePaging
                };
                if chunk.is_empty() { None } else { Some(Ok(chunk)) }
            }
            PagingState::ContinuePaging => {
                self.state = PagingState::FetchingPage;
                None
            }
            PagingState::WindowExhausted | PagingState::SourceExhausted | PagingState::Failed => None,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            PagingState::WindowExhausted | PagingState::SourceExhausted | PagingState::Failed
        )
    }
}

impl Iterator for WindowedPages {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_terminal() {
            if let Some(item) = self.step() {
                return Some(item);
            }
        }
        None
    }
}

impl VkClient {
    /// Wall posts of `owner` (user or community) restricted to `window`, newest first,
    /// at most `limit` records in total.
    pub fn fetch_window(&self, owner: &str, window: Window, limit: Option<usize>) -> WindowedPages {
        let mut base = Params::new();
        let name = strip_site_prefix(owner);
        // Communities are addressed by negative owner ids.
        let owner_id = match name.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => match canonical_user(name) {
                UserRef::Id(id) => Some(id),
                UserRef::Domain(_) => None,
            },
        };
        match owner_id {
            Some(id) => { base.insert("owner_id".to_string(), id.to_string()); }
            None => { base.insert("domain".to_string(), name.to_string()); }
        }
        base.insert("extended".to_string(), "1".to_string());
        WindowedPages::new(self.clone(), "wall.get", base, "/date", window, limit)
    }

    /// Convenience: drain [`fetch_window`](Self::fetch_window) into one collection.
    pub fn posts(&self, owner: &str, window: Window, limit: Option<usize>) -> Result<Vec<Record>> {
        let mut out = Vec::new();
        for chunk in self.fetch_window(owner, window, limit) {
            out.extend(chunk?);
        }
        Ok(out)
    }
}
