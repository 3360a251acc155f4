//! Offset-based pagination: walk pages until the reported total is exhausted.

use crate::client::VkClient;
use crate::error::Result;
use crate::record::{records_from, Collection, Record};
use crate::transport::Params;
use serde_json::Value;

/// One request/response unit of a paginated fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    pub total: u64,
    pub offset: u64,
}

impl Page {
    /// Missing `items` means an empty page and missing `count` a zero total.
    pub fn from_response(v: &Value, offset: u64) -> Self {
        Self {
            items: records_from(v.get("items")),
            total: v.get("count").and_then(|c| c.as_u64()).unwrap_or(0),
            offset,
        }
    }
}

impl VkClient {
    /// Fetch a single page with `offset`/`count` merged into `base`.
    pub fn fetch_page(&self, method: &str, base: &Params, offset: u64, count: usize) -> Result<Page> {
        let mut p = base.clone();
        p.insert("offset".to_string(), offset.to_string());
        p.insert("count".to_string(), count.to_string());
        let response = self.invoke(method, &p)?;
        Ok(Page::from_response(&response, offset))
    }

    /// Concatenate every page of `method`. Terminates on `offset >= total`, not on
    /// page length, so a short final page is fine.
    pub fn fetch_all(&self, method: &str, base: &Params, page_size: usize) -> Result<Collection> {
        let page_size = page_size.max(1);
        let mut offset: u64 = 0;
        let mut out: Collection = Vec::new();

        loop {
            let page = self.fetch_page(method, base, offset, page_size)?;
            tracing::debug!(method, offset, received = page.items.len(), total = page.total, "page");
            out.extend(page.items);

            offset += page_size as u64;
            if offset >= page.total {
                break;
            }
        }

        tracing::info!(method, records = out.len(), "collection fetched");
        Ok(out)
    }
}
