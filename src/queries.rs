//! Per-user collections and single lookups built on the fetcher.

use crate::client::VkClient;
use crate::error::{Error, Result};
use crate::record::{into_record, records_from, Collection, Record};
use crate::transport::{params, Params};
use serde::Serialize;
use serde_json::Value;
use time::{OffsetDateTime, UtcOffset};

// Service page-size ceilings.
pub const FRIENDS_PAGE: usize = 5000;
pub const FOLLOWERS_PAGE: usize = 1000;
pub const SUBSCRIPTIONS_PAGE: usize = 200;
pub const GROUPS_PAGE: usize = 1000;
pub const PHOTOS_PAGE: usize = 1000;
pub const LIKES_PAGE: usize = 1000;
pub const COMMENTS_PAGE: usize = 100;
pub const GIFTS_PAGE: usize = 100_000;
pub const USERS_GET_BATCH: usize = 1000;

/// The "saved photos" system album, skipped when collecting a profile's photos.
pub const SAVED_PHOTOS_ALBUM: i64 = -9000;

/// Subscriptions split by kind. `all` keeps service order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subscriptions {
    pub users: Collection,
    pub pages: Collection,
    pub all: Collection,
}

/// Photo URL, with the attachment's upload time when requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhotoUrl {
    pub url: String,
    pub date: Option<i64>,
}

fn with_fields(mut p: Params, fields: &[String]) -> Params {
    p.insert("fields".to_string(), fields.join(","));
    p
}

/// Largest rendition of a photo object (the service lists sizes ascending).
fn largest_size_url(sizes: Option<&Value>) -> Option<String> {
    sizes
        .and_then(|s| s.as_array())
        .and_then(|sizes| sizes.last())
        .and_then(|s| s.get("url"))
        .and_then(|u| u.as_str())
        .map(|s| s.to_string())
}

fn attachment_photo_urls(item: &Record, with_date: bool, out: &mut Vec<PhotoUrl>) {
    let Some(attachments) = item.get("attachments").and_then(|a| a.as_array()) else { return };
    for att in attachments {
        if att.get("type").and_then(|t| t.as_str()) != Some("photo") {
            continue;
        }
        let Some(photo) = att.get("photo") else { continue };
        if let Some(url) = largest_size_url(photo.get("sizes")) {
            let date = if with_date {
                photo.get("date").or_else(|| att.get("date")).and_then(|d| d.as_i64())
            } else {
                None
            };
            out.push(PhotoUrl { url, date });
        }
    }
}

/// Photo attachments of already fetched posts.
pub fn photo_urls_from_posts(posts: &[Record], with_date: bool) -> Vec<PhotoUrl> {
    let mut out = Vec::new();
    for post in posts {
        attachment_photo_urls(post, with_date, &mut out);
    }
    out
}

impl VkClient {
    // -------- Collections --------

    pub fn friends(&self, domain: &str, fields: &[String]) -> Result<Collection> {
        let user_id = self.resolve_user_id(domain)?;
        // No `order`: the default is ascending id.
        let base = with_fields(params([("user_id", user_id)]), fields);
        self.fetch_all("friends.get", &base, FRIENDS_PAGE)
    }

    pub fn followers(&self, domain: &str, fields: &[String]) -> Result<Collection> {
        let user_id = self.resolve_user_id(domain)?;
        let base = with_fields(params([("user_id", user_id)]), fields);
        self.fetch_all("users.getFollowers", &base, FOLLOWERS_PAGE)
    }

    pub fn subscriptions(&self, domain: &str, fields: &[String]) -> Result<Subscriptions> {
        let user_id = self.resolve_user_id(domain)?;
        let base = with_fields(params([("user_id", user_id), ("extended", 1)]), fields);
        let all = self.fetch_all("users.getSubscriptions", &base, SUBSCRIPTIONS_PAGE)?;

        let (users, pages): (Vec<Record>, Vec<Record>) = all
            .iter()
            .cloned()
            .partition(|s| s.get("type").and_then(|t| t.as_str()) == Some("profile"));
        Ok(Subscriptions { users, pages, all })
    }

    pub fn groups(&self, domain: &str, fields: &[String]) -> Result<Collection> {
        let user_id = self.resolve_user_id(domain)?;
        let base = with_fields(params([("user_id", user_id), ("extended", 1)]), fields);
        self.fetch_all("groups.get", &base, GROUPS_PAGE)
    }

    /// Users who liked a wall post.
    pub fn likes(&self, owner_id: i64, item_id: i64) -> Result<Collection> {
        let base = params([
            ("owner_id", owner_id.to_string()),
            ("item_id", item_id.to_string()),
            ("type", "post".to_string()),
        ]);
        self.fetch_all("likes.getList", &base, LIKES_PAGE)
    }

    /// Gifts received by a user, newest first.
    pub fn gifts(&self, domain: &str) -> Result<Collection> {
        let user_id = self.resolve_user_id(domain)?;
        self.fetch_all("gifts.get", &params([("user_id", user_id)]), GIFTS_PAGE)
    }

    // -------- Photos --------

    /// Album ids of a profile, system albums included.
    pub fn albums(&self, domain: &str) -> Result<Vec<i64>> {
        let owner_id = self.resolve_user_id(domain)?;
        let response = self.invoke("photos.getAlbums", &params([("owner_id", owner_id), ("need_system", 1)]))?;
        Ok(records_from(response.get("items"))
            .iter()
            .filter_map(|a| a.get("id").and_then(|id| id.as_i64()))
            .collect())
    }

    pub fn album_photo_urls(&self, domain: &str, album_id: i64) -> Result<Vec<String>> {
        let owner_id = self.resolve_user_id(domain)?;
        let base = params([("owner_id", owner_id), ("album_id", album_id)]);
        let photos = self.fetch_all("photos.get", &base, PHOTOS_PAGE)?;
        Ok(photos.iter().filter_map(|p| largest_size_url(p.get("sizes"))).collect())
    }

    /// Every photo URL of a profile except the saved-photos album.
    pub fn all_photo_urls(&self, domain: &str) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        for album_id in self.albums(domain)? {
            if album_id == SAVED_PHOTOS_ALBUM {
                continue;
            }
            urls.extend(self.album_photo_urls(domain, album_id)?);
        }
        tracing::info!(domain, photos = urls.len(), "photo urls collected");
        Ok(urls)
    }

    /// Photo attachments in the comments of the given posts.
    pub fn comment_photo_urls(&self, owner_id: i64, post_ids: &[i64], with_date: bool) -> Result<Vec<PhotoUrl>> {
        let mut out = Vec::new();
        for post_id in post_ids {
            let base = params([("owner_id", owner_id), ("post_id", *post_id)]);
            for comment in self.fetch_all("wall.getComments", &base, COMMENTS_PAGE)? {
                attachment_photo_urls(&comment, with_date, &mut out);
            }
        }
        Ok(out)
    }

    // -------- Single lookups --------

    pub fn user(&self, domain: &str, fields: &[String]) -> Result<Record> {
        let name = crate::client::strip_site_prefix(domain);
        let base = with_fields(params([("user_ids", name)]), fields);
        let response = self.invoke("users.get", &base)?;
        match response.as_array().and_then(|users| users.first()) {
            Some(u) => Ok(into_record(u.clone())),
            None => Err(Error::UnresolvedIdentifier(name.to_string())),
        }
    }

    /// "Last First" display name.
    pub fn user_name(&self, domain: &str) -> Result<String> {
        let user = self.user(domain, &[])?;
        let last = user.get("last_name").and_then(|v| v.as_str()).unwrap_or_default();
        let first = user.get("first_name").and_then(|v| v.as_str()).unwrap_or_default();
        Ok(format!("{} {}", last, first))
    }

    pub fn group_name(&self, domain: &str) -> Result<String> {
        let name = crate::client::strip_site_prefix(domain);
        let response = self.invoke("groups.getById", &params([("group_ids", name)]))?;
        response
            .as_array()
            .and_then(|groups| groups.first())
            .and_then(|g| g.get("name"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::UnresolvedIdentifier(name.to_string()))
    }

    /// Last visit, in Moscow time (UTC+3). A hidden or missing value is the epoch.
    pub fn last_seen(&self, domain: &str) -> Result<OffsetDateTime> {
        let user_id = self.resolve_user_id(domain)?;
        let response = self.invoke("users.get", &params([("user_ids", user_id.to_string()), ("fields", "last_seen".to_string())]))?;
        let ts = response
            .pointer("/0/last_seen/time")
            .and_then(|t| t.as_i64())
            .unwrap_or(0);
        let msk = UtcOffset::from_hms(3, 0, 0).map_err(|e| Error::Config(e.to_string()))?;
        let dt = OffsetDateTime::from_unix_timestamp(ts).map_err(|e| Error::Config(e.to_string()))?;
        Ok(dt.to_offset(msk))
    }

    /// Reported number of wall posts.
    pub fn posts_count(&self, domain: &str) -> Result<u64> {
        let base = params([
            ("domain", crate::client::strip_site_prefix(domain)),
            ("extended", "0"),
            ("count", "1"),
            ("offset", "0"),
        ]);
        let response = self.invoke("wall.get", &base)?;
        Ok(response.get("count").and_then(|c| c.as_u64()).unwrap_or(0))
    }

    /// Ids among `ids` whose accounts are deleted or banned.
    pub fn deactivated_users(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let mut out = Vec::new();
        for chunk in ids.chunks(USERS_GET_BATCH) {
            let joined = chunk.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
            let response = self.invoke("users.get", &params([("user_ids", joined)]))?;
            for user in records_from(Some(&response)) {
                if user.get("deactivated").map_or(false, |d| !d.is_null()) {
                    if let Some(id) = user.get("id").and_then(|id| id.as_i64()) {
                        out.push(id);
                    }
                }
            }
        }
        Ok(out)
    }
}
