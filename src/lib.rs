mod config;
mod error;
mod transport;
mod client;
mod record;

mod paging;
mod window;
mod queries;

mod aggregate;
mod key_extractor;
mod counting;

mod concurrency;
mod progress;
mod download;
mod humanize;
mod people;
mod output;
mod util;

pub use crate::config::{ClientOptions, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_EXCLUDE_FIELDS, DEFAULT_LANG};
pub use crate::error::{Error, RemoteError, Result};
pub use crate::transport::{params, HttpTransport, Params, Transport};
pub use crate::client::{canonical_user, strip_site_prefix, UserRef, VkClient};
pub use crate::record::{canonical_key, clear_empty, identifier, is_empty_value, value_at, Collection, Record};

// Pagination and the windowed post extractor.
pub use crate::paging::Page;
pub use crate::window::{scan_page, PageScan, PagingState, Window, WindowedPages, WALL_PAGE_MAX};
pub use crate::queries::{
    photo_urls_from_posts, PhotoUrl, Subscriptions, COMMENTS_PAGE, FOLLOWERS_PAGE, FRIENDS_PAGE, GIFTS_PAGE, GROUPS_PAGE,
    LIKES_PAGE, PHOTOS_PAGE, SAVED_PHOTOS_ALBUM, SUBSCRIPTIONS_PAGE, USERS_GET_BATCH,
};

// Set algebra and statistics.
pub use crate::aggregate::{aggregate, normalize_collection, AggregationKey, KeyGranularity, SetAggregator, SetMode};
pub use crate::key_extractor::{StatKey, UNKNOWN_KEY};
pub use crate::counting::rank;

// Outer helpers: multi-user fan-out, downloads, reshaping, output.
pub use crate::concurrency::{map_users_isolated, map_users_limited};
pub use crate::download::{file_name_for_url, DownloadReport};
pub use crate::people::PeopleFilter;
pub use crate::humanize::{human_readable_group, human_readable_post, human_readable_sub, human_readable_user};
pub use crate::output::{ranking_to_value, write_ranking, write_records, write_records_to, OutputFormat};
pub use crate::util::{init_tracing_once, split_fields};
