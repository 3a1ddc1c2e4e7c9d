// level-api: Async Rust client for the Level device-management API

pub mod auth;
pub mod client;
pub mod device_id;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod query;
pub mod transport;

pub use auth::{Credentials, DEFAULT_BASE_URL};
pub use client::{Collection, LevelClient};
pub use envelope::as_array;
pub use error::Error;
pub use pagination::{DEFAULT_PAGE_SIZE, fetch_all_pages};
pub use query::{
    CandidateQuery, KeyValuePair, Query, QueryValue, build_key_value_collection, sanitize_query,
};
pub use transport::{TlsMode, TransportConfig};
