//! The service stores (C5), expiration & pruning (C8), and the query
//! surface (C9).

pub mod codec;
pub mod config;
pub mod error;
pub mod expire;
pub mod query;
pub mod store;
pub mod version_list;

pub use config::Config;
pub use error::StoreError;
pub use query::Scan;
pub use store::{AliasAddressIndex, ServiceStore, Stores};
pub use version_list::VersionList;
