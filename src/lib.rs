//! Linkstore - client-side store for a short-link admin service
//!
//! Mediates between UI consumers and a remote link service: fetches, creates,
//! updates and deletes short links, and exposes one consistent view of
//! loading/error/data state to every subscriber.
//!
//! # Architecture
//! - `api`: collaborator contract (`ApiClient`) the transport implements
//! - `models`: link records, list queries, patch bodies
//! - `store`: `LinkStore`, its state snapshot and list response normalization
//! - `config`: TOML + environment configuration
//! - `errors`: error type shared by the crate
//! - `system`: logging setup for embedding applications
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use linkstore::api::ApiClient;
//! use linkstore::models::ListQuery;
//! use linkstore::store::LinkStore;
//!
//! async fn show(api: Arc<dyn ApiClient>) {
//!     let store = LinkStore::new(api);
//!     store.list(ListQuery::new().page(1).page_size(20)).await;
//!     if store.create("promo", "https://example.com/promo").await.is_ok() {
//!         println!("{} links", store.total());
//!     }
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod system;

pub use api::{ApiClient, ApiError, ApiResponse};
pub use errors::{LinkStoreError, Result};
pub use models::{LinkId, LinkPatch, LinkRecord, ListQuery, SortOrder};
pub use store::{LinkStore, StoreState, StoreStatus};
