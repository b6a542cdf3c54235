//! Link store
//!
//! Single source of truth for the current page of links and for the status of
//! the latest operation against it.
//!
//! # Synchronization policy
//!
//! - `records` and `total` are only ever replaced together, by a successful
//!   list fetch. Mutation responses are never patched into the local page.
//! - After `create` / `update` / `remove` succeed, the store re-lists with the
//!   last query so the page reflects server truth (ordering, totals, filters).
//! - `list` failures are recorded and logged, never returned. Mutation
//!   failures are recorded and returned.
//!
//! # Concurrency
//!
//! No queueing and no cancellation: concurrent operations each flip `status`
//! when they complete, and the last one to complete decides what is visible.

mod normalize;
mod state;

pub use normalize::{LinkPage, WireShape, normalize_list_response};
pub use state::{StoreState, StoreStatus};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::StoreSettings;
use crate::errors::{LinkStoreError, Result};
use crate::models::{CreateLinkBody, LinkPatch, LinkRecord, ListQuery};

const FETCH_LINKS_FAILED: &str = "Failed to fetch links";
const FETCH_LINK_FAILED: &str = "Failed to fetch link";
const CREATE_LINK_FAILED: &str = "Failed to create link";
const UPDATE_LINK_FAILED: &str = "Failed to update link";
const DELETE_LINK_FAILED: &str = "Failed to delete link";

/// Observable link store.
///
/// Create one per session and hand out `Arc<LinkStore>` to consumers. All
/// methods take `&self`; state is read through [`LinkStore::snapshot`] or a
/// [`LinkStore::subscribe`] receiver.
pub struct LinkStore {
    api: Arc<dyn ApiClient>,
    settings: StoreSettings,
    state: watch::Sender<StoreState>,
    last_query: Mutex<ListQuery>,
    legacy_responses: AtomicU64,
}

impl LinkStore {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self::with_settings(api, StoreSettings::default())
    }

    pub fn with_settings(api: Arc<dyn ApiClient>, settings: StoreSettings) -> Self {
        let initial_query = ListQuery {
            page_size: settings.default_page_size,
            ..ListQuery::default()
        };
        debug!(
            "LinkStore created with {} at {}",
            api.name(),
            settings.links_path
        );
        Self {
            api,
            settings,
            state: watch::Sender::new(StoreState::default()),
            last_query: Mutex::new(initial_query),
            legacy_responses: AtomicU64::new(0),
        }
    }

    // ============ Observation ============

    /// Receiver that is notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Cloned copy of the current state
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> StoreStatus {
        self.state.borrow().status
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn records(&self) -> Vec<LinkRecord> {
        self.state.borrow().records.clone()
    }

    pub fn total(&self) -> u64 {
        self.state.borrow().total
    }

    /// Query used by the most recent `list` (what mutations re-sync with)
    pub fn last_query(&self) -> ListQuery {
        self.last_query.lock().clone()
    }

    /// How many list responses arrived in the legacy bare-array shape
    pub fn legacy_responses(&self) -> u64 {
        self.legacy_responses.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // ============ Operations ============

    /// Fetch a page of links and replace `records` / `total`.
    ///
    /// Never fails from the caller's point of view: on error the previous page
    /// is kept, `status` becomes `error` and `last_error` holds the message.
    pub async fn list(&self, query: ListQuery) {
        *self.last_query.lock() = query.clone();
        self.begin();
        self.fetch_page(&query).await;
    }

    /// Re-run `list` with the last query
    pub async fn refresh(&self) {
        let query = self.last_query();
        self.begin();
        self.fetch_page(&query).await;
    }

    /// Create a link, then re-sync the page.
    ///
    /// Slug format and collisions are checked by the server; its rejection
    /// comes back as the returned error.
    pub async fn create(&self, slug: &str, url: &str) -> Result<()> {
        self.begin();
        let body = self.encode(
            &CreateLinkBody {
                slug: slug.to_string(),
                url: url.to_string(),
            },
            CREATE_LINK_FAILED,
        )?;

        match self.api.post(&self.settings.links_path, body).await {
            Ok(_) => {
                info!("Link created: {}", slug);
                self.resync().await;
                Ok(())
            }
            Err(e) => Err(self.record_failure(&e, CREATE_LINK_FAILED)),
        }
    }

    /// Partially update a link, then re-sync the page.
    ///
    /// Fields left unset in `patch` are not sent.
    pub async fn update(&self, slug: &str, patch: LinkPatch) -> Result<()> {
        self.begin();
        let body = self.encode(&patch, UPDATE_LINK_FAILED)?;

        match self.api.patch(&self.link_path(slug), body).await {
            Ok(_) => {
                info!("Link updated: {}", slug);
                self.resync().await;
                Ok(())
            }
            Err(e) => Err(self.record_failure(&e, UPDATE_LINK_FAILED)),
        }
    }

    /// Delete a link, then re-sync the page.
    pub async fn remove(&self, slug: &str) -> Result<()> {
        self.begin();

        match self.api.delete(&self.link_path(slug)).await {
            Ok(_) => {
                info!("Link deleted: {}", slug);
                self.resync().await;
                Ok(())
            }
            Err(e) => Err(self.record_failure(&e, DELETE_LINK_FAILED)),
        }
    }

    /// Read one link by slug without touching the current page.
    ///
    /// Only a 404 is `Ok(None)`. A success response whose body doesn't decode
    /// as a record is a `Serialization` error, recorded like a transport
    /// failure; so is every other failure.
    pub async fn fetch_one(&self, slug: &str) -> Result<Option<LinkRecord>> {
        self.begin();

        match self.api.get(&self.link_path(slug), &[]).await {
            Ok(resp) => match serde_json::from_value::<LinkRecord>(resp.data) {
                Ok(record) => {
                    self.state.send_modify(StoreState::finish);
                    Ok(Some(record))
                }
                Err(e) => {
                    let err = LinkStoreError::serialization(format!(
                        "Unexpected link payload for {}: {}",
                        slug, e
                    ));
                    error!("{}: {}", FETCH_LINK_FAILED, err);
                    Err(self.record_error(err))
                }
            },
            Err(e) if e.is_not_found() => {
                debug!("Link not found: {}", slug);
                self.state.send_modify(StoreState::finish);
                Ok(None)
            }
            Err(e) => Err(self.record_failure(&e, FETCH_LINK_FAILED)),
        }
    }

    // ============ Internals ============

    fn begin(&self) {
        self.state.send_modify(StoreState::begin);
    }

    /// Re-list after a successful mutation. Status is already `loading`, so
    /// no extra transition is emitted before the fetch.
    async fn resync(&self) {
        let query = self.last_query();
        debug!("Re-syncing links after mutation");
        self.fetch_page(&query).await;
    }

    async fn fetch_page(&self, query: &ListQuery) {
        let pairs = query.to_query_pairs();
        debug!("Fetching links: {:?}", pairs);

        match self.api.get(&self.settings.links_path, &pairs).await {
            Ok(resp) => {
                let page = normalize_list_response(resp.data);
                self.note_shape(page.shape);
                debug!(
                    "Fetched {} links (total {})",
                    page.records.len(),
                    page.total
                );
                self.state
                    .send_modify(|s| s.replace_page(page.records, page.total));
            }
            Err(e) => {
                let message = e.display_message(FETCH_LINKS_FAILED);
                error!("{}: {}", FETCH_LINKS_FAILED, e);
                self.state.send_modify(|s| s.fail(message));
            }
        }
    }

    fn note_shape(&self, shape: WireShape) {
        match shape {
            WireShape::Current => {}
            WireShape::Legacy => {
                self.legacy_responses.fetch_add(1, Ordering::Relaxed);
                if self.settings.warn_on_legacy_shape {
                    warn!(
                        "GET {} answered with the legacy array shape; total is the page length",
                        self.settings.links_path
                    );
                }
            }
            WireShape::Unrecognized => {
                warn!(
                    "GET {} answered with an unrecognized payload; showing an empty list",
                    self.settings.links_path
                );
            }
        }
    }

    fn record_failure(&self, err: &ApiError, fallback: &str) -> LinkStoreError {
        error!("{}: {}", fallback, err);
        self.record_error(LinkStoreError::from_api(err, fallback))
    }

    /// Flip to `error` with the message of `err` and hand it back
    fn record_error(&self, err: LinkStoreError) -> LinkStoreError {
        let message = err.message().to_string();
        self.state.send_modify(|s| s.fail(message));
        err
    }

    fn encode<T: Serialize>(&self, body: &T, fallback: &str) -> Result<serde_json::Value> {
        serde_json::to_value(body).map_err(|e| {
            let err = LinkStoreError::from(e);
            error!("{}: {}", fallback, err);
            self.record_error(err)
        })
    }

    fn link_path(&self, slug: &str) -> String {
        format!(
            "{}/{}",
            self.settings.links_path.trim_end_matches('/'),
            urlencoding::encode(slug)
        )
    }
}
