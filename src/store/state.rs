use serde::Serialize;
use strum::AsRefStr;

use crate::models::LinkRecord;

/// Status of the most recent operation against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Snapshot of everything a UI consumer reads from the store.
///
/// `records` keeps the server's order. `total` counts matches across all
/// pages, so it is usually larger than `records.len()`. `last_error` is
/// `Some` only while `status` is [`StoreStatus::Error`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreState {
    pub records: Vec<LinkRecord>,
    pub total: u64,
    pub status: StoreStatus,
    pub last_error: Option<String>,
}

impl StoreState {
    pub fn is_loading(&self) -> bool {
        self.status == StoreStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == StoreStatus::Error
    }

    pub(crate) fn begin(&mut self) {
        self.status = StoreStatus::Loading;
        self.last_error = None;
    }

    pub(crate) fn finish(&mut self) {
        self.status = StoreStatus::Idle;
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = StoreStatus::Error;
        self.last_error = Some(message);
    }

    /// Swap in a freshly fetched page; records and total always move together.
    pub(crate) fn replace_page(&mut self, records: Vec<LinkRecord>, total: u64) {
        self.records = records;
        self.total = total;
        self.finish();
    }
}
