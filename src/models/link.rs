use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned record identifier.
///
/// Opaque to the store: the service emits integers today, but string ids are
/// accepted and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkId::Int(n) => write!(f, "{}", n),
            LinkId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LinkId {
    fn from(id: i64) -> Self {
        LinkId::Int(id)
    }
}

impl From<String> for LinkId {
    fn from(id: String) -> Self {
        LinkId::Text(id)
    }
}

impl From<&str> for LinkId {
    fn from(id: &str) -> Self {
        LinkId::Text(id.to_string())
    }
}

/// One slug → URL mapping as returned by the link service.
///
/// `id`, `created_at` and `updated_at` are server-assigned; the store never
/// fabricates or edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    pub slug: String,
    pub url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /links`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateLinkBody {
    pub slug: String,
    pub url: String,
}

/// Partial update for `PATCH /links/{slug}`.
///
/// Unset fields are omitted from the body and left unchanged server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url<T: Into<String>>(mut self, url: T) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.is_active.is_none()
    }
}
