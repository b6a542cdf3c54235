//! In-memory link service used by the integration tests
//!
//! Behaves like the real admin API: slug format checks, 409 on taken slugs,
//! 404 on unknown slugs, created_at DESC default ordering, keyword/is_active
//! filters and page/page_size pagination. It can answer list calls in either
//! wire shape, inject failures, and hold calls at a gate so tests can observe
//! in-flight state.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use linkstore::api::{ApiClient, ApiError, ApiResponse};
use linkstore::models::LinkRecord;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

const LINKS_PATH: &str = "/links";
const MAX_SLUG_LEN: usize = 32;
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

struct Inner {
    links: Vec<LinkRecord>,
    next_id: i64,
    clock: DateTime<Utc>,
    legacy_shape: bool,
    failures: VecDeque<(Option<&'static str>, ApiError)>,
    list_override: Option<Value>,
    calls: Vec<RecordedCall>,
}

pub struct FakeLinkServer {
    inner: Mutex<Inner>,
    paused: AtomicBool,
    pending: AtomicUsize,
    gate: Semaphore,
}

impl Default for FakeLinkServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLinkServer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                links: Vec::new(),
                next_id: 1,
                clock: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                legacy_shape: false,
                failures: VecDeque::new(),
                list_override: None,
                calls: Vec::new(),
            }),
            paused: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    /// Insert a link directly, bypassing the call log
    pub fn seed(&self, slug: &str, url: &str) -> LinkRecord {
        let mut inner = self.inner.lock();
        inner.insert(slug, url)
    }

    pub fn seed_many(&self, count: usize) {
        for i in 0..count {
            self.seed(&format!("link-{:03}", i), &format!("https://example.com/{}", i));
        }
    }

    /// Answer list calls with a bare array instead of `{links, total}`
    pub fn set_legacy_shape(&self, legacy: bool) {
        self.inner.lock().legacy_shape = legacy;
    }

    /// Answer list calls with this exact payload
    pub fn override_list_payload(&self, payload: Value) {
        self.inner.lock().list_override = Some(payload);
    }

    /// The next call (any verb) fails with `err`
    pub fn fail_next(&self, err: ApiError) {
        self.inner.lock().failures.push_back((None, err));
    }

    /// The next call with this verb fails with `err`
    pub fn fail_next_on(&self, method: &'static str, err: ApiError) {
        self.inner.lock().failures.push_back((Some(method), err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn link(&self, slug: &str) -> Option<LinkRecord> {
        self.inner.lock().find(slug).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().links.len()
    }

    /// Hold every following call until `release` hands out permits
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Let `n` held calls proceed, in arrival order
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Calls currently waiting at the gate
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn wait_for_pending(&self, n: usize) {
        while self.pending() < n {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }

    async fn gate(&self) {
        if !self.paused.load(Ordering::SeqCst) {
            return;
        }
        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    async fn handle(
        &self,
        method: &'static str,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.gate().await;

        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body: body.clone(),
        });
        if let Some(pos) = inner
            .failures
            .iter()
            .position(|(m, _)| m.is_none_or(|m| m == method))
            && let Some((_, err)) = inner.failures.remove(pos)
        {
            return Err(err);
        }

        let slug = match path.strip_prefix(LINKS_PATH) {
            Some("") => None,
            Some(rest) => match rest.strip_prefix('/') {
                Some(encoded) => Some(
                    urlencoding::decode(encoded)
                        .map_err(|_| ApiError::with_status(400, "invalid slug"))?
                        .into_owned(),
                ),
                None => return Err(ApiError::with_status(404, "route not found")),
            },
            None => return Err(ApiError::with_status(404, "route not found")),
        };

        match (method, slug) {
            ("GET", None) => inner.list(query),
            ("POST", None) => inner.create(body.unwrap_or(Value::Null)),
            ("GET", Some(slug)) => inner.get(&slug),
            ("PATCH", Some(slug)) => inner.update(&slug, body.unwrap_or(Value::Null)),
            ("DELETE", Some(slug)) => inner.delete(&slug),
            _ => Err(ApiError::with_status(405, "method not allowed")),
        }
    }
}

impl Inner {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::seconds(1);
        self.clock
    }

    fn find(&self, slug: &str) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.slug == slug)
    }

    fn insert(&mut self, slug: &str, url: &str) -> LinkRecord {
        let now = self.tick();
        let record = LinkRecord {
            id: self.next_id.into(),
            slug: slug.to_string(),
            url: url.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.links.push(record.clone());
        record
    }

    fn list(&self, query: &[(String, String)]) -> Result<ApiResponse, ApiError> {
        if let Some(ref payload) = self.list_override {
            return Ok(ApiResponse::new(payload.clone()));
        }

        let param = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let page = match param("page") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| ApiError::with_status(400, "invalid page"))?,
            None => 1,
        };
        let page_size = match param("page_size") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
                .ok_or_else(|| ApiError::with_status(400, "invalid page_size"))?,
            None => DEFAULT_PAGE_SIZE,
        };
        let sort_by = param("sort_by").unwrap_or("created_at");
        if !matches!(sort_by, "created_at" | "updated_at" | "slug" | "id") {
            return Err(ApiError::with_status(400, "invalid sort_by"));
        }
        let ascending = match param("sort_order") {
            Some(v) if v.eq_ignore_ascii_case("asc") => true,
            Some(v) if v.eq_ignore_ascii_case("desc") => false,
            Some(_) => return Err(ApiError::with_status(400, "invalid sort_order")),
            None => false,
        };
        let is_active = match param("is_active") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => return Err(ApiError::with_status(400, "invalid is_active")),
            None => None,
        };
        let keyword = param("keyword")
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<&LinkRecord> = self
            .links
            .iter()
            .filter(|l| is_active.is_none_or(|a| l.is_active == a))
            .filter(|l| {
                keyword.as_deref().is_none_or(|k| {
                    l.slug.to_lowercase().contains(k) || l.url.to_lowercase().contains(k)
                })
            })
            .collect();

        matched.sort_by(|a, b| {
            let ord = match sort_by {
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                "slug" => a.slug.cmp(&b.slug),
                "id" => a.id.cmp(&b.id),
                _ => a.created_at.cmp(&b.created_at),
            }
            .then(a.id.cmp(&b.id));
            if ascending { ord } else { ord.reverse() }
        });

        let total = matched.len();
        let links: Vec<&LinkRecord> = matched
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        let data = if self.legacy_shape {
            json!(links)
        } else {
            json!({ "links": links, "total": total })
        };
        Ok(ApiResponse::new(data))
    }

    fn create(&mut self, body: Value) -> Result<ApiResponse, ApiError> {
        let slug = body["slug"].as_str().unwrap_or_default().to_string();
        let url = body["url"].as_str().unwrap_or_default().to_string();

        if url.is_empty() {
            return Err(ApiError::with_status(400, "url is required"));
        }
        validate_slug(&slug)?;
        if self.find(&slug).is_some() {
            return Err(ApiError::with_status(409, "slug already taken"));
        }

        self.insert(&slug, &url);
        Ok(ApiResponse::empty())
    }

    fn get(&self, slug: &str) -> Result<ApiResponse, ApiError> {
        validate_slug(slug)?;
        match self.find(slug) {
            Some(link) => Ok(ApiResponse::new(json!(link))),
            None => Err(ApiError::with_status(404, "link not found")),
        }
    }

    fn update(&mut self, slug: &str, body: Value) -> Result<ApiResponse, ApiError> {
        validate_slug(slug)?;
        if let Some(url) = body.get("url").and_then(Value::as_str)
            && url.is_empty()
        {
            return Err(ApiError::with_status(400, "url cannot be empty"));
        }

        let now = self.tick();
        let link = self
            .links
            .iter_mut()
            .find(|l| l.slug == slug)
            .ok_or_else(|| ApiError::with_status(404, "link not found"))?;

        if let Some(url) = body.get("url").and_then(Value::as_str) {
            link.url = url.to_string();
        }
        if let Some(active) = body.get("is_active").and_then(Value::as_bool) {
            link.is_active = active;
        }
        link.updated_at = now;
        Ok(ApiResponse::empty())
    }

    fn delete(&mut self, slug: &str) -> Result<ApiResponse, ApiError> {
        validate_slug(slug)?;
        let before = self.links.len();
        self.links.retain(|l| l.slug != slug);
        if self.links.len() == before {
            return Err(ApiError::with_status(404, "link not found"));
        }
        Ok(ApiResponse::empty())
    }
}

fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.is_empty() {
        return Err(ApiError::with_status(400, "slug is required"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(ApiError::with_status(400, "slug is too long (max 32 chars)"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::with_status(400, "slug contains invalid characters"));
    }
    Ok(())
}

#[async_trait]
impl ApiClient for FakeLinkServer {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<ApiResponse, ApiError> {
        self.handle("GET", path, query, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.handle("POST", path, &[], Some(body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.handle("PATCH", path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.handle("DELETE", path, &[], None).await
    }

    fn name(&self) -> &'static str {
        "FakeLinkServer"
    }
}
