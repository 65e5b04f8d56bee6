//! Response envelopes returned by list and detail endpoints

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Pagination metadata of a `{ data, meta }` envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

/// Known collection envelope shapes. Variant order is match order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `[ ... ]`
    Bare(Vec<Value>),
    /// `{ "data": [ ... ], "meta": { "total": n, "totalPages": p } }`
    Paged { data: Vec<Value>, meta: Meta },
    /// `{ "data": [ ... ], "total": n }`
    Counted { data: Vec<Value>, total: u64 },
    /// `{ "data": [ ... ] }`
    Plain { data: Vec<Value> },
}

/// A normalized collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
            total_count: 0,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pages implied by `total` records served `per_page` at a time.
fn pages_for(total: usize, per_page: usize) -> usize {
    if total == 0 || per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

impl Envelope {
    /// Classify a response body. Unknown shapes fail closed.
    pub fn parse(body: Value) -> AppResult<Self> {
        let kind = describe(&body);
        serde_json::from_value(body).map_err(|_| {
            AppError::InvalidResponseShape(format!("expected a list or data envelope, got {}", kind))
        })
    }

    /// Normalize into `(items, total_pages, total_count)`.
    pub fn normalize<T: DeserializeOwned>(self) -> AppResult<Page<T>> {
        let (data, total, total_pages) = match self {
            Envelope::Bare(data) => {
                let total = data.len();
                (data, total, 1)
            }
            Envelope::Paged { data, meta } => {
                let total = meta.total.map(|t| t as usize).unwrap_or(data.len());
                let total_pages = meta
                    .total_pages
                    .map(|p| p as usize)
                    .unwrap_or_else(|| pages_for(total, data.len()));
                (data, total, total_pages)
            }
            Envelope::Counted { data, total } => {
                let total = total as usize;
                let total_pages = pages_for(total, data.len());
                (data, total, total_pages)
            }
            Envelope::Plain { data } => {
                let total = data.len();
                (data, total, 1)
            }
        };

        let items = data
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(Page {
            items,
            total_pages: total_pages.max(1),
            total_count: total,
        })
    }
}

/// Decode a list body into a normalized page.
pub fn normalize_list<T: DeserializeOwned>(body: Value) -> AppResult<Page<T>> {
    Envelope::parse(body)?.normalize()
}

/// Decode a detail body. Detail endpoints answer either with the record
/// or with `{ "data": record }`.
pub fn normalize_single<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    let value = match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    if !value.is_object() {
        return Err(AppError::InvalidResponseShape(format!(
            "expected a record, got {}",
            describe(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
