use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::pagination::PageResult;
use crate::resource::ResourceKind;

#[derive(Clone, Debug, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub pagination: Option<PageResult>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WirePagination {
    #[serde(alias = "totalItems", alias = "totalDocuments", alias = "count")]
    pub total: Option<u64>,
    #[serde(alias = "currentPage")]
    pub page: Option<u32>,
    #[serde(alias = "pageSize", alias = "perPage")]
    pub limit: Option<u32>,
    #[serde(alias = "totalPages", alias = "pageCount")]
    pub pages: Option<u32>,
}

impl WirePagination {
    fn to_page_result(&self, fallback_page_size: u32) -> Option<PageResult> {
        let page_size = self.limit.filter(|l| *l > 0).unwrap_or(fallback_page_size);
        let total = match (self.total, self.pages) {
            (Some(total), _) => total,
            // only a page count: the best available upper bound
            (None, Some(pages)) => u64::from(pages) * u64::from(page_size.max(1)),
            (None, None) => return None,
        };
        Some(PageResult::new(total, self.page.unwrap_or(1), page_size))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    Bare(Vec<Value>),
    Keyed {
        field: String,
        items: Vec<Value>,
        pagination: Option<Value>,
    },
    Unknown { shape: String },
}

impl Envelope {
    pub fn classify(value: Value, fields: &[&str]) -> Self {
        match value {
            Value::Array(items) => Self::Bare(items),
            Value::Object(mut map) => {
                for field in fields {
                    if map.get(*field).is_some_and(Value::is_array) {
                        let items = match map.remove(*field) {
                            Some(Value::Array(items)) => items,
                            _ => Vec::new(),
                        };
                        let pagination = map.remove("pagination").filter(|p| p.is_object());
                        return Self::Keyed {
                            field: field.to_string(),
                            items,
                            pagination,
                        };
                    }
                }
                Self::Unknown {
                    shape: describe_object(&map),
                }
            }
            Value::Null => Self::Unknown {
                shape: "null".to_string(),
            },
            Value::Bool(_) => Self::Unknown {
                shape: "boolean".to_string(),
            },
            Value::Number(_) => Self::Unknown {
                shape: "number".to_string(),
            },
            Value::String(_) => Self::Unknown {
                shape: "string".to_string(),
            },
        }
    }
}

fn describe_object(map: &Map<String, Value>) -> String {
    let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
    format!("object {{{}}}", keys.join(", "))
}

/// Folds any known envelope into a [`ListResponse`].
///
/// This never fails: an unrecognized body becomes an empty list, and records
/// that do not decode as `T` are dropped. Both cases are logged.
pub fn normalize<T: DeserializeOwned>(
    kind: ResourceKind,
    value: Value,
    fallback_page_size: u32,
) -> ListResponse<T> {
    let (raw_items, raw_pagination) = match Envelope::classify(value, kind.collection_fields()) {
        Envelope::Bare(items) => (items, None),
        Envelope::Keyed {
            field,
            items,
            pagination,
        } => {
            log::trace!("{kind}: records found under '{field}'");
            (items, pagination)
        }
        Envelope::Unknown { shape } => {
            log::warn!("{kind}: unrecognized listing response ({shape}), showing no records");
            return ListResponse::default();
        }
    };

    let pagination = raw_pagination.and_then(|raw| {
        match serde_json::from_value::<WirePagination>(raw) {
            Ok(wire) => wire.to_page_result(fallback_page_size),
            Err(e) => {
                log::warn!("{kind}: ignoring malformed pagination object: {e}");
                None
            }
        }
    });

    let received = raw_items.len();
    let items: Vec<T> = raw_items
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<T>(raw).ok())
        .collect();
    if items.len() != received {
        log::warn!(
            "{kind}: dropped {} of {} records that did not decode",
            received - items.len(),
            received
        );
    }

    ListResponse { items, pagination }
}
