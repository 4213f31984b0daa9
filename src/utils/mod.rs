use std::collections::HashSet;

use chrono::NaiveDate;

use crate::pagination::{PageSize, ALLOWED_PAGE_SIZES};
use crate::query::{is_reserved, DATE_FORMAT};

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("date is empty".to_string());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| "expected YYYY-MM-DD".to_string())
}

pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => parse_date(raw).map(Some),
        None => Ok(None),
    }
}

pub fn parse_page_size(value: u32) -> Result<PageSize, String> {
    PageSize::new(value).ok_or_else(|| {
        let allowed: Vec<String> = ALLOWED_PAGE_SIZES.iter().map(|s| s.to_string()).collect();
        format!("expected one of {}", allowed.join(", "))
    })
}

pub fn parse_filter_pair(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("filter key is empty".to_string());
    }
    if is_reserved(key) {
        return Err(format!("'{key}' is not a filter, use its own option"));
    }
    Ok((key.to_string(), val.trim().to_string()))
}

pub fn parse_filter_pairs(values: &[String]) -> Result<Vec<(String, String)>, String> {
    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for raw in values {
        let (key, val) = parse_filter_pair(raw).map_err(|e| format!("'{raw}': {e}"))?;
        if !seen.insert(key.clone()) {
            return Err(format!("filter '{key}' given more than once"));
        }
        out.push((key, val));
    }
    Ok(out)
}
