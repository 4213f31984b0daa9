use crate::criteria::FilterCriteria;
use crate::pagination::PageRequest;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const RESERVED_PARAMS: [&str; 7] = [
    "search",
    "startDate",
    "endDate",
    "sortBy",
    "sortOrder",
    "page",
    "limit",
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn push_non_empty(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.pairs.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn apply_to(&self, url: &mut reqwest::Url) {
        if self.pairs.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.iter());
    }
}

/// Translates criteria and an optional page into wire parameters.
///
/// Emission order is fixed: `search`, field filters by key, `startDate`,
/// `endDate`, `sortBy`, `sortOrder`, then `page` and `limit` when a page
/// request is given (delegated paging). Empty values are never emitted.
pub fn build_query(criteria: &FilterCriteria, page: Option<PageRequest>) -> QueryParams {
    let mut params = QueryParams::default();

    params.push_non_empty("search", criteria.search.trim());

    for (key, value) in criteria.field_filters.iter() {
        if key.is_empty() {
            continue;
        }
        if is_reserved(key) {
            log::debug!("skipping field filter '{key}', the name is reserved");
            continue;
        }
        params.push_non_empty(key, value);
    }

    if let Some(start) = criteria.date_range.start {
        params.push_non_empty("startDate", &start.format(DATE_FORMAT).to_string());
    }
    if let Some(end) = criteria.date_range.end {
        params.push_non_empty("endDate", &end.format(DATE_FORMAT).to_string());
    }

    let sort_key = criteria.sort.key.trim();
    if !sort_key.is_empty() {
        params.push_non_empty("sortBy", sort_key);
        params.push_non_empty("sortOrder", criteria.sort.direction.as_wire());
    }

    if let Some(page) = page {
        params.push_non_empty("page", &page.page.to_string());
        params.push_non_empty("limit", &page.page_size.get().to_string());
    }

    params
}
