use std::collections::BTreeMap;

use chrono::NaiveDate;

pub const DEFAULT_SORT_KEY: &str = "createdAt";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: DEFAULT_SORT_KEY.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Inclusive calendar-date bounds. Either side may be unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn is_ordered(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

// an empty filter value means the filter is unset
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub search: String,
    pub field_filters: BTreeMap<String, String>,
    pub date_range: DateRange,
    pub sort: SortSpec,
}

impl FilterCriteria {
    pub fn for_keys(keys: &[&str]) -> Self {
        Self {
            field_filters: keys
                .iter()
                .map(|k| (k.to_string(), String::new()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn field_filter(&self, key: &str) -> Option<&str> {
        self.field_filters
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn active_filter_count(&self) -> usize {
        let mut count = self
            .field_filters
            .values()
            .filter(|v| !v.is_empty())
            .count();
        if !self.search.trim().is_empty() {
            count += 1;
        }
        if self.date_range.start.is_some() {
            count += 1;
        }
        if self.date_range.end.is_some() {
            count += 1;
        }
        count
    }

    pub fn is_default(&self) -> bool {
        self.active_filter_count() == 0 && self.sort == SortSpec::default()
    }
}

/// Every mutator swaps in a whole new [`FilterCriteria`] and returns a copy of
/// it. Resetting the page afterwards is up to the owning view.
#[derive(Clone, Debug, Default)]
pub struct CriteriaStore {
    current: FilterCriteria,
    filter_keys: Vec<String>,
    revision: u64,
}

impl CriteriaStore {
    pub fn new(filter_keys: &[&str]) -> Self {
        Self {
            current: FilterCriteria::for_keys(filter_keys),
            filter_keys: filter_keys.iter().map(|k| k.to_string()).collect(),
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> &FilterCriteria {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_search(&mut self, text: &str) -> FilterCriteria {
        self.replace(FilterCriteria {
            search: text.to_string(),
            ..self.current.clone()
        })
    }

    pub fn set_field_filter(&mut self, key: &str, value: &str) -> FilterCriteria {
        let mut field_filters = self.current.field_filters.clone();
        field_filters.insert(key.to_string(), value.to_string());
        self.replace(FilterCriteria {
            field_filters,
            ..self.current.clone()
        })
    }

    pub fn set_date_range(&mut self, range: DateRange) -> FilterCriteria {
        self.replace(FilterCriteria {
            date_range: range,
            ..self.current.clone()
        })
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) -> FilterCriteria {
        self.replace(FilterCriteria {
            sort: SortSpec {
                key: key.to_string(),
                direction,
            },
            ..self.current.clone()
        })
    }

    /// Column-header behaviour: re-selecting the active key flips the
    /// direction, a new key starts out descending.
    pub fn toggle_sort(&mut self, key: &str) -> FilterCriteria {
        let direction = if self.current.sort.key == key {
            self.current.sort.direction.flipped()
        } else {
            SortDirection::Descending
        };
        self.set_sort(key, direction)
    }

    pub fn clear_all(&mut self) -> FilterCriteria {
        let keys: Vec<&str> = self.filter_keys.iter().map(|k| k.as_str()).collect();
        let mut cleared = FilterCriteria::for_keys(&keys);
        // keys set ad hoc are kept, but emptied
        for key in self.current.field_filters.keys() {
            cleared.field_filters.entry(key.clone()).or_default();
        }
        self.replace(cleared)
    }

    fn replace(&mut self, next: FilterCriteria) -> FilterCriteria {
        self.current = next;
        self.revision += 1;
        self.current.clone()
    }
}
