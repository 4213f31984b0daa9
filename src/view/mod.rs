use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::criteria::{CriteriaStore, DateRange, FilterCriteria, SortDirection};
use crate::fetcher::{FetchOutcome, ListFetcher, PendingFetch, RecordService, Settled};
use crate::notify::NotificationSink;
use crate::pagination::{PageButton, PageResult, PageSize, PaginationController, PagingMode};
use crate::query::{build_query, QueryParams};
use crate::reconcile::{normalize, ListResponse};
use crate::resource::ResourceKind;

#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    pub paging: PagingMode,
    pub page_size: PageSize,
}

impl ViewOptions {
    pub fn for_resource(kind: ResourceKind) -> Self {
        Self {
            paging: kind.default_paging(),
            page_size: PageSize::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Failed,
    Discarded,
}

/// One list page: criteria, paging, the fetcher and the last good result.
///
/// Criteria and page operations are synchronous and only mark the view as
/// stale; the owner then calls [`ListView::refresh`], or splits it into
/// [`ListView::request`] and [`ListView::apply`] to keep several requests in
/// flight. A failed fetch keeps the previous result on display.
pub struct ListView<S, T> {
    kind: ResourceKind,
    criteria: CriteriaStore,
    pager: PaginationController,
    fetcher: ListFetcher<S>,
    sink: Arc<dyn NotificationSink>,
    current: ListResponse<T>,
    issued_query: Option<QueryParams>,
    stale: bool,
}

impl<S, T> ListView<S, T>
where
    S: RecordService,
    T: DeserializeOwned,
{
    pub fn new(
        kind: ResourceKind,
        service: Arc<S>,
        sink: Arc<dyn NotificationSink>,
        options: ViewOptions,
    ) -> Self {
        Self {
            kind,
            criteria: CriteriaStore::new(kind.filter_keys()),
            pager: PaginationController::new(options.paging, options.page_size),
            fetcher: ListFetcher::new(kind, service),
            sink,
            current: ListResponse::default(),
            issued_query: None,
            stale: true,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.criteria.snapshot()
    }

    pub fn pager(&self) -> &PaginationController {
        &self.pager
    }

    pub fn fetcher(&self) -> &ListFetcher<S> {
        &self.fetcher
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn set_search(&mut self, text: &str) -> FilterCriteria {
        let snapshot = self.criteria.set_search(text);
        self.criteria_changed();
        snapshot
    }

    pub fn set_field_filter(&mut self, key: &str, value: &str) -> FilterCriteria {
        let snapshot = self.criteria.set_field_filter(key, value);
        self.criteria_changed();
        snapshot
    }

    pub fn set_date_range(&mut self, range: DateRange) -> FilterCriteria {
        let snapshot = self.criteria.set_date_range(range);
        self.criteria_changed();
        snapshot
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) -> FilterCriteria {
        let snapshot = self.criteria.set_sort(key, direction);
        self.criteria_changed();
        snapshot
    }

    pub fn toggle_sort(&mut self, key: &str) -> FilterCriteria {
        let snapshot = self.criteria.toggle_sort(key);
        self.criteria_changed();
        snapshot
    }

    pub fn clear_all(&mut self) -> FilterCriteria {
        let snapshot = self.criteria.clear_all();
        self.criteria_changed();
        snapshot
    }

    pub fn go_to_page(&mut self, n: u32) -> bool {
        let moved = self.pager.go_to_page(n);
        self.page_changed(moved)
    }

    pub fn go_to_next(&mut self) -> bool {
        let moved = self.pager.go_to_next();
        self.page_changed(moved)
    }

    pub fn go_to_previous(&mut self) -> bool {
        let moved = self.pager.go_to_previous();
        self.page_changed(moved)
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.pager.set_page_size(size);
        // a local result set is re-sliced in place
        if self.pager.mode() == PagingMode::Delegated {
            self.stale = true;
        }
    }

    pub fn query(&self) -> QueryParams {
        build_query(self.criteria.snapshot(), self.pager.page_request())
    }

    pub fn request(&mut self) -> PendingFetch<S> {
        let query = self.query();
        self.issued_query = Some(query.clone());
        self.fetcher.begin(query)
    }

    pub fn apply(&mut self, outcome: FetchOutcome) -> Applied {
        match self.fetcher.settle(outcome) {
            Settled::Fresh(value) => {
                // the user may have moved on since the request went out
                let superseded = self.issued_query.as_ref() != Some(&self.query());
                let response: ListResponse<T> =
                    normalize(self.kind, value, self.pager.page_size().get());
                match (self.pager.mode(), response.pagination) {
                    // keep the page the user moved to (or reset to) meanwhile
                    (PagingMode::Delegated, Some(page)) if superseded => {
                        self.pager.absorb_total(page.total)
                    }
                    (PagingMode::Delegated, Some(page)) => self.pager.apply_page_result(page),
                    _ => self.pager.absorb_full_set(response.items.len()),
                }
                self.current = response;
                self.stale = superseded;
                Applied::Updated
            }
            Settled::Failed(e) => {
                log::warn!("{} fetch failed: {e}", self.kind);
                self.sink.error(&format!("Failed to load {}: {e}", self.kind));
                Applied::Failed
            }
            Settled::Stale(_) => Applied::Discarded,
        }
    }

    pub async fn refresh(&mut self) -> Applied {
        let outcome = self.request().send().await;
        self.apply(outcome)
    }

    /// Refreshes only when something changed since the last applied result.
    pub async fn sync(&mut self) -> Option<Applied> {
        if !self.stale {
            return None;
        }
        Some(self.refresh().await)
    }

    pub fn visible_items(&self) -> &[T] {
        self.pager.slice(&self.current.items)
    }

    pub fn response(&self) -> &ListResponse<T> {
        &self.current
    }

    pub fn page_result(&self) -> PageResult {
        self.pager.page_result()
    }

    pub fn page_buttons(&self) -> Vec<PageButton> {
        self.pager.page_buttons()
    }

    fn criteria_changed(&mut self) {
        self.pager.reset();
        self.stale = true;
    }

    fn page_changed(&mut self, moved: bool) -> bool {
        if moved && !self.pager.slices_locally() {
            self.stale = true;
        }
        moved
    }
}
