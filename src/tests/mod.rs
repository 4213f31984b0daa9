use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::criteria::{DateRange, FilterCriteria, SortDirection, SortSpec};
use crate::fetcher::{FetchError, RecordService};
use crate::notify::NotificationSink;
use crate::pagination::{
    page_window, PageButton, PageRequest, PageSize, PaginationController, PagingMode,
};
use crate::query::{build_query, QueryParams};
use crate::reconcile::{normalize, Envelope};
use crate::resource::ResourceKind;
use crate::view::{Applied, ListView, ViewOptions};

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn records(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| json!({ "_id": i, "title": format!("record {i}") }))
        .collect()
}

/// Serves a fixed record set. Honors `page`/`limit` when present and answers
/// with a `documents` envelope; otherwise returns everything as a bare array.
struct PagedService {
    records: Vec<Value>,
    with_pagination: bool,
    seen: Mutex<Vec<QueryParams>>,
}

impl PagedService {
    fn new(n: usize) -> Self {
        Self {
            records: records(n),
            with_pagination: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn without_pagination(n: usize) -> Self {
        Self {
            with_pagination: false,
            ..Self::new(n)
        }
    }

    fn requests(&self) -> Vec<QueryParams> {
        self.seen.lock().unwrap().clone()
    }
}

impl RecordService for PagedService {
    async fn list_records(
        &self,
        _kind: ResourceKind,
        query: &QueryParams,
    ) -> Result<Value, FetchError> {
        self.seen.lock().unwrap().push(query.clone());
        let page: Option<usize> = query.get("page").and_then(|p| p.parse().ok());
        let limit: Option<usize> = query.get("limit").and_then(|l| l.parse().ok());
        match (page, limit) {
            (Some(page), Some(limit)) => {
                let items: Vec<Value> = self
                    .records
                    .iter()
                    .skip((page - 1) * limit)
                    .take(limit)
                    .cloned()
                    .collect();
                if !self.with_pagination {
                    return Ok(json!({ "docs": items }));
                }
                let total = self.records.len();
                Ok(json!({
                    "documents": items,
                    "pagination": {
                        "total": total,
                        "page": page,
                        "limit": limit,
                        "pages": total.div_ceil(limit),
                    }
                }))
            }
            _ => Ok(Value::Array(self.records.clone())),
        }
    }
}

type Reply = Result<Value, String>;

/// Each request blocks until the test releases the reply registered for its
/// `search` value, so completion order is under the test's control.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl ScriptedService {
    fn expect(&self, search: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().insert(search.to_string(), rx);
        tx
    }
}

impl RecordService for ScriptedService {
    async fn list_records(
        &self,
        _kind: ResourceKind,
        query: &QueryParams,
    ) -> Result<Value, FetchError> {
        let search = query.get("search").unwrap_or_default().to_string();
        let rx = self.replies.lock().unwrap().remove(&search);
        let rx = rx.ok_or_else(|| FetchError::Service {
            message: format!("no reply scripted for '{search}'"),
        })?;
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(FetchError::Service { message }),
            Err(_) => Err(FetchError::Service {
                message: "reply dropped".to_string(),
            }),
        }
    }
}

fn view_of<S: RecordService>(
    kind: ResourceKind,
    service: Arc<S>,
    sink: Arc<RecordingSink>,
    paging: PagingMode,
) -> ListView<S, Value> {
    ListView::new(
        kind,
        service,
        sink,
        ViewOptions {
            paging,
            page_size: PageSize::default(),
        },
    )
}

fn titles(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|v| v["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn build_query_emits_fixed_order() {
    let mut field_filters = BTreeMap::new();
    field_filters.insert("project".to_string(), "p9".to_string());
    field_filters.insert("author".to_string(), String::new());
    field_filters.insert("category".to_string(), "c3".to_string());
    let criteria = FilterCriteria {
        search: "  annual report ".to_string(),
        field_filters,
        date_range: DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 5),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1),
        ),
        sort: SortSpec {
            key: "title".to_string(),
            direction: SortDirection::Ascending,
        },
    };
    let query = build_query(
        &criteria,
        Some(PageRequest {
            page: 3,
            page_size: PageSize::new(25).unwrap(),
        }),
    );
    let pairs: Vec<(&str, &str)> = query.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("search", "annual report"),
            ("category", "c3"),
            ("project", "p9"),
            ("startDate", "2024-01-05"),
            ("endDate", "2024-02-01"),
            ("sortBy", "title"),
            ("sortOrder", "asc"),
            ("page", "3"),
            ("limit", "25"),
        ]
    );
}

#[test]
fn build_query_local_paging_omits_page_and_limit() {
    let query = build_query(&FilterCriteria::for_keys(&["status", "team"]), None);
    assert_eq!(query.keys(), vec!["sortBy", "sortOrder"]);
    assert_eq!(query.get("page"), None);
}

#[test]
fn build_query_without_sort_key_emits_no_sort() {
    let criteria = FilterCriteria {
        sort: SortSpec {
            key: String::new(),
            direction: SortDirection::Ascending,
        },
        ..FilterCriteria::default()
    };
    assert!(build_query(&criteria, None).is_empty());
}

#[test]
fn build_query_never_lets_a_filter_shadow_a_reserved_param() {
    let mut criteria = FilterCriteria::for_keys(&["category"]);
    criteria.field_filters.insert("page".to_string(), "5".to_string());
    criteria.field_filters.insert("search".to_string(), "x".to_string());
    criteria.field_filters.insert("category".to_string(), "c1".to_string());
    let query = build_query(
        &criteria,
        Some(PageRequest {
            page: 1,
            page_size: PageSize::default(),
        }),
    );
    assert_eq!(
        query.keys(),
        vec!["category", "sortBy", "sortOrder", "page", "limit"]
    );
    assert_eq!(query.get("page"), Some("1"));
}

fn filter_value() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z0-9]{1,4}"]
}

proptest! {
    #[test]
    fn build_query_is_deterministic_and_skips_empty_values(
        search in "[a-z ]{0,6}",
        category in filter_value(),
        status in filter_value(),
        team in filter_value(),
        page in proptest::option::of(1u32..40),
        size_idx in 0usize..4,
    ) {
        let mut field_filters = BTreeMap::new();
        field_filters.insert("category".to_string(), category.clone());
        field_filters.insert("status".to_string(), status.clone());
        field_filters.insert("team".to_string(), team.clone());
        let criteria = FilterCriteria {
            search: search.clone(),
            field_filters,
            ..FilterCriteria::default()
        };
        let request = page.map(|page| PageRequest {
            page,
            page_size: PageSize::new(crate::pagination::ALLOWED_PAGE_SIZES[size_idx]).unwrap(),
        });

        let first = build_query(&criteria, request);
        let second = build_query(&criteria.clone(), request);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|(_, v)| !v.is_empty()));

        let mut expected: Vec<&str> = Vec::new();
        if !search.trim().is_empty() {
            expected.push("search");
        }
        for (key, value) in [("category", &category), ("status", &status), ("team", &team)] {
            if !value.is_empty() {
                expected.push(key);
            }
        }
        expected.push("sortBy");
        expected.push("sortOrder");
        if page.is_some() {
            expected.push("page");
            expected.push("limit");
        }
        prop_assert_eq!(first.keys(), expected);
    }

    #[test]
    fn go_to_page_outside_range_is_ignored(total in 0usize..200, start in 1u32..30, n in 0u32..60) {
        let mut pager = PaginationController::new(PagingMode::Local, PageSize::default());
        pager.absorb_full_set(total);
        pager.go_to_page(start);
        let before = pager.current_page();
        let moved = pager.go_to_page(n);
        if n < 1 || n > pager.total_pages() {
            prop_assert!(!moved);
            prop_assert_eq!(pager.current_page(), before);
        } else {
            prop_assert_eq!(pager.current_page(), n);
        }
        prop_assert!(pager.current_page() >= 1);
        prop_assert!(pager.current_page() <= pager.total_pages().max(1));
    }

    #[test]
    fn page_size_change_resets_and_bounds_display(
        total in 0usize..200,
        start in 1u32..20,
        size_idx in 0usize..4,
    ) {
        let items = records(total);
        let mut pager = PaginationController::new(PagingMode::Local, PageSize::default());
        pager.absorb_full_set(items.len());
        pager.go_to_page(start);
        let size = PageSize::new(crate::pagination::ALLOWED_PAGE_SIZES[size_idx]).unwrap();
        pager.set_page_size(size);
        prop_assert_eq!(pager.current_page(), 1);
        prop_assert!(pager.slice(&items).len() <= size.get() as usize);
    }

    #[test]
    fn every_criteria_mutation_returns_to_page_one(
        ops in proptest::collection::vec(0u8..6, 1..12),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let service = Arc::new(PagedService::new(60));
        let mut view = view_of(
            ResourceKind::Documents,
            service,
            Arc::new(RecordingSink::default()),
            PagingMode::Delegated,
        );
        rt.block_on(view.refresh());
        for op in ops {
            view.go_to_page(4);
            match op {
                0 => { view.set_search("abc"); }
                1 => { view.set_field_filter("category", "7"); }
                2 => {
                    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
                    view.set_date_range(DateRange::new(start, None));
                }
                3 => { view.set_sort("title", SortDirection::Ascending); }
                4 => { view.toggle_sort("title"); }
                _ => { view.clear_all(); }
            }
            prop_assert_eq!(view.pager().current_page(), 1);
            prop_assert!(view.is_stale());
            let query = view.query();
            prop_assert_eq!(query.get("page"), Some("1"));
            rt.block_on(view.refresh());
        }
    }
}

#[test]
fn window_for_page_six_of_twelve() {
    use PageButton::{Ellipsis, Page};
    assert_eq!(
        page_window(6, 12),
        vec![
            Page(1),
            Ellipsis,
            Page(4),
            Page(5),
            Page(6),
            Page(7),
            Page(8),
            Ellipsis,
            Page(12)
        ]
    );
    let rendered: Vec<String> = page_window(6, 12).iter().map(|b| b.to_string()).collect();
    assert_eq!(rendered, ["1", "...", "4", "5", "6", "7", "8", "...", "12"]);
}

#[test]
fn local_page_size_scenario() {
    let items = records(23);
    let mut pager = PaginationController::new(PagingMode::Local, PageSize::default());
    pager.absorb_full_set(items.len());
    assert_eq!(pager.total_pages(), 3);
    assert!(pager.go_to_page(3));
    assert_eq!(pager.slice(&items).len(), 3);
    assert_eq!(pager.range_label(), (21, 23));

    pager.set_page_size(PageSize::new(25).unwrap());
    assert_eq!(pager.current_page(), 1);
    assert_eq!(pager.total_pages(), 1);
    assert_eq!(pager.slice(&items).len(), 23);
}

#[test]
fn local_filter_change_clamps_to_page_one() {
    let mut pager = PaginationController::new(PagingMode::Local, PageSize::new(5).unwrap());
    pager.absorb_full_set(40);
    assert!(pager.go_to_page(7));
    pager.absorb_full_set(12);
    assert_eq!(pager.current_page(), 1);
    assert!(pager.go_to_next());
    assert_eq!(pager.current_page(), 2);
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Doc {
    #[serde(rename = "_id")]
    id: u32,
    title: String,
}

#[test]
fn envelope_variants_normalize_to_the_same_items() {
    let items = json!([{ "_id": 1, "title": "a" }, { "_id": 2, "title": "b" }]);
    let keyed = json!({
        "documents": items.clone(),
        "pagination": { "total": 2, "page": 1, "limit": 10, "pages": 1 }
    });
    let docs = json!({ "docs": items.clone() });

    let a = normalize::<Doc>(ResourceKind::Documents, keyed, 10);
    let b = normalize::<Doc>(ResourceKind::Documents, docs, 10);
    let c = normalize::<Doc>(ResourceKind::Documents, items, 10);

    assert_eq!(a.items, b.items);
    assert_eq!(b.items, c.items);
    assert_eq!(
        c.items,
        vec![
            Doc {
                id: 1,
                title: "a".to_string()
            },
            Doc {
                id: 2,
                title: "b".to_string()
            }
        ]
    );
    let page = a.pagination.unwrap();
    assert_eq!((page.total, page.page, page.page_size, page.page_count), (2, 1, 10, 1));
    assert!(b.pagination.is_none());
    assert!(c.pagination.is_none());
}

#[test]
fn unknown_envelope_becomes_empty() {
    let out = normalize::<Doc>(ResourceKind::Books, json!({ "message": "ok" }), 10);
    assert!(out.items.is_empty());
    assert!(out.pagination.is_none());
    let out = normalize::<Doc>(ResourceKind::Books, json!("nope"), 10);
    assert!(out.items.is_empty());
    assert!(matches!(
        Envelope::classify(json!({ "books": 3 }), ResourceKind::Books.collection_fields()),
        Envelope::Unknown { .. }
    ));
}

#[test]
fn undecodable_records_are_dropped() {
    let out = normalize::<Doc>(
        ResourceKind::Categories,
        json!({ "categories": [{ "_id": 1, "title": "x" }, { "title": 5 }] }),
        10,
    );
    assert_eq!(out.items.len(), 1);
}

#[test]
fn pagination_aliases_are_understood() {
    let out = normalize::<Value>(
        ResourceKind::Books,
        json!({
            "books": [],
            "pagination": { "totalItems": 31, "currentPage": 2, "pageSize": 10 }
        }),
        5,
    );
    let page = out.pagination.unwrap();
    assert_eq!((page.total, page.page, page.page_count), (31, 2, 4));
}

#[tokio::test]
async fn later_request_wins_when_it_resolves_first() {
    let service = Arc::new(ScriptedService::default());
    let sink = Arc::new(RecordingSink::default());
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        Arc::clone(&sink),
        PagingMode::Local,
    );

    let tx1 = service.expect("a");
    let tx2 = service.expect("ab");
    view.set_search("a");
    let first = tokio::spawn(view.request().send());
    view.set_search("ab");
    let second = tokio::spawn(view.request().send());
    assert_eq!(view.fetcher().in_flight(), 2);

    tx2.send(Ok(json!([{ "title": "second" }]))).unwrap();
    let outcome2 = second.await.unwrap();
    tx1.send(Ok(json!([{ "title": "first" }]))).unwrap();
    let outcome1 = first.await.unwrap();

    assert_eq!(view.apply(outcome2), Applied::Updated);
    assert_eq!(view.apply(outcome1), Applied::Discarded);
    assert_eq!(titles(view.visible_items()), vec!["second"]);
    assert_eq!(view.fetcher().in_flight(), 0);
    assert!(!view.is_stale());
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn earlier_request_is_discarded_even_when_it_arrives_first() {
    let service = Arc::new(ScriptedService::default());
    let sink = Arc::new(RecordingSink::default());
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        sink,
        PagingMode::Local,
    );

    let tx1 = service.expect("a");
    let tx2 = service.expect("ab");
    view.set_search("a");
    let first = tokio::spawn(view.request().send());
    view.set_search("ab");
    let second = tokio::spawn(view.request().send());

    tx1.send(Ok(json!([{ "title": "first" }]))).unwrap();
    assert_eq!(view.apply(first.await.unwrap()), Applied::Discarded);
    assert!(view.visible_items().is_empty());

    tx2.send(Ok(json!([{ "title": "second" }]))).unwrap();
    assert_eq!(view.apply(second.await.unwrap()), Applied::Updated);
    assert_eq!(titles(view.visible_items()), vec!["second"]);
}

#[tokio::test]
async fn failure_keeps_previous_results_and_notifies() {
    let service = Arc::new(ScriptedService::default());
    let sink = Arc::new(RecordingSink::default());
    let mut view = view_of(
        ResourceKind::Projects,
        Arc::clone(&service),
        Arc::clone(&sink),
        PagingMode::Local,
    );

    let tx = service.expect("");
    let pending = tokio::spawn(view.request().send());
    tx.send(Ok(json!({ "projects": [{ "title": "kept" }] }))).unwrap();
    assert_eq!(view.apply(pending.await.unwrap()), Applied::Updated);

    view.set_search("boom");
    let tx = service.expect("boom");
    let pending = tokio::spawn(view.request().send());
    tx.send(Err("service unavailable".to_string())).unwrap();
    assert_eq!(view.apply(pending.await.unwrap()), Applied::Failed);

    assert_eq!(titles(view.visible_items()), vec!["kept"]);
    assert!(view.is_stale());
    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("service unavailable"));
}

#[tokio::test]
async fn stale_failure_is_silent() {
    let service = Arc::new(ScriptedService::default());
    let sink = Arc::new(RecordingSink::default());
    let mut view = view_of(
        ResourceKind::Books,
        Arc::clone(&service),
        Arc::clone(&sink),
        PagingMode::Local,
    );

    let tx1 = service.expect("x");
    let tx2 = service.expect("xy");
    view.set_search("x");
    let first = tokio::spawn(view.request().send());
    view.set_search("xy");
    let second = tokio::spawn(view.request().send());

    tx2.send(Ok(json!([{ "title": "fresh" }]))).unwrap();
    assert_eq!(view.apply(second.await.unwrap()), Applied::Updated);
    tx1.send(Err("timeout".to_string())).unwrap();
    assert_eq!(view.apply(first.await.unwrap()), Applied::Discarded);

    assert!(sink.messages().is_empty());
    assert_eq!(titles(view.visible_items()), vec!["fresh"]);
}

#[tokio::test]
async fn delegated_view_pages_through_the_service() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Delegated,
    );

    assert_eq!(view.refresh().await, Applied::Updated);
    assert_eq!(view.pager().total_items(), 23);
    assert_eq!(view.pager().total_pages(), 3);
    assert_eq!(view.visible_items().len(), 10);

    assert!(!view.go_to_page(4));
    assert!(!view.is_stale());
    assert!(view.go_to_page(3));
    assert!(view.is_stale());
    assert_eq!(view.sync().await, Some(Applied::Updated));
    assert_eq!(titles(view.visible_items()), vec!["record 21", "record 22", "record 23"]);

    view.set_page_size(PageSize::new(25).unwrap());
    assert_eq!(view.pager().current_page(), 1);
    assert_eq!(view.sync().await, Some(Applied::Updated));
    assert_eq!(view.pager().total_pages(), 1);
    assert_eq!(view.visible_items().len(), 23);
    assert_eq!(view.sync().await, None);

    let pages: Vec<Option<String>> = service
        .requests()
        .iter()
        .map(|q| q.get("page").map(|p| p.to_string()))
        .collect();
    assert_eq!(
        pages,
        vec![
            Some("1".to_string()),
            Some("3".to_string()),
            Some("1".to_string())
        ]
    );
}

#[tokio::test]
async fn local_view_slices_without_refetching() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Projects,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Local,
    );

    view.refresh().await;
    assert_eq!(view.pager().total_pages(), 3);
    assert!(view.go_to_next());
    assert!(view.go_to_next());
    assert!(!view.go_to_next());
    assert!(!view.is_stale());
    assert_eq!(view.visible_items().len(), 3);
    assert!(view.go_to_previous());
    assert_eq!(titles(view.visible_items())[0], "record 11");

    view.set_page_size(PageSize::new(25).unwrap());
    assert!(!view.is_stale());
    assert_eq!(view.pager().total_pages(), 1);
    assert_eq!(view.visible_items().len(), 23);

    assert_eq!(service.requests().len(), 1);
    assert!(service.requests()[0].get("limit").is_none());
}

#[tokio::test]
async fn delegated_view_without_pagination_falls_back_to_slicing() {
    let service = Arc::new(PagedService::without_pagination(23));
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Delegated,
    );

    view.refresh().await;
    assert!(view.pager().slices_locally());
    assert_eq!(view.pager().total_items(), 10);
    assert_eq!(view.pager().total_pages(), 1);
    assert_eq!(view.visible_items().len(), 10);
    assert!(!view.go_to_page(2));
}

#[tokio::test]
async fn only_the_newest_of_many_overlapping_requests_is_shown() {
    use futures::stream::{FuturesUnordered, StreamExt};

    let service = Arc::new(ScriptedService::default());
    let sink = Arc::new(RecordingSink::default());
    let mut view = view_of(
        ResourceKind::Categories,
        Arc::clone(&service),
        Arc::clone(&sink),
        PagingMode::Local,
    );

    let in_flight = FuturesUnordered::new();
    let mut senders = Vec::new();
    for search in ["r", "re", "rep"] {
        senders.push((search, service.expect(search)));
        view.set_search(search);
        in_flight.push(view.request().send());
    }
    for (search, tx) in senders.into_iter().rev() {
        let reply = if search == "re" {
            Err("late failure".to_string())
        } else {
            Ok(json!({ "categories": [{ "title": search }] }))
        };
        tx.send(reply).unwrap();
    }

    let outcomes: Vec<_> = in_flight.collect().await;
    let applied: Vec<Applied> = outcomes.into_iter().map(|o| view.apply(o)).collect();

    assert_eq!(applied.iter().filter(|a| **a == Applied::Updated).count(), 1);
    assert_eq!(applied.iter().filter(|a| **a == Applied::Discarded).count(), 2);
    assert_eq!(titles(view.visible_items()), vec!["rep"]);
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn fetcher_hands_out_increasing_tickets() {
    use crate::fetcher::{ListFetcher, Settled};

    let mut fetcher = ListFetcher::new(ResourceKind::Books, Arc::new(PagedService::new(3)));
    assert_eq!(fetcher.latest(), None);

    let first = fetcher.begin(QueryParams::default());
    let second = fetcher.begin(QueryParams::default());
    assert!(first.ticket() < second.ticket());
    assert_eq!(fetcher.latest(), Some(second.ticket()));

    let late = first.send().await;
    assert!(matches!(fetcher.settle(late), Settled::Stale(t) if t.seq() == 1));
    let settled = fetcher.settle(second.send().await);
    assert!(matches!(settled, Settled::Fresh(Value::Array(ref v)) if v.len() == 3));

    assert!(matches!(fetcher.fetch(QueryParams::default()).await, Settled::Fresh(_)));
    assert_eq!(fetcher.latest().map(|t| t.seq()), Some(3));
    assert_eq!(fetcher.in_flight(), 0);
}

#[tokio::test]
async fn criteria_change_during_delegated_fetch_keeps_page_one() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Delegated,
    );
    view.refresh().await;
    assert!(view.go_to_page(3));
    assert_eq!(view.sync().await, Some(Applied::Updated));

    let pending = view.request();
    view.set_search("report");
    assert_eq!(view.apply(pending.send().await), Applied::Updated);

    assert_eq!(view.pager().current_page(), 1);
    assert_eq!(view.pager().total_pages(), 3);
    assert!(view.is_stale());
    let query = view.query();
    assert_eq!(query.get("page"), Some("1"));
    assert_eq!(query.get("search"), Some("report"));

    assert_eq!(view.sync().await, Some(Applied::Updated));
    assert!(!view.is_stale());
    let last = service.requests().pop().unwrap();
    assert_eq!(last.get("page"), Some("1"));
    assert_eq!(last.get("search"), Some("report"));
}

#[tokio::test]
async fn page_move_during_delegated_fetch_is_kept() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Documents,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Delegated,
    );
    view.refresh().await;

    let pending = view.request();
    assert!(view.go_to_page(2));
    assert_eq!(view.apply(pending.send().await), Applied::Updated);

    assert_eq!(view.pager().current_page(), 2);
    assert!(view.is_stale());
    assert_eq!(view.sync().await, Some(Applied::Updated));
    assert_eq!(service.requests().pop().unwrap().get("page"), Some("2"));
    assert_eq!(titles(view.visible_items())[0], "record 11");
    assert_eq!(view.sync().await, None);
}

#[tokio::test]
async fn criteria_change_during_local_fetch_keeps_page_one() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Projects,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Local,
    );
    view.refresh().await;
    assert!(view.go_to_page(3));

    let pending = view.request();
    view.set_search("x");
    assert_eq!(view.apply(pending.send().await), Applied::Updated);

    assert_eq!(view.pager().current_page(), 1);
    assert!(view.is_stale());
    assert_eq!(titles(view.visible_items())[0], "record 1");

    assert_eq!(view.sync().await, Some(Applied::Updated));
    assert!(!view.is_stale());
    let requests = service.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].get("search"), Some("x"));
    assert_eq!(requests[2].get("page"), None);
}

#[tokio::test]
async fn page_move_during_local_fetch_needs_no_refetch() {
    let service = Arc::new(PagedService::new(23));
    let mut view = view_of(
        ResourceKind::Projects,
        Arc::clone(&service),
        Arc::new(RecordingSink::default()),
        PagingMode::Local,
    );
    view.refresh().await;

    let pending = view.request();
    assert!(view.go_to_page(2));
    assert_eq!(view.apply(pending.send().await), Applied::Updated);

    assert_eq!(view.pager().current_page(), 2);
    assert!(!view.is_stale());
    assert_eq!(titles(view.visible_items())[0], "record 11");
    assert_eq!(view.sync().await, None);
    assert_eq!(service.requests().len(), 2);
}
