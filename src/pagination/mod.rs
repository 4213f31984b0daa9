pub mod window;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use window::{page_window, PageButton};

pub const ALLOWED_PAGE_SIZES: [u32; 4] = [5, 10, 25, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PageSize(u32);

impl PageSize {
    pub fn new(value: u32) -> Option<Self> {
        ALLOWED_PAGE_SIZES.contains(&value).then_some(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: PageSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
}

impl PageResult {
    pub fn new(total: u64, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page_count = page_count(total, page_size);
        let page = page.clamp(1, page_count.max(1));
        Self {
            total,
            page,
            page_size,
            page_count,
        }
    }
}

pub fn page_count(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    #[default]
    Local,
    Delegated,
}

impl FromStr for PagingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "client" => Ok(Self::Local),
            "delegated" | "server" | "remote" => Ok(Self::Delegated),
            other => Err(format!(
                "unknown paging mode '{other}', expected local or delegated"
            )),
        }
    }
}

// In delegated mode a response without page metadata switches to local
// slicing until the next response that carries metadata.
#[derive(Clone, Debug)]
pub struct PaginationController {
    mode: PagingMode,
    current_page: u32,
    page_size: PageSize,
    total_items: u64,
    unpaged_fallback: bool,
}

impl PaginationController {
    pub fn new(mode: PagingMode, page_size: PageSize) -> Self {
        Self {
            mode,
            current_page: 1,
            page_size,
            total_items: 0,
            unpaged_fallback: false,
        }
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        page_count(self.total_items, self.page_size.get())
    }

    pub fn slices_locally(&self) -> bool {
        self.mode == PagingMode::Local || self.unpaged_fallback
    }

    pub fn go_to_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.total_pages() {
            return false;
        }
        self.current_page = n;
        true
    }

    pub fn go_to_next(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn go_to_previous(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.current_page = 1;
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn page_request(&self) -> Option<PageRequest> {
        match self.mode {
            PagingMode::Local => None,
            PagingMode::Delegated => Some(PageRequest {
                page: self.current_page,
                page_size: self.page_size,
            }),
        }
    }

    pub fn absorb_full_set(&mut self, len: usize) {
        self.total_items = len as u64;
        self.unpaged_fallback = self.mode == PagingMode::Delegated;
        if self.current_page > self.total_pages().max(1) {
            self.current_page = 1;
        }
    }

    /// Takes only the total from page metadata whose page number no longer
    /// applies. A page that no longer exists snaps back to page 1.
    pub fn absorb_total(&mut self, total: u64) {
        self.total_items = total;
        self.unpaged_fallback = false;
        if self.current_page > self.total_pages().max(1) {
            self.current_page = 1;
        }
    }

    pub fn apply_page_result(&mut self, result: PageResult) {
        if result.page_size != self.page_size.get() {
            log::debug!(
                "service paged by {} while {} was requested",
                result.page_size,
                self.page_size
            );
        }
        self.total_items = result.total;
        self.unpaged_fallback = false;
        self.current_page = result.page.clamp(1, self.total_pages().max(1));
    }

    pub fn page_result(&self) -> PageResult {
        PageResult::new(self.total_items, self.current_page, self.page_size.get())
    }

    /// Items of the current page. When the service already paged, the
    /// response is taken as-is, capped at the page size.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let size = self.page_size.get() as usize;
        if !self.slices_locally() {
            return &items[..items.len().min(size)];
        }
        let start = (self.current_page as usize - 1).saturating_mul(size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(size).min(items.len());
        &items[start..end]
    }

    // (0, 0) when there is nothing to show
    pub fn range_label(&self) -> (u64, u64) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let size = u64::from(self.page_size.get());
        let first = u64::from(self.current_page - 1) * size + 1;
        let last = (u64::from(self.current_page) * size).min(self.total_items);
        (first.min(last), last)
    }

    pub fn page_buttons(&self) -> Vec<PageButton> {
        page_window(self.current_page, self.total_pages())
    }
}
