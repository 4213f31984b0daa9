use std::fmt;

use serde::{Serialize, Serializer};

pub const WINDOW_SIZE: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageButton {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

impl Serialize for PageButton {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(n) => serializer.serialize_u32(*n),
            Self::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Page buttons for a pager bar.
///
/// Up to `WINDOW_SIZE` pages are shown all at once. Beyond that the window
/// is the current page and two neighbours on each side (shifted inwards at
/// the edges), with page 1 and the last page always present and an ellipsis
/// wherever pages are skipped.
pub fn page_window(current: u32, total: u32) -> Vec<PageButton> {
    if total == 0 {
        return Vec::new();
    }
    if total <= WINDOW_SIZE {
        return (1..=total).map(PageButton::Page).collect();
    }

    let current = current.clamp(1, total);
    let half = WINDOW_SIZE / 2;
    let end = current
        .saturating_sub(half)
        .max(1)
        .saturating_add(WINDOW_SIZE - 1)
        .min(total);
    let start = end.saturating_sub(WINDOW_SIZE - 1).max(1);

    let mut out = Vec::with_capacity(WINDOW_SIZE as usize + 4);
    if start > 1 {
        out.push(PageButton::Page(1));
        if start > 2 {
            out.push(PageButton::Ellipsis);
        }
    }
    out.extend((start..=end).map(PageButton::Page));
    if end < total {
        if end < total - 1 {
            out.push(PageButton::Ellipsis);
        }
        out.push(PageButton::Page(total));
    }
    out
}
