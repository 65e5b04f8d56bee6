//! Local search, status filter and pagination over a fetched collection

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::models::{Book, Borrow, BorrowStatus, Category, Favorite, Member, StatusFilter};

/// A record a list screen can search and filter.
pub trait Listable {
    /// Text fields matched by the search box
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Status shown on screen, for records that have one
    fn display_status(&self, _now: DateTime<Utc>) -> Option<BorrowStatus> {
        None
    }
}

impl Listable for Book {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.title), Cow::Borrowed(&self.author)]
    }
}

impl Listable for Category {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name)]
    }
}

impl Listable for Member {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.username),
            Cow::Borrowed(&self.email),
            Cow::Owned(self.id.to_string()),
        ]
    }
}

impl Listable for Borrow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields: Vec<Cow<'_, str>> = vec![Cow::Owned(self.id.to_string())];
        if let Some(book) = &self.book {
            fields.push(Cow::Borrowed(&book.title));
        }
        if let Some(user) = &self.user {
            fields.push(Cow::Borrowed(&user.username));
        }
        fields
    }

    fn display_status(&self, now: DateTime<Utc>) -> Option<BorrowStatus> {
        Some(Borrow::display_status(self, now))
    }
}

impl Listable for Favorite {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        match &self.book {
            Some(book) => book.search_fields(),
            None => vec![Cow::Owned(self.book_id.to_string())],
        }
    }
}

/// Search text, status filter and page of a list screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub status: StatusFilter,
    /// 1-based; clamped when applied
    pub page: usize,
    pub page_size: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
            page_size,
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

/// "Showing start-end of total", 1-based and inclusive. All zero when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayedRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl std::fmt::Display for DisplayedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} of {}", self.start, self.end, self.total)
    }
}

/// The slice of a collection a screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct Visible<T> {
    pub items: Vec<T>,
    pub range: DisplayedRange,
    /// Page actually shown after clamping
    pub page: usize,
    pub total_pages: usize,
}

fn matches_search<T: Listable>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

fn matches_status<T: Listable>(item: &T, filter: StatusFilter, now: DateTime<Utc>) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Only(_) => item
            .display_status(now)
            .is_some_and(|status| filter.accepts(status)),
    }
}

/// Filter `items` by search text and status, then cut out the requested page.
///
/// Pure: the same inputs always give the same output. Order is the order of
/// `items`.
pub fn filter_paginate<T: Listable + Clone>(items: &[T], query: &ListQuery, now: DateTime<Utc>) -> Visible<T> {
    let needle = query.search.trim().to_lowercase();
    let matched: Vec<&T> = items
        .iter()
        .filter(|item| matches_search(*item, &needle))
        .filter(|item| matches_status(*item, query.status, now))
        .collect();

    let page_size = query.page_size.max(1);
    let total = matched.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(total);
    let end = (page * page_size).min(total);
    let items: Vec<T> = matched[start..end].iter().map(|item| (*item).clone()).collect();

    let range = if items.is_empty() {
        DisplayedRange { start: 0, end: 0, total }
    } else {
        DisplayedRange {
            start: start + 1,
            end,
            total,
        }
    };

    Visible {
        items,
        range,
        page,
        total_pages,
    }
}
