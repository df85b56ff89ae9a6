//! Render helpers shared by the views.

use std::fmt;

use booktrack_kernel::models::Book;

/// Marker appended to shortened descriptions.
pub const ELLIPSIS: char = '…';

/// Cover image of a book, falling back to the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub src: String,
    pub alt: String,
}

impl Cover {
    pub fn for_book(book: &Book, placeholder: &str) -> Self {
        let src = book
            .thumbnail
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(placeholder);
        Self {
            src: src.to_string(),
            alt: book.title.clone(),
        }
    }
}

pub fn join_authors(authors: &[String]) -> String {
    authors.join(", ")
}

/// First `limit` characters of a description followed by [`ELLIPSIS`].
/// Missing or empty descriptions render as nothing.
pub fn short_description(description: Option<&str>, limit: usize) -> String {
    match description {
        Some(text) if !text.is_empty() => {
            let mut short: String = text.chars().take(limit).collect();
            short.push(ELLIPSIS);
            short
        }
        _ => String::new(),
    }
}

/// Timestamp cut to minute precision (`YYYY-MM-DDTHH:MM`) for editing.
pub fn datetime_local(value: Option<&str>) -> String {
    value
        .map(|v| v.chars().take(16).collect())
        .unwrap_or_default()
}

/// A 1 to 5 star control. Zero means unrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarRating {
    value: u8,
}

impl StarRating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Self {
        Self {
            value: value.min(Self::MAX),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Whether star `index` (1-based) is lit.
    pub fn is_on(&self, index: u8) -> bool {
        index >= 1 && self.value >= index
    }

    pub fn stars(&self) -> [bool; 5] {
        std::array::from_fn(|i| self.is_on(i as u8 + 1))
    }

    /// Clicking star `index` sets the rating to exactly that value.
    /// Returns `None` for an index outside 1..=5.
    pub fn click(index: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&index).then(|| Self::new(index))
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for on in self.stars() {
            f.write_str(if on { "★" } else { "☆" })?;
        }
        Ok(())
    }
}
