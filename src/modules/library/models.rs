use std::fmt;

use booktrack_http::routes::Routes;
use booktrack_kernel::models::{LibraryItem, Status};
use booktrack_kernel::settings::UiSettings;

use crate::utils::{self, Cover, StarRating};

/// Status filter tabs. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    ToRead,
    Reading,
    Finished,
    All,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::ToRead, Tab::Reading, Tab::Finished, Tab::All];

    /// Status the list is filtered by; `None` lists everything.
    pub fn status(&self) -> Option<Status> {
        match self {
            Tab::ToRead => Some(Status::ToRead),
            Tab::Reading => Some(Status::Reading),
            Tab::Finished => Some(Status::Finished),
            Tab::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.status() {
            Some(status) => status.label(),
            None => "all",
        }
    }
}

impl From<Status> for Tab {
    fn from(status: Status) -> Self {
        match status {
            Status::ToRead => Tab::ToRead,
            Status::Reading => Tab::Reading,
            Status::Finished => Tab::Finished,
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Tab::All);
        }
        value
            .parse::<Status>()
            .map(Tab::from)
            .map_err(|_| "unknown tab; expected to_read, reading, finished or all")
    }
}

/// One library entry as displayed, with its inline controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRow {
    /// In-memory copy of the backend record.
    pub item: LibraryItem,
    pub cover: Cover,
    pub title: String,
    /// Link to the book's detail page.
    pub href: String,
    pub authors: String,
    /// Value shown by the status selector.
    pub status_select: Status,
    /// Stars shown by the rating control.
    pub stars: StarRating,
}

impl LibraryRow {
    pub fn new(item: LibraryItem, ui: &UiSettings) -> Self {
        Self {
            cover: Cover::for_book(&item.book, &ui.placeholder_thumbnail),
            title: item.book.title.clone(),
            href: Routes::book_page(&item.book.google_id),
            authors: utils::join_authors(&item.book.authors),
            status_select: item.entry.status,
            stars: StarRating::new(item.entry.rating()),
            item,
        }
    }

    pub fn google_id(&self) -> &str {
        &self.item.book.google_id
    }
}

/// Everything the library page displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPage {
    pub tab: Tab,
    pub rows: Vec<LibraryRow>,
    /// Bumped on every render; rollbacks only apply to the list they came from.
    pub(crate) generation: u64,
}

impl LibraryPage {
    /// Switch tabs. Pending rollbacks for the old list become inert.
    pub(crate) fn select(&mut self, tab: Tab) {
        self.tab = tab;
        self.generation += 1;
    }

    pub(crate) fn render(&mut self, rows: Vec<LibraryRow>) {
        self.rows = rows;
        self.generation += 1;
    }

    pub fn row(&self, google_id: &str) -> Option<&LibraryRow> {
        self.rows.iter().find(|row| row.google_id() == google_id)
    }

    pub(crate) fn row_mut(
        &mut self,
        generation: u64,
        google_id: &str,
    ) -> Option<&mut LibraryRow> {
        if generation != self.generation {
            return None;
        }
        self.rows.iter_mut().find(|row| row.google_id() == google_id)
    }
}

impl fmt::Display for LibraryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.tab {
                    format!("[{}]", tab.label())
                } else {
                    tab.label().to_string()
                }
            })
            .collect();
        writeln!(f, "{}", tabs.join("  "))?;

        if self.rows.is_empty() {
            return writeln!(f, "(empty)");
        }
        for row in &self.rows {
            writeln!(
                f,
                "{:<10} {}  {}  [{}]",
                row.status_select.label(),
                row.stars,
                row.title,
                row.google_id()
            )?;
            if !row.authors.is_empty() {
                writeln!(f, "{:<10} {}", "", row.authors)?;
            }
        }
        Ok(())
    }
}
