use std::fmt;

use booktrack_kernel::models::{Book, Status};
use booktrack_kernel::settings::UiSettings;

use crate::utils::{self, Cover};

pub const ADD_LABEL: &str = "Add to library";
pub const ADDED_LABEL: &str = "Added";
pub const ERROR_LABEL: &str = "Error";

/// The "add to library" button of a result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddButton {
    pub label: String,
    pub disabled: bool,
}

impl Default for AddButton {
    fn default() -> Self {
        Self {
            label: ADD_LABEL.to_string(),
            disabled: false,
        }
    }
}

/// How an add attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Failed,
}

impl AddOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AddOutcome::Added => ADDED_LABEL,
            AddOutcome::Failed => ERROR_LABEL,
        }
    }
}

/// One search hit as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    /// Payload posted when the book is added.
    pub book: Book,
    pub cover: Cover,
    pub title: String,
    pub authors: String,
    pub description: String,
    /// Initial status selected for the add.
    pub status: Status,
    pub add_button: AddButton,
}

impl ResultCard {
    pub fn new(book: Book, ui: &UiSettings) -> Self {
        Self {
            cover: Cover::for_book(&book, &ui.placeholder_thumbnail),
            title: book.title.clone(),
            authors: utils::join_authors(&book.authors),
            description: utils::short_description(
                book.description.as_deref(),
                ui.description_limit,
            ),
            status: Status::default(),
            add_button: AddButton::default(),
            book,
        }
    }
}

/// Everything the search page displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Current contents of the query input.
    pub query: String,
    pub cards: Vec<ResultCard>,
    /// Bumped on every render so late callbacks can tell their cards are gone.
    pub(crate) generation: u64,
}

impl SearchPage {
    pub(crate) fn render(&mut self, cards: Vec<ResultCard>) {
        self.cards = cards;
        self.generation += 1;
    }

    pub(crate) fn button_mut(
        &mut self,
        generation: u64,
        index: usize,
    ) -> Option<&mut AddButton> {
        if generation != self.generation {
            return None;
        }
        self.cards.get_mut(index).map(|card| &mut card.add_button)
    }
}

impl fmt::Display for SearchPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cards.is_empty() {
            return writeln!(f, "no results");
        }
        for (i, card) in self.cards.iter().enumerate() {
            writeln!(f, "{:>2}. {} [{}]", i + 1, card.title, card.book.google_id)?;
            if !card.authors.is_empty() {
                writeln!(f, "    {}", card.authors)?;
            }
            writeln!(f, "    cover: {}", card.cover.src)?;
            if !card.description.is_empty() {
                writeln!(f, "    {}", card.description)?;
            }
            writeln!(
                f,
                "    [{}] as {}{}",
                card.add_button.label,
                card.status.label(),
                if card.add_button.disabled { " (busy)" } else { "" }
            )?;
        }
        Ok(())
    }
}
