pub mod book;
pub mod library;
pub mod search;

#[cfg(test)]
pub(crate) mod fake;

pub use book::BookDetailView;
pub use library::LibraryView;
pub use search::SearchView;
