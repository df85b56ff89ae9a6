//! In-memory `LibraryApi` used by the view tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use booktrack_http::{ApiError, LibraryApi};
use booktrack_kernel::models::{
    AddToLibrary, Book, Created, EntryPatch, LibraryEntry, LibraryItem, Status,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Search(String),
    List(Option<Status>),
    Get(String),
    Add(AddToLibrary),
    Update(String, EntryPatch),
    Remove(String),
}

#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<Call>>,
    books: Mutex<Vec<Book>>,
    items: Mutex<Vec<LibraryItem>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    write_delay: Mutex<Option<Duration>>,
    list_delay: Mutex<Option<Duration>>,
    pub fail_search: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(self, books: Vec<Book>) -> Self {
        *self.books.lock().unwrap() = books;
        self
    }

    pub fn with_items(self, items: Vec<LibraryItem>) -> Self {
        *self.items.lock().unwrap() = items;
        self
    }

    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    pub fn delay_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn write_pause(&self) {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn outcome(flag: &AtomicBool) -> Result<(), ApiError> {
        if flag.load(Ordering::SeqCst) {
            Err(ApiError::status(500, "boom"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LibraryApi for FakeApi {
    async fn search(&self, query: &str) -> Result<Vec<Book>, ApiError> {
        self.record(Call::Search(query.to_string()));
        let delay = self.search_delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Self::outcome(&self.fail_search)?;
        let needle = query.to_lowercase();
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|book| book.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list(&self, status: Option<Status>) -> Result<Vec<LibraryItem>, ApiError> {
        self.record(Call::List(status));
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Self::outcome(&self.fail_list)?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| status.map_or(true, |s| item.entry.status == s))
            .cloned()
            .collect())
    }

    async fn get(&self, google_id: &str) -> Result<LibraryItem, ApiError> {
        self.record(Call::Get(google_id.to_string()));
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.book.google_id == google_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Not found"))
    }

    async fn add(&self, request: &AddToLibrary) -> Result<Created, ApiError> {
        self.record(Call::Add(request.clone()));
        self.write_pause().await;
        Self::outcome(&self.fail_add)?;
        Ok(Created::Entry(entry(&request.book.google_id, request.status)))
    }

    async fn update(&self, google_id: &str, patch: &EntryPatch) -> Result<(), ApiError> {
        self.record(Call::Update(google_id.to_string(), patch.clone()));
        self.write_pause().await;
        Self::outcome(&self.fail_update)
    }

    async fn remove(&self, google_id: &str) -> Result<(), ApiError> {
        self.record(Call::Remove(google_id.to_string()));
        self.write_pause().await;
        Self::outcome(&self.fail_remove)
    }
}

pub(crate) fn book(google_id: &str, title: &str) -> Book {
    Book {
        id: None,
        google_id: google_id.to_string(),
        title: title.to_string(),
        authors: vec!["Frank Herbert".to_string()],
        thumbnail: None,
        published_date: Some("1965".to_string()),
        description: None,
    }
}

pub(crate) fn entry(google_id: &str, status: Status) -> LibraryEntry {
    LibraryEntry {
        id: None,
        google_id: google_id.to_string(),
        status,
        my_rating: None,
        started_at: None,
        finished_at: None,
        my_notes: None,
        updated_at: None,
    }
}

pub(crate) fn item(google_id: &str, title: &str, status: Status) -> LibraryItem {
    LibraryItem {
        book: book(google_id, title),
        entry: entry(google_id, status),
    }
}
