//! URL building for the backend API and the site's pages

use booktrack_kernel::models::Status;

/// Absolute endpoint URLs under one backend base URL.
#[derive(Debug, Clone)]
pub struct Routes {
    base: String,
}

impl Routes {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /api/search?q=<query>`
    pub fn search(&self, query: &str) -> String {
        format!("{}/api/search?q={}", self.base, urlencoding::encode(query))
    }

    /// `GET /api/library`, optionally filtered by status
    pub fn library(&self, status: Option<Status>) -> String {
        match status {
            Some(status) => format!(
                "{}/api/library?status={}",
                self.base,
                urlencoding::encode(status.as_str())
            ),
            None => format!("{}/api/library", self.base),
        }
    }

    /// `/api/library/<google_id>` for get, patch and delete
    pub fn entry(&self, google_id: &str) -> String {
        format!("{}/api/library/{}", self.base, urlencoding::encode(google_id))
    }

    /// Site-relative link to a book's detail page.
    pub fn book_page(google_id: &str) -> String {
        format!("/book?google_id={}", urlencoding::encode(google_id))
    }
}
