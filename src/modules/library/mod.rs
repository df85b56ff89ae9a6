pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use booktrack_http::{ApiError, LibraryApi};
use booktrack_kernel::models::{EntryPatch, Status};
use booktrack_kernel::settings::UiSettings;
use booktrack_kernel::{apply_optimistic, InitCtx, View, ViewState};

use crate::utils::StarRating;
use models::{LibraryPage, LibraryRow, Tab};

/// Why a row control did not stick.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("no row for book '{0}' in the current list")]
    NoSuchRow(String),

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// The backend refused the change; the row was rolled back.
    #[error(transparent)]
    Rejected(#[from] ApiError),
}

/// Library page: status tabs and rows with optimistic inline controls.
#[derive(Clone)]
pub struct LibraryView {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn LibraryApi>,
    ui: UiSettings,
    page: ViewState<LibraryPage>,
}

impl LibraryView {
    pub fn new(api: Arc<dyn LibraryApi>, ui: UiSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                ui,
                page: ViewState::new(LibraryPage::default()),
            }),
        }
    }

    pub fn page(&self) -> LibraryPage {
        self.inner.page.snapshot()
    }

    /// Activate `tab` and refetch its list, discarding unconfirmed edits.
    pub async fn select_tab(&self, tab: Tab) {
        self.inner.page.update(|page| page.select(tab));
        self.reload().await;
    }

    /// Refetch the active tab. A failed fetch shows an empty list.
    pub async fn reload(&self) {
        let inner = &self.inner;
        let tab = inner.page.read(|page| page.tab);
        let items = match inner.api.list(tab.status()).await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    view = "library",
                    tab = tab.label(),
                    error = %err,
                    "list fetch failed"
                );
                Vec::new()
            }
        };
        tracing::debug!(
            view = "library",
            tab = tab.label(),
            rows = items.len(),
            "rendering list"
        );

        let rows = items
            .into_iter()
            .map(|item| LibraryRow::new(item, &inner.ui))
            .collect();
        inner.page.update(|page| page.render(rows));
    }

    /// Status selector changed on a row.
    pub async fn change_status(&self, google_id: &str, status: Status) -> Result<(), RowError> {
        self.ensure_row(google_id)?;
        let page = &self.inner.page;
        let patch = EntryPatch::status(status);

        apply_optimistic(
            || {
                page.update(|page| {
                    let generation = page.generation;
                    let row = page.row_mut(generation, google_id)?;
                    let previous = row.item.entry.status;
                    row.item.entry.status = status;
                    row.status_select = status;
                    Some((generation, previous))
                })
            },
            || self.inner.api.update(google_id, &patch),
            |snapshot| {
                let Some((generation, previous)) = snapshot else {
                    return;
                };
                page.update(|page| {
                    if let Some(row) = page.row_mut(generation, google_id) {
                        row.item.entry.status = previous;
                        row.status_select = previous;
                    }
                });
            },
        )
        .await
        .map_err(|err| rejected(google_id, "status", err))
    }

    /// Star `value` clicked on a row. Sets the rating to exactly `value`.
    pub async fn rate(&self, google_id: &str, value: u8) -> Result<(), RowError> {
        let stars = StarRating::click(value).ok_or(RowError::InvalidRating(value))?;
        self.ensure_row(google_id)?;
        let page = &self.inner.page;
        let patch = EntryPatch::rating(stars.value());

        apply_optimistic(
            || {
                page.update(|page| {
                    let generation = page.generation;
                    let row = page.row_mut(generation, google_id)?;
                    let previous = (row.item.entry.my_rating, row.stars);
                    row.item.entry.my_rating = Some(stars.value());
                    row.stars = stars;
                    Some((generation, previous))
                })
            },
            || self.inner.api.update(google_id, &patch),
            |snapshot| {
                let Some((generation, (my_rating, previous_stars))) = snapshot else {
                    return;
                };
                page.update(|page| {
                    if let Some(row) = page.row_mut(generation, google_id) {
                        row.item.entry.my_rating = my_rating;
                        row.stars = previous_stars;
                    }
                });
            },
        )
        .await
        .map_err(|err| rejected(google_id, "rating", err))
    }

    /// Remove button on a row. The row disappears at once; if the delete
    /// fails the whole list comes back exactly as it was.
    pub async fn remove(&self, google_id: &str) -> Result<(), RowError> {
        self.ensure_row(google_id)?;
        let page = &self.inner.page;

        apply_optimistic(
            || {
                page.update(|page| {
                    let snapshot = (page.generation, page.rows.clone());
                    page.rows.retain(|row| row.google_id() != google_id);
                    snapshot
                })
            },
            || self.inner.api.remove(google_id),
            |(generation, rows): (u64, Vec<LibraryRow>)| {
                page.update(|page| {
                    if page.generation == generation {
                        page.rows = rows;
                    }
                });
            },
        )
        .await
        .map_err(|err| rejected(google_id, "remove", err))
    }

    fn ensure_row(&self, google_id: &str) -> Result<(), RowError> {
        if self.inner.page.read(|page| page.row(google_id).is_some()) {
            Ok(())
        } else {
            Err(RowError::NoSuchRow(google_id.to_string()))
        }
    }
}

fn rejected(google_id: &str, control: &'static str, err: ApiError) -> RowError {
    tracing::warn!(
        view = "library",
        %google_id,
        control,
        error = %err,
        "change rolled back"
    );
    RowError::Rejected(err)
}

#[async_trait]
impl View for LibraryView {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let tab = match ctx.query.get("status") {
            Some(raw) => raw.parse::<Tab>().map_err(anyhow::Error::msg)?,
            None => Tab::default(),
        };
        self.select_tab(tab).await;
        tracing::info!(view = self.name(), tab = tab.label(), "view initialized");
        Ok(())
    }
}
