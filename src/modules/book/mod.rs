pub mod form;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use booktrack_http::{ApiError, LibraryApi};
use booktrack_kernel::models::LibraryItem;
use booktrack_kernel::settings::UiSettings;
use booktrack_kernel::{InitCtx, View, ViewState};

use crate::utils::{self, Cover};
use form::DetailForm;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("no book is loaded")]
    NotLoaded,

    #[error(transparent)]
    Rejected(#[from] ApiError),
}

/// Header and edit form for one library entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub google_id: String,
    pub cover: Cover,
    pub title: String,
    pub authors: String,
    pub published_date: String,
    pub form: DetailForm,
}

impl DetailPage {
    pub fn new(item: &LibraryItem, ui: &UiSettings) -> Self {
        let book = &item.book;
        Self {
            google_id: book.google_id.clone(),
            cover: Cover::for_book(book, &ui.placeholder_thumbnail),
            title: book.title.clone(),
            authors: utils::join_authors(&book.authors),
            published_date: book.published_date.clone().unwrap_or_default(),
            form: DetailForm::from_entry(&item.entry),
        }
    }
}

impl fmt::Display for DetailPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if !self.authors.is_empty() {
            writeln!(f, "{}", self.authors)?;
        }
        if !self.published_date.is_empty() {
            writeln!(f, "{}", self.published_date)?;
        }
        writeln!(f, "cover:       {}", self.cover.src)?;
        writeln!(f, "status:      {}", self.form.status.label())?;
        writeln!(f, "started at:  {}", self.form.started_at)?;
        writeln!(f, "finished at: {}", self.form.finished_at)?;
        writeln!(f, "my rating:   {}", self.form.rating)?;
        writeln!(f, "my notes:    {}", self.form.notes)
    }
}

/// Book detail page. Saves are blocking: nothing changes locally until the
/// user submits, and a submit sends the whole form.
#[derive(Clone)]
pub struct BookDetailView {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn LibraryApi>,
    ui: UiSettings,
    page: ViewState<Option<DetailPage>>,
}

impl BookDetailView {
    pub fn new(api: Arc<dyn LibraryApi>, ui: UiSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                ui,
                page: ViewState::new(None),
            }),
        }
    }

    /// The rendered page, or `None` if nothing could be shown.
    pub fn page(&self) -> Option<DetailPage> {
        self.inner.page.snapshot()
    }

    /// Fetch and render one entry. A failed fetch renders nothing.
    pub async fn load(&self, google_id: &str) -> bool {
        let inner = &self.inner;
        match inner.api.get(google_id).await {
            Ok(item) => {
                let page = DetailPage::new(&item, &inner.ui);
                inner.page.update(|slot| *slot = Some(page));
                true
            }
            Err(err) => {
                tracing::warn!(
                    view = "book",
                    %google_id,
                    error = %err,
                    "entry fetch failed"
                );
                false
            }
        }
    }

    /// Interact with the form. Returns `None` when no page is rendered.
    pub fn edit<R>(&self, f: impl FnOnce(&mut DetailForm) -> R) -> Option<R> {
        self.inner
            .page
            .update(|slot| slot.as_mut().map(|page| f(&mut page.form)))
    }

    /// Save the whole form as one PATCH.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        let (google_id, patch) = self
            .inner
            .page
            .read(|slot| {
                slot.as_ref()
                    .map(|page| (page.google_id.clone(), page.form.payload()))
            })
            .ok_or(SubmitError::NotLoaded)?;

        match self.inner.api.update(&google_id, &patch).await {
            Ok(()) => {
                tracing::info!(view = "book", %google_id, "entry saved");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    view = "book",
                    %google_id,
                    error = %err,
                    "entry save failed"
                );
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl View for BookDetailView {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let Some(google_id) = ctx.query.get("google_id") else {
            tracing::debug!(
                view = self.name(),
                "no google_id in page query; nothing to show"
            );
            return Ok(());
        };
        let rendered = self.load(google_id).await;
        tracing::info!(view = self.name(), %google_id, rendered, "view initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fake::{item, Call, FakeApi};
    use booktrack_kernel::models::{EntryPatch, Status};
    use booktrack_kernel::settings::Settings;
    use booktrack_kernel::PageQuery;
    use form::DateField;

    fn api() -> Arc<FakeApi> {
        let mut dune = item("d 1", "Dune", Status::Finished);
        dune.book.thumbnail = Some("http://covers/dune.jpg".to_string());
        dune.entry.started_at = Some("2024-01-05T08:30:00".to_string());
        dune.entry.finished_at = Some("2024-02-11T22:10:59.5".to_string());
        dune.entry.my_rating = Some(4);
        Arc::new(FakeApi::new().with_items(vec![dune]))
    }

    async fn init(view: &BookDetailView, raw_query: &str) {
        let settings = Settings::default();
        let query = PageQuery::parse(raw_query);
        view.init(&InitCtx {
            settings: &settings,
            query: &query,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn missing_identifier_renders_nothing() {
        let api = api();
        let view = BookDetailView::new(api.clone(), UiSettings::default());

        init(&view, "").await;

        assert!(view.page().is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_renders_nothing() {
        let api = api();
        let view = BookDetailView::new(api.clone(), UiSettings::default());

        init(&view, "google_id=unknown").await;

        assert!(view.page().is_none());
        assert_eq!(api.calls(), vec![Call::Get("unknown".to_string())]);
    }

    #[tokio::test]
    async fn renders_header_and_prefilled_form() {
        let view = BookDetailView::new(api(), UiSettings::default());

        init(&view, "google_id=d%201").await;

        let page = view.page().unwrap();
        assert_eq!(page.title, "Dune");
        assert_eq!(page.cover.src, "http://covers/dune.jpg");
        assert_eq!(page.published_date, "1965");
        assert_eq!(page.form.status, Status::Finished);
        assert_eq!(page.form.started_at, "2024-01-05T08:30");
        assert_eq!(page.form.finished_at, "2024-02-11T22:10");
        assert_eq!(page.form.rating.value(), 4);
        assert_eq!(page.form.chosen, 0);
    }

    #[tokio::test]
    async fn submit_sends_the_whole_form_once() {
        let api = api();
        let view = BookDetailView::new(api.clone(), UiSettings::default());
        view.load("d 1").await;

        view.edit(|form| {
            form.status = Status::Reading;
            form.notes = "second read".to_string();
            form.set_date(DateField::FinishedAt, "")
        })
        .unwrap()
        .unwrap();
        view.submit().await.unwrap();

        let expected = EntryPatch {
            status: Some(Status::Reading),
            my_rating: None,
            started_at: Some(Some("2024-01-05T08:30".to_string())),
            finished_at: Some(None),
            my_notes: Some("second read".to_string()),
        };
        assert_eq!(
            api.calls().last(),
            Some(&Call::Update("d 1".to_string(), expected))
        );
    }

    #[tokio::test]
    async fn clicked_star_replaces_the_stored_rating() {
        let api = api();
        let view = BookDetailView::new(api.clone(), UiSettings::default());
        view.load("d 1").await;

        view.edit(|form| form.click_star(5)).unwrap().unwrap();
        view.submit().await.unwrap();

        match api.calls().last() {
            Some(Call::Update(id, patch)) => {
                assert_eq!(id, "d 1");
                assert_eq!(patch.my_rating, Some(5));
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_save_is_reported_and_form_kept() {
        let api = api();
        FakeApi::fail(&api.fail_update);
        let view = BookDetailView::new(api, UiSettings::default());
        view.load("d 1").await;
        view.edit(|form| form.click_star(2)).unwrap().unwrap();

        let err = view.submit().await.unwrap_err();

        assert!(matches!(err, SubmitError::Rejected(_)));
        assert_eq!(view.page().unwrap().form.rating.value(), 2);
    }

    #[tokio::test]
    async fn nothing_to_submit_without_a_page() {
        let view = BookDetailView::new(api(), UiSettings::default());
        assert!(view.edit(|form| form.click_star(1)).is_none());
        assert!(matches!(view.submit().await, Err(SubmitError::NotLoaded)));
    }
}
