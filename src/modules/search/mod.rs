pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use booktrack_http::LibraryApi;
use booktrack_kernel::models::{AddToLibrary, Status};
use booktrack_kernel::settings::UiSettings;
use booktrack_kernel::{Debouncer, InitCtx, Timers, View, ViewState};

use models::{AddButton, AddOutcome, ResultCard, SearchPage};

/// Search page: debounced query input, result cards, "add to library".
#[derive(Clone)]
pub struct SearchView {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn LibraryApi>,
    ui: UiSettings,
    page: ViewState<SearchPage>,
    debounce: Debouncer,
    timers: Timers,
}

impl SearchView {
    pub fn new(api: Arc<dyn LibraryApi>, ui: UiSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                debounce: Debouncer::new(ui.search_debounce()),
                ui,
                page: ViewState::new(SearchPage::default()),
                timers: Timers::new(),
            }),
        }
    }

    pub fn page(&self) -> SearchPage {
        self.inner.page.snapshot()
    }

    /// A keystroke in the query box: re-arm the debounced search.
    pub fn input(&self, text: &str) {
        self.inner.page.update(|page| page.query = text.to_string());
        let inner = Arc::clone(&self.inner);
        self.inner.debounce.schedule(async move {
            inner.run_search().await;
        });
    }

    /// Enter or the search button: search now, dropping any pending
    /// debounced search. A debounced search whose delay already elapsed
    /// is not recalled, so it may still land alongside this one.
    pub async fn submit(&self) {
        self.inner.debounce.cancel();
        self.inner.run_search().await;
    }

    /// Replace the query and search immediately.
    pub async fn submit_query(&self, query: &str) {
        self.inner.page.update(|page| page.query = query.to_string());
        self.submit().await;
    }

    /// Pick the initial status for card `index`. Returns false if there is
    /// no such card.
    pub fn select_status(&self, index: usize, status: Status) -> bool {
        self.inner.page.update(|page| match page.cards.get_mut(index) {
            Some(card) => {
                card.status = status;
                true
            }
            None => false,
        })
    }

    /// Press the add button of card `index`.
    ///
    /// Returns `None` when the press is ignored: no such card, or an add for
    /// it is still in flight. The button shows the outcome until the reset
    /// timer restores it.
    pub async fn add(&self, index: usize) -> Option<AddOutcome> {
        let inner = &self.inner;
        let (generation, request) = inner.page.update(|page| {
            let generation = page.generation;
            let card = page.cards.get_mut(index)?;
            if card.add_button.disabled {
                return None;
            }
            card.add_button.disabled = true;
            let request = AddToLibrary {
                book: card.book.clone(),
                status: card.status,
            };
            Some((generation, request))
        })?;

        let google_id = request.book.google_id.clone();
        let outcome = match inner.api.add(&request).await {
            Ok(created) => {
                tracing::info!(
                    view = "search",
                    %google_id,
                    status = %created.entry().status,
                    "book added to library"
                );
                AddOutcome::Added
            }
            Err(err) => {
                tracing::warn!(
                    view = "search",
                    %google_id,
                    error = %err,
                    "add to library failed"
                );
                AddOutcome::Failed
            }
        };

        inner.page.update(|page| {
            if let Some(button) = page.button_mut(generation, index) {
                button.label = outcome.label().to_string();
            }
        });

        let page = inner.page.clone();
        inner.timers.after(inner.ui.add_reset(), async move {
            page.update(|page| {
                if let Some(button) = page.button_mut(generation, index) {
                    *button = AddButton::default();
                }
            });
        });

        Some(outcome)
    }
}

impl Inner {
    async fn run_search(&self) {
        let query = self.page.read(|page| page.query.trim().to_string());
        if query.is_empty() {
            self.page.update(|page| page.render(Vec::new()));
            return;
        }

        let books = match self.api.search(&query).await {
            Ok(books) => books,
            Err(err) => {
                tracing::warn!(
                    view = "search",
                    %query,
                    error = %err,
                    "search failed; showing no results"
                );
                Vec::new()
            }
        };
        tracing::debug!(view = "search", %query, results = books.len(), "rendering results");

        let cards = books
            .into_iter()
            .map(|book| ResultCard::new(book, &self.ui))
            .collect();
        self.page.update(|page| page.render(cards));
    }
}

#[async_trait]
impl View for SearchView {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(query) = ctx.query.get("q") {
            self.submit_query(query).await;
        }
        tracing::info!(
            view = self.name(),
            environment = ?ctx.settings.environment,
            "view initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.inner.debounce.cancel();
        self.inner.timers.cancel_all();
        tracing::info!(view = self.name(), "view stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fake::{book, Call, FakeApi};
    use booktrack_kernel::settings::Settings;
    use booktrack_kernel::PageQuery;
    use models::{ADDED_LABEL, ADD_LABEL, ERROR_LABEL};
    use std::time::Duration;

    fn view_with(api: Arc<FakeApi>) -> SearchView {
        SearchView::new(api, UiSettings::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_input_issues_one_search_for_the_last_query() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api.clone());

        for text in ["d", "du", "dun", "dune"] {
            view.input(text);
            tokio::time::sleep(ms(100)).await;
        }
        assert!(api.searches().is_empty());

        tokio::time::sleep(ms(250)).await;
        assert_eq!(api.searches(), vec!["dune".to_string()]);
        assert_eq!(view.page().cards.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_searches_immediately_and_drops_the_pending_one() {
        let api = Arc::new(FakeApi::new());
        let view = view_with(api.clone());

        view.input("dune");
        view.submit().await;
        assert_eq!(api.searches(), vec!["dune".to_string()]);

        tokio::time::sleep(ms(1000)).await;
        assert_eq!(api.searches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_after_the_debounce_fired_searches_again() {
        let api = Arc::new(FakeApi::new());
        let view = view_with(api.clone());

        view.input("dune");
        tokio::time::sleep(ms(301)).await;
        assert_eq!(api.searches().len(), 1);

        view.submit().await;
        assert_eq!(api.searches(), vec!["dune".to_string(), "dune".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_clears_without_a_request() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api.clone());
        view.submit_query("dune").await;
        assert_eq!(view.page().cards.len(), 1);

        view.input("   ");
        tokio::time::sleep(ms(400)).await;
        view.submit().await;

        assert!(view.page().cards.is_empty());
        assert_eq!(api.searches().len(), 1);
    }

    #[tokio::test]
    async fn card_without_thumbnail_uses_placeholder() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api);

        view.submit_query("dune").await;

        let page = view.page();
        let card = &page.cards[0];
        assert_eq!(card.cover.src, "/static/placeholder.png");
        assert_eq!(card.title, "Dune");
        assert_eq!(card.authors, "Frank Herbert");
        assert_eq!(card.status, Status::ToRead);
        assert_eq!(card.add_button, AddButton::default());
    }

    #[tokio::test]
    async fn failed_search_renders_nothing() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api.clone());
        view.submit_query("dune").await;

        FakeApi::fail(&api.fail_search);
        view.submit_query("dune").await;

        assert!(view.page().cards.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_overwrites_a_fresher_one() {
        let api = Arc::new(
            FakeApi::new().with_books(vec![book("d1", "Dune"), book("d2", "Dune Messiah")]),
        );
        api.delay_search("dune", ms(500));
        let view = view_with(api.clone());

        let slow = tokio::spawn({
            let view = view.clone();
            async move { view.submit_query("dune").await }
        });
        tokio::task::yield_now().await;
        view.submit_query("messiah").await;
        assert_eq!(view.page().cards.len(), 1);

        slow.await.unwrap();
        assert_eq!(view.page().cards.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn add_disables_button_then_resets_after_delay() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        api.delay_writes(ms(100));
        let view = view_with(api.clone());
        view.submit_query("dune").await;
        assert!(view.select_status(0, Status::Reading));

        let first = tokio::spawn({
            let view = view.clone();
            async move { view.add(0).await }
        });
        tokio::task::yield_now().await;
        assert!(view.page().cards[0].add_button.disabled);
        assert_eq!(view.add(0).await, None);

        assert_eq!(first.await.unwrap(), Some(AddOutcome::Added));
        let button = view.page().cards[0].add_button.clone();
        assert_eq!(button.label, ADDED_LABEL);
        assert!(button.disabled);

        tokio::time::sleep(ms(1250)).await;
        assert_eq!(view.page().cards[0].add_button.label, ADD_LABEL);
        assert!(!view.page().cards[0].add_button.disabled);

        let adds: Vec<_> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Add(request) => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(adds.len(), 1);
        assert_eq!(adds[0].status, Status::Reading);
        assert_eq!(adds[0].book.google_id, "d1");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_add_shows_error_then_resets() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        FakeApi::fail(&api.fail_add);
        let view = view_with(api);
        view.submit_query("dune").await;

        assert_eq!(view.add(0).await, Some(AddOutcome::Failed));
        assert_eq!(view.page().cards[0].add_button.label, ERROR_LABEL);

        tokio::time::sleep(ms(1250)).await;
        assert_eq!(view.page().cards[0].add_button, AddButton::default());
    }

    #[tokio::test(start_paused = true)]
    async fn add_outcome_after_new_results_is_inert() {
        let api = Arc::new(
            FakeApi::new().with_books(vec![book("d1", "Dune"), book("d2", "Dune Messiah")]),
        );
        api.delay_writes(ms(100));
        let view = view_with(api);
        view.submit_query("dune").await;

        let pending = tokio::spawn({
            let view = view.clone();
            async move { view.add(0).await }
        });
        tokio::task::yield_now().await;
        view.submit_query("dune").await;

        assert_eq!(pending.await.unwrap(), Some(AddOutcome::Added));
        assert_eq!(view.page().cards[0].add_button, AddButton::default());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_search_and_reset() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api.clone());
        view.submit_query("dune").await;
        view.add(0).await;

        view.input("messiah");
        view.stop().await.unwrap();
        tokio::time::sleep(ms(2000)).await;

        assert_eq!(api.searches().len(), 1);
        assert_eq!(view.page().cards[0].add_button.label, ADDED_LABEL);
    }

    #[tokio::test]
    async fn init_searches_the_q_parameter() {
        let api = Arc::new(FakeApi::new().with_books(vec![book("d1", "Dune")]));
        let view = view_with(api.clone());
        let settings = Settings::default();
        let query = PageQuery::parse("q=dune");

        view.init(&InitCtx {
            settings: &settings,
            query: &query,
        })
        .await
        .unwrap();

        assert_eq!(api.searches(), vec!["dune".to_string()]);
        assert_eq!(view.page().query, "dune");
    }
}
