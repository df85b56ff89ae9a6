use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

/// Context handed to a view when its page loads.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub query: &'a PageQuery,
}

/// Lifecycle every page controller implements.
#[async_trait]
pub trait View: Sync + Send {
    /// Unique name for this view, used in logs.
    fn name(&self) -> &'static str;

    /// Fetch whatever the page needs and render it.
    /// Called once when the page loads.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Tear the view down: cancel scheduled callbacks so nothing fires
    /// against state that is no longer displayed.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The render model a view owns, shared with its scheduled callbacks and
/// in-flight requests.
///
/// Closures passed to [`ViewState::read`] and [`ViewState::update`] run
/// under a lock and must not block.
#[derive(Debug, Default)]
pub struct ViewState<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> ViewState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<T: Clone> ViewState<T> {
    pub fn snapshot(&self) -> T {
        self.read(T::clone)
    }
}

impl<T> Clone for ViewState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Decoded `key=value` pairs from a page URL's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pairs: Vec<(String, String)>,
}

impl PageQuery {
    /// Parse `a=1&b=two`, with or without a leading `?`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for `name`; empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
