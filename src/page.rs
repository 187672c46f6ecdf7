//! Task page orchestration.
//!
//! A [`TaskPage`] owns the current filters and the page state, and reloads
//! tasks when mounted, when the filters change, or on refresh. Each reload
//! is tagged with a generation number; a completion that is not from the
//! latest reload is dropped, so the newest trigger always wins.

use crate::error::{RetrievalError, RetrievalResult};
use crate::filters::{FilterEdit, FilterSpec};
use crate::store::TaskStore;
use crate::types::Task;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// What the page currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// A retrieval is in flight.
    Loading,
    /// The last retrieval failed; carries the store's message.
    Error(String),
    /// The last retrieval succeeded.
    Ready(Vec<Task>),
}

impl PageState {
    /// Tasks to list. Empty while loading or after a failure.
    pub fn tasks(&self) -> &[Task] {
        match self {
            PageState::Ready(tasks) => tasks,
            PageState::Loading | PageState::Error(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }

    fn from_result(result: RetrievalResult<Vec<Task>>) -> Self {
        match result {
            Ok(tasks) => PageState::Ready(tasks),
            Err(err) => PageState::Error(err.message),
        }
    }
}

struct PageInner {
    filters: FilterSpec,
    state: PageState,
    generation: u64,
}

/// Handle to a reload started by [`TaskPage::begin_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub filters: FilterSpec,
}

/// The task list page: filters, state, and the store it reads from.
pub struct TaskPage {
    store: Arc<dyn TaskStore>,
    inner: Mutex<PageInner>,
}

impl TaskPage {
    /// A page that has not loaded yet. Call [`TaskPage::mount`] to fetch.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_filters(store, FilterSpec::default())
    }

    pub fn with_filters(store: Arc<dyn TaskStore>, filters: FilterSpec) -> Self {
        Self {
            store,
            inner: Mutex::new(PageInner {
                filters,
                state: PageState::Loading,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn filters(&self) -> FilterSpec {
        self.lock().filters.clone()
    }

    pub fn state(&self) -> PageState {
        self.lock().state.clone()
    }

    /// Initial load.
    pub async fn mount(&self) -> PageState {
        self.reload(None).await
    }

    /// Reload with the current filters.
    pub async fn refresh(&self) -> PageState {
        self.reload(None).await
    }

    /// Replace the filters and reload. Unchanged filters do not reload.
    pub async fn set_filters(&self, filters: FilterSpec) -> PageState {
        {
            let inner = self.lock();
            if inner.filters == filters && !inner.state.is_loading() {
                return inner.state.clone();
            }
        }
        self.reload(Some(filters)).await
    }

    /// Apply a single form edit to the current filters and reload.
    pub async fn edit_filter(&self, edit: FilterEdit) -> PageState {
        let next = self.filters().apply(edit);
        self.set_filters(next).await
    }

    async fn reload(&self, filters: Option<FilterSpec>) -> PageState {
        let ticket = self.begin_load(filters);
        let result = self.store.fetch_tasks(&ticket.filters).await;
        self.finish_load(ticket.generation, result);
        self.state()
    }

    /// Enter `Loading` for a new generation, optionally replacing the
    /// filters in the same step.
    pub fn begin_load(&self, filters: Option<FilterSpec>) -> LoadTicket {
        let mut inner = self.lock();
        if let Some(filters) = filters {
            inner.filters = filters;
        }
        inner.generation += 1;
        inner.state = PageState::Loading;
        debug!(generation = inner.generation, "Loading tasks");
        LoadTicket {
            generation: inner.generation,
            filters: inner.filters.clone(),
        }
    }

    /// Record the outcome of a reload. Returns false (and changes nothing)
    /// when a newer reload has started since `generation` began.
    pub fn finish_load(&self, generation: u64, result: Result<Vec<Task>, RetrievalError>) -> bool {
        let mut inner = self.lock();
        if generation != inner.generation {
            debug!(
                generation,
                latest = inner.generation,
                "Discarding stale task retrieval"
            );
            return false;
        }

        if let Err(ref err) = result {
            warn!(table = err.table, error = %err, "Error loading tasks");
        }
        inner.state = PageState::from_result(result);
        true
    }
}
