//! Async list store: a [`ListState`] bound to the [`Source`] that feeds it.
//!
//! A [`Store`] is a cheap, cloneable handle. Each action applies its pure
//! transition under the lock, releases it, performs the fetch, then applies
//! the outcome under the lock again. Every fetch carries a fresh [`Ticket`]
//! from a per-store counter that never goes backwards (not even across
//! [`Store::clear`]), so only the latest request can land.
//!
//! The `dispatch_*` variants return as soon as the store has entered its
//! loading phase and leave the fetch running on the runtime; the plain
//! variants wait for it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::sources::Source;
use crate::state::{ListState, PageRequest, StateError, Ticket};

pub struct Store<S: Source> {
    state: Arc<Mutex<ListState<S::Item>>>,
    source: Arc<S>,
    seq: Arc<AtomicU64>,
}

impl<S: Source> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            source: self.source.clone(),
            seq: self.seq.clone(),
        }
    }
}

impl<S: Source + 'static> Store<S> {
    pub fn new(source: S, limit: usize) -> Self {
        let state = ListState::new(source.mode(), limit);
        Self {
            state: Arc::new(Mutex::new(state)),
            source: Arc::new(source),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> ListState<S::Item> {
        self.state.lock().await.clone()
    }

    pub async fn submit(&self, query: &str) {
        let request = self.state.lock().await.submit(query, self.next_ticket());
        self.run(request).await;
    }

    pub async fn goto_page(&self, page: usize) -> Result<(), StateError> {
        let request = self
            .state
            .lock()
            .await
            .goto_page(page, self.next_ticket())?;
        if let Some(request) = request {
            self.run(request).await;
        }
        Ok(())
    }

    pub async fn resize_limit(&self, limit: usize) -> Result<(), StateError> {
        let request = self
            .state
            .lock()
            .await
            .resize_limit(limit, self.next_ticket())?;
        if let Some(request) = request {
            self.run(request).await;
        }
        Ok(())
    }

    pub async fn dispatch_submit(&self, query: &str) -> JoinHandle<()> {
        let request = self.state.lock().await.submit(query, self.next_ticket());
        self.spawn(Some(request))
    }

    pub async fn dispatch_goto_page(&self, page: usize) -> Result<JoinHandle<()>, StateError> {
        let request = self
            .state
            .lock()
            .await
            .goto_page(page, self.next_ticket())?;
        Ok(self.spawn(request))
    }

    pub async fn dispatch_resize_limit(
        &self,
        limit: usize,
    ) -> Result<JoinHandle<()>, StateError> {
        let request = self
            .state
            .lock()
            .await
            .resize_limit(limit, self.next_ticket())?;
        Ok(self.spawn(request))
    }

    pub async fn select(&self, key: &str) {
        self.state.lock().await.select(key);
    }

    pub async fn clear(&self) {
        self.state.lock().await.clear();
    }

    fn next_ticket(&self) -> Ticket {
        Ticket::new(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn spawn(&self, request: Option<PageRequest>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            if let Some(request) = request {
                store.run(request).await;
            }
        })
    }

    async fn run(&self, request: PageRequest) {
        let outcome = self.source.fetch(&request).await;

        let mut state = self.state.lock().await;
        let applied = match outcome {
            Ok(payload) => state.on_fetched(request.ticket, payload),
            Err(e) => state.on_error(request.ticket, &e),
        };
        if !applied {
            tracing::debug!(
                ticket = request.ticket.seq(),
                query = %request.query,
                "dropping response for superseded request"
            );
        }
    }
}
