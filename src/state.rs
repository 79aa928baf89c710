//! List, pagination and selection state for one resource kind.
//!
//! [`ListState`] is a plain value mutated only through its transition
//! methods. Transitions that need data from a backend return a
//! [`PageRequest`]; the caller performs the fetch and feeds the outcome back
//! through [`ListState::on_fetched`] or [`ListState::on_error`], quoting the
//! [`Ticket`] it was handed. Outcomes carrying any ticket other than the
//! latest one are dropped, so a slow response can never overwrite a newer
//! one.
//!
//! # Phases
//!
//! ```text
//!            submit / gotoPage / resizeLimit
//!   Idle ───────────────▶ Loading ──on_fetched──▶ Loaded
//!     ▲                     │                       │
//!     │                     └──on_error──▶ Failed   │
//!     └──────────────── clear ◀──────────────────────┘
//! ```
//!
//! A store is in exactly one phase, so "loading", "error" and "data" can
//! never be shown at the same time.
//!
//! # Paging modes
//!
//! In [`PagingMode::Remote`] every page is requested from the backend. In
//! [`PagingMode::Local`] the backend returns the whole collection once;
//! it is sorted by key and paged client-side without further requests.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::models::{Keyed, Payload};
use crate::paging::{total_pages, PageWindow, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    Remote,
    Local,
}

/// Sequence number identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// What the backend should be asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: Ticket,
    pub query: String,
    pub window: PageWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub status: Option<u16>,
    pub message: String,
}

impl From<&FetchError> for ErrorState {
    fn from(err: &FetchError) -> Self {
        Self {
            status: err.status(),
            message: err.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Failed(ErrorState),
    Loaded(Page<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("page must be >= 1")]
    InvalidPage,
    #[error("page {page} is past the last page ({last})")]
    PageOutOfRange { page: usize, last: usize },
    #[error("limit must be > 0")]
    InvalidLimit,
    #[error("no query has been submitted")]
    NoQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    mode: PagingMode,
    initial_limit: usize,
    query: Option<String>,
    window: PageWindow,
    phase: Phase<T>,
    /// Complete collection backing a client-side paged view.
    all: Vec<T>,
    selected: Option<String>,
    pending: Option<Ticket>,
}

impl<T: Keyed + Clone> ListState<T> {
    pub fn new(mode: PagingMode, limit: usize) -> Self {
        let window = PageWindow::new(limit);
        Self {
            mode,
            initial_limit: window.limit,
            query: None,
            window,
            phase: Phase::Idle,
            all: Vec::new(),
            selected: None,
            pending: None,
        }
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn error(&self) -> Option<&ErrorState> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Items of the current page; empty unless loaded.
    pub fn items(&self) -> &[T] {
        match &self.phase {
            Phase::Loaded(page) => &page.items,
            _ => &[],
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        match &self.phase {
            Phase::Loaded(page) => page.pagination.as_ref(),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected item, if it is on the current page.
    pub fn selected_item(&self) -> Option<&T> {
        let key = self.selected.as_deref()?;
        self.items().iter().find(|item| item.key() == key)
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    /// Start a new query at page 1.
    pub fn submit(&mut self, query: &str, ticket: Ticket) -> PageRequest {
        self.query = Some(query.to_string());
        self.window.page = 1;
        self.selected = None;
        self.all.clear();
        self.begin_fetch(ticket)
    }

    /// Move to page `page` of the current query.
    ///
    /// Returns `Ok(None)` when the page was served from the client-side
    /// collection and no fetch is needed.
    pub fn goto_page(
        &mut self,
        page: usize,
        ticket: Ticket,
    ) -> Result<Option<PageRequest>, StateError> {
        if page < 1 {
            return Err(StateError::InvalidPage);
        }
        if self.query.is_none() {
            return Err(StateError::NoQuery);
        }
        if let Some(known) = self.pagination() {
            let last = known.total_page.max(1);
            if page > last {
                return Err(StateError::PageOutOfRange { page, last });
            }
        }

        self.selected = None;
        self.window.page = page;

        match self.mode {
            PagingMode::Local => {
                if self.is_loaded() {
                    self.show_local();
                }
                Ok(None)
            }
            PagingMode::Remote => Ok(Some(self.begin_fetch(ticket))),
        }
    }

    /// Change the page size and return to page 1.
    ///
    /// A remote refetch happens when the previous total was at least the
    /// previous limit, or when a fetch at the old limit is still in flight;
    /// otherwise the loaded items are already the complete result set and
    /// are re-paged in place.
    pub fn resize_limit(
        &mut self,
        limit: usize,
        ticket: Ticket,
    ) -> Result<Option<PageRequest>, StateError> {
        if limit == 0 {
            return Err(StateError::InvalidLimit);
        }

        let previous_limit = self.window.limit;
        let previous_total = self.known_total();

        self.window = PageWindow { limit, page: 1 };
        self.selected = None;

        match self.mode {
            PagingMode::Local => {
                if self.is_loaded() {
                    self.show_local();
                }
                Ok(None)
            }
            PagingMode::Remote => {
                let needs_fetch = self.query.is_some()
                    && (self.pending.is_some()
                        || previous_total.is_some_and(|t| t >= previous_limit));
                if needs_fetch {
                    return Ok(Some(self.begin_fetch(ticket)));
                }
                if let Phase::Loaded(page) = &self.phase {
                    self.all = page.items.clone();
                    self.show_local();
                }
                Ok(None)
            }
        }
    }

    /// Apply a successful response. Returns `false` if `ticket` is stale.
    pub fn on_fetched(&mut self, ticket: Ticket, payload: Payload<T>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.pending = None;

        let (mut items, pagination) = payload.into_parts();
        match self.mode {
            PagingMode::Remote => {
                self.window.page = pagination.map(|p| p.page.max(1)).unwrap_or(1);
                self.all.clear();
                self.phase = Phase::Loaded(Page { items, pagination });
            }
            PagingMode::Local => {
                items.sort_by_key(|item| item.key());
                self.all = items;
                self.show_local();
            }
        }
        true
    }

    /// Apply a failed response. Returns `false` if `ticket` is stale.
    pub fn on_error(&mut self, ticket: Ticket, err: &FetchError) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.pending = None;
        self.all.clear();
        self.phase = Phase::Failed(err.into());
        true
    }

    /// Reset to the initial empty state. Outstanding fetches are orphaned.
    pub fn clear(&mut self) {
        *self = Self::new(self.mode, self.initial_limit);
    }

    /// Toggle selection of `key`.
    pub fn select(&mut self, key: &str) {
        if self.selected.as_deref() == Some(key) {
            self.selected = None;
        } else {
            self.selected = Some(key.to_string());
        }
    }

    fn is_loaded(&self) -> bool {
        matches!(self.phase, Phase::Loaded(_))
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        self.pending == Some(ticket)
    }

    fn begin_fetch(&mut self, ticket: Ticket) -> PageRequest {
        self.phase = Phase::Loading;
        self.pending = Some(ticket);
        PageRequest {
            ticket,
            query: self.query.clone().unwrap_or_default(),
            window: self.window,
        }
    }

    fn known_total(&self) -> Option<usize> {
        match &self.phase {
            Phase::Loaded(page) => Some(
                page.pagination
                    .map(|p| p.total)
                    .unwrap_or(page.items.len()),
            ),
            _ => None,
        }
    }

    /// Show the current window of the client-side collection. The page is
    /// pulled back to the last one if the collection is shorter than it.
    fn show_local(&mut self) {
        let last = total_pages(self.all.len(), self.window.limit).max(1);
        self.window.page = self.window.page.min(last);
        let range = self.window.range(self.all.len());
        self.phase = Phase::Loaded(Page {
            items: self.all[range].to_vec(),
            pagination: Some(Pagination::derive(self.all.len(), self.window)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Keyed for Item {
        fn key(&self) -> String {
            self.0.to_string()
        }
    }

    fn paged(items: &[&'static str], total: usize, page: usize, per_page: usize) -> Payload<Item> {
        Payload::Paged {
            items: items.iter().map(|s| Item(s)).collect(),
            pagination: Pagination {
                total,
                page,
                per_page,
                total_page: crate::paging::total_pages(total, per_page),
            },
        }
    }

    fn list(items: &[&'static str]) -> Payload<Item> {
        Payload::List(items.iter().map(|s| Item(s)).collect())
    }

    #[test]
    fn submit_enters_loading_and_resets_page() {
        let mut state = ListState::<Item>::new(PagingMode::Remote, 8);
        let req = state.submit("orders", Ticket::new(1));

        assert!(state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(req.query, "orders");
        assert_eq!(req.window, PageWindow { limit: 8, page: 1 });
        assert_eq!(state.pending(), Some(Ticket::new(1)));
    }

    #[test]
    fn fetched_paged_payload_populates_items_and_summary() {
        let mut state = ListState::new(PagingMode::Remote, 2);
        state.submit("q", Ticket::new(1));
        assert!(state.on_fetched(Ticket::new(1), paged(&["a", "b"], 5, 1, 2)));

        assert!(!state.is_loading());
        assert_eq!(state.items(), &[Item("a"), Item("b")]);
        assert_eq!(state.pagination().unwrap().total_page, 3);
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn single_payload_is_one_element_without_summary() {
        let mut state = ListState::new(PagingMode::Remote, 8);
        state.submit("a", Ticket::new(1));
        state.on_fetched(Ticket::new(1), Payload::Single(Item("a")));
        assert_eq!(state.items(), &[Item("a")]);
        assert!(state.pagination().is_none());
        assert_eq!(state.window().page, 1);
    }

    #[test]
    fn error_drops_items() {
        let mut state = ListState::new(PagingMode::Remote, 8);
        state.submit("a", Ticket::new(1));
        state.on_fetched(Ticket::new(1), list(&["a"]));

        state.submit("b", Ticket::new(2));
        let err = FetchError::from_status(404, Some(&serde_json::json!({"message": "not found"})));
        assert!(state.on_error(Ticket::new(2), &err));

        assert!(state.items().is_empty());
        let shown = state.error().unwrap();
        assert_eq!(shown.message, "Not Found: not found");
        assert_eq!(shown.status, Some(404));
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut state = ListState::new(PagingMode::Remote, 2);
        state.submit("q", Ticket::new(1));
        state.on_fetched(Ticket::new(1), paged(&["a", "b"], 6, 1, 2));

        // page 2 requested, then page 3 requested before page 2 answers
        state.goto_page(2, Ticket::new(2)).unwrap();
        state.goto_page(3, Ticket::new(3)).ok();

        assert!(state.on_fetched(Ticket::new(3), paged(&["e", "f"], 6, 3, 2)));
        assert!(!state.on_fetched(Ticket::new(2), paged(&["c", "d"], 6, 2, 2)));
        assert_eq!(state.items(), &[Item("e"), Item("f")]);
        assert_eq!(state.window().page, 3);
    }

    #[test]
    fn goto_page_validates_bounds() {
        let mut state = ListState::<Item>::new(PagingMode::Remote, 2);
        assert_eq!(state.goto_page(1, Ticket::new(1)), Err(StateError::NoQuery));

        state.submit("q", Ticket::new(2));
        state.on_fetched(Ticket::new(2), paged(&["a", "b"], 4, 1, 2));

        assert_eq!(state.goto_page(0, Ticket::new(3)), Err(StateError::InvalidPage));
        assert_eq!(
            state.goto_page(3, Ticket::new(3)),
            Err(StateError::PageOutOfRange { page: 3, last: 2 })
        );
        // rejected transitions leave the state untouched
        assert_eq!(state.items().len(), 2);

        let req = state.goto_page(2, Ticket::new(4)).unwrap().unwrap();
        assert_eq!(req.window.page, 2);
        assert!(state.is_loading());
    }

    #[test]
    fn fetch_transitions_clear_selection() {
        let mut state = ListState::new(PagingMode::Remote, 2);
        state.submit("q", Ticket::new(1));
        state.on_fetched(Ticket::new(1), paged(&["a", "b"], 4, 1, 2));

        state.select("a");
        state.goto_page(2, Ticket::new(2)).unwrap();
        assert_eq!(state.selected(), None);

        state.on_fetched(Ticket::new(2), paged(&["c", "d"], 4, 2, 2));
        state.select("c");
        state.resize_limit(4, Ticket::new(3)).unwrap();
        assert_eq!(state.selected(), None);

        state.select("x");
        state.submit("other", Ticket::new(4));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn select_toggles() {
        let mut state = ListState::<Item>::new(PagingMode::Remote, 8);
        state.submit("q", Ticket::new(1));
        state.on_fetched(Ticket::new(1), list(&["a", "b"]));
        let before = state.clone();

        state.select("a");
        assert_eq!(state.selected(), Some("a"));
        assert_eq!(state.selected_item(), Some(&Item("a")));

        state.select("b");
        assert_eq!(state.selected(), Some("b"));

        state.select("b");
        assert_eq!(state.selected(), None);

        state.select("a");
        state.select("a");
        assert_eq!(state, before);
    }

    #[test]
    fn resize_refetches_only_when_results_were_truncated() {
        let mut state = ListState::new(PagingMode::Remote, 2);
        state.submit("q", Ticket::new(1));
        state.on_fetched(Ticket::new(1), paged(&["a", "b"], 5, 1, 2));

        let req = state.resize_limit(4, Ticket::new(2)).unwrap();
        assert_eq!(
            req.map(|r| r.window),
            Some(PageWindow { limit: 4, page: 1 })
        );
        state.on_fetched(Ticket::new(2), paged(&["a", "b", "c", "d"], 5, 1, 4));

        // with limit 8 the single page holds all five results
        state.resize_limit(8, Ticket::new(3)).unwrap();
        state.on_fetched(Ticket::new(3), paged(&["a", "b", "c", "d", "e"], 5, 1, 8));

        let req = state.resize_limit(3, Ticket::new(4)).unwrap();
        assert!(req.is_none());
        assert!(!state.is_loading());
        assert_eq!(state.items(), &[Item("a"), Item("b"), Item("c")]);
        assert_eq!(
            state.pagination().copied(),
            Some(Pagination {
                total: 5,
                page: 1,
                per_page: 3,
                total_page: 2
            })
        );
    }

    #[test]
    fn resize_while_loading_supersedes_the_fetch_in_flight() {
        let mut state = ListState::new(PagingMode::Remote, 2);
        state.submit("q", Ticket::new(1));

        let req = state.resize_limit(5, Ticket::new(2)).unwrap().unwrap();
        assert_eq!(req.window, PageWindow { limit: 5, page: 1 });
        assert_eq!(state.pending(), Some(Ticket::new(2)));

        // the answer sized for the old limit is dropped
        assert!(!state.on_fetched(Ticket::new(1), paged(&["a", "b"], 9, 1, 2)));
        assert!(state.is_loading());

        assert!(state.on_fetched(
            Ticket::new(2),
            paged(&["a", "b", "c", "d", "e"], 9, 1, 5)
        ));
        assert_eq!(state.items().len(), 5);
        assert_eq!(state.pagination().unwrap().per_page, 5);
    }

    #[test]
    fn resize_before_any_query_does_not_fetch() {
        let mut state = ListState::<Item>::new(PagingMode::Remote, 2);
        assert_eq!(state.resize_limit(5, Ticket::new(1)), Ok(None));
        assert_eq!(state.window().limit, 5);
        assert_eq!(state.phase(), &Phase::Idle);
    }

    #[test]
    fn resize_rejects_zero() {
        let mut state = ListState::<Item>::new(PagingMode::Remote, 2);
        assert_eq!(
            state.resize_limit(0, Ticket::new(1)),
            Err(StateError::InvalidLimit)
        );
        assert_eq!(state.window().limit, 2);
    }

    #[test]
    fn resize_then_first_page_matches_fresh_submit() {
        let mut resized = ListState::new(PagingMode::Remote, 2);
        resized.submit("q", Ticket::new(1));
        resized.on_fetched(Ticket::new(1), paged(&["a", "b"], 6, 1, 2));
        resized.resize_limit(3, Ticket::new(2)).unwrap();
        let req = resized.goto_page(1, Ticket::new(3)).unwrap().unwrap();

        let mut fresh = ListState::<Item>::new(PagingMode::Remote, 3);
        let fresh_req = fresh.submit("q", Ticket::new(9));

        assert_eq!(req.window, fresh_req.window);
        assert_eq!(req.query, fresh_req.query);

        resized.on_fetched(Ticket::new(3), paged(&["a", "b", "c"], 6, 1, 3));
        fresh.on_fetched(Ticket::new(9), paged(&["a", "b", "c"], 6, 1, 3));
        assert_eq!(resized.items(), fresh.items());
        assert_eq!(resized.pagination(), fresh.pagination());
    }

    #[test]
    fn clear_restores_initial_state() {
        let initial = ListState::<Item>::new(PagingMode::Remote, 8);
        let mut state = initial.clone();
        state.submit("q", Ticket::new(1));
        state.on_fetched(Ticket::new(1), paged(&["a"], 20, 1, 8));
        state.resize_limit(3, Ticket::new(2)).unwrap();
        state.select("a");

        state.clear();
        assert_eq!(state, initial);

        // a response for the orphaned fetch is dropped
        assert!(!state.on_fetched(Ticket::new(2), list(&["z"])));
        assert_eq!(state, initial);
    }

    #[test]
    fn local_mode_sorts_and_pages_without_fetching() {
        let mut state = ListState::new(PagingMode::Local, 2);
        state.submit("", Ticket::new(1));
        state.on_fetched(Ticket::new(1), list(&["delta", "alpha", "charlie", "bravo", "echo"]));

        assert_eq!(state.items(), &[Item("alpha"), Item("bravo")]);
        assert_eq!(state.pagination().unwrap().total_page, 3);

        assert_eq!(state.goto_page(3, Ticket::new(2)), Ok(None));
        assert_eq!(state.items(), &[Item("echo")]);
        assert_eq!(state.pagination().unwrap().page, 3);

        assert_eq!(state.resize_limit(4, Ticket::new(3)), Ok(None));
        assert_eq!(state.items().len(), 4);
        assert_eq!(state.window().page, 1);
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn local_page_requested_while_loading_is_clamped() {
        let mut state = ListState::new(PagingMode::Local, 2);
        state.submit("", Ticket::new(1));
        assert_eq!(state.goto_page(50, Ticket::new(2)), Ok(None));

        state.on_fetched(Ticket::new(1), list(&["c", "a", "b"]));
        assert_eq!(state.window().page, 2);
        assert_eq!(state.items(), &[Item("c")]);
        assert_eq!(
            state.pagination().copied(),
            Some(Pagination {
                total: 3,
                page: 2,
                per_page: 2,
                total_page: 2
            })
        );
    }

    #[test]
    fn empty_local_collection_stays_on_page_one() {
        let mut state = ListState::<Item>::new(PagingMode::Local, 2);
        state.submit("", Ticket::new(1));
        state.goto_page(4, Ticket::new(2)).unwrap();
        state.on_fetched(Ticket::new(1), list(&[]));
        assert_eq!(state.window().page, 1);
        assert!(state.items().is_empty());
    }
}
