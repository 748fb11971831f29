use super::models::Post;
use super::source::{FetchError, PostSource};
use tracing::debug;

pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingState {
    pub items: Vec<Post>,
    pub loading: bool,
    pub error_message: Option<String>,
    pub search_term: String,
    pub current_page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error_message: None,
            search_term: String::new(),
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct ListingBrowser {
    state: ListingState,
    generation: u64,
    mounted: bool,
    in_flight: bool,
}

impl ListingBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Starts a fresh mount. Returns the ticket for its single retrieval, or
    /// `None` if already mounted.
    pub fn mount(&mut self) -> Option<FetchTicket> {
        if self.mounted {
            return None;
        }

        self.generation += 1;
        self.state = ListingState::default();
        self.mounted = true;
        self.in_flight = true;
        debug!(generation = self.generation, "listing mounted");
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = false;
        debug!(generation = self.generation, "listing unmounted");
    }

    /// Applies a retrieval outcome. Outcomes for a previous or inactive mount
    /// are discarded and `false` is returned.
    pub fn apply(&mut self, ticket: FetchTicket, outcome: Result<Vec<Post>, FetchError>) -> bool {
        if !self.mounted || !self.in_flight || ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        self.in_flight = false;
        self.state.loading = false;
        match outcome {
            Ok(posts) => {
                self.state.items = posts;
                self.state.error_message = None;
            }
            Err(e) => {
                self.state.items.clear();
                self.state.error_message = Some(e.to_string());
            }
        }
        true
    }

    pub fn fetch_all(&mut self, source: &dyn PostSource) -> bool {
        match self.mount() {
            Some(ticket) => {
                let outcome = source.fetch_posts();
                self.apply(ticket, outcome)
            }
            None => false,
        }
    }

    pub fn search(&mut self, term: &str) {
        self.state.search_term = term.to_string();
        self.state.current_page = 1;
    }

    pub fn filtered(&self) -> Vec<&Post> {
        let needle = self.state.search_term.to_lowercase();
        self.state.items.iter().filter(|post| post.matches(&needle)).collect()
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(PAGE_SIZE)
    }

    pub fn set_page(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        self.state.current_page = page.clamp(1, last);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.current_page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.state.current_page.saturating_sub(1));
    }

    pub fn visible_page(&self) -> Vec<&Post> {
        let start = (self.state.current_page - 1) * PAGE_SIZE;
        self.filtered().into_iter().skip(start).take(PAGE_SIZE).collect()
    }

    pub fn show_pager(&self) -> bool {
        self.filtered().len() > PAGE_SIZE
    }
}
