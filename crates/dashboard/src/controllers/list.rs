use std::marker::PhantomData;

use api_types::page::PaginatedResponse;

use crate::{client::ClientResult, controllers::filters::RowFilter};

pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 25, 50];

/// What a list is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// A global collection (all clients, process history).
    Global,
    /// Rows of one process; `None` when the route carried no process id.
    Process(Option<String>),
}

/// Parameters of one outbound page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub process_id: Option<String>,
    pub page: u32,
    pub size: u32,
}

/// Paginated list state owned by one screen or dialog section.
///
/// Operations that need data return a [`PageRequest`]; the caller performs the
/// fetch and hands the outcome back to [`ListController::apply`]. Only the
/// response to the most recent request is applied, so out-of-order
/// completions never overwrite a newer page. Page changes replace the buffer;
/// filters only narrow what is shown from the fetched page and leave the
/// server totals untouched.
#[derive(Debug)]
pub struct ListController<T, F> {
    scope: ListScope,
    page: u32,
    size: u32,
    filter: F,
    buffer: PaginatedResponse<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    selected: usize,
    _rows: PhantomData<fn() -> T>,
}

impl<T, F: RowFilter<T>> ListController<T, F> {
    pub fn new(scope: ListScope, size: u32) -> Self {
        let size = size.max(1);
        Self {
            scope,
            page: 0,
            size,
            filter: F::default(),
            buffer: PaginatedResponse::empty(0, size),
            loading: false,
            error: None,
            generation: 0,
            selected: 0,
            _rows: PhantomData,
        }
    }

    /// Starts a fetch of the current page.
    ///
    /// A process-scoped list without a process id records an error and
    /// returns `None`: no request must be issued.
    pub fn load(&mut self) -> Option<PageRequest> {
        let process_id = match &self.scope {
            ListScope::Global => None,
            ListScope::Process(Some(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
            ListScope::Process(_) => {
                self.loading = false;
                self.error = Some("Process id not provided.".to_string());
                return None;
            }
        };

        self.generation += 1;
        self.loading = true;
        self.error = None;
        Some(PageRequest {
            generation: self.generation,
            process_id,
            page: self.page,
            size: self.size,
        })
    }

    pub fn change_page(&mut self, page: u32, size: u32) -> Option<PageRequest> {
        self.page = page;
        self.size = size.max(1);
        self.load()
    }

    /// Advances the cursor while it stays below the last known page; the
    /// cursor may already be ahead of the buffer when a fetch is in flight.
    pub fn next_page(&mut self) -> Option<PageRequest> {
        if self.page.saturating_add(1) >= self.buffer.total_pages {
            return None;
        }
        self.change_page(self.page + 1, self.size)
    }

    pub fn prev_page(&mut self) -> Option<PageRequest> {
        if self.page == 0 {
            return None;
        }
        self.change_page(self.page - 1, self.size)
    }

    /// Moves to the next entry of [`PAGE_SIZE_OPTIONS`] and reloads from the
    /// first page.
    pub fn cycle_page_size(&mut self) -> Option<PageRequest> {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|option| *option > self.size)
            .unwrap_or(PAGE_SIZE_OPTIONS[0]);
        self.change_page(0, next)
    }

    /// Updates the filter, then reloads from the first page.
    pub fn apply_filter(&mut self, update: impl FnOnce(&mut F)) -> Option<PageRequest> {
        update(&mut self.filter);
        self.page = 0;
        self.selected = 0;
        self.load()
    }

    pub fn clear_filters(&mut self) -> Option<PageRequest> {
        self.apply_filter(|filter| *filter = F::default())
    }

    /// Reloads unconditionally from the first page.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        self.page = 0;
        self.load()
    }

    /// Applies the outcome of the request tagged `generation`.
    ///
    /// Returns `false` when the response is stale and was discarded.
    pub fn apply(&mut self, generation: u64, result: ClientResult<PaginatedResponse<T>>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "discarding stale page response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.buffer = page;
                self.error = None;
                let visible = self.visible_len();
                if self.selected >= visible {
                    self.selected = visible.saturating_sub(1);
                }
            }
            Err(err) => {
                self.error = Some(err.user_message());
            }
        }
        true
    }

    pub fn process_id(&self) -> Option<&str> {
        match &self.scope {
            ListScope::Process(Some(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.size
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn buffer(&self) -> &PaginatedResponse<T> {
        &self.buffer
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rows of the fetched page that pass the filter.
    pub fn visible(&self) -> Vec<&T> {
        self.buffer
            .content
            .iter()
            .filter(|row| self.filter.matches(row))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.buffer
            .content
            .iter()
            .filter(|row| self.filter.matches(row))
            .count()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.visible().into_iter().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Paging and selection shared by every list, whatever its row type.
pub trait PagedList {
    fn next_page(&mut self) -> Option<PageRequest>;
    fn prev_page(&mut self) -> Option<PageRequest>;
    fn refresh(&mut self) -> Option<PageRequest>;
    fn cycle_page_size(&mut self) -> Option<PageRequest>;
    fn clear_filters(&mut self) -> Option<PageRequest>;
    fn select_next(&mut self);
    fn select_prev(&mut self);
}

impl<T, F: RowFilter<T>> PagedList for ListController<T, F> {
    fn next_page(&mut self) -> Option<PageRequest> {
        Self::next_page(self)
    }

    fn prev_page(&mut self) -> Option<PageRequest> {
        Self::prev_page(self)
    }

    fn refresh(&mut self) -> Option<PageRequest> {
        Self::refresh(self)
    }

    fn cycle_page_size(&mut self) -> Option<PageRequest> {
        Self::cycle_page_size(self)
    }

    fn clear_filters(&mut self) -> Option<PageRequest> {
        Self::clear_filters(self)
    }

    fn select_next(&mut self) {
        Self::select_next(self)
    }

    fn select_prev(&mut self) {
        Self::select_prev(self)
    }
}
