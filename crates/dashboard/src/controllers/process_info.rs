use std::time::Instant;

use api_types::{
    bulk_load::{BulkLoadError, ProcessDetails},
    client::ClientDetail,
    page::PaginatedResponse,
};

use crate::{
    client::ClientResult,
    controllers::{
        debounce::{Debouncer, FILTER_QUIET},
        filters::{ClientFilter, ErrorFilter},
        list::{ListController, ListScope, PageRequest},
        process_details::ProcessRequest,
    },
};

/// Page size of both sub-lists.
pub const SECTION_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoRequest {
    Details(ProcessRequest),
    Errors(PageRequest),
    Clients(PageRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPane {
    Errors,
    Clients,
}

impl InfoPane {
    pub fn toggle(self) -> Self {
        match self {
            Self::Errors => Self::Clients,
            Self::Clients => Self::Errors,
        }
    }
}

/// Filter inputs of the dialog, each with its own quiet period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFilter {
    IdType,
    ClientName,
    ClientCode,
}

impl InfoFilter {
    pub fn next(self) -> Self {
        match self {
            Self::IdType => Self::ClientName,
            Self::ClientName => Self::ClientCode,
            Self::ClientCode => Self::IdType,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IdType => "Id type",
            Self::ClientName => "Client name",
            Self::ClientCode => "Client code",
        }
    }

    pub fn pane(self) -> InfoPane {
        match self {
            Self::IdType => InfoPane::Errors,
            Self::ClientName | Self::ClientCode => InfoPane::Clients,
        }
    }
}

/// Consolidated process dialog: details, validation errors and imported
/// clients, each loading independently with its own cursor and filter.
#[derive(Debug)]
pub struct ProcessInfoController {
    process_id: String,
    details: Option<ProcessDetails>,
    details_loading: bool,
    details_error: Option<String>,
    details_generation: u64,
    errors: ListController<BulkLoadError, ErrorFilter>,
    clients: ListController<ClientDetail, ClientFilter>,
    id_type_filter: Debouncer<String>,
    name_filter: Debouncer<String>,
    code_filter: Debouncer<String>,
    filter_field: InfoFilter,
    focus: InfoPane,
}

impl ProcessInfoController {
    pub fn new(process_id: &str) -> Self {
        let process_id = process_id.trim().to_string();
        let scope = ListScope::Process((!process_id.is_empty()).then(|| process_id.clone()));
        Self {
            process_id,
            details: None,
            details_loading: false,
            details_error: None,
            details_generation: 0,
            errors: ListController::new(scope.clone(), SECTION_PAGE_SIZE),
            clients: ListController::new(scope, SECTION_PAGE_SIZE),
            id_type_filter: Debouncer::new(FILTER_QUIET, String::new()),
            name_filter: Debouncer::new(FILTER_QUIET, String::new()),
            code_filter: Debouncer::new(FILTER_QUIET, String::new()),
            filter_field: InfoFilter::IdType,
            focus: InfoPane::Errors,
        }
    }

    /// Everything the dialog loads on open, to be fetched concurrently.
    pub fn start(&mut self) -> Vec<InfoRequest> {
        let mut requests = Vec::with_capacity(3);
        if self.process_id.is_empty() {
            self.details_error = Some("Process id not provided.".to_string());
        } else {
            self.details_generation += 1;
            self.details_loading = true;
            self.details_error = None;
            requests.push(InfoRequest::Details(ProcessRequest {
                generation: self.details_generation,
                process_id: self.process_id.clone(),
            }));
        }
        requests.extend(self.errors.load().map(InfoRequest::Errors));
        requests.extend(self.clients.load().map(InfoRequest::Clients));
        requests
    }

    pub fn apply_details(&mut self, generation: u64, result: ClientResult<ProcessDetails>) {
        if generation != self.details_generation {
            return;
        }
        self.details_loading = false;
        match result {
            Ok(details) => self.details = Some(details),
            Err(err) => self.details_error = Some(err.user_message()),
        }
    }

    pub fn apply_errors(
        &mut self,
        generation: u64,
        result: ClientResult<PaginatedResponse<BulkLoadError>>,
    ) -> bool {
        self.errors.apply(generation, result)
    }

    pub fn apply_clients(
        &mut self,
        generation: u64,
        result: ClientResult<PaginatedResponse<ClientDetail>>,
    ) -> bool {
        self.clients.apply(generation, result)
    }

    fn debouncer(&self, field: InfoFilter) -> &Debouncer<String> {
        match field {
            InfoFilter::IdType => &self.id_type_filter,
            InfoFilter::ClientName => &self.name_filter,
            InfoFilter::ClientCode => &self.code_filter,
        }
    }

    /// Text of the filter being edited.
    pub fn filter_input(&self) -> &str {
        self.debouncer(self.filter_field).current()
    }

    pub fn filter_field(&self) -> InfoFilter {
        self.filter_field
    }

    /// Moves editing to the next filter and focuses the pane it narrows.
    pub fn cycle_filter_field(&mut self) {
        self.filter_field = self.filter_field.next();
        self.focus = self.filter_field.pane();
    }

    /// Replaces the edited filter's text; the reload waits for the quiet
    /// period.
    pub fn edit_filter(&mut self, edit: impl FnOnce(&mut String), now: Instant) {
        let debouncer = match self.filter_field {
            InfoFilter::IdType => &mut self.id_type_filter,
            InfoFilter::ClientName => &mut self.name_filter,
            InfoFilter::ClientCode => &mut self.code_filter,
        };
        let mut value = debouncer.current().clone();
        edit(&mut value);
        debouncer.input(value, now);
    }

    /// Reloads whichever sub-list's filter settled since the last poll.
    pub fn poll_filters(&mut self, now: Instant) -> Vec<InfoRequest> {
        let mut requests = Vec::new();
        if let Some(id_type) = self.id_type_filter.poll(now) {
            requests.extend(
                self.errors
                    .apply_filter(|filter| filter.id_type = id_type)
                    .map(InfoRequest::Errors),
            );
        }
        // Name and code settling together still cost a single reload.
        let name = self.name_filter.poll(now);
        let code = self.code_filter.poll(now);
        if name.is_some() || code.is_some() {
            let request = self.clients.apply_filter(|filter| {
                if let Some(name) = name {
                    filter.name = name;
                }
                if let Some(code) = code {
                    filter.code = code;
                }
            });
            requests.extend(request.map(InfoRequest::Clients));
        }
        requests
    }

    /// Earliest instant a pending filter may settle.
    pub fn next_deadline(&self) -> Option<Instant> {
        [&self.id_type_filter, &self.name_filter, &self.code_filter]
            .into_iter()
            .filter_map(Debouncer::deadline)
            .min()
    }

    pub fn next_page(&mut self) -> Option<InfoRequest> {
        match self.focus {
            InfoPane::Errors => self.errors.next_page().map(InfoRequest::Errors),
            InfoPane::Clients => self.clients.next_page().map(InfoRequest::Clients),
        }
    }

    pub fn prev_page(&mut self) -> Option<InfoRequest> {
        match self.focus {
            InfoPane::Errors => self.errors.prev_page().map(InfoRequest::Errors),
            InfoPane::Clients => self.clients.prev_page().map(InfoRequest::Clients),
        }
    }

    pub fn select_next(&mut self) {
        match self.focus {
            InfoPane::Errors => self.errors.select_next(),
            InfoPane::Clients => self.clients.select_next(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            InfoPane::Errors => self.errors.select_prev(),
            InfoPane::Clients => self.clients.select_prev(),
        }
    }

    /// Switches pane; editing moves to that pane's first filter.
    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
        self.filter_field = match self.focus {
            InfoPane::Errors => InfoFilter::IdType,
            InfoPane::Clients => InfoFilter::ClientName,
        };
    }

    pub fn focus(&self) -> InfoPane {
        self.focus
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn details(&self) -> Option<&ProcessDetails> {
        self.details.as_ref()
    }

    pub fn details_loading(&self) -> bool {
        self.details_loading
    }

    pub fn details_error(&self) -> Option<&str> {
        self.details_error.as_deref()
    }

    pub fn errors(&self) -> &ListController<BulkLoadError, ErrorFilter> {
        &self.errors
    }

    pub fn clients(&self) -> &ListController<ClientDetail, ClientFilter> {
        &self.clients
    }

    pub fn selected_client(&self) -> Option<&ClientDetail> {
        self.clients.selected()
    }
}
