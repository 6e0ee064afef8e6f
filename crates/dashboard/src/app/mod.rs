mod tasks;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;

use api_types::{
    bulk_load::{BulkLoadError, BulkLoadProcess, BulkLoadResponse},
    client::ClientDetail,
};

use crate::{
    client::{ClientError, Gateway},
    config::AppConfig,
    controllers::{
        ClientDetailsController, ClientFetch, ClientFilter, ClientRequest, ErrorFilter,
        HealthMonitor, HealthPoller, InfoPane, InfoRequest, ListController, ListScope, PageRequest,
        PagedList, Probe, ProcessDetailsController, ProcessFilter, ProcessInfoController,
        ProcessRequest, UploadController, UploadTicket,
    },
    error::{AppError, Result},
    routes::Route,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub use tasks::{AppEvent, Payload, ScopeId, Scopes, TaskScope};

pub const TOAST_TTL: Duration = Duration::from_secs(5);
const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Clients,
    Health,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Dashboard, Section::Clients, Section::Health];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Clients => "Clients",
            Self::Health => "Health",
        }
    }

    pub fn key(self) -> char {
        match self {
            Self::Dashboard => '1',
            Self::Clients => '2',
            Self::Health => '3',
        }
    }

    pub fn of(route: &Route) -> Self {
        match route {
            Route::Dashboard | Route::Clients(_) | Route::Errors(_) => Self::Dashboard,
            Route::AllClients => Self::Clients,
            Route::Health => Self::Health,
        }
    }

    fn route(self) -> Route {
        match self {
            Self::Dashboard => Route::Dashboard,
            Self::Clients => Route::AllClients,
            Self::Health => Route::Health,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub level: ToastLevel,
    pub message: String,
    pub expires_at: Instant,
}

impl ToastState {
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// What a text prompt edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    UploadPath,
    FileName,
    ClientName,
    ClientCode,
    IdType,
    FindByCode,
    FindById,
    Goto,
}

impl EditTarget {
    pub fn label(self) -> &'static str {
        match self {
            Self::UploadPath => "File path",
            Self::FileName => "File name",
            Self::ClientName => "Name",
            Self::ClientCode => "Client code",
            Self::IdType => "Id type",
            Self::FindByCode => "Find client by code",
            Self::FindById => "Find client by id",
            Self::Goto => "Go to",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing { target: EditTarget, buffer: String },
    /// Keystrokes feed the debounced filter of the open process-info dialog.
    DialogFilter,
}

#[derive(Debug)]
pub struct DashboardState {
    pub upload: UploadController,
    pub history: ListController<BulkLoadProcess, ProcessFilter>,
}

#[derive(Debug)]
pub enum Screen {
    Dashboard(DashboardState),
    Clients(ListController<ClientDetail, ClientFilter>),
    Errors(ListController<BulkLoadError, ErrorFilter>),
    AllClients(ListController<ClientDetail, ClientFilter>),
    Health(HealthMonitor),
}

#[derive(Debug)]
pub enum Dialog {
    ClientDetails(ClientDetailsController),
    ProcessDetails(ProcessDetailsController),
    ProcessInfo(ProcessInfoController),
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,
    pub screen: Screen,
    /// Open dialogs, topmost last.
    pub dialogs: Vec<Dialog>,
    pub header_health: HealthPoller,
    pub toast: Option<ToastState>,
    pub input: InputMode,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy)]
enum PageKind {
    Processes,
    ProcessClients,
    ProcessErrors,
    AllClients,
}

enum Followup {
    Uploaded(BulkLoadResponse),
    OpenDialog(Dialog),
    Navigate(Route),
    ClientsFallback {
        process_id: String,
        message: Option<String>,
    },
    EnterDialogFilter,
}

pub struct App<G> {
    config: AppConfig,
    gateway: G,
    pub state: AppState,
    scopes: Scopes,
    events: mpsc::UnboundedReceiver<AppEvent>,
    header_scope: TaskScope,
    screen_scope: TaskScope,
    /// One scope per open dialog, parallel to `state.dialogs`.
    dialog_scopes: Vec<TaskScope>,
    should_quit: bool,
}

impl<G: Gateway> App<G> {
    pub fn new(config: AppConfig, gateway: G) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let mut scopes = Scopes::new(tx);
        let header_scope = scopes.open();
        let screen_scope = scopes.open();
        let state = AppState {
            route: Route::Dashboard,
            screen: Screen::Dashboard(dashboard_state(&config)),
            dialogs: Vec::new(),
            header_health: HealthPoller::new(config.health_interval()),
            toast: None,
            input: InputMode::Normal,
            base_url: config.base_url.clone(),
        };

        Self {
            config,
            gateway,
            state,
            scopes,
            events,
            header_scope,
            screen_scope,
            dialog_scopes: Vec::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        self.start(Instant::now());

        while !self.should_quit {
            let now = Instant::now();
            self.drain_events(now);
            self.tick(now);

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(self.poll_timeout(Instant::now()))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key, Instant::now()),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
            tokio::task::yield_now().await;
        }

        tracing::info!("dashboard closed");
        Ok(())
    }

    /// Starts the header health poller and opens the configured route.
    pub fn start(&mut self, now: Instant) {
        let generation = self.state.header_health.start(now);
        spawn_health(&self.gateway, &mut self.header_scope, generation);
        let route = Route::parse(&self.config.route);
        self.navigate(route, now);
    }

    /// How long the loop may wait for input before the next timer is due.
    fn poll_timeout(&self, now: Instant) -> Duration {
        let deadlines = self.state.dialogs.iter().filter_map(|dialog| match dialog {
            Dialog::ProcessInfo(info) => info.next_deadline(),
            _ => None,
        });
        poll_timeout(deadlines, now)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Waits for the next completed background fetch.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events.recv().await
    }

    pub fn drain_events(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event, now);
        }
    }

    /// Replaces the current screen. Every dialog and every task of the old
    /// screen is dropped.
    pub fn navigate(&mut self, route: Route, now: Instant) {
        self.close_dialogs();
        self.state.input = InputMode::Normal;
        self.screen_scope = self.scopes.open();

        let size = self.config.page_size;
        self.state.screen = match &route {
            Route::Dashboard => Screen::Dashboard(dashboard_state(&self.config)),
            Route::Clients(process_id) => {
                Screen::Clients(ListController::new(ListScope::Process(process_id.clone()), size))
            }
            Route::Errors(process_id) => {
                Screen::Errors(ListController::new(ListScope::Process(process_id.clone()), size))
            }
            Route::AllClients => Screen::AllClients(ListController::new(ListScope::Global, size)),
            Route::Health => Screen::Health(HealthMonitor::new(self.config.health_interval())),
        };
        tracing::info!(route = %route, "navigate");
        self.state.route = route;

        if let Screen::Health(monitor) = &mut self.state.screen {
            let generation = monitor.start(now);
            spawn_health_check(&self.gateway, &mut self.screen_scope, generation);
            return;
        }
        let request = self.screen_list().and_then(|list| list.refresh());
        self.dispatch_page(request);
    }

    /// Timers: health schedules, settled dialog filters, toast expiry and
    /// panicked tasks.
    pub fn tick(&mut self, now: Instant) {
        if let Some(generation) = self.state.header_health.tick(now) {
            spawn_health(&self.gateway, &mut self.header_scope, generation);
        }
        if let Screen::Health(monitor) = &mut self.state.screen {
            if let Some(generation) = monitor.tick(now) {
                spawn_health_check(&self.gateway, &mut self.screen_scope, generation);
            }
        }
        for (dialog, scope) in self.state.dialogs.iter_mut().zip(&mut self.dialog_scopes) {
            if let Dialog::ProcessInfo(info) = dialog {
                for request in info.poll_filters(now) {
                    spawn_info(&self.gateway, scope, request);
                }
            }
        }

        if self.state.toast.as_ref().is_some_and(|toast| toast.expired(now)) {
            self.state.toast = None;
        }

        let mut failures = self.header_scope.reap();
        failures.extend(self.screen_scope.reap());
        for scope in &mut self.dialog_scopes {
            failures.extend(scope.reap());
        }
        if let Some(message) = failures.pop() {
            self.show_toast(ToastLevel::Error, message, now);
        }
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>, now: Instant) {
        self.state.toast = Some(ToastState {
            level,
            message: message.into(),
            expires_at: now + TOAST_TTL,
        });
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        let AppEvent { scope, payload } = event;
        if scope == self.header_scope.id() {
            if let Payload::Health { generation, result } = payload {
                self.state.header_health.complete(generation, result);
            }
            return;
        }
        if scope == self.screen_scope.id() {
            self.apply_screen(payload, now);
            return;
        }
        if let Some(index) = self.dialog_scopes.iter().position(|s| s.id() == scope) {
            self.apply_dialog(index, payload);
            return;
        }
        tracing::trace!(scope, "dropping event of a closed scope");
    }

    fn apply_screen(&mut self, payload: Payload, now: Instant) {
        let followup = match (&mut self.state.screen, payload) {
            (Screen::Dashboard(dashboard), Payload::Processes { generation, result }) => {
                dashboard.history.apply(generation, result);
                None
            }
            (Screen::Dashboard(dashboard), Payload::Uploaded { generation, result }) => dashboard
                .upload
                .finish(generation, result)
                .map(Followup::Uploaded),
            (Screen::Dashboard(_), Payload::FirstClient { process_id, result }) => match result {
                Ok(page) => match page.content.into_iter().next() {
                    Some(client) => Some(Followup::OpenDialog(Dialog::ClientDetails(
                        ClientDetailsController::enriched(client),
                    ))),
                    None => Some(Followup::ClientsFallback {
                        process_id,
                        message: None,
                    }),
                },
                Err(err) => Some(Followup::ClientsFallback {
                    process_id,
                    message: Some(err.user_message()),
                }),
            },
            (
                Screen::Clients(list) | Screen::AllClients(list),
                Payload::Clients { generation, result },
            ) => {
                list.apply(generation, result);
                None
            }
            (Screen::Errors(list), Payload::Errors { generation, result }) => {
                list.apply(generation, result);
                None
            }
            (Screen::Health(monitor), Payload::Health { generation, result }) => {
                monitor.complete_health(generation, result);
                None
            }
            (Screen::Health(monitor), Payload::Probe { probe, result }) => {
                monitor.complete_probe(probe, result);
                None
            }
            (_, payload) => {
                tracing::debug!(
                    route = %self.state.route,
                    "unexpected screen payload: {payload:?}"
                );
                None
            }
        };
        self.run_followup(followup, now);
    }

    fn apply_dialog(&mut self, index: usize, payload: Payload) {
        let (Some(dialog), Some(scope)) = (
            self.state.dialogs.get_mut(index),
            self.dialog_scopes.get_mut(index),
        ) else {
            return;
        };
        let gateway = &self.gateway;

        match (dialog, payload) {
            (Dialog::ClientDetails(details), Payload::Client { generation, result }) => {
                if let Some(next) = details.apply_client(generation, result) {
                    spawn_client_fetch(gateway, scope, next);
                }
            }
            (Dialog::ClientDetails(details), Payload::Account { generation, result }) => {
                if let Some(next) = details.apply_account(generation, result) {
                    spawn_client_fetch(gateway, scope, next);
                }
            }
            (Dialog::ClientDetails(details), Payload::FirstPayment { generation, result }) => {
                details.apply_first_payment(generation, result);
            }
            (Dialog::ProcessDetails(details), Payload::ProcessDetails { generation, result }) => {
                details.apply_details(generation, result);
            }
            (Dialog::ProcessDetails(details), Payload::Statistics { generation, result }) => {
                details.apply_statistics(generation, result);
            }
            (Dialog::ProcessDetails(details), Payload::ProcessStatus { generation, result }) => {
                details.apply_status(generation, result);
            }
            (Dialog::ProcessInfo(info), Payload::ProcessDetails { generation, result }) => {
                info.apply_details(generation, result);
            }
            (Dialog::ProcessInfo(info), Payload::Errors { generation, result }) => {
                info.apply_errors(generation, result);
            }
            (Dialog::ProcessInfo(info), Payload::Clients { generation, result }) => {
                info.apply_clients(generation, result);
            }
            (_, payload) => {
                tracing::debug!(index, "unexpected dialog payload: {payload:?}");
            }
        }
    }

    fn run_followup(&mut self, followup: Option<Followup>, now: Instant) {
        match followup {
            None => {}
            Some(Followup::Uploaded(response)) => {
                tracing::info!(
                    process_id = %response.process_id,
                    created = response.success_count,
                    rejected = response.error_count,
                    "upload completed"
                );
                self.show_toast(
                    ToastLevel::Success,
                    format!("{} clients created", response.success_count),
                    now,
                );
                self.navigate(Route::Clients(Some(response.process_id)), now);
            }
            Some(Followup::OpenDialog(dialog)) => self.open_dialog(dialog),
            Some(Followup::Navigate(route)) => self.navigate(route, now),
            Some(Followup::ClientsFallback {
                process_id,
                message,
            }) => {
                if let Some(message) = message {
                    self.show_toast(ToastLevel::Warning, message, now);
                }
                self.navigate(Route::Clients(Some(process_id)), now);
            }
            Some(Followup::EnterDialogFilter) => self.state.input = InputMode::DialogFilter,
        }
    }

    pub fn open_dialog(&mut self, mut dialog: Dialog) {
        let mut scope = self.scopes.open();
        match &mut dialog {
            Dialog::ClientDetails(details) => {
                if let Some(request) = details.start() {
                    spawn_client_fetch(&self.gateway, &mut scope, request);
                }
            }
            Dialog::ProcessDetails(details) => {
                if let Some(request) = details.load() {
                    spawn_process_details(&self.gateway, &mut scope, request);
                }
            }
            Dialog::ProcessInfo(info) => {
                for request in info.start() {
                    spawn_info(&self.gateway, &mut scope, request);
                }
            }
        }
        self.dialog_scopes.push(scope);
        self.state.dialogs.push(dialog);
    }

    pub fn close_dialog(&mut self) {
        self.state.dialogs.pop();
        self.dialog_scopes.pop();
        if self.state.input == InputMode::DialogFilter {
            self.state.input = InputMode::Normal;
        }
    }

    fn close_dialogs(&mut self) {
        self.state.dialogs.clear();
        self.dialog_scopes.clear();
    }

    fn screen_list(&mut self) -> Option<&mut dyn PagedList> {
        match &mut self.state.screen {
            Screen::Dashboard(dashboard) => Some(&mut dashboard.history),
            Screen::Clients(list) | Screen::AllClients(list) => Some(list),
            Screen::Errors(list) => Some(list),
            Screen::Health(_) => None,
        }
    }

    fn dispatch_page(&mut self, request: Option<PageRequest>) {
        let Some(request) = request else {
            return;
        };
        let kind = match &self.state.screen {
            Screen::Dashboard(_) => PageKind::Processes,
            Screen::Clients(_) => PageKind::ProcessClients,
            Screen::Errors(_) => PageKind::ProcessErrors,
            Screen::AllClients(_) => PageKind::AllClients,
            Screen::Health(_) => return,
        };
        spawn_page(&self.gateway, &mut self.screen_scope, kind, request);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.input {
            InputMode::Editing { .. } => self.handle_editing(action, now),
            InputMode::DialogFilter => self.handle_dialog_filter(action, now),
            InputMode::Normal if self.state.dialogs.is_empty() => {
                self.handle_screen_key(action, now)
            }
            InputMode::Normal => self.handle_dialog_key(action, now),
        }
    }

    fn begin_edit(&mut self, target: EditTarget) {
        self.state.input = InputMode::Editing {
            target,
            buffer: String::new(),
        };
    }

    fn handle_editing(&mut self, action: AppAction, now: Instant) {
        let InputMode::Editing { target, buffer } = &mut self.state.input else {
            return;
        };
        match action {
            AppAction::Input(ch) => buffer.push(ch),
            AppAction::Backspace => {
                buffer.pop();
            }
            AppAction::Cancel => self.state.input = InputMode::Normal,
            AppAction::Submit => {
                let target = *target;
                let value = std::mem::take(buffer);
                self.state.input = InputMode::Normal;
                self.submit_edit(target, value, now);
            }
            _ => {}
        }
    }

    fn submit_edit(&mut self, target: EditTarget, value: String, now: Instant) {
        match target {
            EditTarget::UploadPath => {
                self.pick_file(value.trim());
                return;
            }
            EditTarget::FindByCode => {
                if !value.trim().is_empty() {
                    self.open_dialog(Dialog::ClientDetails(ClientDetailsController::by_code(
                        &value,
                    )));
                }
                return;
            }
            EditTarget::FindById => {
                let value = value.trim();
                if value.is_empty() {
                    return;
                }
                match value.parse::<i64>() {
                    Ok(id) => self.open_dialog(Dialog::ClientDetails(
                        ClientDetailsController::by_id(id),
                    )),
                    Err(_) => {
                        self.show_toast(ToastLevel::Warning, "Client id must be a number.", now)
                    }
                }
                return;
            }
            EditTarget::Goto => {
                self.navigate(Route::parse(value.trim()), now);
                return;
            }
            _ => {}
        }

        let request = match (&mut self.state.screen, target) {
            (Screen::Dashboard(dashboard), EditTarget::FileName) => dashboard
                .history
                .apply_filter(|filter| filter.file_name = value),
            (Screen::Clients(list) | Screen::AllClients(list), EditTarget::ClientName) => {
                list.apply_filter(|filter| filter.name = value)
            }
            (Screen::Clients(list) | Screen::AllClients(list), EditTarget::ClientCode) => {
                list.apply_filter(|filter| filter.code = value)
            }
            (Screen::Errors(list), EditTarget::IdType) => {
                list.apply_filter(|filter| filter.id_type = value)
            }
            _ => None,
        };
        self.dispatch_page(request);
    }

    fn pick_file(&mut self, path: &str) {
        let Screen::Dashboard(dashboard) = &mut self.state.screen else {
            return;
        };
        if path.is_empty() {
            return;
        }
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                if let Err(err) = dashboard.upload.select(path, meta.len()) {
                    tracing::info!(path, "file rejected: {err}");
                }
            }
            Ok(_) => dashboard.upload.reject(format!("{path} is not a file.")),
            Err(err) => dashboard.upload.reject(format!("Cannot open {path}: {err}")),
        }
    }

    fn handle_screen_key(&mut self, action: AppAction, now: Instant) {
        match action {
            AppAction::Cancel => {
                if matches!(self.state.route, Route::Clients(_) | Route::Errors(_)) {
                    self.navigate(Route::Dashboard, now);
                }
            }
            AppAction::Up => {
                if let Some(list) = self.screen_list() {
                    list.select_prev();
                }
            }
            AppAction::Down => {
                if let Some(list) = self.screen_list() {
                    list.select_next();
                }
            }
            AppAction::NextPage => {
                let request = self.screen_list().and_then(|list| list.next_page());
                self.dispatch_page(request);
            }
            AppAction::PrevPage => {
                let request = self.screen_list().and_then(|list| list.prev_page());
                self.dispatch_page(request);
            }
            AppAction::Submit => self.open_selected(),
            AppAction::Input(ch) => self.handle_screen_char(ch, now),
            _ => {}
        }
    }

    fn handle_screen_char(&mut self, ch: char, now: Instant) {
        if self.handle_local_char(ch, now) {
            return;
        }
        match ch {
            'q' => self.should_quit = true,
            'g' => self.begin_edit(EditTarget::Goto),
            'r' => self.refresh(),
            'n' => self.handle_screen_key(AppAction::NextPage, now),
            'p' => self.handle_screen_key(AppAction::PrevPage, now),
            'j' => self.handle_screen_key(AppAction::Down, now),
            'k' => self.handle_screen_key(AppAction::Up, now),
            'z' => {
                let request = self.screen_list().and_then(|list| list.cycle_page_size());
                self.dispatch_page(request);
            }
            'x' => {
                let request = self.screen_list().and_then(|list| list.clear_filters());
                self.dispatch_page(request);
            }
            _ => {
                if let Some(section) = Section::ALL.into_iter().find(|s| s.key() == ch) {
                    self.navigate(section.route(), now);
                }
            }
        }
    }

    /// Keys that only mean something on the current screen.
    fn handle_local_char(&mut self, ch: char, now: Instant) -> bool {
        match &mut self.state.screen {
            Screen::Dashboard(dashboard) => match ch {
                'o' => self.begin_edit(EditTarget::UploadPath),
                'u' => {
                    if let Some(ticket) = dashboard.upload.begin_upload() {
                        spawn_upload(&self.gateway, &mut self.screen_scope, ticket);
                    }
                }
                'd' => dashboard.upload.clear(),
                '/' => self.begin_edit(EditTarget::FileName),
                's' => {
                    let request = dashboard.history.apply_filter(ProcessFilter::cycle_status);
                    self.dispatch_page(request);
                }
                'i' | 'c' | 'e' | 'v' => {
                    let Some(process_id) = dashboard
                        .history
                        .selected()
                        .map(|process| process.process_id.clone())
                    else {
                        return true;
                    };
                    match ch {
                        'i' => self.open_dialog(Dialog::ProcessInfo(ProcessInfoController::new(
                            &process_id,
                        ))),
                        'c' => self.navigate(Route::Clients(Some(process_id)), now),
                        'e' => self.navigate(Route::Errors(Some(process_id)), now),
                        _ => self.view_first_client(process_id),
                    }
                }
                _ => return false,
            },
            Screen::Clients(_) => match ch {
                '/' => self.begin_edit(EditTarget::ClientName),
                'c' => self.begin_edit(EditTarget::ClientCode),
                _ => return false,
            },
            Screen::AllClients(_) => match ch {
                '/' => self.begin_edit(EditTarget::ClientName),
                'c' => self.begin_edit(EditTarget::ClientCode),
                'f' => self.begin_edit(EditTarget::FindByCode),
                'i' => self.begin_edit(EditTarget::FindById),
                _ => return false,
            },
            Screen::Errors(_) => match ch {
                '/' => self.begin_edit(EditTarget::IdType),
                _ => return false,
            },
            Screen::Health(_) => return false,
        }
        true
    }

    /// Opens the first client of a process; falls back to the process
    /// clients screen when there is none or the lookup fails.
    fn view_first_client(&mut self, process_id: String) {
        let gateway = self.gateway.clone();
        self.screen_scope.spawn(async move {
            let result = gateway.process_clients(&process_id, 0, 1).await;
            Payload::FirstClient { process_id, result }
        });
    }

    fn refresh(&mut self) {
        if let Screen::Health(monitor) = &mut self.state.screen {
            let generation = monitor.manual_refresh();
            spawn_health_check(&self.gateway, &mut self.screen_scope, generation);
            return;
        }
        let request = self.screen_list().and_then(|list| list.refresh());
        self.dispatch_page(request);
    }

    fn open_selected(&mut self) {
        let dialog = match &self.state.screen {
            Screen::Dashboard(dashboard) => dashboard.history.selected().map(|process| {
                Dialog::ProcessDetails(ProcessDetailsController::from_process(process.clone()))
            }),
            Screen::Clients(list) | Screen::AllClients(list) => list
                .selected()
                .map(|client| {
                    Dialog::ClientDetails(ClientDetailsController::enriched(client.clone()))
                }),
            Screen::Errors(_) | Screen::Health(_) => None,
        };
        if let Some(dialog) = dialog {
            self.open_dialog(dialog);
        }
    }

    fn handle_dialog_key(&mut self, action: AppAction, now: Instant) {
        if matches!(action, AppAction::Cancel | AppAction::Input('q')) {
            self.close_dialog();
            return;
        }
        let (Some(dialog), Some(scope)) =
            (self.state.dialogs.last_mut(), self.dialog_scopes.last_mut())
        else {
            return;
        };
        let gateway = &self.gateway;

        let followup = match dialog {
            Dialog::ClientDetails(_) => None,
            Dialog::ProcessDetails(details) => match action {
                AppAction::Input('s') => {
                    if let Some(request) = details.refresh_status() {
                        spawn_status(gateway, scope, request);
                    }
                    None
                }
                AppAction::Input('r') => {
                    if let Some(request) = details.load() {
                        spawn_process_details(gateway, scope, request);
                    }
                    None
                }
                AppAction::Input('i') => Some(Followup::OpenDialog(Dialog::ProcessInfo(
                    ProcessInfoController::new(details.process_id()),
                ))),
                AppAction::Input('c') => Some(Followup::Navigate(Route::Clients(Some(
                    details.process_id().to_string(),
                )))),
                AppAction::Input('e') => Some(Followup::Navigate(Route::Errors(Some(
                    details.process_id().to_string(),
                )))),
                _ => None,
            },
            Dialog::ProcessInfo(info) => match action {
                AppAction::NextField => {
                    info.toggle_focus();
                    None
                }
                AppAction::Up | AppAction::Input('k') => {
                    info.select_prev();
                    None
                }
                AppAction::Down | AppAction::Input('j') => {
                    info.select_next();
                    None
                }
                AppAction::NextPage | AppAction::Input('n') => {
                    if let Some(request) = info.next_page() {
                        spawn_info(gateway, scope, request);
                    }
                    None
                }
                AppAction::PrevPage | AppAction::Input('p') => {
                    if let Some(request) = info.prev_page() {
                        spawn_info(gateway, scope, request);
                    }
                    None
                }
                AppAction::Input('/') => Some(Followup::EnterDialogFilter),
                AppAction::Submit if info.focus() == InfoPane::Clients => {
                    info.selected_client().map(|client| {
                        Followup::OpenDialog(Dialog::ClientDetails(
                            ClientDetailsController::enriched(client.clone()),
                        ))
                    })
                }
                _ => None,
            },
        };
        self.run_followup(followup, now);
    }

    fn handle_dialog_filter(&mut self, action: AppAction, now: Instant) {
        let Some(Dialog::ProcessInfo(info)) = self.state.dialogs.last_mut() else {
            self.state.input = InputMode::Normal;
            return;
        };
        match action {
            AppAction::Input(ch) => info.edit_filter(|value| value.push(ch), now),
            AppAction::Backspace => info.edit_filter(
                |value| {
                    value.pop();
                },
                now,
            ),
            AppAction::NextField => info.cycle_filter_field(),
            AppAction::Submit | AppAction::Cancel => self.state.input = InputMode::Normal,
            _ => {}
        }
    }
}

/// The tick rate, shortened so a pending deadline is not overslept.
fn poll_timeout(deadlines: impl Iterator<Item = Instant>, now: Instant) -> Duration {
    deadlines
        .map(|deadline| deadline.saturating_duration_since(now))
        .fold(TICK_RATE, Duration::min)
}

fn dashboard_state(config: &AppConfig) -> DashboardState {
    DashboardState {
        upload: UploadController::new(config.upload_max_bytes),
        history: ListController::new(ListScope::Global, config.page_size),
    }
}

fn spawn_page<G: Gateway>(
    gateway: &G,
    scope: &mut TaskScope,
    kind: PageKind,
    request: PageRequest,
) {
    let gateway = gateway.clone();
    let PageRequest {
        generation,
        process_id,
        page,
        size,
    } = request;
    let process_id = process_id.unwrap_or_default();
    match kind {
        PageKind::Processes => scope.spawn(async move {
            let result = gateway.processes(page, size).await;
            Payload::Processes { generation, result }
        }),
        PageKind::AllClients => scope.spawn(async move {
            let result = gateway.all_clients(page, size).await;
            Payload::Clients { generation, result }
        }),
        PageKind::ProcessClients => scope.spawn(async move {
            let result = gateway.process_clients(&process_id, page, size).await;
            Payload::Clients { generation, result }
        }),
        PageKind::ProcessErrors => scope.spawn(async move {
            let result = gateway.process_errors(&process_id, page, size).await;
            Payload::Errors { generation, result }
        }),
    }
}

fn spawn_health<G: Gateway>(gateway: &G, scope: &mut TaskScope, generation: u64) {
    let gateway = gateway.clone();
    scope.spawn(async move {
        let result = gateway.health().await;
        Payload::Health { generation, result }
    });
}

/// Health plus both probes, for the health screen.
fn spawn_health_check<G: Gateway>(gateway: &G, scope: &mut TaskScope, generation: u64) {
    spawn_health(gateway, scope, generation);
    let readiness = gateway.clone();
    scope.spawn(async move {
        let result = readiness.readiness().await;
        Payload::Probe {
            probe: Probe::Readiness,
            result,
        }
    });
    let liveness = gateway.clone();
    scope.spawn(async move {
        let result = liveness.liveness().await;
        Payload::Probe {
            probe: Probe::Liveness,
            result,
        }
    });
}

fn spawn_upload<G: Gateway>(gateway: &G, scope: &mut TaskScope, ticket: UploadTicket) {
    let gateway = gateway.clone();
    let generation = ticket.generation;
    scope.spawn(async move {
        let read = tokio::fs::read(&ticket.path).await;
        let result = match read {
            Ok(bytes) => match ticket.into_file(bytes) {
                Ok(file) => gateway.upload_clients(&file).await,
                Err(err) => Err(err),
            },
            Err(err) => Err(ClientError::InvalidFile(format!(
                "Cannot read {}: {err}",
                ticket.name
            ))),
        };
        Payload::Uploaded { generation, result }
    });
}

fn spawn_client_fetch<G: Gateway>(gateway: &G, scope: &mut TaskScope, request: ClientRequest) {
    let gateway = gateway.clone();
    let ClientRequest { generation, fetch } = request;
    match fetch {
        ClientFetch::ByCode(code) => scope.spawn(async move {
            let result = gateway.client_by_code(&code).await;
            Payload::Client { generation, result }
        }),
        ClientFetch::ById(id) => scope.spawn(async move {
            let result = gateway.client_by_id(id).await;
            Payload::Client { generation, result }
        }),
        ClientFetch::Account { client_id } => scope.spawn(async move {
            let result = gateway.account_by_client(client_id).await;
            Payload::Account { generation, result }
        }),
        ClientFetch::FirstPayment { account_id } => scope.spawn(async move {
            let result = gateway.first_payment(account_id).await;
            Payload::FirstPayment { generation, result }
        }),
    }
}

/// Details and statistics, fetched concurrently.
fn spawn_process_details<G: Gateway>(gateway: &G, scope: &mut TaskScope, request: ProcessRequest) {
    let ProcessRequest {
        generation,
        process_id,
    } = request;
    let details = gateway.clone();
    let id = process_id.clone();
    scope.spawn(async move {
        let result = details.process_details(&id).await;
        Payload::ProcessDetails { generation, result }
    });
    let statistics = gateway.clone();
    scope.spawn(async move {
        let result = statistics.statistics(&process_id).await;
        Payload::Statistics { generation, result }
    });
}

fn spawn_status<G: Gateway>(gateway: &G, scope: &mut TaskScope, request: ProcessRequest) {
    let gateway = gateway.clone();
    let ProcessRequest {
        generation,
        process_id,
    } = request;
    scope.spawn(async move {
        let result = gateway.process_status(&process_id).await;
        Payload::ProcessStatus { generation, result }
    });
}

fn spawn_info<G: Gateway>(gateway: &G, scope: &mut TaskScope, request: InfoRequest) {
    match request {
        InfoRequest::Details(ProcessRequest {
            generation,
            process_id,
        }) => {
            let gateway = gateway.clone();
            scope.spawn(async move {
                let result = gateway.process_details(&process_id).await;
                Payload::ProcessDetails { generation, result }
            });
        }
        InfoRequest::Errors(request) => {
            spawn_page(gateway, scope, PageKind::ProcessErrors, request);
        }
        InfoRequest::Clients(request) => {
            spawn_page(gateway, scope, PageKind::ProcessClients, request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_follow_routes() {
        assert_eq!(Section::of(&Route::Errors(None)), Section::Dashboard);
        assert_eq!(Section::of(&Route::AllClients), Section::Clients);
        assert_eq!(Section::Health.route(), Route::Health);
    }

    #[test]
    fn poll_timeout_honours_pending_deadlines() {
        let now = Instant::now();
        assert_eq!(poll_timeout(std::iter::empty(), now), TICK_RATE);
        let soon = now + Duration::from_millis(30);
        let later = now + Duration::from_secs(2);
        assert_eq!(poll_timeout([later, soon].into_iter(), now), Duration::from_millis(30));
        assert_eq!(poll_timeout([now].into_iter(), now + Duration::from_millis(5)), Duration::ZERO);
    }

    #[test]
    fn toast_expires_after_ttl() {
        let now = Instant::now();
        let toast = ToastState {
            level: ToastLevel::Info,
            message: "hi".to_string(),
            expires_at: now + TOAST_TTL,
        };
        assert!(!toast.expired(now + Duration::from_secs(4)));
        assert!(toast.expired(now + TOAST_TTL));
    }
}
