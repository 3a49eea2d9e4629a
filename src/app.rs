use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::{Action, View};
use crate::auth;
use crate::cloud::CloudClient;
use crate::config::Config;
use crate::event::Event;
use crate::github::GitHub;
use crate::types::{Entry, PageInfo, Stack};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Load lifecycle of one pane. `Failed` and `Loaded`-with-no-entries are
/// distinct on purpose: an empty result is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// List state for one view: the materialized entries plus the filter
/// projection the selection moves within.
#[derive(Debug, Default)]
pub struct Pane {
    pub entries: Vec<Entry>,
    /// Indices into `entries` matching the active filter, in entry order.
    pub visible: Vec<usize>,
    /// Index into `visible`.
    pub selected: usize,
    pub state: LoadState,
    pub total_count: Option<u64>,
    pub page_info: Option<PageInfo>,
    pub fetching_more: bool,
}

impl Pane {
    fn apply_filter(&mut self, filter: &str) {
        let needle = filter.to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                needle.is_empty() || entry.filter_value().to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();

        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.visible.get(self.selected).map(|&i| &self.entries[i])
    }

    fn at_bottom(&self) -> bool {
        !self.visible.is_empty() && self.selected == self.visible.len() - 1
    }

    /// Whether scrolling past the bottom should fetch another page. A
    /// descriptor reporting no next page never triggers a fetch.
    pub fn should_fetch_next_page(&self) -> bool {
        self.state == LoadState::Loaded
            && !self.fetching_more
            && self
                .page_info
                .as_ref()
                .map(|p| p.has_next_page)
                .unwrap_or(false)
    }
}

pub struct App {
    pub view: View,
    pub stacks: Pane,
    pub issues: Pane,
    pub filter: String,
    pub filter_mode: bool,
    pub should_quit: bool,
    pub config: Config,
    load_seq: u64,
    github: Arc<GitHub>,
    cloud: Arc<CloudClient>,
    credentials_path: PathBuf,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        view: View,
        config: Config,
        github: GitHub,
        cloud: CloudClient,
        credentials_path: PathBuf,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            view,
            stacks: Pane::default(),
            issues: Pane::default(),
            filter: String::new(),
            filter_mode: false,
            should_quit: false,
            config,
            load_seq: 0,
            github: Arc::new(github),
            cloud: Arc::new(cloud),
            credentials_path,
            action_tx,
        }
    }

    pub fn pane(&self, view: View) -> &Pane {
        match view {
            View::Stacks => &self.stacks,
            View::Issues => &self.issues,
        }
    }

    fn pane_mut(&mut self, view: View) -> &mut Pane {
        match view {
            View::Stacks => &mut self.stacks,
            View::Issues => &mut self.issues,
        }
    }

    pub fn active_pane(&self) -> &Pane {
        self.pane(self.view)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Refresh,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.filter_mode {
            return match key.code {
                KeyCode::Esc => Action::ClearFilter,
                KeyCode::Enter => Action::FilterConfirm,
                KeyCode::Backspace => Action::FilterBackspace,
                KeyCode::Char(c) => Action::FilterInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') => Action::GoToTop,
            KeyCode::Char('G') => Action::GoToBottom,
            KeyCode::Tab => Action::SwitchView(match self.view {
                View::Stacks => View::Issues,
                View::Issues => View::Stacks,
            }),
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('o') | KeyCode::Enter => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char('/') => Action::EnterFilterMode,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::ScrollUp => {
                let pane = self.pane_mut(self.view);
                if pane.selected > 0 {
                    pane.selected -= 1;
                }
            }
            Action::ScrollDown => {
                let view = self.view;
                let pane = self.pane_mut(view);
                if pane.at_bottom() {
                    if view == View::Issues && pane.should_fetch_next_page() {
                        pane.fetching_more = true;
                        let cursor = pane.page_info.clone();
                        let load_id = self.load_seq;
                        self.spawn_search_issues(load_id, cursor, true);
                    }
                } else if !pane.visible.is_empty() {
                    pane.selected += 1;
                }
            }
            Action::GoToTop => {
                self.pane_mut(self.view).selected = 0;
            }
            Action::GoToBottom => {
                let pane = self.pane_mut(self.view);
                pane.selected = pane.visible.len().saturating_sub(1);
            }

            Action::SwitchView(view) => {
                self.view = view;
                self.filter.clear();
                self.filter_mode = false;
                self.refresh_visible(view);
                if self.pane(view).state == LoadState::Idle {
                    self.start_load(view);
                }
            }
            Action::Refresh => {
                self.start_load(self.view);
            }

            Action::EnterFilterMode => {
                self.filter_mode = true;
            }
            Action::FilterInput(c) => {
                self.filter.push(c);
                self.refresh_visible(self.view);
            }
            Action::FilterBackspace => {
                self.filter.pop();
                self.refresh_visible(self.view);
            }
            Action::FilterConfirm => {
                self.filter_mode = false;
            }
            Action::ClearFilter => {
                self.filter.clear();
                self.filter_mode = false;
                self.refresh_visible(self.view);
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    if let Err(err) = open::that(&url) {
                        tracing::warn!("failed to open {}: {}", url, err);
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    match arboard::Clipboard::new() {
                        Ok(mut clipboard) => {
                            if let Err(err) = clipboard.set_text(url) {
                                tracing::warn!("failed to set clipboard: {}", err);
                            }
                        }
                        Err(err) => tracing::warn!("clipboard unavailable: {}", err),
                    }
                }
            }

            Action::StacksLoaded(stacks, load_id) => {
                if load_id != self.load_seq {
                    tracing::debug!(load_id, "discarding stale stack load");
                    return;
                }
                self.load_stacks(stacks);
            }
            Action::IssuesLoaded(batch, load_id) => {
                if load_id != self.load_seq {
                    tracing::debug!(load_id, "discarding stale issue load");
                    return;
                }
                let pane = &mut self.issues;
                pane.entries = batch.issues.into_iter().map(Entry::Issue).collect();
                pane.total_count = Some(batch.total_count);
                pane.page_info = Some(batch.page_info);
                pane.selected = 0;
                pane.fetching_more = false;
                pane.state = LoadState::Loaded;
                self.refresh_visible(View::Issues);
            }
            Action::IssuesAppended(batch, load_id) => {
                if load_id != self.load_seq {
                    tracing::debug!(load_id, "discarding stale issue page");
                    return;
                }
                let pane = &mut self.issues;
                pane.entries
                    .extend(batch.issues.into_iter().map(Entry::Issue));
                pane.total_count = Some(batch.total_count);
                pane.page_info = Some(batch.page_info);
                pane.fetching_more = false;
                self.refresh_visible(View::Issues);
            }
            Action::LoadFailed {
                view,
                message,
                load_id,
            } => {
                if load_id != self.load_seq {
                    tracing::debug!(load_id, "discarding stale load failure");
                    return;
                }
                let pane = self.pane_mut(view);
                if pane.fetching_more {
                    // A failed pagination fetch keeps the page already shown.
                    pane.fetching_more = false;
                    tracing::warn!("failed to fetch next page: {}", message);
                } else {
                    pane.state = LoadState::Failed(message);
                    pane.entries.clear();
                    pane.visible.clear();
                    pane.selected = 0;
                }
            }

            Action::None => {}
        }
    }

    /// Resolve the selection to its record's URL. The match inside
    /// `Entry::url` is exhaustive over the record kinds.
    fn selected_url(&self) -> Option<String> {
        let entry = self.active_pane().selected_entry()?;
        Some(entry.url(&self.config.cloud.dashboard_host, &self.config.cloud.org))
    }

    fn load_stacks(&mut self, stacks: Vec<Stack>) {
        let pane = &mut self.stacks;
        pane.total_count = Some(stacks.len() as u64);
        pane.entries = stacks.into_iter().map(Entry::Stack).collect();
        pane.selected = 0;
        pane.state = LoadState::Loaded;
        self.refresh_visible(View::Stacks);
    }

    /// Recompute a pane's filter projection. Only the active view is
    /// subject to the filter text.
    fn refresh_visible(&mut self, view: View) {
        let filter = if view == self.view {
            self.filter.clone()
        } else {
            String::new()
        };
        self.pane_mut(view).apply_filter(&filter);
    }

    fn next_load_id(&mut self) -> u64 {
        self.load_seq += 1;
        self.load_seq
    }

    fn start_load(&mut self, view: View) {
        let load_id = self.next_load_id();
        self.pane_mut(view).state = LoadState::Loading;
        self.pane_mut(view).fetching_more = false;
        match view {
            View::Stacks => self.spawn_fetch_stacks(load_id),
            View::Issues => self.spawn_search_issues(load_id, None, false),
        }
    }

    /// Fetch the stack inventory off the event loop; completion comes back
    /// as an action. The loop itself never blocks on the network.
    fn spawn_fetch_stacks(&self, load_id: u64) {
        let tx = self.action_tx.clone();
        let cloud = Arc::clone(&self.cloud);
        let credentials = self.credentials_path.clone();
        tokio::spawn(async move {
            let result = tokio::time::timeout(FETCH_TIMEOUT, async {
                let token = auth::cloud_token(&credentials)?;
                cloud.fetch_stacks(&token).await
            })
            .await;

            let action = match result {
                Ok(Ok(stacks)) => Action::StacksLoaded(stacks, load_id),
                Ok(Err(err)) => Action::LoadFailed {
                    view: View::Stacks,
                    message: err.to_string(),
                    load_id,
                },
                Err(_) => Action::LoadFailed {
                    view: View::Stacks,
                    message: "stack inventory fetch timed out".to_string(),
                    load_id,
                },
            };
            tx.send(action).ok();
        });
    }

    fn spawn_search_issues(&self, load_id: u64, cursor: Option<PageInfo>, append: bool) {
        let tx = self.action_tx.clone();
        let github = Arc::clone(&self.github);
        let query = self.config.github.query.clone();
        let limit = self.config.github.page_size;
        tokio::spawn(async move {
            let result = tokio::time::timeout(
                FETCH_TIMEOUT,
                github.search_issues(&query, limit, cursor.as_ref()),
            )
            .await;

            let action = match result {
                Ok(Ok(batch)) => {
                    if append {
                        Action::IssuesAppended(batch, load_id)
                    } else {
                        Action::IssuesLoaded(batch, load_id)
                    }
                }
                Ok(Err(err)) => Action::LoadFailed {
                    view: View::Issues,
                    message: err.to_string(),
                    load_id,
                },
                Err(_) => Action::LoadFailed {
                    view: View::Issues,
                    message: "issue search timed out".to_string(),
                    load_id,
                },
            };
            tx.send(action).ok();
        });
    }
}
