use crate::posts::browser::ListingBrowser;
use crate::posts::source::PostSource;
use crate::storage::SlotStore;
use crate::tasks::models::{Task, TaskFilter};
use crate::tasks::store::TaskStore;
use crate::theme::Theme;
use crate::tui::edit::InputState;
use crate::tui::fetch::{self, FetchMessage};
use crate::tui::handlers::{HelpModeAction, InputModeAction, KeyHandler, NormalModeAction};
use anyhow::Result;
use crossterm::event::KeyEvent;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tasks,
    Posts,
}

impl Tab {
    pub fn other(self) -> Self {
        match self {
            Tab::Tasks => Tab::Posts,
            Tab::Posts => Tab::Tasks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddingTask,
    Searching,
}

pub struct App<S: SlotStore> {
    pub tasks: TaskStore<S>,
    pub filter: TaskFilter,
    pub selected_index: usize,
    pub listing: ListingBrowser,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub input: InputState,
    pub theme: Theme,
    pub help_mode: bool,
    pub should_quit: bool,
    prefs: S,
    source: Arc<dyn PostSource>,
    fetch_tx: Sender<FetchMessage>,
    fetch_rx: Receiver<FetchMessage>,
}

impl<S: SlotStore> App<S> {
    pub fn new(tasks: TaskStore<S>, prefs: S, source: Arc<dyn PostSource>) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel();
        Self {
            tasks,
            filter: TaskFilter::default(),
            selected_index: 0,
            listing: ListingBrowser::new(),
            tab: Tab::Tasks,
            input_mode: InputMode::Normal,
            input: InputState::new(),
            theme: Theme::load(&prefs),
            help_mode: false,
            should_quit: false,
            prefs,
            source,
            fetch_tx,
            fetch_rx,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.help_mode {
            self.handle_help_mode_key(key_event);
        } else if self.input_mode != InputMode::Normal {
            self.handle_input_mode_key(key_event);
        } else {
            self.handle_normal_mode_key(key_event);
        }
        Ok(())
    }

    fn handle_help_mode_key(&mut self, key_event: KeyEvent) {
        if KeyHandler::handle_help_mode_key(key_event) == HelpModeAction::ExitHelpMode {
            self.help_mode = false;
        }
    }

    fn handle_normal_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_normal_mode_key(key_event, self.tab) {
            NormalModeAction::None => {}
            NormalModeAction::Quit => self.should_quit = true,
            NormalModeAction::SwitchTab(tab) => self.switch_tab(tab),
            NormalModeAction::ToggleTheme => self.toggle_theme(),
            NormalModeAction::ToggleHelpMode => self.help_mode = !self.help_mode,
            NormalModeAction::MoveSelectionUp => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            NormalModeAction::MoveSelectionDown => {
                if self.selected_index + 1 < self.visible_tasks().len() {
                    self.selected_index += 1;
                }
            }
            NormalModeAction::ToggleSelectedTask => {
                if let Some(id) = self.selected_task_id() {
                    self.tasks.toggle_task(id);
                    self.clamp_selection();
                }
            }
            NormalModeAction::DeleteSelectedTask => {
                if let Some(id) = self.selected_task_id() {
                    self.tasks.delete_task(id);
                    self.clamp_selection();
                }
            }
            NormalModeAction::AddTask => {
                self.input.clear();
                self.input_mode = InputMode::AddingTask;
            }
            NormalModeAction::CycleFilter => {
                self.filter = self.filter.next();
                self.clamp_selection();
            }
            NormalModeAction::EnterSearchMode => {
                let term = self.listing.state().search_term.clone();
                self.input.start(&term);
                self.input_mode = InputMode::Searching;
            }
            NormalModeAction::ClearSearch => self.listing.search(""),
            NormalModeAction::NextPage => self.listing.next_page(),
            NormalModeAction::PreviousPage => self.listing.previous_page(),
        }
    }

    fn handle_input_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_input_mode_key(key_event) {
            InputModeAction::None => return,
            InputModeAction::Cancel => {
                if self.input_mode == InputMode::Searching {
                    self.listing.search("");
                }
                self.input.clear();
                self.input_mode = InputMode::Normal;
                return;
            }
            InputModeAction::Confirm => {
                if self.input_mode == InputMode::AddingTask {
                    let text = self.input.take();
                    if self.tasks.add_task(&text) {
                        self.select_last_visible();
                    }
                }
                self.input.clear();
                self.input_mode = InputMode::Normal;
                return;
            }
            InputModeAction::Backspace => self.input.backspace(),
            InputModeAction::MoveCursorLeft => self.input.move_cursor_left(),
            InputModeAction::MoveCursorRight => self.input.move_cursor_right(),
            InputModeAction::MoveCursorHome => self.input.move_cursor_home(),
            InputModeAction::MoveCursorEnd => self.input.move_cursor_end(),
            InputModeAction::InsertChar(c) => self.input.insert_char(c),
        }

        // Search is live: every edit re-filters from page one.
        if self.input_mode == InputMode::Searching {
            self.listing.search(&self.input.buffer);
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }

        debug!(from = ?self.tab, to = ?tab, "switching tab");
        if self.tab == Tab::Posts {
            self.listing.unmount();
        }
        self.tab = tab;
        if tab == Tab::Posts {
            if let Some(ticket) = self.listing.mount() {
                fetch::spawn_fetch(Arc::clone(&self.source), ticket, self.fetch_tx.clone());
            }
        }
    }

    // Stale results are dropped by the browser.
    pub fn drain_fetch_results(&mut self) {
        while let Ok(message) = self.fetch_rx.try_recv() {
            if !self.listing.apply(message.ticket, message.outcome) {
                debug!("ignored fetch result for an inactive listing");
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.theme.save(&mut self.prefs) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.filtered_tasks(self.filter)
    }

    pub fn selected_task_id(&self) -> Option<i64> {
        self.visible_tasks().get(self.selected_index).map(|task| task.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    fn select_last_visible(&mut self) {
        self.selected_index = self.visible_tasks().len().saturating_sub(1);
    }
}
