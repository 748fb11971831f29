use crate::tui::app::Tab;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_normal_mode_key(key_event: KeyEvent, tab: Tab) -> NormalModeAction {
        let shared = match key_event.code {
            KeyCode::Char('q') => Some(NormalModeAction::Quit),
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(NormalModeAction::Quit)
            }
            KeyCode::Tab | KeyCode::BackTab => Some(NormalModeAction::SwitchTab(tab.other())),
            KeyCode::Char('1') => Some(NormalModeAction::SwitchTab(Tab::Tasks)),
            KeyCode::Char('2') => Some(NormalModeAction::SwitchTab(Tab::Posts)),
            KeyCode::Char('t') => Some(NormalModeAction::ToggleTheme),
            KeyCode::Char('?') => Some(NormalModeAction::ToggleHelpMode),
            _ => None,
        };
        if let Some(action) = shared {
            return action;
        }

        match tab {
            Tab::Tasks => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => NormalModeAction::MoveSelectionUp,
                KeyCode::Down | KeyCode::Char('j') => NormalModeAction::MoveSelectionDown,
                KeyCode::Enter | KeyCode::Char(' ') => NormalModeAction::ToggleSelectedTask,
                KeyCode::Char('a') => NormalModeAction::AddTask,
                KeyCode::Char('d') | KeyCode::Delete => NormalModeAction::DeleteSelectedTask,
                KeyCode::Char('f') => NormalModeAction::CycleFilter,
                _ => NormalModeAction::None,
            },
            Tab::Posts => match key_event.code {
                KeyCode::Char('/') => NormalModeAction::EnterSearchMode,
                KeyCode::Right | KeyCode::Char('n') | KeyCode::Char('l') => NormalModeAction::NextPage,
                KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('h') => {
                    NormalModeAction::PreviousPage
                }
                KeyCode::Esc => NormalModeAction::ClearSearch,
                _ => NormalModeAction::None,
            },
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                HelpModeAction::ExitHelpMode
            }
            _ => HelpModeAction::None,
        }
    }

    pub fn handle_input_mode_key(key_event: KeyEvent) -> InputModeAction {
        match key_event.code {
            KeyCode::Esc => InputModeAction::Cancel,
            KeyCode::Enter => InputModeAction::Confirm,
            KeyCode::Backspace => InputModeAction::Backspace,
            KeyCode::Left => InputModeAction::MoveCursorLeft,
            KeyCode::Right => InputModeAction::MoveCursorRight,
            KeyCode::Home => InputModeAction::MoveCursorHome,
            KeyCode::End => InputModeAction::MoveCursorEnd,
            KeyCode::Char(c) => InputModeAction::InsertChar(c),
            _ => InputModeAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalModeAction {
    None,
    Quit,
    SwitchTab(Tab),
    ToggleTheme,
    ToggleHelpMode,
    MoveSelectionUp,
    MoveSelectionDown,
    ToggleSelectedTask,
    AddTask,
    DeleteSelectedTask,
    CycleFilter,
    EnterSearchMode,
    ClearSearch,
    NextPage,
    PreviousPage,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum InputModeAction {
    None,
    Cancel,
    Confirm,
    Backspace,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    InsertChar(char),
}
