use crate::storage::{self, SlotStore, StorageError, THEME_KEY};
use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn load<S: SlotStore + ?Sized>(slots: &S) -> Self {
        match storage::load_json::<Theme, S>(slots, THEME_KEY) {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable theme preference");
                Theme::default()
            }
        }
    }

    pub fn save<S: SlotStore + ?Sized>(self, slots: &mut S) -> Result<(), StorageError> {
        storage::save_json(slots, THEME_KEY, &self)
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight_bg: Color::LightBlue,
                highlight_fg: Color::Black,
                error: Color::Red,
                border: Color::DarkGray,
            },
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight_bg: Color::Yellow,
                highlight_fg: Color::Black,
                error: Color::LightRed,
                border: Color::Gray,
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error: Color,
    pub border: Color,
}
