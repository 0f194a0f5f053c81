// Light/dark preference, persisted across runs

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::storage::{keys, DurableStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

pub struct ThemeStore {
    storage: Arc<dyn DurableStorage>,
    theme: watch::Sender<Theme>,
}

impl ThemeStore {
    /// Load the stored theme; nothing stored (or garbage) means light
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let initial = storage
            .get(keys::THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let (theme, _) = watch::channel(initial);
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn is_dark(&self) -> bool {
        self.theme() == Theme::Dark
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), ClientError> {
        self.storage.set(keys::THEME, theme.as_str())?;
        self.theme.send_replace(theme);
        Ok(())
    }

    pub fn toggle(&self) -> Result<Theme, ClientError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn watch(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore").field("theme", &self.theme()).finish()
    }
}
