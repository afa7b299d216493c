use crate::error::AppError;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Single,
    Multi,
    Loading,
    History,
    Avatars,
    Projects,
}

impl Tab {
    pub fn all() -> [Tab; 6] {
        [
            Tab::Single,
            Tab::Multi,
            Tab::Loading,
            Tab::History,
            Tab::Avatars,
            Tab::Projects,
        ]
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
            Self::Loading => "loading",
            Self::History => "history",
            Self::Avatars => "avatars",
            Self::Projects => "projects",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Single => "Single video",
            Self::Multi => "Multiple scripts",
            Self::Loading => "Processing",
            Self::History => "History",
            Self::Avatars => "Avatars",
            Self::Projects => "Projects",
        }
    }

    /// Data re-read whenever the tab is activated
    pub fn refresh(&self) -> Option<Refresh> {
        match self {
            Self::Loading => Some(Refresh::Jobs),
            Self::History => Some(Refresh::History),
            Self::Avatars => Some(Refresh::Avatars),
            Self::Projects => Some(Refresh::Projects),
            Self::Single | Self::Multi => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab: {0}")]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tab::all()
            .into_iter()
            .find(|tab| tab.id() == wanted)
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// Gateway reads a tab activation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Jobs,
    History,
    Avatars,
    /// Projects together with the tag list used to filter them
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polling {
    Start,
    Stop,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Tab,
    pub to: Tab,
    pub refresh: Option<Refresh>,
    pub polling: Polling,
}

/// Exactly one active tab. Activation is synchronous; the router only says
/// what has to happen, the caller does it.
#[derive(Debug, Default)]
pub struct TabRouter {
    active: Tab,
    applying_refresh: bool,
}

impl TabRouter {
    pub fn new(initial: Tab) -> Self {
        Self {
            active: initial,
            applying_refresh: false,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_polling(&self) -> bool {
        self.active == Tab::Loading
    }

    pub fn activate(&mut self, tab: Tab) -> Result<Transition, AppError> {
        if self.applying_refresh {
            warn!(%tab, "Refusing tab switch while a refresh is applied");
            return Err(AppError::validation("re-entrant tab switch"));
        }

        let from = self.active;
        let polling = match (from == Tab::Loading, tab == Tab::Loading) {
            (false, true) => Polling::Start,
            (true, false) => Polling::Stop,
            _ => Polling::Keep,
        };
        self.active = tab;
        debug!(%from, to = %tab, ?polling, "Tab activated");

        Ok(Transition {
            from,
            to: tab,
            refresh: tab.refresh(),
            polling,
        })
    }

    /// Mark the start of applying refreshed data; tab switches are refused
    /// until [`TabRouter::exit_refresh`]
    pub fn enter_refresh(&mut self) {
        self.applying_refresh = true;
    }

    pub fn exit_refresh(&mut self) {
        self.applying_refresh = false;
    }
}
