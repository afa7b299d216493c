use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(u64);

impl fmt::Display for NoticeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub level: Level,
    pub message: String,
}

/// Shared status area. Notices stay until dismissed or expired.
#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    items: Vec<Notice>,
}

impl Notifications {
    pub fn push(&mut self, level: Level, message: impl Into<String>) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.items.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    /// Returns whether the notice was still showing
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_is_idempotent() {
        let mut notices = Notifications::default();
        let first = notices.push(Level::Info, "Loading voices");
        let second = notices.push(Level::Error, "Upload failed");
        assert_ne!(first, second);

        assert!(notices.dismiss(first));
        assert!(!notices.dismiss(first));
        assert_eq!(notices.items().len(), 1);
        assert_eq!(notices.latest().map(|n| n.level), Some(Level::Error));
    }
}
