#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing notification. The gateway and the services emit
/// these over the event channel; the view layer decides how to display them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: &str) -> Notice {
        return Notice {
            level: NoticeLevel::Success,
            message: message.to_string(),
        };
    }

    pub fn error(message: &str) -> Notice {
        return Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
        };
    }
}

pub enum Event {
    Notice(Notice),
}
