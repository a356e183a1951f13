//! Start and stop banners printed around a session

use crate::environment::Environment;
use std::fmt::{self, Display};

const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMessageKind {
    Info,
    Success,
}

/// One banner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    pub kind: SessionMessageKind,
    pub text: String,
}

impl SessionMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: SessionMessageKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: SessionMessageKind::Success,
            text: text.into(),
        }
    }

    pub fn print(&self) {
        println!("{}", self);
    }
}

impl Display for SessionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, tag) = match self.kind {
            SessionMessageKind::Info => (COLOR_INFO, "INFO"),
            SessionMessageKind::Success => (COLOR_SUCCESS, "SUCCESS"),
        };
        write!(f, "{}[{}]{} {}", color, tag, COLOR_RESET, self.text)
    }
}

pub fn session_starting(mode: &str, environment: &Environment) -> SessionMessage {
    SessionMessage::info(format!(
        "Starting {} mode against {} ({})",
        mode,
        environment,
        environment.base_url()
    ))
}

pub fn print_session_starting(mode: &str, environment: &Environment) {
    session_starting(mode, environment).print();
}

pub fn print_session_shutdown() {
    SessionMessage::info("Shutting down...").print();
}

pub fn print_session_exit_success() {
    SessionMessage::success("Scanner dashboard exited successfully").print();
}
