//! Progress reporting for long-running operations.

use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

pub trait TaskMonitor {
    fn set_title(&mut self, title: &str);
    /// Fraction complete, clamped to `0.0..=1.0`.
    fn set_progress(&mut self, fraction: f64);
    fn set_status(&mut self, status: &str);
    fn show_message(&mut self, level: MessageLevel, message: &str);
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default)]
pub struct LogMonitor {
    title: String,
}

impl LogMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskMonitor for LogMonitor {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        info!(task = %self.title, "task started");
    }

    fn set_progress(&mut self, fraction: f64) {
        tracing::debug!(task = %self.title, progress = fraction.clamp(0.0, 1.0), "progress");
    }

    fn set_status(&mut self, status: &str) {
        info!(task = %self.title, status, "status");
    }

    fn show_message(&mut self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Info => info!(task = %self.title, "{message}"),
            MessageLevel::Warn => warn!(task = %self.title, "{message}"),
            MessageLevel::Error => error!(task = %self.title, "{message}"),
        }
    }
}

/// Keeps every call for later inspection.
#[derive(Debug, Default)]
pub struct RecordingMonitor {
    pub title: Option<String>,
    pub progress: Vec<f64>,
    pub statuses: Vec<String>,
    pub messages: Vec<(MessageLevel, String)>,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_progress(&self) -> Option<f64> {
        self.progress.last().copied()
    }

    pub fn has_message(&self, level: MessageLevel) -> bool {
        self.messages.iter().any(|(l, _)| *l == level)
    }
}

impl TaskMonitor for RecordingMonitor {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_progress(&mut self, fraction: f64) {
        self.progress.push(fraction.clamp(0.0, 1.0));
    }

    fn set_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }

    fn show_message(&mut self, level: MessageLevel, message: &str) {
        self.messages.push((level, message.to_string()));
    }
}
