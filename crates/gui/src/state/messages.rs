//! Messages from render workers to the UI loop.

use litterscope_core::BBox;
use litterscope_viewer::Composition;

/// A mask rendered to RGBA with the litter layer's palette.
#[derive(Debug, Clone)]
pub struct MaskOverlay {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    /// Geographic extent of the image
    pub bounds: BBox,
}

/// Messages sent from background threads to the main UI loop.
pub enum AppMessage {
    /// A render request finished and its layers are ready.
    RenderReady {
        composition: Box<Composition>,
        overlay: Option<MaskOverlay>,
    },
    /// The request was cancelled before it finished.
    Superseded { generation: u64 },
    /// The request failed (missing or unreadable mask).
    RenderFailed { generation: u64, message: String },
}

/// Log level for console messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A log entry for the console panel.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: std::time::SystemTime,
}

impl LogEntry {
    fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            message: msg.into(),
            timestamp: std::time::SystemTime::now(),
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, msg)
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, msg)
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, msg)
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, msg)
    }
}

/// Console entries kept for display.
pub const MAX_LOG_ENTRIES: usize = 500;

/// Console history, dropping the oldest entries past [`MAX_LOG_ENTRIES`].
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: Vec<LogEntry>,
}

impl LogBuffer {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_LOG_ENTRIES {
            let excess = self.entries.len() - MAX_LOG_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_buffer_keeps_the_newest_entries() {
        let mut logs = LogBuffer::default();
        for i in 0..MAX_LOG_ENTRIES + 25 {
            logs.push(LogEntry::info(format!("entry {i}")));
        }
        assert_eq!(logs.entries().len(), MAX_LOG_ENTRIES);
        assert_eq!(logs.entries()[0].message, "entry 25");
        assert_eq!(
            logs.entries()[MAX_LOG_ENTRIES - 1].message,
            format!("entry {}", MAX_LOG_ENTRIES + 24)
        );
    }
}
