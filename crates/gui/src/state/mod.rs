pub mod messages;

pub use messages::{AppMessage, LogBuffer, LogEntry, LogLevel, MaskOverlay};
