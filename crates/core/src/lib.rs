//! NotePilot Core Library
//!
//! Turns highlight moments of a video into a hierarchical outline: tree
//! mutation, text rendering, export and the session state that ties them to
//! a loaded configuration.

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod session;
pub mod tree;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{Config, ExportSettings, Video, get_config_path, load_config};
pub use error::{NotePilotError, Result};
pub use export::{ExportArtifact, ExportFormat, export_filename, export_outline};
pub use format::{EMPTY_OUTLINE_PLACEHOLDER, format_timestamp, render_outline};
pub use session::{Outcome, Session, SessionEvent};
pub use types::{Category, HighlightPayload, OutlineNode, Relation};
