//! Application state for one outline-building session.
//!
//! A [`Session`] owns the loaded configuration, the selected video, the last
//! playback position and the outline tree. Every interaction arrives as a
//! [`SessionEvent`] and is applied synchronously by [`Session::dispatch`].
//! A failing event is logged and leaves the session exactly as it was.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::{Config, Video},
    error::{NotePilotError, Result},
    export::{ExportArtifact, ExportFormat, export_outline},
    format::render_outline,
    tree,
    types::{HighlightPayload, OutlineNode, Relation},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Replace the configuration. `config` is the raw JSON text or an inline
    /// JSON object.
    LoadConfig { config: Value },
    SelectVideo { video_id: String },
    Playback { time: f64 },
    /// A highlight payload dropped onto the outline, optionally onto a node.
    Drop {
        payload: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
        #[serde(default)]
        relation: Relation,
    },
    /// Drop a highlight of the selected video by id. Only highlights that are
    /// available at the current playback position can be picked.
    DropHighlight {
        highlight_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
        #[serde(default)]
        relation: Relation,
    },
    Remove { id: String },
    Export {
        #[serde(default)]
        format: ExportFormat,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::LoadConfig { .. } => "load_config",
            SessionEvent::SelectVideo { .. } => "select_video",
            SessionEvent::Playback { .. } => "playback",
            SessionEvent::Drop { .. } => "drop",
            SessionEvent::DropHighlight { .. } => "drop_highlight",
            SessionEvent::Remove { .. } => "remove",
            SessionEvent::Export { .. } => "export",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The session state changed.
    Applied,
    /// Nothing to do: duplicate insert, unknown removal or empty export.
    Unchanged,
    Exported(ExportArtifact),
    /// The event could not be applied; the reason is also logged.
    Rejected(String),
}

impl Outcome {
    fn from_flag(changed: bool) -> Self {
        if changed {
            Outcome::Applied
        } else {
            Outcome::Unchanged
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    config: Option<Config>,
    selected_video: Option<String>,
    outline: Vec<OutlineNode>,
    playback_time: f64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        let mut session = Self::new();
        session.load_config(config);
        session
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn selected_video(&self) -> Option<&Video> {
        let id = self.selected_video.as_deref()?;
        self.config.as_ref()?.find_video(id)
    }

    pub fn outline(&self) -> &[OutlineNode] {
        &self.outline
    }

    pub fn playback_time(&self) -> f64 {
        self.playback_time
    }

    pub fn outline_title(&self) -> &str {
        self.config
            .as_ref()
            .map_or(crate::config::DEFAULT_OUTLINE_TITLE, Config::outline_title)
    }

    /// Apply one event. Errors are logged and turned into
    /// [`Outcome::Rejected`]; they never escape.
    pub fn dispatch(&mut self, event: SessionEvent) -> Outcome {
        let kind = event.kind();
        let result = match event {
            SessionEvent::LoadConfig { config } => decode_config(config).map(|config| {
                self.load_config(config);
                Outcome::Applied
            }),
            SessionEvent::SelectVideo { video_id } => {
                self.select_video(&video_id).map(|()| Outcome::Applied)
            }
            SessionEvent::Playback { time } => {
                self.set_playback_time(time).map(|()| Outcome::Applied)
            }
            SessionEvent::Drop {
                payload,
                target_id,
                relation,
            } => decode_payload(payload)
                .and_then(|payload| self.drop_highlight(payload, target_id.as_deref(), relation))
                .map(Outcome::from_flag),
            SessionEvent::DropHighlight {
                highlight_id,
                target_id,
                relation,
            } => self
                .available_highlight(&highlight_id)
                .and_then(|payload| self.drop_highlight(payload, target_id.as_deref(), relation))
                .map(Outcome::from_flag),
            SessionEvent::Remove { id } => Ok(Outcome::from_flag(self.remove(&id))),
            SessionEvent::Export { format } => {
                Ok(self.export(format).map_or(Outcome::Unchanged, Outcome::Exported))
            }
        };

        match result {
            Ok(outcome) => {
                debug!(event = kind, ?outcome, "event applied");
                outcome
            }
            Err(e) => {
                warn!(event = kind, error = %e, "event rejected, session unchanged");
                Outcome::Rejected(e.to_string())
            }
        }
    }

    /// Replace the configuration, select its first video and start a fresh
    /// outline.
    pub fn load_config(&mut self, config: Config) {
        self.selected_video = config.first_video().map(|video| video.id.clone());
        info!(
            videos = config.videos.len(),
            selected = self.selected_video.as_deref().unwrap_or("-"),
            "configuration loaded"
        );
        self.config = Some(config);
        self.reset();
    }

    /// Switch to another video of the loaded configuration. The outline is
    /// reset even when the same video is selected again.
    pub fn select_video(&mut self, id: &str) -> Result<()> {
        let known = self
            .config
            .as_ref()
            .is_some_and(|config| config.find_video(id).is_some());
        if !known {
            return Err(NotePilotError::UnknownVideo { id: id.to_string() });
        }

        self.selected_video = Some(id.to_string());
        self.reset();
        info!(video = id, "video selected");
        Ok(())
    }

    pub fn set_playback_time(&mut self, time: f64) -> Result<()> {
        if !time.is_finite() || time < 0.0 {
            return Err(NotePilotError::InvalidTime { time });
        }
        self.playback_time = time;
        Ok(())
    }

    /// Highlights of the selected video surfaced at the current playback
    /// position.
    pub fn available_highlights(&self) -> Vec<&HighlightPayload> {
        self.selected_video()
            .map(|video| video.available_highlights(self.playback_time))
            .unwrap_or_default()
    }

    /// Insert a dropped highlight into the outline. Returns false when a node
    /// with the same id is already present.
    pub fn drop_highlight(
        &mut self,
        payload: HighlightPayload,
        target: Option<&str>,
        relation: Relation,
    ) -> Result<bool> {
        let node = payload.into_node(self.playback_time)?;
        let id = node.id.clone();
        let (outline, inserted) = tree::insert(&self.outline, node, target, relation);
        self.outline = outline;
        if inserted {
            info!(id = %id, target = target.unwrap_or("-"), ?relation, "highlight added");
        }
        Ok(inserted)
    }

    /// Remove a node and its subtree. Returns false for an unknown id.
    pub fn remove(&mut self, id: &str) -> bool {
        let (outline, removed) = tree::remove(&self.outline, id);
        self.outline = outline;
        if removed {
            info!(id, "outline node removed");
        }
        removed
    }

    pub fn preview(&self) -> String {
        render_outline(&self.outline)
    }

    pub fn export(&self, format: ExportFormat) -> Option<ExportArtifact> {
        export_outline(&self.outline, self.outline_title(), format)
    }

    fn reset(&mut self) {
        self.outline.clear();
        self.playback_time = 0.0;
    }

    fn available_highlight(&self, id: &str) -> Result<HighlightPayload> {
        self.available_highlights()
            .into_iter()
            .find(|highlight| highlight.id == id)
            .cloned()
            .ok_or_else(|| NotePilotError::PayloadParse {
                reason: format!("highlight {id} is not available at the current position"),
            })
    }
}

fn decode_payload(value: Value) -> Result<HighlightPayload> {
    match value {
        Value::String(raw) => HighlightPayload::parse(&raw),
        other => serde_json::from_value(other).map_err(|e| NotePilotError::PayloadParse {
            reason: e.to_string(),
        }),
    }
}

fn decode_config(value: Value) -> Result<Config> {
    match value {
        Value::String(raw) => Config::parse(&raw),
        other => serde_json::from_value(other).map_err(|e| NotePilotError::ConfigParse {
            reason: e.to_string(),
        }),
    }
}
