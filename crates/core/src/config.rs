use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{
    error::{NotePilotError, Result},
    types::HighlightPayload,
};

pub const DEFAULT_OUTLINE_TITLE: &str = "Video Notes";

/// Highlights become available this many seconds before their timestamp.
pub const HIGHLIGHT_LOOKAHEAD_SECONDS: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_directory: Option<String>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default)]
    pub highlights: Vec<HighlightPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_title: Option<String>,
}

impl Config {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| NotePilotError::ConfigParse {
            reason: e.to_string(),
        })
    }

    pub fn find_video(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|video| video.id == id)
    }

    pub fn first_video(&self) -> Option<&Video> {
        self.videos.first()
    }

    pub fn outline_title(&self) -> &str {
        self.export
            .outline_title
            .as_deref()
            .unwrap_or(DEFAULT_OUTLINE_TITLE)
    }

    /// One-line description: video directory and number of videos.
    pub fn summary(&self) -> String {
        format!(
            "Video directory: {} · Videos: {}",
            self.video_directory.as_deref().unwrap_or("unspecified"),
            self.videos.len()
        )
    }
}

impl Video {
    /// Highlights surfaced by `current_time`, in configuration order.
    /// Highlights without a timestamp are never surfaced.
    pub fn available_highlights(&self, current_time: f64) -> Vec<&HighlightPayload> {
        self.highlights
            .iter()
            .filter(|highlight| {
                highlight
                    .time
                    .is_some_and(|time| time <= current_time + HIGHLIGHT_LOOKAHEAD_SECONDS)
            })
            .collect()
    }

    pub fn find_highlight(&self, id: &str) -> Option<&HighlightPayload> {
        self.highlights.iter().find(|highlight| highlight.id == id)
    }
}

/// Default configuration file location
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notepilot")
        .join("config.json")
}

/// Load and parse a configuration file
pub async fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| NotePilotError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
    Config::parse(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "videoDirectory": "/media/lectures",
        "videos": [
            {
                "id": "rust-101",
                "title": "Rust 101",
                "src": "/media/lectures/rust-101.mp4",
                "poster": "/media/lectures/rust-101.jpg",
                "highlights": [
                    { "id": "h1", "label": "Ownership", "time": 12, "category": "summary" },
                    { "id": "h2", "label": "Borrowing", "title": "Borrow rules", "time": 60.4, "category": "insight", "shape": "hex" },
                    { "id": "h3", "label": "Homework", "category": "action" },
                    { "id": "h4", "label": "Lifetimes?", "time": 300, "category": "question", "note": "ask in Q&A" }
                ]
            },
            { "id": "empty", "title": "No highlights" }
        ],
        "export": { "outlineTitle": "Rust Notes" },
        "somethingElse": true
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config = Config::parse(SAMPLE).unwrap();

        assert_eq!(config.videos.len(), 2);
        assert_eq!(config.outline_title(), "Rust Notes");
        assert_eq!(config.first_video().unwrap().id, "rust-101");
        assert!(config.find_video("empty").unwrap().highlights.is_empty());
        assert!(config.find_video("nope").is_none());
        assert_eq!(
            config.summary(),
            "Video directory: /media/lectures · Videos: 2"
        );
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = Config::parse("{}").unwrap();
        assert!(config.videos.is_empty());
        assert_eq!(config.outline_title(), DEFAULT_OUTLINE_TITLE);
        assert_eq!(config.summary(), "Video directory: unspecified · Videos: 0");
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        assert!(matches!(
            Config::parse("{\"videos\": ["),
            Err(NotePilotError::ConfigParse { .. })
        ));
        assert!(matches!(
            Config::parse("{\"videos\": [{\"title\": \"no id\"}]}"),
            Err(NotePilotError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_available_highlights_follow_playback() {
        let config = Config::parse(SAMPLE).unwrap();
        let video = config.first_video().unwrap();

        let ids = |time: f64| -> Vec<String> {
            video
                .available_highlights(time)
                .into_iter()
                .map(|h| h.id.clone())
                .collect()
        };

        assert!(ids(0.0).is_empty());
        assert_eq!(ids(11.5), vec!["h1"]);
        assert_eq!(ids(60.0), vec!["h1", "h2"]);
        assert_eq!(ids(1000.0), vec!["h1", "h2", "h4"]);
        // h3 has no timestamp and never shows up.
        assert!(!ids(f64::MAX).contains(&"h3".to_string()));
    }

    #[test]
    fn test_find_highlight() {
        let config = Config::parse(SAMPLE).unwrap();
        let video = config.first_video().unwrap();
        let h2 = video.find_highlight("h2").unwrap();
        assert_eq!(h2.display_label(), Some("Borrow rules"));
        assert!(video.find_highlight("h9").is_none());
    }

    #[test]
    fn test_config_path_is_under_notepilot() {
        let path = get_config_path();
        assert!(path.ends_with("notepilot/config.json"));
    }

    #[tokio::test]
    async fn test_load_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.videos[0].title, "Rust 101");

        let missing = load_config(&dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(NotePilotError::ConfigRead { .. })));
    }
}
