use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{NotePilotError, Result},
    format::render_outline,
    types::OutlineNode,
};

/// Stem used when nothing of the title survives sanitizing.
const FALLBACK_STEM: &str = "outline";

/// Export target. Both formats carry the same text; only the file extension
/// and declared content type differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "md", alias = "markdown")]
    Markdown,
    #[serde(rename = "docx", alias = "document")]
    Document,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Document => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Document => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content: String,
    pub content_type: &'static str,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, returning the full path of the file.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let mut components = Path::new(&self.filename).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(NotePilotError::InvalidFilename {
                filename: self.filename.clone(),
            });
        }

        fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.content).await?;
        info!(path = %path.display(), bytes = self.content.len(), "export written");
        Ok(path)
    }
}

/// Filename for an export: every whitespace run in the title becomes one `-`,
/// path separators and characters reserved on common file systems become
/// `_`, and leading dots are dropped. The result is always a single file
/// name.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('-');
            }
            in_whitespace = true;
            continue;
        }

        in_whitespace = false;
        if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            stem.push('_');
        } else {
            stem.push(ch);
        }
    }

    let stem = stem.trim_start_matches('.');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{}.{}", stem, format.extension())
}

/// Build the export artifact for an outline: a title heading, a blank line,
/// then the rendered outline. Returns `None` for an empty outline.
pub fn export_outline(
    tree: &[OutlineNode],
    title: &str,
    format: ExportFormat,
) -> Option<ExportArtifact> {
    if tree.is_empty() {
        debug!("outline is empty, nothing to export");
        return None;
    }

    Some(ExportArtifact {
        filename: export_filename(title, format),
        content: format!("# {}\n\n{}", title, render_outline(tree)),
        content_type: format.content_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> Vec<OutlineNode> {
        vec![
            OutlineNode::new("a", "Intro", 65.0)
                .with_category("summary")
                .with_children(vec![OutlineNode::new("b", "Detail", 70.0)]),
        ]
    }

    #[test]
    fn test_export_filename_collapses_whitespace() {
        assert_eq!(
            export_filename("Video Notes", ExportFormat::Markdown),
            "Video-Notes.md"
        );
        assert_eq!(
            export_filename("Deep  dive\t into\nRust", ExportFormat::Document),
            "Deep-dive-into-Rust.docx"
        );
        assert_eq!(export_filename(" padded ", ExportFormat::Markdown), "-padded-.md");
    }

    #[test]
    fn test_export_filename_replaces_path_separators() {
        assert_eq!(
            export_filename("Term 2024/25", ExportFormat::Markdown),
            "Term-2024_25.md"
        );
        assert_eq!(
            export_filename("../escaped notes", ExportFormat::Markdown),
            "_escaped-notes.md"
        );
        assert_eq!(
            export_filename("a\\b: c?", ExportFormat::Document),
            "a_b_-c_.docx"
        );
        assert_eq!(export_filename("...", ExportFormat::Markdown), "outline.md");
        assert_eq!(export_filename("", ExportFormat::Markdown), "outline.md");
        assert_eq!(export_filename(".hidden", ExportFormat::Markdown), "hidden.md");
    }

    #[tokio::test]
    async fn test_write_to_stays_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        for title in ["Term 2024/25", "../escaped notes", "/etc/passwd"] {
            let artifact = export_outline(&outline(), title, ExportFormat::Markdown).unwrap();
            let path = artifact.write_to(&out).await.unwrap();
            assert_eq!(path.parent(), Some(out.as_path()), "{title} escaped {out:?}");
            assert!(path.is_file());
        }
    }

    #[tokio::test]
    async fn test_write_to_rejects_non_plain_filename() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact {
            filename: "../outside.md".to_string(),
            content: "x".to_string(),
            content_type: ExportFormat::Markdown.content_type(),
        };

        let result = artifact.write_to(dir.path()).await;

        assert!(matches!(result, Err(NotePilotError::InvalidFilename { .. })));
        assert!(!dir.path().parent().unwrap().join("outside.md").exists());
    }

    #[test]
    fn test_export_empty_outline_is_none() {
        assert_eq!(export_outline(&[], "Notes", ExportFormat::Markdown), None);
    }

    #[test]
    fn test_export_body_matches_render() {
        let tree = outline();
        let preview = render_outline(&tree);

        let md = export_outline(&tree, "My Notes", ExportFormat::Markdown).unwrap();
        let docx = export_outline(&tree, "My Notes", ExportFormat::Document).unwrap();

        assert_eq!(md.content, format!("# My Notes\n\n{preview}"));
        assert_eq!(md.content, docx.content);
        assert_eq!(md.filename, "My-Notes.md");
        assert_eq!(md.content_type, "text/markdown");
        assert_eq!(docx.filename, "My-Notes.docx");
        assert_eq!(docx.content_type, ExportFormat::Document.content_type());
    }

    #[test]
    fn test_export_format_serde_names() {
        let md: ExportFormat = serde_json::from_str("\"markdown\"").unwrap();
        let docx: ExportFormat = serde_json::from_str("\"docx\"").unwrap();
        assert_eq!(md, ExportFormat::Markdown);
        assert_eq!(docx, ExportFormat::Document);
    }

    #[tokio::test]
    async fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = export_outline(&outline(), "Notes", ExportFormat::Markdown).unwrap();

        let path = artifact.write_to(&dir.path().join("out")).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "Notes.md");
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, artifact.content);
    }
}
