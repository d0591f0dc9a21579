use notepilot_core::SessionEvent;
use tracing::warn;

/// Events parsed from a JSON-lines script.
#[derive(Debug, Default)]
pub struct Script {
    pub events: Vec<SessionEvent>,
    pub skipped: usize,
}

/// Parse one event per line. Blank lines and `#` comments are ignored; lines
/// that are not a valid event are logged and skipped.
pub fn parse_script(text: &str) -> Script {
    let mut script = Script::default();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<SessionEvent>(line) {
            Ok(event) => script.events.push(event),
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed script line");
                script.skipped += 1;
            }
        }
    }

    script
}

#[cfg(test)]
mod tests {
    use notepilot_core::{ExportFormat, Relation};

    use super::*;

    #[test]
    fn test_parse_script_skips_comments_and_bad_lines() {
        let script = parse_script(
            r#"
# warm up
{"type":"playback","time":3}

{"type":"drop","payload":{"id":"a","label":"A"},"target_id":"x","relation":"child"}
{"type":"explode"}
not even json
{"type":"export","format":"docx"}
"#,
        );

        assert_eq!(script.skipped, 2);
        assert_eq!(script.events.len(), 3);
        assert_eq!(script.events[0], SessionEvent::Playback { time: 3.0 });
        assert!(matches!(
            &script.events[1],
            SessionEvent::Drop {
                target_id: Some(target),
                relation: Relation::Child,
                ..
            } if target == "x"
        ));
        assert_eq!(
            script.events[2],
            SessionEvent::Export { format: ExportFormat::Document }
        );
    }

    #[test]
    fn test_parse_empty_script() {
        let script = parse_script("");
        assert!(script.events.is_empty());
        assert_eq!(script.skipped, 0);
    }
}
