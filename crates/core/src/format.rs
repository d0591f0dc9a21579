use crate::types::OutlineNode;

/// Shown in place of the outline when it has no nodes.
pub const EMPTY_OUTLINE_PLACEHOLDER: &str = "_Drag highlights here to build an outline_";

/// Format seconds as M:SS timestamp (minutes unpadded)
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a single outline line at the given depth. `position` is the
/// zero-based index among root nodes and only matters at depth 0.
pub fn format_outline_line(node: &OutlineNode, depth: usize, position: usize) -> String {
    let prefix = if depth == 0 {
        format!("{}.", position + 1)
    } else {
        "-".to_string()
    };

    format!(
        "{}{} {} ({}, {})",
        "  ".repeat(depth),
        prefix,
        node.label,
        format_timestamp(node.time),
        node.category_name()
    )
}

/// Render the outline as numbered, indented text. Preview and export both
/// go through here.
pub fn render_outline(tree: &[OutlineNode]) -> String {
    if tree.is_empty() {
        return EMPTY_OUTLINE_PLACEHOLDER.to_string();
    }

    let mut lines = Vec::new();
    push_lines(tree, 0, &mut lines);
    lines.join("\n")
}

fn push_lines(nodes: &[OutlineNode], depth: usize, lines: &mut Vec<String>) {
    for (position, node) in nodes.iter().enumerate() {
        lines.push(format_outline_line(node, depth, position));
        push_lines(&node.children, depth + 1, lines);
    }
}
