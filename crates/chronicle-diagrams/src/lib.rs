//! Chronicle Diagrams - Sequence-diagram renderers
//!
//! Turns captured traces into textual sequence-diagram notations: Mermaid
//! (`sequenceDiagram`) and PlantUML (`@startuml`). Both derive one lifeline
//! per distinct owning type, emit call messages in sequence order with
//! returns nested around children, and differ only in concrete syntax.

mod mermaid;
mod plantuml;

pub use mermaid::MermaidRenderer;
pub use plantuml::PlantUmlRenderer;

use chronicle_core::CallFrame;

/// Lifelines in first-encounter, pre-order traversal order
pub(crate) fn collect_participants(roots: &[CallFrame]) -> Vec<String> {
    fn visit(frame: &CallFrame, seen: &mut Vec<String>) {
        if !seen.iter().any(|p| p == frame.owner()) {
            seen.push(frame.owner().to_string());
        }
        for child in frame.children() {
            visit(child, seen);
        }
    }
    let mut seen = Vec::new();
    for root in roots {
        visit(root, &mut seen);
    }
    seen
}

/// Message label: the resolved custom narration when present, otherwise the
/// compact `method(arg names)` call form
pub(crate) fn message_text(frame: &CallFrame) -> String {
    if let Some(narration) = frame.narration() {
        return narration.to_string();
    }
    let params = frame
        .params()
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", frame.method(), params)
}

/// Quote a participant name containing structural characters
pub(crate) fn quote_if_needed(name: &str) -> String {
    let structural = name
        .chars()
        .any(|c| matches!(c, '.' | '-' | ':' | ' '));
    if structural {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}
