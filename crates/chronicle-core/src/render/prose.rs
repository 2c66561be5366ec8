//! Prose renderer
//!
//! Same pre-order traversal as the indented form, composed into connected
//! sentences: a frame's narration becomes a clause, children become
//! subordinate clauses introduced with `First,` / `Then,`, and a parent's
//! outcome closes its sentence with `Finally,`. A failure ends the sentence
//! chain for its branch — synchronous call semantics guarantee no siblings
//! ever follow a failed call in the tree.

use crate::model::{CallFrame, CallOutcome, Trace};
use crate::render::{to_phrase, Render};

#[derive(Debug, Default)]
pub struct ProseRenderer;

impl ProseRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Render for ProseRenderer {
    fn render(&self, trace: &Trace) -> String {
        let mut out = String::new();
        for root in trace.roots() {
            render_node(root, 0, true, &mut out);
        }
        out.trim_end().to_string()
    }
}

fn render_node(frame: &CallFrame, depth: usize, first_sibling: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);

    let subject = to_phrase(frame.owner());
    let action = to_phrase(frame.method());
    if depth == 0 {
        out.push_str(&format!("The {subject} "));
    } else if first_sibling {
        out.push_str(&format!("First, the {subject} "));
    } else {
        out.push_str(&format!("Then, the {subject} "));
    }

    if frame.outcome().is_failed() {
        out.push_str("failed to ");
    }
    out.push_str(&action);

    if let (Some(narration), false) = (frame.narration(), frame.outcome().is_failed()) {
        out.push_str(" — ");
        out.push_str(narration);
    } else if !frame.params().is_empty() {
        out.push_str(" for ");
        let rendered = frame
            .params()
            .iter()
            .map(|p| {
                if p.rendered().is_empty() {
                    p.name().to_string()
                } else {
                    format!("{}: {}", p.name(), p.rendered())
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&rendered);
    }

    if frame.children().is_empty() {
        close_leaf(frame, out);
    } else {
        out.push_str(":\n");
        for (i, child) in frame.children().iter().enumerate() {
            render_node(child, depth + 1, i == 0, out);
        }
        close_parent(frame, &indent, out);
    }
}

fn close_leaf(frame: &CallFrame, out: &mut String) {
    match frame.outcome() {
        CallOutcome::Pending => out.push_str(", still in progress.\n"),
        CallOutcome::Returned { value } => {
            if let Some(value) = value {
                out.push_str(&format!(", returning {value}.\n"));
            } else {
                out.push_str(".\n");
            }
        }
        CallOutcome::Failed {
            kind,
            message,
            narration,
        } => {
            out.push_str(&format!(" — {kind}: {message}"));
            if let Some(narration) = narration {
                out.push_str(&format!(" ({narration})"));
            }
            out.push_str(".\n");
        }
    }
}

fn close_parent(frame: &CallFrame, indent: &str, out: &mut String) {
    match frame.outcome() {
        CallOutcome::Pending => {
            out.push_str(&format!("{indent}  Still in progress.\n"));
        }
        CallOutcome::Returned { value } => {
            if let Some(value) = value {
                out.push_str(&format!("{indent}  Finally, it returned {value}.\n"));
            }
        }
        CallOutcome::Failed {
            kind,
            message,
            narration,
        } => {
            out.push_str(&format!("{indent}  But it failed — {kind}: {message}"));
            if let Some(narration) = narration {
                out.push_str(&format!(" ({narration})"));
            }
            out.push_str(".\n");
        }
    }
}
