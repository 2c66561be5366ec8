//! Indented-text renderer
//!
//! Pre-order, depth-first: one line per frame, two spaces of indentation per
//! nesting level, children listed after their parent in call order. Success
//! shows `→ value`, failure is marked with `!!`, open frames with `… pending`.

use crate::model::{CallFrame, CallOutcome, ParamCapture, Trace};
use crate::render::Render;

#[derive(Debug, Default)]
pub struct IndentedTextRenderer;

impl IndentedTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Render for IndentedTextRenderer {
    fn render(&self, trace: &Trace) -> String {
        let mut out = String::new();
        for root in trace.roots() {
            render_node(root, 0, &mut out);
        }
        out.trim_end().to_string()
    }
}

fn render_node(frame: &CallFrame, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&header(frame));
    render_outcome(frame, out);
    if frame.duration_millis() > 0 {
        out.push_str(&format!(" — {}ms", frame.duration_millis()));
    }
    if let Some(narration) = frame.narration() {
        if !frame.outcome().is_failed() {
            out.push_str(" // ");
            out.push_str(narration);
        }
    }
    out.push('\n');
    for child in frame.children() {
        render_node(child, depth + 1, out);
    }
}

fn header(frame: &CallFrame) -> String {
    let params = frame
        .params()
        .iter()
        .map(render_param)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}.{}({})", frame.owner(), frame.method(), params)
}

fn render_param(param: &ParamCapture) -> String {
    if param.rendered().is_empty() {
        param.name().to_string()
    } else {
        format!("{}: {}", param.name(), param.rendered())
    }
}

fn render_outcome(frame: &CallFrame, out: &mut String) {
    match frame.outcome() {
        CallOutcome::Pending => out.push_str(" … pending"),
        CallOutcome::Returned { value } => {
            if let Some(value) = value {
                out.push_str(" → ");
                out.push_str(value);
            }
        }
        CallOutcome::Failed {
            kind,
            message,
            narration,
        } => {
            out.push_str(&format!(" !! {kind}: {message}"));
            if let Some(narration) = narration {
                out.push_str(" | ");
                out.push_str(narration);
            }
        }
    }
}
