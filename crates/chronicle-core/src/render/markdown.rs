//! Markdown renderer
//!
//! Bulleted call flow with bold headers and backticked values, plus a
//! document form that prepends YAML frontmatter and scenario metadata for
//! hosts that collect traces into Markdown reports.

use crate::model::{CallFrame, CallOutcome, ParamCapture, Trace};
use crate::render::Render;

const DEFAULT_SLOW_THRESHOLD_MS: u64 = 200;

/// Metadata for document output: scenario title and result status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceMetadata {
    pub scenario: String,
    pub result: String,
}

impl TraceMetadata {
    pub fn new(scenario: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            result: result.into(),
        }
    }
}

#[derive(Debug)]
pub struct MarkdownRenderer {
    slow_threshold_ms: u64,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }

    /// Renderer marking calls slower than `threshold_ms` as slow
    pub fn with_slow_threshold(threshold_ms: u64) -> Self {
        Self {
            slow_threshold_ms: threshold_ms,
        }
    }

    /// Full document: frontmatter, scenario header, and the call flow
    pub fn render_document(&self, trace: &Trace, metadata: &TraceMetadata) -> String {
        let mut out = FrontmatterBuilder::new()
            .scenario(&metadata.scenario)
            .build(trace);
        if let Some(root) = trace.roots().first() {
            out.push_str(&format!(
                "\n## Trace: {}.{}\n\n",
                root.owner(),
                root.method()
            ));
            out.push_str(&format!("**Scenario:** {}\n", metadata.scenario));
            out.push_str(&format!(
                "**Duration:** {}ms | **Result:** {}\n\n",
                root.duration_millis(),
                metadata.result
            ));
            out.push_str("### Call Flow\n\n");
        }
        for root in trace.roots() {
            self.render_node(root, 0, &mut out);
        }
        out.trim_end().to_string()
    }

    fn render_node(&self, frame: &CallFrame, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let params = frame
            .params()
            .iter()
            .map(render_param)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{indent}- **{}.{}**({params})",
            frame.owner(),
            frame.method()
        ));
        self.render_outcome(frame, depth, out);
        self.render_duration(frame, out);
        out.push('\n');
        if let Some(narration) = frame.narration() {
            if !frame.outcome().is_failed() {
                out.push_str(&format!("{indent}  *{narration}*\n"));
            }
        }
        for child in frame.children() {
            self.render_node(child, depth + 1, out);
        }
    }

    fn render_outcome(&self, frame: &CallFrame, depth: usize, out: &mut String) {
        match frame.outcome() {
            CallOutcome::Pending => out.push_str(" … pending"),
            CallOutcome::Returned { value } => {
                if let Some(value) = value {
                    out.push_str(&format!(" → `{value}`"));
                }
            }
            CallOutcome::Failed {
                kind,
                message,
                narration,
            } => {
                let error_indent = "  ".repeat(depth + 1);
                out.push_str(&format!("\n\n{error_indent}> ❌ `{kind}`: {message}"));
                if let Some(narration) = narration {
                    out.push_str(&format!("\n{error_indent}> {narration}"));
                }
            }
        }
    }

    fn render_duration(&self, frame: &CallFrame, out: &mut String) {
        let millis = frame.duration_millis();
        if millis > 0 {
            out.push_str(&format!(" — {millis}ms"));
            if millis > self.slow_threshold_ms {
                out.push_str(" ⚠️ slow");
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, trace: &Trace) -> String {
        let mut out = String::new();
        for root in trace.roots() {
            self.render_node(root, 0, &mut out);
        }
        out.trim_end().to_string()
    }
}

fn render_param(param: &ParamCapture) -> String {
    if param.rendered().is_empty() {
        param.name().to_string()
    } else {
        format!("{}: `{}`", param.name(), param.rendered())
    }
}

/// Builds the YAML frontmatter block for Markdown trace documents.
#[derive(Debug, Default)]
pub struct FrontmatterBuilder {
    scenario: Option<String>,
}

impl FrontmatterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    pub fn build(&self, trace: &Trace) -> String {
        let mut out = String::from("---\ntype: trace\n");
        if let Some(scenario) = &self.scenario {
            out.push_str(&format!("scenario: {}\n", yaml_safe(scenario)));
        }
        if let Some(root) = trace.roots().first() {
            out.push_str(&format!("entry_point: {}.{}\n", root.owner(), root.method()));
            out.push_str(&format!("duration_ms: {}\n", root.duration_millis()));
        }
        out.push_str(&format!("method_count: {}\n", trace.frame_count()));
        out.push_str(&format!("error_count: {}\n", count_errors(trace)));
        out.push_str("---\n");
        out
    }
}

fn count_errors(trace: &Trace) -> usize {
    fn count(frame: &CallFrame) -> usize {
        let own = usize::from(frame.outcome().is_failed());
        own + frame.children().iter().map(count).sum::<usize>()
    }
    trace.roots().iter().map(count).sum()
}

fn yaml_safe(value: &str) -> String {
    let needs_quoting = value
        .chars()
        .any(|c| matches!(c, ':' | '#' | '"' | '\\' | '\n'));
    if needs_quoting {
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        )
    } else {
        value.to_string()
    }
}
