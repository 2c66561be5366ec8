//! Mermaid `sequenceDiagram` renderer

use crate::{collect_participants, message_text, quote_if_needed};
use chronicle_core::{CallFrame, CallOutcome, Render, Trace};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MermaidRenderer;

impl MermaidRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Diagram with participants declared under their full type names
    pub fn render(&self, trace: &Trace) -> String {
        let mut out = String::from("sequenceDiagram\n");

        for participant in collect_participants(trace.roots()) {
            out.push_str(&format!("    participant {}\n", quote_if_needed(&participant)));
        }

        for root in trace.roots() {
            render_node(root, root.owner(), &mut out);
        }

        out.trim_end().to_string()
    }

    /// Diagram with compact aliases derived from the type names
    pub fn render_with_aliases(&self, trace: &Trace) -> String {
        let mut out = String::from("sequenceDiagram\n");

        let participants = collect_participants(trace.roots());
        let aliases = build_aliases(&participants);

        for participant in &participants {
            out.push_str(&format!(
                "    participant {} as {}\n",
                aliases[participant], participant
            ));
        }

        for root in trace.roots() {
            render_node_aliased(root, root.owner(), &aliases, &mut out);
        }

        out.trim_end().to_string()
    }
}

impl Render for MermaidRenderer {
    fn render(&self, trace: &Trace) -> String {
        MermaidRenderer::render(self, trace)
    }
}

fn render_node(frame: &CallFrame, caller: &str, out: &mut String) {
    let target = frame.owner();
    out.push_str(&format!(
        "    {}->>{}: {}\n",
        quote_if_needed(caller),
        quote_if_needed(target),
        message_text(frame)
    ));

    for child in frame.children() {
        render_node(child, target, out);
    }

    match frame.outcome() {
        // An open frame leaves its activation visibly unreturned
        CallOutcome::Pending => {}
        CallOutcome::Returned { value } => {
            out.push_str(&format!(
                "    {}-->>{}: {}\n",
                quote_if_needed(target),
                quote_if_needed(caller),
                value.as_deref().unwrap_or("()")
            ));
        }
        CallOutcome::Failed { kind, .. } => {
            out.push_str(&format!(
                "    {}-x{}: {}\n",
                quote_if_needed(target),
                quote_if_needed(caller),
                kind
            ));
        }
    }
}

fn render_node_aliased(
    frame: &CallFrame,
    caller: &str,
    aliases: &HashMap<String, String>,
    out: &mut String,
) {
    let target = frame.owner();
    let caller_alias = aliases[caller].as_str();
    let target_alias = aliases[target].as_str();

    out.push_str(&format!(
        "    {caller_alias}->>{target_alias}: {}\n",
        message_text(frame)
    ));

    for child in frame.children() {
        render_node_aliased(child, target, aliases, out);
    }

    match frame.outcome() {
        CallOutcome::Pending => {}
        CallOutcome::Returned { value } => {
            out.push_str(&format!(
                "    {target_alias}-->>{caller_alias}: {}\n",
                value.as_deref().unwrap_or("()")
            ));
        }
        CallOutcome::Failed { kind, .. } => {
            out.push_str(&format!("    {target_alias}-x{caller_alias}: {kind}\n"));
        }
    }
}

fn build_aliases(participants: &[String]) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    let mut used: Vec<String> = Vec::new();
    for name in participants {
        let mut alias = extract_upper(name);
        if alias.is_empty() {
            alias = name.clone();
        }
        if used.contains(&alias) {
            let mut suffix = 2;
            while used.contains(&format!("{alias}{suffix}")) {
                suffix += 1;
            }
            alias = format!("{alias}{suffix}");
        }
        used.push(alias.clone());
        aliases.insert(name.clone(), alias);
    }
    aliases
}

fn extract_upper(name: &str) -> String {
    let upper: String = name.chars().filter(|c| c.is_uppercase()).collect();
    upper.chars().take(2).collect()
}
