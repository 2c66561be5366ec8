//! PlantUML sequence-diagram renderer

use crate::{collect_participants, message_text, quote_if_needed};
use chronicle_core::{CallFrame, CallOutcome, Render, Trace};

#[derive(Debug, Default)]
pub struct PlantUmlRenderer;

impl PlantUmlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, trace: &Trace) -> String {
        let mut out = String::from("@startuml\n");

        for participant in collect_participants(trace.roots()) {
            out.push_str(&format!("participant {}\n", quote_if_needed(&participant)));
        }

        for root in trace.roots() {
            render_node(root, root.owner(), &mut out);
        }

        out.push_str("@enduml");
        out
    }
}

impl Render for PlantUmlRenderer {
    fn render(&self, trace: &Trace) -> String {
        PlantUmlRenderer::render(self, trace)
    }
}

fn render_node(frame: &CallFrame, caller: &str, out: &mut String) {
    let target = frame.owner();
    out.push_str(&format!(
        "{} -> {}: {}\n",
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
                "{} --> {}: {}\n",
                quote_if_needed(target),
                quote_if_needed(caller),
                value.as_deref().unwrap_or("()")
            ));
        }
        CallOutcome::Failed { kind, .. } => {
            out.push_str(&format!(
                "{} -[#red]-> {}: {}\n",
                quote_if_needed(target),
                quote_if_needed(caller),
                kind
            ));
        }
    }
}
