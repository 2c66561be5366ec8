//! JSON export
//!
//! Flattens a trace into an `enter` / `exit` / `error` event stream and
//! serializes it with `serde_json`. String output only — writing it anywhere
//! is the host's business.

use crate::model::{CallFrame, CallOutcome, Trace};
use crate::render::TraceMetadata;
use serde_json::{json, Map, Value};

const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Default)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export the event stream: `{"events": [...]}`
    pub fn export(&self, trace: &Trace) -> String {
        let doc = json!({ "events": self.events(trace) });
        serde_json::to_string_pretty(&doc).expect("trace events serialize")
    }

    /// Export a full document with scenario metadata
    pub fn export_document(&self, trace: &Trace, metadata: &TraceMetadata) -> String {
        let mut scenario = Map::new();
        scenario.insert("name".to_string(), json!(metadata.scenario));
        scenario.insert("result".to_string(), json!(metadata.result));
        if let Some(root) = trace.roots().first() {
            scenario.insert("durationMs".to_string(), json!(root.duration_millis()));
        }
        let doc = json!({
            "version": FORMAT_VERSION,
            "scenario": Value::Object(scenario),
            "events": self.events(trace),
        });
        serde_json::to_string_pretty(&doc).expect("trace events serialize")
    }

    fn events(&self, trace: &Trace) -> Vec<Value> {
        let mut events = Vec::new();
        let mut next_id = 0u64;
        for root in trace.roots() {
            flatten(root, 0, None, &mut next_id, &mut events);
        }
        events
    }
}

fn flatten(
    frame: &CallFrame,
    depth: usize,
    parent_id: Option<u64>,
    next_id: &mut u64,
    events: &mut Vec<Value>,
) {
    let id = *next_id;
    *next_id += 1;
    events.push(enter_event(frame, id, depth, parent_id));

    for child in frame.children() {
        flatten(child, depth + 1, Some(id), next_id, events);
    }

    let exit_id = *next_id;
    *next_id += 1;
    if let Some(event) = exit_event(frame, exit_id, depth, parent_id) {
        events.push(event);
    }
}

fn enter_event(frame: &CallFrame, id: u64, depth: usize, parent_id: Option<u64>) -> Value {
    let params: Map<String, Value> = frame
        .params()
        .iter()
        .map(|p| {
            let value = if p.rendered().is_empty() {
                Value::Null
            } else {
                json!(p.rendered())
            };
            (p.name().to_string(), value)
        })
        .collect();
    json!({
        "id": id,
        "type": "enter",
        "class": frame.owner(),
        "method": frame.method(),
        "seq": frame.index(),
        "params": params,
        "depth": depth,
        "parentId": parent_id,
    })
}

fn exit_event(frame: &CallFrame, id: u64, depth: usize, parent_id: Option<u64>) -> Option<Value> {
    let mut event = Map::new();
    event.insert("id".to_string(), json!(id));
    event.insert("class".to_string(), json!(frame.owner()));
    event.insert("method".to_string(), json!(frame.method()));
    event.insert("seq".to_string(), json!(frame.index()));
    match frame.outcome() {
        // Open frames have no exit event
        CallOutcome::Pending => return None,
        CallOutcome::Returned { value } => {
            event.insert("type".to_string(), json!("exit"));
            event.insert(
                "returnValue".to_string(),
                value.as_ref().map_or(Value::Null, |v| json!(v)),
            );
        }
        CallOutcome::Failed {
            kind,
            message,
            narration,
        } => {
            event.insert("type".to_string(), json!("error"));
            let mut error = Map::new();
            error.insert("type".to_string(), json!(kind));
            error.insert("message".to_string(), json!(message));
            if let Some(narration) = narration {
                error.insert("narration".to_string(), json!(narration));
            }
            event.insert("error".to_string(), Value::Object(error));
        }
    }
    event.insert("durationMs".to_string(), json!(frame.duration_millis()));
    event.insert("depth".to_string(), json!(depth));
    event.insert(
        "parentId".to_string(),
        parent_id.map_or(Value::Null, |p| json!(p)),
    );
    Some(Value::Object(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamCapture;

    fn frame(owner: &str, method: &str, index: u64, depth: usize) -> CallFrame {
        CallFrame {
            owner: owner.to_string(),
            method: method.to_string(),
            index,
            depth,
            params: Vec::new(),
            narration: None,
            narrative: String::new(),
            children: Vec::new(),
            outcome: CallOutcome::Returned { value: None },
            duration_nanos: 0,
        }
    }

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).expect("valid JSON")
    }

    #[test]
    fn test_enter_and_exit_events_in_order() {
        let mut root = frame("OrderService", "place_order", 1, 0);
        let mut child = frame("InventoryService", "check_stock", 2, 1);
        child.outcome = CallOutcome::Returned {
            value: Some("true".to_string()),
        };
        root.children = vec![child];
        root.outcome = CallOutcome::Returned {
            value: Some("\"order-42\"".to_string()),
        };
        let trace = Trace {
            roots: vec![root],
            warnings: Vec::new(),
        };

        let doc = parse(&JsonExporter::new().export(&trace));
        let events = doc["events"].as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["type"], "enter");
        assert_eq!(events[0]["class"], "OrderService");
        assert_eq!(events[1]["type"], "enter");
        assert_eq!(events[1]["parentId"], 0);
        assert_eq!(events[2]["type"], "exit");
        assert_eq!(events[2]["returnValue"], "true");
        assert_eq!(events[3]["type"], "exit");
        assert_eq!(events[3]["returnValue"], "\"order-42\"");
    }

    #[test]
    fn test_error_event_payload() {
        let mut f = frame("PaymentService", "charge", 1, 0);
        f.outcome = CallOutcome::Failed {
            kind: "PaymentDeclined".to_string(),
            message: "insufficient funds".to_string(),
            narration: Some("payment was declined by the gateway".to_string()),
        };
        let trace = Trace {
            roots: vec![f],
            warnings: Vec::new(),
        };

        let doc = parse(&JsonExporter::new().export(&trace));
        let events = doc["events"].as_array().unwrap();
        assert_eq!(events[1]["type"], "error");
        assert_eq!(events[1]["error"]["type"], "PaymentDeclined");
        assert_eq!(events[1]["error"]["message"], "insufficient funds");
        assert_eq!(
            events[1]["error"]["narration"],
            "payment was declined by the gateway"
        );
    }

    #[test]
    fn test_params_and_suppressed_values() {
        let mut f = frame("A", "m", 1, 0);
        f.params = vec![
            ParamCapture::new("shown", "\"v\""),
            ParamCapture::new("suppressed", ""),
        ];
        let trace = Trace {
            roots: vec![f],
            warnings: Vec::new(),
        };

        let doc = parse(&JsonExporter::new().export(&trace));
        let params = &doc["events"][0]["params"];
        assert_eq!(params["shown"], "\"v\"");
        assert_eq!(params["suppressed"], Value::Null);
    }

    #[test]
    fn test_pending_frame_has_no_exit_event() {
        let mut f = frame("A", "m", 1, 0);
        f.outcome = CallOutcome::Pending;
        let trace = Trace {
            roots: vec![f],
            warnings: Vec::new(),
        };

        let doc = parse(&JsonExporter::new().export(&trace));
        let events = doc["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "enter");
    }

    #[test]
    fn test_document_wrapper() {
        let mut f = frame("LendingService", "borrow_book", 1, 0);
        f.outcome = CallOutcome::Returned {
            value: Some("<LoanReceipt>".to_string()),
        };
        let trace = Trace {
            roots: vec![f],
            warnings: Vec::new(),
        };

        let doc = parse(&JsonExporter::new().export_document(
            &trace,
            &TraceMetadata::new("member borrows available book", "passed"),
        ));
        assert_eq!(doc["version"], "1.0");
        assert_eq!(doc["scenario"]["name"], "member borrows available book");
        assert_eq!(doc["scenario"]["result"], "passed");
        assert_eq!(doc["scenario"]["durationMs"], 0);
    }
}
