//! Narration template engine
//!
//! Resolves `{name}` placeholders in narration directives against the
//! captured argument values of a call. Excluded parameters resolve to
//! `[hidden]`; an unknown placeholder fails the whole directive with
//! [`UnknownPlaceholder`] so the caller can fall back to the default-format
//! narration instead of disrupting interception. Error templates additionally
//! understand the reserved `{message}` and `{error}` placeholders.

use crate::model::ParamCapture;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Replacement text for a placeholder naming an excluded parameter
pub const HIDDEN: &str = "[hidden]";

/// A directive referenced a parameter name unknown at the call site.
///
/// Never surfaced to the traced caller — the context recovers by emitting
/// the default-format narration and recording a [`TemplateWarning`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placeholder {{{name}}} in narration template")]
pub struct UnknownPlaceholder {
    /// The placeholder name that did not match any parameter
    pub name: String,
}

/// Which directive slot a warning was observed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSlot {
    Narration,
    OnError,
}

impl fmt::Display for TemplateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSlot::Narration => write!(f, "narration"),
            TemplateSlot::OnError => write!(f, "error narration"),
        }
    }
}

/// A recorded directive-resolution anomaly (recovered, not raised)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateWarning {
    pub owner: String,
    pub method: String,
    pub placeholder: String,
    pub slot: TemplateSlot,
}

/// Formats warnings as a human-readable report, empty string when none
pub fn format_warnings(warnings: &[TemplateWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::from("WARNING: Unresolved template placeholder(s) detected:\n");
    for w in warnings {
        out.push_str(&format!(
            "  - {}.{}: {{{}}} in {}\n",
            w.owner, w.method, w.placeholder, w.slot
        ));
    }
    out
}

/// Resolves narration directives against captured argument values.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    placeholder: Regex,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            // Regex is a literal and cannot fail to compile
            placeholder: Regex::new(r"\{([^}]+)\}").expect("placeholder pattern"),
        }
    }

    /// Resolve a success directive.
    ///
    /// `values` maps parameter names to their pre-rendered values;
    /// `exclusions` are parameter names that must never be shown.
    pub fn resolve(
        &self,
        template: &str,
        values: &HashMap<String, String>,
        exclusions: &HashSet<String>,
    ) -> Result<String, UnknownPlaceholder> {
        self.resolve_with(template, |name| {
            if exclusions.contains(name) {
                return Some(HIDDEN.to_string());
            }
            values.get(name).cloned()
        })
    }

    /// Resolve an error directive.
    ///
    /// Same as [`resolve`](Self::resolve) plus the reserved placeholders:
    /// `{message}` embeds the failure message verbatim and `{error}` the
    /// failure kind. A parameter with the same name shadows the reserved
    /// meaning.
    pub fn resolve_error(
        &self,
        template: &str,
        values: &HashMap<String, String>,
        exclusions: &HashSet<String>,
        kind: &str,
        message: &str,
    ) -> Result<String, UnknownPlaceholder> {
        self.resolve_with(template, |name| {
            if exclusions.contains(name) {
                return Some(HIDDEN.to_string());
            }
            if let Some(value) = values.get(name) {
                return Some(value.clone());
            }
            match name {
                "message" => Some(message.to_string()),
                "error" => Some(kind.to_string()),
                _ => None,
            }
        })
    }

    fn resolve_with(
        &self,
        template: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, UnknownPlaceholder> {
        let mut out = String::with_capacity(template.len());
        let mut last_end = 0;
        for caps in self.placeholder.captures_iter(template) {
            let whole = caps.get(0).expect("match");
            let name = &caps[1];
            out.push_str(&template[last_end..whole.start()]);
            match lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    return Err(UnknownPlaceholder {
                        name: name.to_string(),
                    })
                }
            }
            last_end = whole.end();
        }
        out.push_str(&template[last_end..]);
        Ok(out)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Default-format call narration: `Type.method(arg1=v1, arg2=v2)`.
///
/// Excluded parameters are already absent from `params`, so they are simply
/// omitted here, never masked.
pub fn default_call(owner: &str, method: &str, params: &[ParamCapture]) -> String {
    let args = params
        .iter()
        .map(|p| {
            if p.rendered().is_empty() {
                p.name().to_string()
            } else {
                format!("{}={}", p.name(), p.rendered())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{owner}.{method}({args})")
}

/// Default success suffix: ` -> value`, empty for unit results
pub fn returned_suffix(value: Option<&str>) -> String {
    match value {
        Some(v) => format!(" -> {v}"),
        None => String::new(),
    }
}

/// Default failure suffix: ` -> raised Kind: message`
pub fn raised_suffix(kind: &str, message: &str) -> String {
    format!(" -> raised {kind}: {message}")
}

/// Suffix for frames captured while still open
pub fn pending_suffix() -> String {
    " -> pending".to_string()
}
