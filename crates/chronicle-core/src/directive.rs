//! Narration directives
//!
//! Declarative per-method metadata: a custom success template, error
//! templates keyed by failure kind, and the set of excluded parameter names.
//! Directives are plain immutable records registered by the host integration
//! and looked up by `(owner type, method)` key; the core performs no
//! discovery of its own.

use std::collections::{HashMap, HashSet};

/// An error template, applicable to one failure kind or to any (`kind: None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTemplate {
    pub(crate) kind: Option<String>,
    pub(crate) template: String,
}

/// Narration metadata for one method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NarrationDirective {
    pub(crate) narration: Option<String>,
    pub(crate) on_error: Vec<ErrorTemplate>,
    pub(crate) excluded: HashSet<String>,
}

impl NarrationDirective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the custom success template (`{name}` placeholders)
    pub fn narrated(mut self, template: impl Into<String>) -> Self {
        self.narration = Some(template.into());
        self
    }

    /// Add an error template for a specific failure kind
    pub fn on_error(mut self, kind: impl Into<String>, template: impl Into<String>) -> Self {
        self.on_error.push(ErrorTemplate {
            kind: Some(kind.into()),
            template: template.into(),
        });
        self
    }

    /// Add a catch-all error template, used when no kind matches
    pub fn on_any_error(mut self, template: impl Into<String>) -> Self {
        self.on_error.push(ErrorTemplate {
            kind: None,
            template: template.into(),
        });
        self
    }

    /// Exclude a parameter from every trace output channel
    pub fn exclude(mut self, param: impl Into<String>) -> Self {
        self.excluded.insert(param.into());
        self
    }

    /// Custom success template, if any
    pub fn narration(&self) -> Option<&str> {
        self.narration.as_deref()
    }

    /// Excluded parameter names
    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// Select the error template for a failure kind: exact match wins,
    /// then the catch-all, then none (default error formatting applies).
    pub fn error_template(&self, kind: &str) -> Option<&str> {
        self.on_error
            .iter()
            .find(|t| t.kind.as_deref() == Some(kind))
            .or_else(|| self.on_error.iter().find(|t| t.kind.is_none()))
            .map(|t| t.template.as_str())
    }
}

/// Directive lookup by `(owner type, method)` key.
#[derive(Debug, Clone, Default)]
pub struct DirectiveCatalog {
    by_method: HashMap<(String, String), NarrationDirective>,
}

impl DirectiveCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the directive for `owner.method`, replacing any previous one
    pub fn register(
        &mut self,
        owner: impl Into<String>,
        method: impl Into<String>,
        directive: NarrationDirective,
    ) -> &mut Self {
        self.by_method
            .insert((owner.into(), method.into()), directive);
        self
    }

    /// Look up the directive for `owner.method`
    pub fn lookup(&self, owner: &str, method: &str) -> Option<&NarrationDirective> {
        self.by_method
            .get(&(owner.to_string(), method.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }
}
