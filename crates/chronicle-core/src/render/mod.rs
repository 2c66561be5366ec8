//! Renderers: trace tree to text
//!
//! Stateless, deterministic transformers from a captured [`Trace`] to a
//! string. Built-in forms: indented text, prose, and Markdown; the
//! sequence-diagram notations live in the `chronicle-diagrams` crate and
//! implement the same [`Render`] contract.

mod indented;
mod markdown;
mod phrase;
mod prose;

pub use indented::IndentedTextRenderer;
pub use markdown::{FrontmatterBuilder, MarkdownRenderer, TraceMetadata};
pub use prose::ProseRenderer;

use crate::model::Trace;

/// Transform a trace tree into a string representation.
///
/// Implementations never mutate the input and produce identical output for
/// structurally equal traces.
pub trait Render {
    fn render(&self, trace: &Trace) -> String;
}

pub(crate) use phrase::to_phrase;
