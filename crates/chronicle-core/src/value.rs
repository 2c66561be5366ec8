//! Value rendering and per-type summarizers
//!
//! Captured arguments, results, and failure payloads are rendered to compact
//! strings at capture time. A [`SummaryRegistry`] maps a type's `TypeId` to a
//! custom summarizer; anything unregistered falls back to the default
//! rendering: quoted/truncated strings, plain numbers and bools, and an
//! opaque `<TypeName>` placeholder for everything else. Rendered values are
//! single-line (newlines escaped) so one value can never break line-oriented
//! or diagram output.

use std::any::{Any, TypeId};
use std::collections::HashMap;

const DEFAULT_MAX_STRING_LEN: usize = 200;
const DEFAULT_MAX_ITEMS: usize = 5;

type Summarizer = Box<dyn Fn(&dyn Any) -> String + Send + Sync>;

/// Custom per-type display strings, keyed by type identity.
///
/// Registration avoids any trait coupling between rendering and host types:
/// the host registers a closure per concrete type, and the renderer consults
/// the registry before falling back to the default textual form.
#[derive(Default)]
pub struct SummaryRegistry {
    summaries: HashMap<TypeId, Summarizer>,
}

impl SummaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a summarizer for values of type `T`
    pub fn register<T, F>(&mut self, summarize: F)
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.summaries.insert(
            TypeId::of::<T>(),
            Box::new(move |any| {
                let value = any.downcast_ref::<T>().expect("summarizer type mismatch");
                summarize(value)
            }),
        );
    }

    /// Summarize a value if its type is registered
    pub fn summarize(&self, value: &dyn Any) -> Option<String> {
        self.summaries.get(&value.type_id()).map(|f| f(value))
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl std::fmt::Debug for SummaryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryRegistry")
            .field("registered", &self.summaries.len())
            .finish()
    }
}

/// Serializes values to bounded, single-line string representations.
pub struct ValueRenderer {
    max_string_len: usize,
    max_items: usize,
    summaries: SummaryRegistry,
}

impl ValueRenderer {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_STRING_LEN, DEFAULT_MAX_ITEMS)
    }

    pub fn with_limits(max_string_len: usize, max_items: usize) -> Self {
        Self {
            max_string_len,
            max_items,
            summaries: SummaryRegistry::new(),
        }
    }

    /// Register a custom summarizer for values of type `T`.
    ///
    /// The summarizer is used wherever a `T` appears: arguments, results,
    /// failure payloads.
    pub fn register_summary<T, F>(&mut self, summarize: F)
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.summaries.register(summarize);
    }

    /// Render a value: registered summarizer, default primitive form, or
    /// an opaque `<TypeName>` placeholder.
    pub fn render<T: Any>(&self, value: &T) -> String {
        if let Some(summary) = self.summaries.summarize(value) {
            return self.escape(&summary);
        }
        if let Some(text) = self.render_primitive(value) {
            return text;
        }
        format!("<{}>", short_type_name(std::any::type_name::<T>()))
    }

    /// Render a value for template interpolation: like
    /// [`render`](Self::render) but strings are not quoted, so a placeholder
    /// resolves to the bare text.
    pub fn render_plain<T: Any>(&self, value: &T) -> String {
        let any: &dyn Any = value;
        if let Some(summary) = self.summaries.summarize(any) {
            return self.escape(&summary);
        }
        if let Some(s) = any.downcast_ref::<String>() {
            return self.clip(s);
        }
        if let Some(s) = any.downcast_ref::<&'static str>() {
            return self.clip(s);
        }
        if let Some(text) = self.render_primitive(any) {
            return text;
        }
        format!("<{}>", short_type_name(std::any::type_name::<T>()))
    }

    /// Render a borrowed string slice (convenience for non-`'static` borrows)
    pub fn render_str(&self, value: &str) -> String {
        self.quote(value)
    }

    /// Unquoted counterpart of [`render_str`](Self::render_str)
    pub fn render_plain_str(&self, value: &str) -> String {
        self.clip(value)
    }

    /// Render a slice with the item limit applied: `[a, b, … (7 total)]`
    pub fn render_slice<T: Any>(&self, values: &[T]) -> String {
        let mut out = String::from("[");
        for (i, value) in values.iter().take(self.max_items).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.render(value));
        }
        if values.len() > self.max_items {
            out.push_str(&format!(", … ({} total)", values.len()));
        }
        out.push(']');
        out
    }

    fn render_primitive(&self, value: &dyn Any) -> Option<String> {
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(self.quote(s));
        }
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return Some(self.quote(s));
        }
        if value.downcast_ref::<()>().is_some() {
            return Some("()".to_string());
        }
        macro_rules! plain {
            ($($ty:ty),+ $(,)?) => {
                $(
                    if let Some(v) = value.downcast_ref::<$ty>() {
                        return Some(v.to_string());
                    }
                )+
            };
        }
        plain!(
            bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        );
        None
    }

    fn quote(&self, s: &str) -> String {
        format!("\"{}\"", self.clip(s))
    }

    fn clip(&self, s: &str) -> String {
        let mut text: String = s.chars().take(self.max_string_len).collect();
        if s.chars().count() > self.max_string_len {
            text.push('…');
        }
        escape_line(&text)
    }

    fn escape(&self, s: &str) -> String {
        escape_line(s)
    }
}

impl Default for ValueRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValueRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueRenderer")
            .field("max_string_len", &self.max_string_len)
            .field("max_items", &self.max_items)
            .field("summaries", &self.summaries)
            .finish()
    }
}

fn escape_line(s: &str) -> String {
    if !s.contains('\n') && !s.contains('\r') {
        return s.to_string();
    }
    s.replace('\r', "\\r").replace('\n', "\\n")
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Order {
        id: String,
        total_cents: u64,
    }

    // --- defaults ---

    #[test]
    fn test_strings_are_quoted() {
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render(&"order-42".to_string()), "\"order-42\"");
        assert_eq!(renderer.render_str("order-42"), "\"order-42\"");
    }

    #[test]
    fn test_numbers_and_bools_are_plain() {
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render(&42i32), "42");
        assert_eq!(renderer.render(&2.5f64), "2.5");
        assert_eq!(renderer.render(&true), "true");
        assert_eq!(renderer.render(&'x'), "x");
        assert_eq!(renderer.render(&()), "()");
    }

    #[test]
    fn test_long_string_truncated_with_ellipsis() {
        let renderer = ValueRenderer::with_limits(5, 5);
        assert_eq!(renderer.render_str("abcdefgh"), "\"abcde…\"");
    }

    #[test]
    fn test_newlines_escaped() {
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render_str("a\nb\r\nc"), "\"a\\nb\\r\\nc\"");
    }

    #[test]
    fn test_unregistered_type_renders_placeholder() {
        let renderer = ValueRenderer::new();
        let order = Order {
            id: "o-1".to_string(),
            total_cents: 100,
        };
        assert_eq!(renderer.render(&order), "<Order>");
    }

    // --- summarizers ---

    #[test]
    fn test_registered_summarizer_wins() {
        let mut renderer = ValueRenderer::new();
        renderer.register_summary::<Order, _>(|o| {
            format!("Order {} (${}.{:02})", o.id, o.total_cents / 100, o.total_cents % 100)
        });
        let order = Order {
            id: "o-1".to_string(),
            total_cents: 1999,
        };
        assert_eq!(renderer.render(&order), "Order o-1 ($19.99)");
    }

    #[test]
    fn test_summarizer_output_is_escaped() {
        let mut renderer = ValueRenderer::new();
        renderer.register_summary::<Order, _>(|o| format!("Order\n{}", o.id));
        let order = Order {
            id: "o-1".to_string(),
            total_cents: 0,
        };
        assert_eq!(renderer.render(&order), "Order\\no-1");
    }

    #[test]
    fn test_summarizer_applies_per_type_not_per_value() {
        let mut registry = SummaryRegistry::new();
        registry.register::<u64, _>(|n| format!("#{n}"));
        assert_eq!(registry.summarize(&7u64), Some("#7".to_string()));
        assert_eq!(registry.summarize(&7u32), None);
    }

    // --- slices ---

    #[test]
    fn test_slice_within_limit() {
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render_slice(&[1, 2, 3]), "[1, 2, 3]");
    }

    #[test]
    fn test_slice_overflow_marker() {
        let renderer = ValueRenderer::with_limits(200, 2);
        assert_eq!(renderer.render_slice(&[1, 2, 3, 4]), "[1, 2, … (4 total)]");
    }

    // --- plain forms ---

    #[test]
    fn test_plain_strings_are_unquoted() {
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render_plain(&"M-001".to_string()), "M-001");
        assert_eq!(renderer.render_plain_str("M-001"), "M-001");
        assert_eq!(renderer.render_plain(&42i32), "42");
    }

    #[test]
    fn test_plain_string_still_clipped_and_escaped() {
        let renderer = ValueRenderer::with_limits(3, 5);
        assert_eq!(renderer.render_plain_str("abcdef"), "abc…");
        let renderer = ValueRenderer::new();
        assert_eq!(renderer.render_plain_str("a\nb"), "a\\nb");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::vec::Vec<alloc::string::String>"), "Vec");
        assert_eq!(short_type_name("my_crate::model::Order"), "Order");
        assert_eq!(short_type_name("Order"), "Order");
    }
}
