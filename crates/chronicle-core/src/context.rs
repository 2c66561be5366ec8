//! Context and call-stack manager
//!
//! A [`TraceContext`] owns the live, mutable call stack for one logical
//! thread of execution. Interceptors report call boundaries through
//! [`begin_call`](TraceContext::begin_call) /
//! [`end_returned`](TraceContext::end_returned) /
//! [`end_failed`](TraceContext::end_failed); the context builds the call
//! tree, resolves narration at close time, and hands out immutable
//! [`Trace`] snapshots on demand.
//!
//! Cross-thread propagation goes through [`ContextSnapshot`]: the snapshot
//! shares the *same* live stack (not a copy), so calls intercepted on the
//! destination thread append to the same in-flight trace. All push/pop
//! activity is serialized by the one mutex around the shared stack.
//!
//! Closing is strictly last-opened-first-closed per execution context; any
//! violation is an interceptor bug surfaced as a fatal [`ProtocolViolation`],
//! never silently corrected.

use crate::config::{TraceConfig, TracingLevel};
use crate::directive::{DirectiveCatalog, NarrationDirective};
use crate::model::{CallFrame, CallOutcome, ParamCapture, Trace};
use crate::template::{self, TemplateEngine, TemplateSlot, TemplateWarning};
use crate::value::ValueRenderer;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;

/// Interceptor contract violation: unbalanced or misordered begin/end calls.
///
/// Fatal by design — it indicates a broken caller, not a recoverable runtime
/// condition, and is never retried or papered over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("end of call #{handle} but no frame is open on this context")]
    NoOpenFrame { handle: u64 },

    #[error("end of call #{handle} out of order: the open frame is #{open} ({owner}.{method})")]
    OutOfOrder {
        handle: u64,
        open: u64,
        owner: String,
        method: String,
    },
}

/// Handle to one begun call; closes exactly that frame.
///
/// An inert handle (returned while tracing is inactive) makes the matching
/// end call a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a begun call must be closed through its handle"]
pub struct FrameHandle {
    index: Option<u64>,
}

impl FrameHandle {
    fn inert() -> Self {
        Self { index: None }
    }

    /// Whether this handle refers to a recorded frame
    pub fn is_recording(&self) -> bool {
        self.index.is_some()
    }
}

/// An open invocation on the live stack
struct OpenFrame {
    owner: String,
    method: String,
    index: u64,
    depth: usize,
    params: Vec<ParamCapture>,
    /// Full rendered-value map for close-time template resolution; kept even
    /// when the level suppresses displayed values
    values: HashMap<String, String>,
    directive: Option<NarrationDirective>,
    children: Vec<CallFrame>,
    started: Instant,
}

/// The live stack: closed roots plus the chain of open frames
struct LiveStack {
    roots: Vec<CallFrame>,
    open: Vec<OpenFrame>,
    warnings: Vec<TemplateWarning>,
    next_index: u64,
}

impl LiveStack {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            open: Vec::new(),
            warnings: Vec::new(),
            next_index: 1,
        }
    }
}

enum Closing {
    Returned(Option<String>),
    Failed { kind: String, message: String },
}

/// Per-execution-context trace capture.
pub struct TraceContext {
    config: TraceConfig,
    directives: Arc<DirectiveCatalog>,
    values: Arc<ValueRenderer>,
    engine: TemplateEngine,
    stack: Arc<Mutex<LiveStack>>,
}

impl TraceContext {
    /// Context with default configuration and no directives
    pub fn new() -> Self {
        Self::with_config(TraceConfig::new())
    }

    pub fn with_config(config: TraceConfig) -> Self {
        let renderer = ValueRenderer::with_limits(config.max_string_len(), config.max_items());
        Self::configured(config, Arc::new(DirectiveCatalog::new()), Arc::new(renderer))
    }

    /// Context with an explicit directive catalog and value renderer
    pub fn configured(
        config: TraceConfig,
        directives: Arc<DirectiveCatalog>,
        values: Arc<ValueRenderer>,
    ) -> Self {
        Self {
            config,
            directives,
            values,
            engine: TemplateEngine::new(),
            stack: Arc::new(Mutex::new(LiveStack::new())),
        }
    }

    /// Whether this context is actively recording.
    ///
    /// When false, interceptors can skip capture entirely.
    pub fn is_active(&self) -> bool {
        self.config.level().is_enabled(TracingLevel::Errors)
    }

    /// The configuration shared by this context
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Render a value through this context's renderer and summarizers
    pub fn render<T: Any>(&self, value: &T) -> String {
        self.values.render(value)
    }

    /// Render a borrowed string slice
    pub fn render_str(&self, value: &str) -> String {
        self.values.render_str(value)
    }

    /// Start collecting arguments for a call, rendered through this
    /// context's renderer and summarizers
    pub fn args(&self) -> CallArgs<'_> {
        CallArgs {
            renderer: &self.values,
            entries: Vec::new(),
        }
    }

    /// Record entry into a call.
    ///
    /// Arguments are collected via [`args`](Self::args) in declaration
    /// order. Parameters excluded by directive are not captured at all.
    pub fn begin_call(&self, owner: &str, method: &str, args: CallArgs<'_>) -> FrameHandle {
        let level = self.config.level();
        if !level.is_enabled(TracingLevel::Errors) {
            return FrameHandle::inert();
        }

        let directive = self.directives.lookup(owner, method).cloned();
        let mut params = Vec::new();
        let mut values = HashMap::new();
        for entry in args.entries {
            if directive
                .as_ref()
                .is_some_and(|d| d.excluded().contains(entry.name.as_str()))
            {
                continue;
            }
            values.insert(entry.name.clone(), entry.plain);
            let shown = if level.is_enabled(TracingLevel::Detail) {
                entry.display
            } else {
                String::new()
            };
            params.push(ParamCapture::new(entry.name, shown));
        }

        let mut stack = self.lock_stack();
        let index = stack.next_index;
        stack.next_index += 1;
        let depth = stack.open.len();
        stack.open.push(OpenFrame {
            owner: owner.to_string(),
            method: method.to_string(),
            index,
            depth,
            params,
            values,
            directive,
            children: Vec::new(),
            started: Instant::now(),
        });
        FrameHandle { index: Some(index) }
    }

    /// Record a normal return. The handle must reference the top of stack.
    pub fn end_returned(
        &self,
        handle: FrameHandle,
        result: Option<String>,
    ) -> Result<(), ProtocolViolation> {
        let Some(index) = handle.index else {
            return Ok(());
        };
        let mut stack = self.lock_stack();
        let frame = pop_checked(&mut stack, index)?;
        let level = self.config.level();

        if !level.is_enabled(TracingLevel::Summary) {
            // Off and Errors retain nothing from a successful call
            return Ok(());
        }
        if level == TracingLevel::Summary {
            let is_root = stack.open.is_empty();
            let is_leaf = frame.children.is_empty();
            if !is_root && !is_leaf {
                // Prune the intermediate frame, promoting its children
                let children = frame.children;
                if let Some(parent) = stack.open.last_mut() {
                    parent.children.extend(children);
                }
                return Ok(());
            }
        }

        let closed = self.close_frame(&mut stack.warnings, frame, Closing::Returned(result));
        attach(&mut stack, closed);
        Ok(())
    }

    /// Record an exceptional exit. The failure is recorded as data only —
    /// re-raising it to the original caller stays the interceptor's job.
    pub fn end_failed(
        &self,
        handle: FrameHandle,
        kind: &str,
        message: &str,
    ) -> Result<(), ProtocolViolation> {
        let Some(index) = handle.index else {
            return Ok(());
        };
        let mut stack = self.lock_stack();
        let frame = pop_checked(&mut stack, index)?;

        if !self.config.level().is_enabled(TracingLevel::Errors) {
            return Ok(());
        }

        let closed = self.close_frame(
            &mut stack.warnings,
            frame,
            Closing::Failed {
                kind: kind.to_string(),
                message: message.to_string(),
            },
        );
        attach(&mut stack, closed);
        Ok(())
    }

    /// Immutable snapshot of everything recorded since the last reset.
    ///
    /// Closed top-level frames are deep-copied; open frames are included
    /// best-effort as `Pending` so a mid-execution dump is still meaningful.
    /// The live stack is never mutated by a capture.
    pub fn capture(&self) -> Trace {
        let stack = self.lock_stack();
        let mut roots = stack.roots.clone();
        if let Some(pending_root) = pending_chain(&stack.open) {
            roots.push(pending_root);
        }
        Trace {
            roots,
            warnings: stack.warnings.clone(),
        }
    }

    /// Discard the live stack, returning this context to idle.
    ///
    /// Previously captured traces are unaffected. The sequence counter is
    /// not rewound, so frames recorded after a reset never share an index
    /// with frames captured before it.
    pub fn reset(&self) {
        let mut stack = self.lock_stack();
        stack.roots.clear();
        stack.open.clear();
        stack.warnings.clear();
    }

    /// Snapshot for cross-thread propagation.
    ///
    /// The snapshot shares this context's live stack; calls recorded through
    /// the attached context on another thread append to the same in-flight
    /// trace, serialized by the stack's lock.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            context: TraceContext {
                config: self.config.clone(),
                directives: Arc::clone(&self.directives),
                values: Arc::clone(&self.values),
                engine: self.engine.clone(),
                stack: Arc::clone(&self.stack),
            },
        }
    }

    fn lock_stack(&self) -> MutexGuard<'_, LiveStack> {
        // A panic while holding this lock is already fatal to the trace
        self.stack.lock().expect("live stack lock poisoned")
    }

    fn close_frame(
        &self,
        warnings: &mut Vec<TemplateWarning>,
        frame: OpenFrame,
        closing: Closing,
    ) -> CallFrame {
        let duration_nanos = frame.started.elapsed().as_nanos() as u64;
        let exclusions = frame
            .directive
            .as_ref()
            .map(|d| d.excluded().clone())
            .unwrap_or_default();

        let narration = match frame.directive.as_ref().and_then(|d| d.narration()) {
            Some(tpl) => match self.engine.resolve(tpl, &frame.values, &exclusions) {
                Ok(text) => Some(text),
                Err(unknown) => {
                    warnings.push(TemplateWarning {
                        owner: frame.owner.clone(),
                        method: frame.method.clone(),
                        placeholder: unknown.name,
                        slot: TemplateSlot::Narration,
                    });
                    None
                }
            },
            None => None,
        };

        let (outcome, tail) = match closing {
            Closing::Returned(value) => {
                let tail = template::returned_suffix(value.as_deref());
                (CallOutcome::Returned { value }, tail)
            }
            Closing::Failed { kind, message } => {
                let error_narration = frame
                    .directive
                    .as_ref()
                    .and_then(|d| d.error_template(&kind))
                    .and_then(|tpl| {
                        match self
                            .engine
                            .resolve_error(tpl, &frame.values, &exclusions, &kind, &message)
                        {
                            Ok(text) => Some(text),
                            Err(unknown) => {
                                warnings.push(TemplateWarning {
                                    owner: frame.owner.clone(),
                                    method: frame.method.clone(),
                                    placeholder: unknown.name,
                                    slot: TemplateSlot::OnError,
                                });
                                None
                            }
                        }
                    });
                let mut tail = template::raised_suffix(&kind, &message);
                if let Some(narrated) = &error_narration {
                    tail.push_str(" | ");
                    tail.push_str(narrated);
                }
                (
                    CallOutcome::Failed {
                        kind,
                        message,
                        narration: error_narration,
                    },
                    tail,
                )
            }
        };

        let head = narration
            .clone()
            .unwrap_or_else(|| template::default_call(&frame.owner, &frame.method, &frame.params));

        CallFrame {
            owner: frame.owner,
            method: frame.method,
            index: frame.index,
            depth: frame.depth,
            params: frame.params,
            narration,
            narrative: format!("{head}{tail}"),
            children: frame.children,
            outcome,
            duration_nanos,
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

fn pop_checked(stack: &mut LiveStack, handle: u64) -> Result<OpenFrame, ProtocolViolation> {
    match stack.open.last() {
        None => Err(ProtocolViolation::NoOpenFrame { handle }),
        Some(top) if top.index != handle => Err(ProtocolViolation::OutOfOrder {
            handle,
            open: top.index,
            owner: top.owner.clone(),
            method: top.method.clone(),
        }),
        Some(_) => Ok(stack.open.pop().expect("checked non-empty")),
    }
}

fn attach(stack: &mut LiveStack, frame: CallFrame) {
    match stack.open.last_mut() {
        Some(parent) => parent.children.push(frame),
        None => stack.roots.push(frame),
    }
}

/// Fold the open-frame chain into one best-effort pending root
fn pending_chain(open: &[OpenFrame]) -> Option<CallFrame> {
    let mut inner: Option<CallFrame> = None;
    for frame in open.iter().rev() {
        let mut children = frame.children.clone();
        if let Some(child) = inner.take() {
            children.push(child);
        }
        let head = template::default_call(&frame.owner, &frame.method, &frame.params);
        inner = Some(CallFrame {
            owner: frame.owner.clone(),
            method: frame.method.clone(),
            index: frame.index,
            depth: frame.depth,
            params: frame.params.clone(),
            narration: None,
            narrative: format!("{head}{}", template::pending_suffix()),
            children,
            outcome: CallOutcome::Pending,
            duration_nanos: 0,
        });
    }
    inner
}

struct ArgEntry {
    name: String,
    /// Display form (strings quoted), shown in captured parameters
    display: String,
    /// Plain form (strings bare), interpolated into narration templates
    plain: String,
}

/// Ordered argument collector for [`TraceContext::begin_call`].
///
/// Each argument is rendered twice at capture time: a display form for the
/// captured parameter list and a plain form for template interpolation.
/// Registered summarizers apply to both.
pub struct CallArgs<'r> {
    renderer: &'r ValueRenderer,
    entries: Vec<ArgEntry>,
}

impl CallArgs<'_> {
    /// Add an argument
    pub fn arg<T: Any>(mut self, name: &str, value: &T) -> Self {
        self.entries.push(ArgEntry {
            name: name.to_string(),
            display: self.renderer.render(value),
            plain: self.renderer.render_plain(value),
        });
        self
    }

    /// Add a borrowed string argument
    pub fn arg_str(mut self, name: &str, value: &str) -> Self {
        self.entries.push(ArgEntry {
            name: name.to_string(),
            display: self.renderer.render_str(value),
            plain: self.renderer.render_plain_str(value),
        });
        self
    }

    /// Add a slice argument, rendered with the item limit applied
    pub fn arg_slice<T: Any>(mut self, name: &str, values: &[T]) -> Self {
        let rendered = self.renderer.render_slice(values);
        self.entries.push(ArgEntry {
            name: name.to_string(),
            display: rendered.clone(),
            plain: rendered,
        });
        self
    }

    /// Number of collected arguments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Opaque capture for cross-thread trace propagation.
///
/// Obtain via [`TraceContext::snapshot`], move to the destination thread,
/// and [`attach`](Self::attach) there before any calls are intercepted.
/// Dropping the attached context ends the handoff; the origin context is
/// unaffected.
pub struct ContextSnapshot {
    context: TraceContext,
}

impl ContextSnapshot {
    /// Restore the captured context on the current thread
    pub fn attach(self) -> TraceContext {
        self.context
    }

    /// Wrap a task so it runs with the captured context attached
    pub fn wrap<F, R>(self, task: F) -> impl FnOnce() -> R
    where
        F: FnOnce(&TraceContext) -> R,
    {
        move || {
            let context = self.attach();
            task(&context)
        }
    }
}
