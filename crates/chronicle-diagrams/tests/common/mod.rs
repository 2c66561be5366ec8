//! Shared trace fixtures built through the real capture pipeline

use chronicle_core::{DirectiveCatalog, NarrationDirective, Trace, TraceConfig, TraceContext, ValueRenderer};
use std::sync::Arc;

/// Root with two successful children: borrow -> find + lookup
pub fn lending_trace() -> Trace {
    let context = TraceContext::new();
    let root = context.begin_call(
        "LendingService",
        "borrowBook",
        context
            .args()
            .arg_str("memberId", "M-001")
            .arg_str("isbn", "978-0-13-468599-1"),
    );

    let find = context.begin_call(
        "CatalogService",
        "findBook",
        context.args().arg_str("isbn", "978-0-13-468599-1"),
    );
    context
        .end_returned(find, Some("Book(The Pragmatic Programmer)".to_string()))
        .unwrap();

    let lookup = context.begin_call(
        "MemberService",
        "lookupMember",
        context.args().arg_str("memberId", "M-001"),
    );
    context
        .end_returned(lookup, Some("Member(Alice)".to_string()))
        .unwrap();

    context
        .end_returned(root, Some("LoanReceipt".to_string()))
        .unwrap();
    context.capture()
}

/// Root whose only child fails; the root re-raises the failure
pub fn failing_trace() -> Trace {
    let context = TraceContext::new();
    let root = context.begin_call(
        "LendingService",
        "borrowBook",
        context.args().arg_str("isbn", "978-0-13-235088-4"),
    );
    let find = context.begin_call(
        "CatalogService",
        "findBook",
        context.args().arg_str("isbn", "978-0-13-235088-4"),
    );
    context
        .end_failed(find, "NotFound", "Book not available: 978-0-13-235088-4")
        .unwrap();
    context
        .end_failed(root, "NotFound", "Book not available: 978-0-13-235088-4")
        .unwrap();
    context.capture()
}

/// Trace captured while a frame is still open
pub fn pending_trace() -> Trace {
    let context = TraceContext::new();
    let _root = context.begin_call("PaymentService", "charge", context.args());
    context.capture()
}

/// Trace with a directive-narrated root and an excluded parameter
pub fn narrated_trace() -> Trace {
    let mut directives = DirectiveCatalog::new();
    directives.register(
        "LendingService",
        "borrowBook",
        NarrationDirective::new()
            .narrated("Borrowing book {isbn} for member {memberId}")
            .exclude("cardSecret"),
    );
    let context = TraceContext::configured(
        TraceConfig::new(),
        Arc::new(directives),
        Arc::new(ValueRenderer::new()),
    );

    let root = context.begin_call(
        "LendingService",
        "borrowBook",
        context
            .args()
            .arg_str("memberId", "M-001")
            .arg_str("isbn", "978-0-13-468599-1")
            .arg_str("cardSecret", "CARD-VERIFY"),
    );
    context
        .end_returned(root, Some("LoanReceipt".to_string()))
        .unwrap();
    context.capture()
}
