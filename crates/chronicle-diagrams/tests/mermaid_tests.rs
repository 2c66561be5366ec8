//! Mermaid renderer integration tests

mod common;

use chronicle_diagrams::MermaidRenderer;
use pretty_assertions::assert_eq;

#[test]
fn test_three_frame_trace() {
    let diagram = MermaidRenderer::new().render(&common::lending_trace());
    let expected = "sequenceDiagram\n\
                    \u{20}   participant LendingService\n\
                    \u{20}   participant CatalogService\n\
                    \u{20}   participant MemberService\n\
                    \u{20}   LendingService->>LendingService: borrowBook(memberId, isbn)\n\
                    \u{20}   LendingService->>CatalogService: findBook(isbn)\n\
                    \u{20}   CatalogService-->>LendingService: Book(The Pragmatic Programmer)\n\
                    \u{20}   LendingService->>MemberService: lookupMember(memberId)\n\
                    \u{20}   MemberService-->>LendingService: Member(Alice)\n\
                    \u{20}   LendingService-->>LendingService: LoanReceipt";
    assert_eq!(diagram, expected);
}

#[test]
fn test_children_nest_between_root_call_and_return() {
    let diagram = MermaidRenderer::new().render(&common::lending_trace());
    let pos = |needle: &str| diagram.find(needle).unwrap_or_else(|| panic!("missing {needle}"));

    let root_call = pos("LendingService->>LendingService: borrowBook");
    let find_call = pos("LendingService->>CatalogService: findBook");
    let find_return = pos("CatalogService-->>LendingService:");
    let lookup_call = pos("LendingService->>MemberService: lookupMember");
    let lookup_return = pos("MemberService-->>LendingService:");
    let root_return = pos("LendingService-->>LendingService: LoanReceipt");

    assert!(root_call < find_call);
    assert!(find_call < find_return);
    assert!(find_return < lookup_call);
    assert!(lookup_call < lookup_return);
    assert!(lookup_return < root_return);
}

#[test]
fn test_failure_uses_the_cross_arrow() {
    let diagram = MermaidRenderer::new().render(&common::failing_trace());
    assert!(diagram.contains("CatalogService-xLendingService: NotFound"));
    assert!(diagram.contains("LendingService-xLendingService: NotFound"));
    assert!(!diagram.contains("-->>"));
}

#[test]
fn test_pending_frame_has_no_return_message() {
    let diagram = MermaidRenderer::new().render(&common::pending_trace());
    let expected = "sequenceDiagram\n\
                    \u{20}   participant PaymentService\n\
                    \u{20}   PaymentService->>PaymentService: charge()";
    assert_eq!(diagram, expected);
}

#[test]
fn test_custom_narration_is_the_message_text() {
    let diagram = MermaidRenderer::new().render(&common::narrated_trace());
    assert!(diagram
        .contains("LendingService->>LendingService: Borrowing book 978-0-13-468599-1 for member M-001"));
}

#[test]
fn test_excluded_parameter_never_appears() {
    let diagram = MermaidRenderer::new().render(&common::narrated_trace());
    assert!(!diagram.contains("cardSecret"));
    assert!(!diagram.contains("CARD-VERIFY"));
}

#[test]
fn test_aliases() {
    let diagram = MermaidRenderer::new().render_with_aliases(&common::lending_trace());
    assert!(diagram.contains("participant LS as LendingService"));
    assert!(diagram.contains("participant CS as CatalogService"));
    assert!(diagram.contains("participant MS as MemberService"));
    assert!(diagram.contains("LS->>CS: findBook(isbn)"));
    assert!(diagram.contains("CS-->>LS: Book(The Pragmatic Programmer)"));
}
