//! Property tests for the narration template engine

use chronicle_core::TemplateEngine;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn no_exclusions() -> HashSet<String> {
    HashSet::new()
}

proptest! {
    #[test]
    fn prop_template_without_placeholders_is_verbatim(
        template in "[a-zA-Z0-9 .,!?'-]{0,80}",
    ) {
        let engine = TemplateEngine::new();
        let resolved = engine
            .resolve(&template, &HashMap::new(), &no_exclusions())
            .unwrap();
        prop_assert_eq!(resolved, template);
    }

    #[test]
    fn prop_known_placeholder_resolves_to_its_value(
        name in "[a-zA-Z][a-zA-Z0-9_]{0,15}",
        value in "[a-zA-Z0-9 -]{0,40}",
        prefix in "[a-zA-Z ]{0,20}",
        suffix in "[a-zA-Z ]{0,20}",
    ) {
        let engine = TemplateEngine::new();
        let template = format!("{prefix}{{{name}}}{suffix}");
        let mut values = HashMap::new();
        values.insert(name.clone(), value.clone());

        let resolved = engine.resolve(&template, &values, &no_exclusions()).unwrap();
        prop_assert_eq!(resolved, format!("{prefix}{value}{suffix}"));
    }

    #[test]
    fn prop_unknown_placeholder_always_fails(
        name in "[a-zA-Z][a-zA-Z0-9_]{0,15}",
    ) {
        let engine = TemplateEngine::new();
        let template = format!("before {{{name}}} after");

        let err = engine
            .resolve(&template, &HashMap::new(), &no_exclusions())
            .unwrap_err();
        prop_assert_eq!(err.name, name);
    }

    #[test]
    fn prop_excluded_value_never_survives_resolution(
        name in "[a-zA-Z][a-zA-Z0-9_]{0,15}",
        secret in "[a-zA-Z0-9]{8,24}",
    ) {
        let engine = TemplateEngine::new();
        let template = format!("using {{{name}}} here");
        let mut values = HashMap::new();
        values.insert(name.clone(), secret.clone());
        let mut exclusions = HashSet::new();
        exclusions.insert(name);

        let resolved = engine.resolve(&template, &values, &exclusions).unwrap();
        prop_assert!(!resolved.contains(&secret));
        prop_assert!(resolved.contains("[hidden]"));
    }

    #[test]
    fn prop_error_message_embedded_verbatim(
        message in "[a-zA-Z0-9 .:'-]{1,60}",
    ) {
        let engine = TemplateEngine::new();
        let resolved = engine
            .resolve_error(
                "failed: {message}",
                &HashMap::new(),
                &no_exclusions(),
                "SomeKind",
                &message,
            )
            .unwrap();
        prop_assert_eq!(resolved, format!("failed: {message}"));
    }
}
