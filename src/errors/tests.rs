//! Unit tests for diagnostics.
//!
//! This module contains tests for error codes, tips and the collector.

use crate::errors::errors::{Diagnostics, Error, ErrorImpl, ErrorTip, FixIt, Warning, WarningImpl};
use crate::{Position, Span};
use std::rc::Rc;

fn span_at(offset: u32) -> Span {
    let file = Rc::new("test.tn".to_string());
    Span::new(
        Position::new(offset, 1, offset + 1, Rc::clone(&file)),
        Position::new(offset + 1, 1, offset + 2, file),
    )
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::SyntaxError {
            token: "@".to_string(),
            message: "expected expression".to_string(),
        },
        span_at(10),
    );

    assert_eq!(error.get_error_name(), "SyntaxError");
    assert_eq!(error.get_span().start.offset, 10);
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "Core.Int32".to_string(),
            received: "Core.String".to_string(),
        },
        span_at(0),
    );

    assert_eq!(error.get_error_name(), "TypeMismatch");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `Core.Int32`, received `Core.String`"
    );
}

#[test]
fn test_no_binary_overload_tip_mentions_expected() {
    let error = Error::new(
        ErrorImpl::NoBinaryOverload {
            operator: "+".to_string(),
            left: "Core.Int32".to_string(),
            right: "Core.Bool".to_string(),
            expected: Some("Core.Int32".to_string()),
        },
        span_at(3),
    );

    assert!(error.get_tip().to_string().contains("returning `Core.Int32`"));
}

#[test]
fn test_internal_invariant_has_no_tip() {
    let error = Error::new(
        ErrorImpl::InternalInvariant {
            message: "root node".to_string(),
        },
        span_at(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(
        error.get_error().to_string(),
        "internal invariant violated: root node"
    );
}

#[test]
fn test_ambiguous_types_lists_modules() {
    let error = Error::new(
        ErrorImpl::AmbiguousTypes {
            name: "Point".to_string(),
            modules: vec!["Geometry".to_string(), "Graphics".to_string()],
        },
        span_at(0),
    );

    assert!(error.get_tip().to_string().contains("Geometry, Graphics"));
}

#[test]
fn test_warning_names() {
    let warning = Warning::new(
        WarningImpl::ImportSkipped {
            item: "System.Foo.Bar".to_string(),
            reason: "unknown parameter type".to_string(),
        },
        span_at(0),
    );

    assert_eq!(warning.get_warning_name(), "ImportSkipped");
    assert!(warning.get_message().contains("System.Foo.Bar"));
}

#[test]
fn test_diagnostics_collects_in_order() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());

    diagnostics.push_error(Error::new(
        ErrorImpl::UndefinedName {
            name: "a".to_string(),
        },
        span_at(0),
    ));
    diagnostics.push_error(Error::new(
        ErrorImpl::UndefinedName {
            name: "b".to_string(),
        },
        span_at(5),
    ));
    diagnostics.push_warning(Warning::new(
        WarningImpl::ShadowedDeclaration {
            name: "c".to_string(),
        },
        span_at(9),
    ));
    diagnostics.push_fixit(FixIt {
        message: "qualify".to_string(),
        replacement: "A.Point".to_string(),
        span: span_at(2),
    });

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.errors_named("UndefinedName").count(), 2);
    assert_eq!(diagnostics.errors()[1].get_span().start.offset, 5);

    let (errors, warnings, fixits) = diagnostics.drain();
    assert_eq!(errors.len(), 2);
    assert_eq!(warnings.len(), 1);
    assert_eq!(fixits.len(), 1);
    assert!(diagnostics.is_empty());
}
