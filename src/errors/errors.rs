use std::fmt::Display;

use thiserror::Error;

use crate::Span;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The diagnostic code.
    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::SyntaxError { .. } => "SyntaxError",
            ErrorImpl::UndefinedName { .. } => "UndefinedName",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::UndefinedTopLevel { .. } => "UndefinedTopLevel",
            ErrorImpl::TypeDoesNotContainProperty { .. } => "TypeDoesNotContainProperty",
            ErrorImpl::TypeDoesNotContainMethod { .. } => "TypeDoesNotContainMethod",
            ErrorImpl::AmbiguousTypes { .. } => "AmbiguousTypes",
            ErrorImpl::ExpectedMember { .. } => "ExpectedMember",
            ErrorImpl::MissingTypeAnnotation { .. } => "MissingTypeAnnotation",
            ErrorImpl::NoBinaryOverload { .. } => "NoBinaryOverload",
            ErrorImpl::AmbiguousOperatorOverload { .. } => "AmbiguousOperatorOverload",
            ErrorImpl::InvalidConformance { .. } => "InvalidConformance",
            ErrorImpl::AlreadyDeclared { .. } => "AlreadyDeclared",
            ErrorImpl::NoMatchingOverload { .. } => "NoMatchingOverload",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::MultipleBaseTypes { .. } => "MultipleBaseTypes",
            ErrorImpl::CyclicInheritance { .. } => "CyclicInheritance",
            ErrorImpl::ImmutableAssignment { .. } => "ImmutableAssignment",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::UnexpectedReturnValue { .. } => "UnexpectedReturnValue",
            ErrorImpl::MissingBody { .. } => "MissingBody",
            ErrorImpl::MissingContractMember { .. } => "MissingContractMember",
            ErrorImpl::UninitializedProperty { .. } => "UninitializedProperty",
            ErrorImpl::CyclicTypeInference { .. } => "CyclicTypeInference",
            ErrorImpl::UnknownValueType { .. } => "UnknownValueType",
            ErrorImpl::InternalInvariant { .. } => "InternalInvariant",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::SyntaxError { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UndefinedName { name } => {
                ErrorTip::Suggestion(format!("Nothing named `{}` is visible here", name))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::UndefinedTopLevel { name } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`, is the module that declares it imported?",
                name
            )),
            ErrorImpl::TypeDoesNotContainProperty {
                type_name,
                property,
            } => ErrorTip::Suggestion(format!(
                "Type `{}` has no property `{}`",
                type_name, property
            )),
            ErrorImpl::TypeDoesNotContainMethod { type_name, method } => ErrorTip::Suggestion(
                format!("Type `{}` has no method `{}`", type_name, method),
            ),
            ErrorImpl::AmbiguousTypes { name, modules } => ErrorTip::Suggestion(format!(
                "`{}` is declared in {}, qualify it with its module",
                name,
                modules.join(", ")
            )),
            ErrorImpl::ExpectedMember { name } => ErrorTip::Suggestion(format!(
                "`{}` cannot be used as a value, expected a member access",
                name
            )),
            ErrorImpl::MissingTypeAnnotation { name } => ErrorTip::Suggestion(format!(
                "`{}` needs a type annotation or an initial value",
                name
            )),
            ErrorImpl::NoBinaryOverload {
                operator,
                left,
                right,
                expected,
            } => match expected {
                Some(expected) => ErrorTip::Suggestion(format!(
                    "No operator `{}` for `{}` and `{}` returning `{}`",
                    operator, left, right, expected
                )),
                None => ErrorTip::Suggestion(format!(
                    "No operator `{}` for `{}` and `{}`",
                    operator, left, right
                )),
            },
            ErrorImpl::AmbiguousOperatorOverload {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Both `{}` and `{}` declare operator `{}` for these operands",
                left, right, operator
            )),
            ErrorImpl::InvalidConformance {
                type_name,
                conformance,
                kind,
            } => ErrorTip::Suggestion(format!(
                "`{}` cannot conform to {} `{}`",
                type_name, kind, conformance
            )),
            ErrorImpl::AlreadyDeclared { name } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", name))
            }
            ErrorImpl::NoMatchingOverload { name, arguments } => ErrorTip::Suggestion(format!(
                "No overload of `{}` accepts ({})",
                name, arguments
            )),
            ErrorImpl::NotCallable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a function or a type", name))
            }
            ErrorImpl::MultipleBaseTypes {
                type_name,
                first,
                second,
            } => ErrorTip::Suggestion(format!(
                "`{}` already inherits from `{}`, it cannot also inherit from `{}`",
                type_name, first, second
            )),
            ErrorImpl::CyclicInheritance { type_name } => {
                ErrorTip::Suggestion(format!("`{}` inherits from itself", type_name))
            }
            ErrorImpl::ImmutableAssignment { name } => ErrorTip::Suggestion(format!(
                "`{}` is immutable, declare it with `var`",
                name
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Not every path through `{}` returns a value",
                function
            )),
            ErrorImpl::MissingReturnValue { function } => {
                ErrorTip::Suggestion(format!("`{}` must return a value", function))
            }
            ErrorImpl::UnexpectedReturnValue { function } => {
                ErrorTip::Suggestion(format!("`{}` does not return a value", function))
            }
            ErrorImpl::MissingBody { function } => {
                ErrorTip::Suggestion(format!("`{}` needs a body", function))
            }
            ErrorImpl::MissingContractMember {
                type_name,
                contract,
                member,
            } => ErrorTip::Suggestion(format!(
                "`{}` must implement `{}` required by `{}`",
                type_name, member, contract
            )),
            ErrorImpl::UninitializedProperty {
                type_name,
                property,
            } => ErrorTip::Suggestion(format!(
                "`{}.{}` is never initialized",
                type_name, property
            )),
            ErrorImpl::CyclicTypeInference { name } => ErrorTip::Suggestion(format!(
                "The initializer of `{}` depends on its own type, annotate it",
                name
            )),
            ErrorImpl::UnknownValueType { name } => {
                ErrorTip::Suggestion(format!("`{}` has no known type", name))
            }
            ErrorImpl::InternalInvariant { .. } => ErrorTip::None,
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("syntax error at {token:?}: {message}")]
    SyntaxError { token: String, message: String },
    #[error("undefined name {name:?}")]
    UndefinedName { name: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("undefined top-level type {name:?}")]
    UndefinedTopLevel { name: String },
    #[error("type {type_name:?} does not contain property {property:?}")]
    TypeDoesNotContainProperty { type_name: String, property: String },
    #[error("type {type_name:?} does not contain method {method:?}")]
    TypeDoesNotContainMethod { type_name: String, method: String },
    #[error("type {name:?} is ambiguous between {modules:?}")]
    AmbiguousTypes { name: String, modules: Vec<String> },
    #[error("expected a member of {name:?}")]
    ExpectedMember { name: String },
    #[error("missing type annotation for {name:?}")]
    MissingTypeAnnotation { name: String },
    #[error("no operator {operator} for {left:?} and {right:?}")]
    NoBinaryOverload {
        operator: String,
        left: String,
        right: String,
        expected: Option<String>,
    },
    #[error("operator {operator} is ambiguous for {left:?} and {right:?}")]
    AmbiguousOperatorOverload {
        operator: String,
        left: String,
        right: String,
    },
    #[error("{type_name:?} cannot conform to {kind} {conformance:?}")]
    InvalidConformance {
        type_name: String,
        conformance: String,
        kind: String,
    },
    #[error("{name:?} already declared")]
    AlreadyDeclared { name: String },
    #[error("no overload of {name:?} matches ({arguments})")]
    NoMatchingOverload { name: String, arguments: String },
    #[error("{name:?} is not callable")]
    NotCallable { name: String },
    #[error("{type_name:?} has base type {first:?}, cannot add {second:?}")]
    MultipleBaseTypes {
        type_name: String,
        first: String,
        second: String,
    },
    #[error("{type_name:?} inherits from itself")]
    CyclicInheritance { type_name: String },
    #[error("cannot assign to immutable {name:?}")]
    ImmutableAssignment { name: String },
    #[error("{function:?} does not return on every path")]
    MissingReturn { function: String },
    #[error("{function:?} must return a value")]
    MissingReturnValue { function: String },
    #[error("{function:?} cannot return a value")]
    UnexpectedReturnValue { function: String },
    #[error("{function:?} has no body")]
    MissingBody { function: String },
    #[error("{type_name:?} is missing {member:?} required by {contract:?}")]
    MissingContractMember {
        type_name: String,
        contract: String,
        member: String,
    },
    #[error("property {property:?} of {type_name:?} is never initialized")]
    UninitializedProperty { type_name: String, property: String },
    #[error("type of {name:?} depends on itself")]
    CyclicTypeInference { name: String },
    #[error("type of {name:?} is not known")]
    UnknownValueType { name: String },
    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },
}

#[derive(Debug, Clone)]
pub struct Warning {
    internal_warning: WarningImpl,
    span: Span,
}

impl Warning {
    pub fn new(warning_impl: WarningImpl, span: Span) -> Self {
        Warning {
            internal_warning: warning_impl,
            span,
        }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_warning(&self) -> &WarningImpl {
        &self.internal_warning
    }

    pub fn get_warning_name(&self) -> &str {
        match &self.internal_warning {
            WarningImpl::LibraryUnavailable { .. } => "LibraryUnavailable",
            WarningImpl::ImportSkipped { .. } => "ImportSkipped",
            WarningImpl::ShadowedDeclaration { .. } => "ShadowedDeclaration",
        }
    }

    pub fn get_message(&self) -> String {
        self.internal_warning.to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarningImpl {
    #[error("library {library:?} could not be loaded: {reason}")]
    LibraryUnavailable { library: String, reason: String },
    #[error("skipped {item:?}: {reason}")]
    ImportSkipped { item: String, reason: String },
    #[error("{name:?} shadows an earlier declaration")]
    ShadowedDeclaration { name: String },
}

/// A suggested source edit attached to a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct FixIt {
    pub message: String,
    pub replacement: String,
    pub span: Span,
}

/// Append-only sink for everything reported during one compilation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
    warnings: Vec<Warning>,
    fixits: Vec<FixIt>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_error(&mut self, error: Error) {
        log::trace!("error {}: {}", error.get_error_name(), error.get_error());
        self.errors.push(error);
    }

    pub fn push_warning(&mut self, warning: Warning) {
        log::trace!("warning {}", warning.get_message());
        self.warnings.push(warning);
    }

    pub fn push_fixit(&mut self, fixit: FixIt) {
        self.fixits.push(fixit);
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn fixits(&self) -> &[FixIt] {
        &self.fixits
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.fixits.is_empty()
    }

    /// Errors carrying the given diagnostic code.
    pub fn errors_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Error> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.get_error_name() == name)
    }

    pub fn drain(&mut self) -> (Vec<Error>, Vec<Warning>, Vec<FixIt>) {
        (
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
            std::mem::take(&mut self.fixits),
        )
    }
}
