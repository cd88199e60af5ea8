use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by the chopper.
///
/// Every variant is fatal to the current `chop` call; partial results are
/// never returned.
#[derive(Debug, Error, Diagnostic)]
pub enum ChopError {
    #[error("bound must be a positive number of sub-programs, got {0}")]
    #[diagnostic(code(cleaver::chop::invalid_bound))]
    InvalidBound(usize),

    #[error("member '{name}' is not supported by the chopper")]
    #[diagnostic(
        code(cleaver::chop::unsupported_member),
        help("apply extension/plugin transformations before chopping, so only core members remain")
    )]
    UnsupportedMember { name: String },

    #[error("{kind} '{name}' is referenced but not declared in the program")]
    #[diagnostic(code(cleaver::chop::missing_reference))]
    MissingReference { kind: &'static str, name: String },

    #[error("internal consistency violation: {0}")]
    #[diagnostic(code(cleaver::chop::inconsistent))]
    Inconsistent(String),
}
