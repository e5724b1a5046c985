//! Error taxonomy of the engine.
//!
//! Validation errors are reported before any computation starts.
//! Exhausting a search budget is not fatal: it is reported as a [ComputationTimeoutError] inside a degraded
//! [Outcome][crate::extensions::Outcome].
//! An [InternalInvariantViolation] indicates a bug in the engine itself and is never recovered.

use crate::datatypes::Semantics;

/// The input graph is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphValidationError {
    /// Two arguments share the same id.
    #[error("duplicate argument id \"{0}\"")]
    DuplicateArgumentId(String),
    /// An attack or support references an id which is not an argument.
    #[error("{relation} from \"{source_id}\" references unknown argument \"{target_id}\"")]
    UnknownTargetReference {
        /// `attack` or `support`.
        relation: &'static str,
        /// Id of the attacker (resp. supporter).
        source_id: String,
        /// The unknown id.
        target_id: String,
    },
}

/// An unknown semantics (or acceptance policy) tag was requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind} \"{tag}\"")]
pub struct UnsupportedSemanticsError {
    /// What kind of tag could not be understood.
    pub kind: &'static str,
    /// The offending tag.
    pub tag: String,
}

impl UnsupportedSemanticsError {
    pub(crate) fn semantics(tag: &str) -> Self {
        Self {
            kind: "semantics",
            tag: tag.to_string(),
        }
    }

    pub(crate) fn policy(tag: &str) -> Self {
        Self {
            kind: "acceptance policy",
            tag: tag.to_string(),
        }
    }
}

/// Why a search stopped before exploring its whole search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Exhaustion {
    /// The maximal number of node expansions has been reached.
    #[strum(to_string = "node budget exhausted")]
    NodeBudget,
    /// The wall-clock deadline has passed.
    #[strum(to_string = "deadline exceeded")]
    Deadline,
    /// The search has been cancelled by the caller.
    #[strum(to_string = "cancelled")]
    Cancelled,
}

/// The search for extensions has been stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("computation of {semantics} extensions stopped ({reason}) after {nodes} expansions, {unexplored} branches unexplored")]
pub struct ComputationTimeoutError {
    /// The requested semantics.
    pub semantics: Semantics,
    /// Why the search stopped.
    pub reason: Exhaustion,
    /// Number of expanded search nodes.
    pub nodes: u64,
    /// Number of branches which have not been explored.
    pub unexplored: usize,
}

/// The engine produced a result which violates the semantics it claims to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal invariant violated: {0}")]
pub struct InternalInvariantViolation(pub String);

/// A textual argumentation framework could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error in line {line}: {message}")]
pub struct ParseError {
    /// 1-based line of the offending input.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

/// Umbrella error for a full analysis.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// See [GraphValidationError].
    #[error(transparent)]
    Validation(#[from] GraphValidationError),
    /// See [UnsupportedSemanticsError].
    #[error(transparent)]
    UnsupportedSemantics(#[from] UnsupportedSemanticsError),
    /// See [InternalInvariantViolation].
    #[error(transparent)]
    Internal(#[from] InternalInvariantViolation),
    /// See [ParseError].
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The request could not be read.
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn messages() {
        assert_eq!(
            GraphValidationError::DuplicateArgumentId("a".into()).to_string(),
            "duplicate argument id \"a\""
        );
        assert_eq!(
            GraphValidationError::UnknownTargetReference {
                relation: "attack",
                source_id: "a".into(),
                target_id: "x".into()
            }
            .to_string(),
            "attack from \"a\" references unknown argument \"x\""
        );
        assert_eq!(
            UnsupportedSemanticsError::semantics("ideal").to_string(),
            "unsupported semantics \"ideal\""
        );
        let timeout = ComputationTimeoutError {
            semantics: Semantics::Preferred,
            reason: Exhaustion::Deadline,
            nodes: 12,
            unexplored: 3,
        };
        assert_eq!(
            timeout.to_string(),
            "computation of preferred extensions stopped (deadline exceeded) after 12 expansions, 3 branches unexplored"
        );
        assert_eq!(Exhaustion::NodeBudget.to_string(), "node budget exhausted");
        assert_eq!(Exhaustion::Cancelled.to_string(), "cancelled");
        assert_eq!(
            serde_json::to_string(&Exhaustion::NodeBudget).unwrap(),
            "\"node-budget\""
        );
        let engine: EngineError = InternalInvariantViolation("oops".into()).into();
        assert_eq!(engine.to_string(), "internal invariant violated: oops");
    }
}
