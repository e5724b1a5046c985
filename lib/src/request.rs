/*!
The JSON interface of the engine, as used by a hosting process.

# Example
```
use af_semantics::request::analyse_json;

let response = analyse_json(
    r#"{
        "arguments": [
            {"id": "a", "content": "it rains", "attacks": ["b"]},
            {"id": "b", "content": "it is dry"}
        ],
        "semantics": "preferred"
    }"#,
)
.unwrap();
assert_eq!(response.status["a"].to_string(), "accepted");
assert!(!response.partial);
```
*/

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::Budget,
    datatypes::{ArgSet, ArgumentInput, Extension, Policy, Semantics, Status},
    error::{EngineError, Exhaustion, UnsupportedSemanticsError},
    extensions::{ExtensionComputer, Outcome},
    graph::ArgumentGraph,
    status::StatusAssigner,
};

/// One analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The arguments together with their outgoing attacks and supports.
    pub arguments: Vec<ArgumentInput>,
    /// Tag of the requested [Semantics].
    pub semantics: String,
    /// Tag of the [Policy], defaults to `skeptical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_policy: Option<String>,
    /// Limits of the computation, defaults to [Budget::default].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
}

impl AnalysisRequest {
    /// Creates a request with the default policy and budget.
    pub fn new(arguments: Vec<ArgumentInput>, semantics: Semantics) -> Self {
        Self {
            arguments,
            semantics: semantics.to_string(),
            acceptance_policy: None,
            budget: None,
        }
    }

    /// Parses the semantics tag.
    pub fn semantics(&self) -> Result<Semantics, UnsupportedSemanticsError> {
        Semantics::from_str(self.semantics.trim())
            .map_err(|_| UnsupportedSemanticsError::semantics(&self.semantics))
    }

    /// Parses the acceptance policy tag.
    pub fn policy(&self) -> Result<Policy, UnsupportedSemanticsError> {
        match &self.acceptance_policy {
            None => Ok(Policy::default()),
            Some(tag) => {
                Policy::from_str(tag.trim()).map_err(|_| UnsupportedSemanticsError::policy(tag))
            }
        }
    }
}

/// An [Extension] with argument ids instead of indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionOutput {
    /// The semantics the extension belongs to.
    pub semantics: Semantics,
    /// The ids of the accepted arguments, in index order.
    pub arguments: Vec<String>,
}

impl ExtensionOutput {
    /// Translates an [Extension] of `graph`.
    pub fn from_extension(graph: &ArgumentGraph, extension: &Extension) -> Self {
        Self {
            semantics: extension.semantics,
            arguments: graph.ordering().ids_of(&extension.arguments),
        }
    }

    /// Translates back into an [Extension] of `graph`; returns [None] if an id is not part of the graph.
    pub fn to_extension(&self, graph: &ArgumentGraph) -> Option<Extension> {
        let arguments = self
            .arguments
            .iter()
            .map(|id| graph.arg(id).and_then(|arg| u32::try_from(arg.value()).ok()))
            .collect::<Option<ArgSet>>()?;
        Some(Extension::new(self.semantics, arguments))
    }
}

/// Size and search statistics of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStats {
    /// Number of arguments.
    pub argument_count: usize,
    /// Number of distinct attacks.
    pub attack_count: usize,
    /// Number of returned extensions.
    pub extension_count: usize,
    /// Number of expanded search nodes.
    #[serde(default)]
    pub nodes_expanded: u64,
    /// Number of branches left unexplored (only non-zero for partial results).
    #[serde(default)]
    pub unexplored_branches: usize,
    /// Why the search stopped early, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhaustion: Option<Exhaustion>,
}

/// The answer to an [AnalysisRequest].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// The extensions, in canonical order.
    pub extensions: Vec<ExtensionOutput>,
    /// Status of every argument, computed from the returned extensions.
    pub status: BTreeMap<String, Status>,
    /// [true] if the search budget has been exhausted and the extensions are a degraded result.
    pub partial: bool,
    /// Statistics.
    pub stats: ResponseStats,
}

impl AnalysisResponse {
    /// Builds the response of a finished computation.
    pub fn new(graph: &ArgumentGraph, outcome: &Outcome, policy: Policy) -> Self {
        Self {
            extensions: outcome
                .extensions
                .iter()
                .map(|ext| ExtensionOutput::from_extension(graph, ext))
                .collect(),
            status: StatusAssigner::assign(graph, &outcome.extensions, policy),
            partial: outcome.is_partial(),
            stats: ResponseStats {
                argument_count: graph.len(),
                attack_count: graph.attack_count(),
                extension_count: outcome.extensions.len(),
                nodes_expanded: outcome.stats.nodes_expanded,
                unexplored_branches: outcome.stats.unexplored_branches,
                exhaustion: outcome.exhaustion.as_ref().map(|err| err.reason),
            },
        }
    }
}

/// Runs a whole analysis: builds and validates the graph, computes the extensions, and assigns the statuses.
///
/// Validation errors and unknown tags are reported before any computation starts.
pub fn analyse(request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
    let semantics = request.semantics()?;
    let policy = request.policy()?;
    let graph = ArgumentGraph::build(request.arguments.clone())?;
    log::debug!(
        "analysing {} arguments and {} attacks under {} semantics",
        graph.len(),
        graph.attack_count(),
        semantics
    );
    let outcome = ExtensionComputer::new(&graph)
        .with_budget(request.budget.unwrap_or_default())
        .compute(semantics)?;
    Ok(AnalysisResponse::new(&graph, &outcome, policy))
}

/// Parses `input` as an [AnalysisRequest] and runs [analyse].
pub fn analyse_json(input: &str) -> Result<AnalysisResponse, EngineError> {
    let request: AnalysisRequest = serde_json::from_str(input)?;
    analyse(&request)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::GraphValidationError;
    use test_log::test;

    #[test]
    fn request_defaults() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"arguments": [{"id": "a"}, {"id": "b", "attacks": ["a"], "supports": ["b"]}], "semantics": "GR"}"#,
        )
        .unwrap();
        assert_eq!(request.semantics(), Ok(Semantics::Grounded));
        assert_eq!(request.policy(), Ok(Policy::Skeptical));
        assert_eq!(request.budget, None);
        assert_eq!(request.arguments[0].content, "");
        assert_eq!(request.arguments[1].supports, vec!["b".to_string()]);
    }

    #[test]
    fn analysis() {
        let mut request = AnalysisRequest::new(
            vec![
                ArgumentInput::new("a").attacking(&["b"]),
                ArgumentInput::new("b").attacking(&["a"]),
                ArgumentInput::new("c").attacking(&["b"]),
            ],
            Semantics::Complete,
        );
        let response = analyse(&request).unwrap();
        assert_eq!(response.extensions.len(), 1);
        assert_eq!(response.extensions[0].arguments, vec!["a", "c"]);
        assert_eq!(response.status["b"], Status::Rejected);
        assert_eq!(response.stats.argument_count, 3);
        assert_eq!(response.stats.attack_count, 3);
        assert_eq!(response.stats.extension_count, 1);
        assert!(!response.partial);

        request.arguments.pop();
        request.semantics = "preferred".to_string();
        request.acceptance_policy = Some("credulous".to_string());
        let response = analyse(&request).unwrap();
        assert_eq!(response.status["a"], Status::Accepted);
        assert_eq!(response.status["b"], Status::Accepted);

        request.acceptance_policy = None;
        let response = analyse(&request).unwrap();
        assert_eq!(response.status["a"], Status::Undecided);
    }

    #[test]
    fn errors() {
        let result = analyse_json(r#"{"arguments": [], "semantics": "ideal"}"#);
        assert!(matches!(
            result,
            Err(EngineError::UnsupportedSemantics(UnsupportedSemanticsError { kind: "semantics", .. }))
        ));
        let result = analyse_json(
            r#"{"arguments": [], "semantics": "stable", "acceptance_policy": "majority"}"#,
        );
        assert!(matches!(result, Err(EngineError::UnsupportedSemantics(_))));
        let result = analyse_json(
            r#"{"arguments": [{"id": "a"}, {"id": "a"}], "semantics": "grounded"}"#,
        );
        assert!(matches!(
            result,
            Err(EngineError::Validation(GraphValidationError::DuplicateArgumentId(_)))
        ));
        let result = analyse_json(
            r#"{"arguments": [{"id": "a", "attacks": ["z"]}], "semantics": "grounded"}"#,
        );
        assert!(matches!(
            result,
            Err(EngineError::Validation(GraphValidationError::UnknownTargetReference { .. }))
        ));
        assert!(matches!(analyse_json("{"), Err(EngineError::Json(_))));
    }

    #[test]
    fn partial_response() {
        let json = r#"{
            "arguments": [
                {"id": "a", "attacks": ["b"]}, {"id": "b", "attacks": ["a"]},
                {"id": "c", "attacks": ["d"]}, {"id": "d", "attacks": ["c"]}
            ],
            "semantics": "preferred",
            "budget": {"max_nodes": 1}
        }"#;
        let response = analyse_json(json).unwrap();
        assert!(response.partial);
        assert_eq!(response.stats.exhaustion, Some(Exhaustion::NodeBudget));
        assert_eq!(response.extensions.len(), 1);
        assert_eq!(response.extensions[0].semantics, Semantics::Grounded);
        assert!(response.extensions[0].arguments.is_empty());
        let output = serde_json::to_value(&response).unwrap();
        assert_eq!(output["partial"], serde_json::Value::Bool(true));
        assert_eq!(output["stats"]["exhaustion"], "node-budget");
    }

    #[test]
    fn oversized_thread_count() {
        let json = r#"{
            "arguments": [
                {"id": "a", "attacks": ["b"]}, {"id": "b", "attacks": ["a"]},
                {"id": "c", "attacks": ["d"]}, {"id": "d", "attacks": ["c"]}
            ],
            "semantics": "preferred",
            "budget": {"threads": 18446744073709551615}
        }"#;
        let response = analyse_json(json).unwrap();
        assert!(!response.partial);
        assert_eq!(response.extensions.len(), 4);
    }

    #[test]
    fn extension_round_trip() {
        let graph = ArgumentGraph::build(vec![
            ArgumentInput::new("x").attacking(&["y"]),
            ArgumentInput::new("y"),
            ArgumentInput::new("z"),
        ])
        .unwrap();
        let extension = Extension::new(Semantics::SemiStable, [0u32, 2].into_iter().collect());
        let output = ExtensionOutput::from_extension(&graph, &extension);
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"semantics":"semi-stable","arguments":["x","z"]}"#);
        let parsed: ExtensionOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.to_extension(&graph), Some(extension));

        let unknown = ExtensionOutput {
            semantics: Semantics::Stable,
            arguments: vec!["w".to_string()],
        };
        assert_eq!(unknown.to_extension(&graph), None);
    }
}
