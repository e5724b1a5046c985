//! Aggregation of extensions into a per-argument acceptance [Status].

use std::collections::BTreeMap;

use crate::{
    datatypes::{Extension, Policy, Status},
    graph::ArgumentGraph,
};

/// Derives the acceptance status of every argument from a list of extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAssigner;

impl StatusAssigner {
    /// Maps every argument id of `graph` to its [Status] under `policy`.
    ///
    /// - [Policy::Skeptical]: accepted iff in every extension, rejected iff in none, undecided otherwise.
    /// - [Policy::Credulous]: accepted iff in at least one extension, rejected otherwise.
    ///
    /// An empty list of extensions rejects every argument under both policies.
    pub fn assign(
        graph: &ArgumentGraph,
        extensions: &[Extension],
        policy: Policy,
    ) -> BTreeMap<String, Status> {
        Self::assign_indexed(graph, extensions, policy)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, status)| graph.id(idx.into()).map(|id| (id.to_string(), status)))
            .collect()
    }

    /// Like [assign][StatusAssigner::assign], but indexed by the dense argument index.
    pub fn assign_indexed(
        graph: &ArgumentGraph,
        extensions: &[Extension],
        policy: Policy,
    ) -> Vec<Status> {
        let mut counts = vec![0usize; graph.len()];
        for extension in extensions {
            for idx in extension.arguments.iter() {
                if let Some(count) = counts.get_mut(idx as usize) {
                    *count += 1;
                }
            }
        }
        counts
            .into_iter()
            .map(|count| match (count, policy) {
                (0, _) => Status::Rejected,
                (_, Policy::Credulous) => Status::Accepted,
                (count, Policy::Skeptical) if count == extensions.len() => Status::Accepted,
                (_, Policy::Skeptical) => Status::Undecided,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::{ArgSet, ArgumentInput, Semantics};
    use test_log::test;

    fn graph() -> ArgumentGraph {
        ArgumentGraph::build(vec![
            ArgumentInput::new("a"),
            ArgumentInput::new("b"),
            ArgumentInput::new("c"),
        ])
        .unwrap()
    }

    fn extension(indices: &[u32]) -> Extension {
        Extension::new(
            Semantics::Preferred,
            indices.iter().copied().collect::<ArgSet>(),
        )
    }

    #[test]
    fn skeptical() {
        let graph = graph();
        let status = StatusAssigner::assign(
            &graph,
            &[extension(&[0, 1]), extension(&[0])],
            Policy::Skeptical,
        );
        assert_eq!(status["a"], Status::Accepted);
        assert_eq!(status["b"], Status::Undecided);
        assert_eq!(status["c"], Status::Rejected);
        assert_eq!(status.len(), 3);
    }

    #[test]
    fn credulous() {
        let graph = graph();
        let status = StatusAssigner::assign(
            &graph,
            &[extension(&[0, 1]), extension(&[0])],
            Policy::Credulous,
        );
        assert_eq!(status["a"], Status::Accepted);
        assert_eq!(status["b"], Status::Accepted);
        assert_eq!(status["c"], Status::Rejected);
        assert!(status.values().all(|status| *status != Status::Undecided));
    }

    #[test]
    fn no_extensions() {
        let graph = graph();
        for policy in [Policy::Skeptical, Policy::Credulous] {
            assert_eq!(
                StatusAssigner::assign_indexed(&graph, &[], policy),
                vec![Status::Rejected; 3]
            );
        }
        let single_empty = [extension(&[])];
        assert_eq!(
            StatusAssigner::assign_indexed(&graph, &single_empty, Policy::Skeptical),
            vec![Status::Rejected; 3]
        );
    }
}
