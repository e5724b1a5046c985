/*!
Computation of the extensions of an [ArgumentGraph] under a given [Semantics].

The [ExtensionComputer] dispatches once on the semantics, runs the [LabellingEngine] with the configured [Budget], and
re-verifies every result with the [ConflictAnalyzer][crate::conflict::ConflictAnalyzer].

# Example
```
use af_semantics::{datatypes::{ArgumentInput, Semantics}, extensions::ExtensionComputer, graph::ArgumentGraph};

let graph = ArgumentGraph::build(vec![
    ArgumentInput::new("a").attacking(&["b"]),
    ArgumentInput::new("b").attacking(&["a"]),
]).unwrap();
let outcome = ExtensionComputer::new(&graph).compute(Semantics::Preferred).unwrap();
assert!(!outcome.is_partial());
let printed: Vec<String> = outcome
    .extensions
    .iter()
    .map(|ext| graph.ordering().print_set(&ext.arguments).to_string())
    .collect();
assert_eq!(printed, vec!["[a]", "[b]"]);
```
*/

use crossbeam_channel::Sender;

use crate::{
    config::Budget,
    datatypes::{Arg, ArgSet, Extension, Policy, Semantics, Status},
    error::{ComputationTimeoutError, InternalInvariantViolation},
    graph::ArgumentGraph,
    labelling::{heuristics::Heuristic, CancellationToken, Goal, LabellingEngine, SearchReport},
    status::StatusAssigner,
};

/// Statistics of one computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeStats {
    /// Number of expanded search nodes.
    pub nodes_expanded: u64,
    /// Number of branches which have not been explored.
    pub unexplored_branches: usize,
    /// Number of labellings the search reported before the final selection.
    pub candidates: usize,
}

/// The result of [ExtensionComputer::compute].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The requested semantics.
    pub semantics: Semantics,
    /// The extensions, in canonical order.
    pub extensions: Vec<Extension>,
    /// Set if the search has been stopped early; the extensions are then a degraded result.
    pub exhaustion: Option<ComputationTimeoutError>,
    /// Statistics of the search.
    pub stats: OutcomeStats,
}

impl Outcome {
    /// Returns [true] if the search has been stopped early.
    pub fn is_partial(&self) -> bool {
        self.exhaustion.is_some()
    }

    /// The extensions, or the reason why they are incomplete.
    pub fn into_result(self) -> Result<Vec<Extension>, ComputationTimeoutError> {
        match self.exhaustion {
            Some(err) => Err(err),
            None => Ok(self.extensions),
        }
    }
}

/// Computes extensions of one graph; all settings are fixed with the builder methods before calling [compute][ExtensionComputer::compute].
#[derive(Debug, Clone)]
pub struct ExtensionComputer<'a> {
    graph: &'a ArgumentGraph,
    budget: Budget,
    heuristic: Heuristic<'a>,
    cancel: CancellationToken,
}

impl<'a> ExtensionComputer<'a> {
    /// Creates a computer with the [default budget][Budget::default] and the [simple heuristic][Heuristic::Simple].
    pub fn new(graph: &'a ArgumentGraph) -> Self {
        Self {
            graph,
            budget: Budget::default(),
            heuristic: Heuristic::default(),
            cancel: CancellationToken::default(),
        }
    }

    /// Sets the [Budget].
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the branching [Heuristic].
    pub fn with_heuristic(mut self, heuristic: Heuristic<'a>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Uses the given token, so the computation can be cancelled from another thread.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Computes all extensions of the graph under `semantics`.
    ///
    /// If the budget is exhausted, the result is degraded instead of failing (see [Outcome::exhaustion]):
    /// it consists of the grounded extension (tagged [Semantics::Grounded]), followed by the already found
    /// extensions whose membership does not depend on the unexplored search space (complete and stable ones).
    pub fn compute(&self, semantics: Semantics) -> Result<Outcome, InternalInvariantViolation> {
        self.run(semantics, None)
    }

    /// Computes the extensions like [compute][ExtensionComputer::compute] and sends each one to `sender` as soon as it is certain.
    ///
    /// Complete and stable extensions are sent while the search is running; preferred and semi-stable ones after the search,
    /// since their maximality is only known at the end. Extensions are sent in search order, not in canonical order.
    pub fn enumerate_channel(
        &self,
        semantics: Semantics,
        sender: Sender<Extension>,
    ) -> Result<Outcome, InternalInvariantViolation> {
        self.run(semantics, Some(sender))
    }

    /// Decides whether `arg` is in some extension under `semantics`.
    /// Returns [None] if the budget has been exhausted before the answer was certain, or if `arg` is not part of the graph.
    pub fn credulous(
        &self,
        semantics: Semantics,
        arg: Arg,
    ) -> Result<Option<bool>, InternalInvariantViolation> {
        self.decide(semantics, Policy::Credulous, arg)
    }

    /// Decides whether `arg` is in every extension under `semantics`.
    /// Like [StatusAssigner::assign], an empty list of extensions accepts nothing.
    /// Returns [None] if the budget has been exhausted before the answer was certain, or if `arg` is not part of the graph.
    pub fn skeptical(
        &self,
        semantics: Semantics,
        arg: Arg,
    ) -> Result<Option<bool>, InternalInvariantViolation> {
        self.decide(semantics, Policy::Skeptical, arg)
    }

    fn decide(
        &self,
        semantics: Semantics,
        policy: Policy,
        arg: Arg,
    ) -> Result<Option<bool>, InternalInvariantViolation> {
        let outcome = self.compute(semantics)?;
        if outcome.is_partial() {
            return Ok(None);
        }
        let status = StatusAssigner::assign_indexed(self.graph, &outcome.extensions, policy);
        Ok(status
            .get(arg.value())
            .map(|status| *status == Status::Accepted))
    }

    fn run(
        &self,
        semantics: Semantics,
        forward: Option<Sender<Extension>>,
    ) -> Result<Outcome, InternalInvariantViolation> {
        log::info!("[Start] computing {} extensions", semantics);
        let engine = LabellingEngine::new(self.graph);
        let outcome = match semantics {
            Semantics::Grounded => {
                let grounded = engine.grounded();
                engine.verify(&grounded)?;
                let extension = Extension::new(Semantics::Grounded, grounded.in_set());
                send(&forward, &extension);
                Outcome {
                    semantics,
                    extensions: vec![extension],
                    exhaustion: None,
                    stats: OutcomeStats::default(),
                }
            }
            Semantics::Complete | Semantics::Stable => {
                let goal = if semantics == Semantics::Stable {
                    Goal::NoUndec
                } else {
                    Goal::All
                };
                let (found, report) = match &forward {
                    Some(sender) => self.search_forwarding(&engine, goal, semantics, sender)?,
                    None => engine.search(goal, &self.budget, self.heuristic, &self.cancel)?,
                };
                self.finish(&engine, semantics, found, report, &forward)?
            }
            Semantics::Preferred | Semantics::SemiStable => {
                let goal = if semantics == Semantics::Preferred {
                    Goal::Maximal
                } else {
                    Goal::MaxRange
                };
                let (found, report) =
                    engine.search(goal, &self.budget, self.heuristic, &self.cancel)?;
                let outcome = self.finish(&engine, semantics, found, report, &None)?;
                for extension in outcome.extensions.iter() {
                    send(&forward, extension);
                }
                outcome
            }
        };
        log::info!(
            "[Done] computing {} extensions: {} found{}",
            semantics,
            outcome.extensions.len(),
            if outcome.is_partial() { " (partial)" } else { "" }
        );
        Ok(outcome)
    }

    /// Runs the search and forwards every found set to `sender` while the search is still running.
    fn search_forwarding(
        &self,
        engine: &LabellingEngine<'_>,
        goal: Goal,
        semantics: Semantics,
        sender: &Sender<Extension>,
    ) -> Result<(Vec<ArgSet>, SearchReport), InternalInvariantViolation> {
        let (s, r) = crossbeam_channel::unbounded::<ArgSet>();
        std::thread::scope(|scope| {
            let forwarder = scope.spawn(move || {
                let mut collected = Vec::new();
                for set in r {
                    if sender.send(Extension::new(semantics, set.clone())).is_err() {
                        log::debug!("receiver of the extensions is gone");
                    }
                    collected.push(set);
                }
                collected
            });
            let report = engine.search_channel(goal, &self.budget, self.heuristic, &self.cancel, s);
            let collected = forwarder.join().map_err(|_| {
                InternalInvariantViolation("extension forwarder panicked".to_string())
            })?;
            Ok((collected, report?))
        })
    }

    /// Selects, verifies, and orders the extensions found by the search.
    fn finish(
        &self,
        engine: &LabellingEngine<'_>,
        semantics: Semantics,
        found: Vec<ArgSet>,
        report: SearchReport,
        forward: &Option<Sender<Extension>>,
    ) -> Result<Outcome, InternalInvariantViolation> {
        let stats = OutcomeStats {
            nodes_expanded: report.nodes,
            unexplored_branches: report.unexplored,
            candidates: found.len(),
        };
        for set in found.iter() {
            self.verify(semantics, set)?;
        }

        if let Some(reason) = report.exhaustion {
            log::warn!(
                "search for {} extensions stopped: {}, returning a partial result",
                semantics,
                reason
            );
            let (grounded, _) = engine.grounded_sets();
            let mut extensions = vec![Extension::new(Semantics::Grounded, grounded.clone())];
            send(forward, &extensions[0]);
            let kept = match semantics {
                Semantics::Complete => found.into_iter().filter(|set| *set != grounded).collect(),
                Semantics::Stable => found,
                _ => Vec::new(),
            };
            extensions.extend(
                canonical(kept)
                    .into_iter()
                    .map(|set| Extension::new(semantics, set)),
            );
            return Ok(Outcome {
                semantics,
                extensions,
                exhaustion: Some(ComputationTimeoutError {
                    semantics,
                    reason,
                    nodes: report.nodes,
                    unexplored: report.unexplored,
                }),
                stats,
            });
        }

        let selected = match semantics {
            Semantics::Preferred => maximal(found),
            Semantics::SemiStable => {
                let analyzer = self.graph.conflicts();
                let ranges: Vec<u64> = found.iter().map(|set| analyzer.range(set).len()).collect();
                let best = ranges.iter().copied().max();
                found
                    .into_iter()
                    .zip(ranges)
                    .filter(|(_, range)| Some(*range) == best)
                    .map(|(set, _)| set)
                    .collect()
            }
            _ => found,
        };
        log::debug!(
            "selected {} of {} candidates",
            selected.len(),
            stats.candidates
        );
        Ok(Outcome {
            semantics,
            extensions: canonical(selected)
                .into_iter()
                .map(|set| Extension::new(semantics, set))
                .collect(),
            exhaustion: None,
            stats,
        })
    }

    fn verify(&self, semantics: Semantics, set: &ArgSet) -> Result<(), InternalInvariantViolation> {
        let analyzer = self.graph.conflicts();
        let valid = analyzer.is_complete(set)
            && (semantics != Semantics::Stable || analyzer.is_stable(set));
        if valid {
            Ok(())
        } else {
            Err(InternalInvariantViolation(format!(
                "{} is not a {} extension",
                self.graph.ordering().print_set(set),
                semantics
            )))
        }
    }
}

fn send(forward: &Option<Sender<Extension>>, extension: &Extension) {
    if let Some(sender) = forward {
        if sender.send(extension.clone()).is_err() {
            log::debug!("receiver of the extensions is gone");
        }
    }
}

/// Removes every set which is a proper subset of another one.
fn maximal(sets: Vec<ArgSet>) -> Vec<ArgSet> {
    sets.iter()
        .filter(|set| {
            !sets
                .iter()
                .any(|other| other.len() > set.len() && set.is_subset(other))
        })
        .cloned()
        .collect()
}

/// Sorts the sets lexicographically by their index sequences and removes duplicates.
fn canonical(sets: Vec<ArgSet>) -> Vec<ArgSet> {
    let mut keyed: Vec<(Vec<u32>, ArgSet)> = sets
        .into_iter()
        .map(|set| (set.iter().collect(), set))
        .collect();
    keyed.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
    keyed.dedup_by(|lhs, rhs| lhs.0 == rhs.0);
    keyed.into_iter().map(|(_, set)| set).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::ArgumentInput;
    use test_log::test;

    fn graph(relations: &[(&str, &[&str])]) -> ArgumentGraph {
        ArgumentGraph::build(
            relations
                .iter()
                .map(|(id, attacks)| ArgumentInput::new(id).attacking(attacks))
                .collect(),
        )
        .unwrap()
    }

    fn ids(graph: &ArgumentGraph, outcome: &Outcome) -> Vec<Vec<String>> {
        outcome
            .extensions
            .iter()
            .map(|ext| graph.ordering().ids_of(&ext.arguments))
            .collect()
    }

    fn compute(graph: &ArgumentGraph, semantics: Semantics) -> Vec<Vec<String>> {
        let outcome = ExtensionComputer::new(graph).compute(semantics).unwrap();
        assert!(!outcome.is_partial());
        assert!(outcome.extensions.iter().all(|ext| ext.semantics == semantics));
        ids(graph, &outcome)
    }

    fn sets(expected: &[&[&str]]) -> Vec<Vec<String>> {
        expected
            .iter()
            .map(|set| set.iter().map(|id| id.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_graph() {
        let graph = graph(&[]);
        assert_eq!(compute(&graph, Semantics::Grounded), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Complete), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::SemiStable), sets(&[&[]]));
    }

    #[test]
    fn single_argument() {
        let graph = graph(&[("A", &[])]);
        for semantics in Semantics::ALL {
            assert_eq!(compute(&graph, semantics), sets(&[&["A"]]));
        }
    }

    #[test]
    fn mutual_attack() {
        let graph = graph(&[("A", &["B"]), ("B", &["A"])]);
        assert_eq!(compute(&graph, Semantics::Grounded), sets(&[&[]]));
        assert_eq!(
            compute(&graph, Semantics::Complete),
            sets(&[&[], &["A"], &["B"]])
        );
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&["A"], &["B"]]));
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[&["A"], &["B"]]));
        assert_eq!(
            compute(&graph, Semantics::SemiStable),
            sets(&[&["A"], &["B"]])
        );
    }

    #[test]
    fn self_attack() {
        let graph = graph(&[("A", &["A"])]);
        assert_eq!(compute(&graph, Semantics::Grounded), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[]));
        assert_eq!(compute(&graph, Semantics::SemiStable), sets(&[&[]]));
    }

    #[test]
    fn chain() {
        let graph = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        for semantics in Semantics::ALL {
            assert_eq!(compute(&graph, semantics), sets(&[&["A", "C"]]));
        }
    }

    #[test]
    fn odd_cycle() {
        // no non-empty admissible set exists: each singleton is attacked without being defended
        let graph = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
        assert_eq!(compute(&graph, Semantics::Grounded), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Complete), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&[]]));
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[]));
        assert_eq!(compute(&graph, Semantics::SemiStable), sets(&[&[]]));
        let analyzer = graph.conflicts();
        for idx in 0..3u32 {
            let single: ArgSet = [idx].into_iter().collect();
            assert!(!analyzer.is_admissible(&single));
        }
    }

    #[test]
    fn semi_stable_without_stable() {
        // a <-> b, b -> c, c -> c: {b} is stable, {a} leaves c undecided
        let graph = graph(&[("a", &["b"]), ("b", &["a", "c"]), ("c", &["c"])]);
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[&["b"]]));
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&["a"], &["b"]]));
        assert_eq!(compute(&graph, Semantics::SemiStable), sets(&[&["b"]]));

        let graph = self::graph(&[("a", &["b"]), ("b", &["a"]), ("c", &["c", "a"])]);
        assert_eq!(compute(&graph, Semantics::Stable), sets(&[]));
        assert_eq!(compute(&graph, Semantics::Preferred), sets(&[&["b"]]));
        assert_eq!(compute(&graph, Semantics::SemiStable), sets(&[&["b"]]));
    }

    #[test]
    fn degraded() {
        let graph = graph(&[
            ("g", &["x"]),
            ("x", &[]),
            ("a1", &["b1"]),
            ("b1", &["a1"]),
            ("a2", &["b2"]),
            ("b2", &["a2"]),
            ("a3", &["b3"]),
            ("b3", &["a3"]),
        ]);
        let computer =
            ExtensionComputer::new(&graph).with_budget(Budget::unlimited().with_max_nodes(4));
        let outcome = computer.compute(Semantics::Complete).unwrap();
        assert!(outcome.is_partial());
        let exhaustion = outcome.exhaustion.unwrap();
        assert_eq!(exhaustion.reason, crate::error::Exhaustion::NodeBudget);
        assert_eq!(exhaustion.nodes, 4);
        assert!(exhaustion.unexplored > 0);
        assert_eq!(outcome.stats.unexplored_branches, exhaustion.unexplored);
        assert_eq!(outcome.extensions[0].semantics, Semantics::Grounded);
        assert_eq!(
            graph.ordering().ids_of(&outcome.extensions[0].arguments),
            vec!["g".to_string()]
        );
        for extension in outcome.extensions.iter().skip(1) {
            assert_eq!(extension.semantics, Semantics::Complete);
            assert!(graph.conflicts().is_complete(&extension.arguments));
            assert_ne!(extension.arguments, outcome.extensions[0].arguments);
        }

        let outcome = computer.compute(Semantics::Preferred).unwrap();
        assert!(outcome.is_partial());
        assert_eq!(outcome.extensions.len(), 1);
        assert_eq!(outcome.extensions[0].semantics, Semantics::Grounded);
        assert!(outcome.clone().into_result().is_err());

        let cancel = CancellationToken::default();
        cancel.cancel();
        let outcome = ExtensionComputer::new(&graph)
            .with_cancellation(cancel)
            .compute(Semantics::Stable)
            .unwrap();
        assert_eq!(
            outcome.exhaustion.map(|err| err.reason),
            Some(crate::error::Exhaustion::Cancelled)
        );
        assert_eq!(outcome.extensions.len(), 1);

        // grounded never searches, so it is never partial
        let outcome = ExtensionComputer::new(&graph)
            .with_budget(Budget::unlimited().with_max_nodes(0))
            .compute(Semantics::Grounded)
            .unwrap();
        assert!(!outcome.is_partial());
    }

    #[test]
    fn deadline() {
        let graph = graph(&[
            ("g", &["x"]),
            ("x", &[]),
            ("a", &["b"]),
            ("b", &["a"]),
        ]);
        let computer =
            ExtensionComputer::new(&graph).with_budget(Budget::unlimited().with_max_millis(0));
        for semantics in [
            Semantics::Complete,
            Semantics::Preferred,
            Semantics::Stable,
            Semantics::SemiStable,
        ] {
            let outcome = computer.compute(semantics).unwrap();
            assert!(outcome.is_partial());
            assert_eq!(
                outcome.exhaustion.map(|err| err.reason),
                Some(crate::error::Exhaustion::Deadline)
            );
            assert_eq!(outcome.extensions[0].semantics, Semantics::Grounded);
            assert_eq!(
                graph.ordering().ids_of(&outcome.extensions[0].arguments),
                vec!["g".to_string()]
            );
        }
        assert!(!computer.compute(Semantics::Grounded).unwrap().is_partial());
    }

    #[test]
    fn idempotence() {
        let graph = graph(&[
            ("a", &["b"]),
            ("b", &["a", "c"]),
            ("c", &["d"]),
            ("d", &["c", "e"]),
            ("e", &["e"]),
        ]);
        for semantics in Semantics::ALL {
            let first = ExtensionComputer::new(&graph).compute(semantics).unwrap();
            let second = ExtensionComputer::new(&graph)
                .with_heuristic(Heuristic::MaxDegree)
                .with_budget(Budget::default().with_threads(3))
                .compute(semantics)
                .unwrap();
            assert_eq!(first.extensions, second.extensions);
        }
    }

    #[test]
    fn streaming() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"]), ("c", &[])]);
        let computer = ExtensionComputer::new(&graph);
        let (s, r) = crossbeam_channel::unbounded();
        let outcome = computer.enumerate_channel(Semantics::Complete, s).unwrap();
        let mut streamed: Vec<Extension> = r.iter().collect();
        streamed.sort_by_key(|ext| ext.indices());
        assert_eq!(streamed, outcome.extensions);
        assert_eq!(streamed.len(), 3);

        let (s, r) = crossbeam_channel::unbounded();
        let outcome = computer.enumerate_channel(Semantics::Preferred, s).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), outcome.extensions);
    }

    #[test]
    fn decisions() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"]), ("c", &["b"])]);
        let computer = ExtensionComputer::new(&graph);
        let a = graph.arg("a").unwrap();
        let b = graph.arg("b").unwrap();
        let c = graph.arg("c").unwrap();
        assert_eq!(computer.credulous(Semantics::Preferred, a), Ok(Some(true)));
        assert_eq!(computer.credulous(Semantics::Preferred, b), Ok(Some(false)));
        assert_eq!(computer.skeptical(Semantics::Complete, c), Ok(Some(true)));
        assert_eq!(computer.skeptical(Semantics::Complete, Arg(7)), Ok(None));
        let limited = ExtensionComputer::new(&graph).with_budget(Budget::unlimited().with_max_nodes(0));
        assert_eq!(limited.credulous(Semantics::Stable, a), Ok(None));
        let outcome = computer.compute(Semantics::Complete).unwrap();
        assert_eq!(outcome.extensions[0].indices(), vec![a.value(), c.value()]);
    }
}
