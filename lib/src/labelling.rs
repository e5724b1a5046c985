/*!
This module computes labellings of an [ArgumentGraph].

 - the grounded labelling as a least fixpoint
 - all complete labellings (optionally restricted to a [Goal]) by a bounded backtracking search

# Search
The search operates on a [PartialLabelling], which keeps for every argument the set of labels it may still receive.
Every branch point fixes one argument to its first possible label, or removes that label, so the two branches are disjoint.
After each decision the complete-labelling conditions are propagated to a fixpoint.
A leaf (every argument has exactly one label left) is therefore a complete labelling, and each one is visited once.

The frontier is an explicit stack, which can be shared with further workers (see [Budget::workers][crate::config::Budget::workers]).
Budget, deadline, and [cancellation][CancellationToken] are checked before each expansion.
*/

pub mod heuristics;
mod search;

use crate::{
    config::Budget,
    datatypes::{ArgSet, Label, Labelling},
    error::{Exhaustion, InternalInvariantViolation},
    graph::ArgumentGraph,
};

use self::heuristics::Heuristic;
pub use self::search::{CancellationToken, PartialLabelling};

/// What the search is looking for; each [Goal] allows a different kind of pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// All complete labellings.
    All,
    /// Complete labellings with a subset-maximal IN set; branches which can only lead to a subset of an already found IN set are skipped.
    Maximal,
    /// Complete labellings with a maximal number of decided arguments; branches whose bound is below the best found one are skipped.
    MaxRange,
    /// Complete labellings without UNDEC arguments (i.e. stable labellings).
    NoUndec,
}

/// Statistics of one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Number of expanded search nodes.
    pub nodes: u64,
    /// Number of leaves which have been reported.
    pub found: usize,
    /// Number of branches which have not been explored.
    pub unexplored: usize,
    /// Set if the search did not explore its whole search space.
    pub exhaustion: Option<Exhaustion>,
}

/// Computes labellings of one [ArgumentGraph]; holds no state beyond the borrowed graph.
#[derive(Debug, Clone, Copy)]
pub struct LabellingEngine<'a> {
    graph: &'a ArgumentGraph,
}

impl<'a> LabellingEngine<'a> {
    /// Creates the engine for the given graph.
    pub fn new(graph: &'a ArgumentGraph) -> Self {
        Self { graph }
    }

    /// Computes the grounded labelling.
    ///
    /// Starting with no IN and no OUT arguments, an argument is labelled IN if all its attackers are OUT, and OUT if one of its attackers is IN.
    /// This is repeated until a full pass does not change any label; every remaining argument is UNDEC.
    pub fn grounded(&self) -> Labelling {
        log::info!("[Start] grounded");
        let (in_set, out_set) = self.grounded_sets();
        log::info!("[Done] grounded");
        Labelling::from_sets(self.graph.len(), &in_set, &out_set)
    }

    /// The IN and OUT sets of the grounded labelling.
    pub fn grounded_sets(&self) -> (ArgSet, ArgSet) {
        let mut in_set = ArgSet::new();
        let mut out_set = ArgSet::new();
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            let undecided = self.graph.universe() - &(&in_set | &out_set);
            for idx in undecided.iter() {
                let attackers = self.graph.attackers_of(idx.into());
                if attackers.is_subset(&out_set) {
                    in_set.insert(idx);
                    changed = true;
                } else if !attackers.is_disjoint(&in_set) {
                    out_set.insert(idx);
                    changed = true;
                }
            }
            log::debug!(
                "pass {}: {} in, {} out",
                passes,
                in_set.len(),
                out_set.len()
            );
            if !changed {
                break;
            }
        }
        (in_set, out_set)
    }

    /// Runs the search for complete labellings which satisfy `goal`, and sends the IN set of every found leaf to `sender`.
    ///
    /// For [Goal::All] and [Goal::NoUndec] every sent set is a solution; for [Goal::Maximal] and [Goal::MaxRange] the sent sets
    /// are candidates which may be dominated by later ones, but every solution is sent.
    pub fn search_channel(
        &self,
        goal: Goal,
        budget: &Budget,
        heuristic: Heuristic<'_>,
        cancel: &CancellationToken,
        sender: crossbeam_channel::Sender<ArgSet>,
    ) -> Result<SearchReport, InternalInvariantViolation> {
        log::info!("[Start] search for {:?} complete labellings", goal);
        let (in_set, out_set) = self.grounded_sets();
        let root = PartialLabelling::from_grounded(self.graph, &in_set, &out_set, goal);
        let report = search::Search::new(self.graph, goal, budget, heuristic, cancel)
            .run(root, budget.workers(), sender)?;
        log::info!(
            "[Done] search for {:?} complete labellings: {} nodes, {} leaves{}",
            goal,
            report.nodes,
            report.found,
            report
                .exhaustion
                .map(|reason| format!(", stopped: {reason}"))
                .unwrap_or_default()
        );
        Ok(report)
    }

    /// Runs the search like [search_channel][LabellingEngine::search_channel] and collects the IN sets.
    pub fn search(
        &self,
        goal: Goal,
        budget: &Budget,
        heuristic: Heuristic<'_>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ArgSet>, SearchReport), InternalInvariantViolation> {
        let (s, r) = crossbeam_channel::unbounded();
        let report = self.search_channel(goal, budget, heuristic, cancel, s)?;
        Ok((r.try_iter().collect(), report))
    }

    /// Checks that `labelling` satisfies the labelling conditions of the graph.
    pub fn verify(&self, labelling: &Labelling) -> Result<(), InternalInvariantViolation> {
        if labelling.is_complete_labelling(self.graph) {
            Ok(())
        } else {
            Err(InternalInvariantViolation(format!(
                "not a complete labelling: {}",
                self.graph.ordering().print_labelling(labelling.labels())
            )
            .trim_end()
            .to_string()))
        }
    }

    /// Returns [true] if the labelling does not contain any [Label::Undec].
    pub fn is_two_valued(labelling: &Labelling) -> bool {
        labelling.labels().iter().all(|label| *label != Label::Undec)
    }
}
