//! Pure functions about conflicts and defence over an [ArgumentGraph].
//!
//! All set-valued operations work on [ArgSet] bitmaps, so unions, intersections, and subset tests operate on whole words.

use crate::{
    datatypes::{key, Arg, ArgSet, Labelling},
    graph::ArgumentGraph,
};

/// Stateless view on an [ArgumentGraph] which answers conflict and defence queries.
#[derive(Debug, Clone, Copy)]
pub struct ConflictAnalyzer<'a> {
    graph: &'a ArgumentGraph,
}

impl<'a> ConflictAnalyzer<'a> {
    /// Creates the analyzer for the given graph.
    pub fn new(graph: &'a ArgumentGraph) -> Self {
        Self { graph }
    }

    /// The attackers of `arg`.
    pub fn attackers_of(&self, arg: Arg) -> &'a ArgSet {
        self.graph.attackers_of(arg)
    }

    /// Returns [true] iff no member of `set` attacks a member of `set`.
    pub fn is_conflict_free(&self, set: &ArgSet) -> bool {
        set.iter()
            .all(|idx| self.graph.attackers_of(Arg::from(idx)).is_disjoint(set))
    }

    /// `S+`: all arguments attacked by a member of `set`.
    pub fn attacked_by(&self, set: &ArgSet) -> ArgSet {
        let mut result = ArgSet::new();
        for idx in set {
            result |= self.graph.targets_of(Arg::from(idx));
        }
        result
    }

    /// `S ∪ S+`
    pub fn range(&self, set: &ArgSet) -> ArgSet {
        let mut result = self.attacked_by(set);
        result |= set;
        result
    }

    /// Returns [true] iff every attacker of `arg` is attacked by some member of `set`.
    pub fn defends(&self, set: &ArgSet, arg: Arg) -> bool {
        self.graph.attackers_of(arg).is_subset(&self.attacked_by(set))
    }

    fn defends_with(&self, counter_attacked: &ArgSet, arg: Arg) -> bool {
        self.graph.attackers_of(arg).is_subset(counter_attacked)
    }

    /// The characteristic function `F(S)`: the set of all arguments defended by `set`.
    pub fn characteristic(&self, set: &ArgSet) -> ArgSet {
        let counter_attacked = self.attacked_by(set);
        self.graph
            .universe()
            .iter()
            .filter(|&idx| self.defends_with(&counter_attacked, Arg::from(idx)))
            .collect()
    }

    /// Conflict-free and defending all its members.
    pub fn is_admissible(&self, set: &ArgSet) -> bool {
        let counter_attacked = self.attacked_by(set);
        self.is_conflict_free(set)
            && set
                .iter()
                .all(|idx| self.defends_with(&counter_attacked, Arg::from(idx)))
    }

    /// Conflict-free and `F(S) = S`.
    pub fn is_complete(&self, set: &ArgSet) -> bool {
        self.is_conflict_free(set) && self.characteristic(set) == *set
    }

    /// Conflict-free and attacking every argument outside of `set`.
    pub fn is_stable(&self, set: &ArgSet) -> bool {
        self.is_conflict_free(set) && self.range(set) == *self.graph.universe()
    }

    /// The labelling induced by `set`: IN = S, OUT = S+, UNDEC = everything else.
    pub fn labelling_of(&self, set: &ArgSet) -> Labelling {
        Labelling::from_sets(self.graph.len(), set, &(self.attacked_by(set) - set))
    }

    /// Returns [true] iff `attacker` attacks `target`.
    pub fn attacks(&self, attacker: Arg, target: Arg) -> bool {
        self.graph.targets_of(attacker).contains(key(target))
    }
}

impl ArgumentGraph {
    /// Creates a [ConflictAnalyzer] for this graph.
    pub fn conflicts(&self) -> ConflictAnalyzer<'_> {
        ConflictAnalyzer::new(self)
    }
}
