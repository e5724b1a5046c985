/*!
This module contains all the crate-wide defined branching heuristics of the labelling search.
In addition there is the public enum [Heuristic], which allows to set a heuristic function with the public API.

A heuristic only picks the argument to branch on; the search always tries the labels in the order IN, OUT, UNDEC.
 */
use super::PartialLabelling;
use crate::{
    datatypes::{key, Arg, Label},
    graph::ArgumentGraph,
};

use strum::{EnumString, EnumVariantNames};

/// Return value for heuristics.
pub type RetVal = Option<Arg>;
/// Signature for heuristics functions.
pub type HeuristicFn = dyn Fn(&ArgumentGraph, &PartialLabelling) -> RetVal + Sync;

pub(crate) fn heu_simple(_graph: &ArgumentGraph, state: &PartialLabelling) -> RetVal {
    state.open().min().map(Arg::from)
}

pub(crate) fn heu_max_degree(graph: &ArgumentGraph, state: &PartialLabelling) -> RetVal {
    state
        .open()
        .iter()
        .min_by_key(|&idx| {
            let arg = Arg::from(idx);
            (
                std::cmp::Reverse(graph.attackers_of(arg).len() + graph.targets_of(arg).len()),
                idx,
            )
        })
        .map(Arg::from)
}

pub(crate) fn heu_min_attackers(graph: &ArgumentGraph, state: &PartialLabelling) -> RetVal {
    state
        .open()
        .iter()
        .min_by_key(|&idx| {
            let undecided = graph
                .attackers_of(Arg::from(idx))
                .iter()
                .filter(|&att| state.fixed(Arg::from(att)) != Some(Label::Out))
                .count();
            (undecided, idx)
        })
        .map(Arg::from)
}

/// Enumeration of all currently implemented heuristics.
/// It represents a public view on the crate-view implementations of heuristics.
#[derive(EnumString, EnumVariantNames, Copy, Clone)]
pub enum Heuristic<'a> {
    /// Implementation of a simple heuristic.
    /// This will just take the open argument with the smallest index.
    Simple,
    /// Takes the open argument with the most attack relations (incoming and outgoing), which tends to decide the most arguments by propagation.
    MaxDegree,
    /// Takes the open argument with the fewest attackers which are not already OUT.
    MinAttackers,
    /// Allow passing in an externally-defined custom heuristic.
    #[strum(disabled)]
    Custom(&'a HeuristicFn),
}

impl Default for Heuristic<'_> {
    fn default() -> Self {
        Self::Simple
    }
}

impl std::fmt::Debug for Heuristic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "Simple"),
            Self::MaxDegree => write!(f, "Open argument with the maximal attack degree"),
            Self::MinAttackers => write!(f, "Open argument with the minimal number of attackers not yet out"),
            Self::Custom(_) => f.debug_tuple("Custom function").finish(),
        }
    }
}

impl Heuristic<'_> {
    pub(crate) fn get_heuristic(&self) -> &(dyn Fn(&ArgumentGraph, &PartialLabelling) -> RetVal + Sync + '_) {
        match self {
            Heuristic::Simple => &heu_simple,
            Heuristic::MaxDegree => &heu_max_degree,
            Heuristic::MinAttackers => &heu_min_attackers,
            Self::Custom(f) => f,
        }
    }
}

/// Returns [true] if `arg` is still open in `state`, i.e. a valid answer of a heuristic.
pub fn is_open(state: &PartialLabelling, arg: Arg) -> bool {
    state.open().contains(key(arg))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        datatypes::{ArgSet, ArgumentInput},
        labelling::Goal,
    };
    use std::str::FromStr;
    use test_log::test;

    #[test]
    fn debug_out() {
        dbg!(Heuristic::Simple);
        dbg!(Heuristic::MaxDegree);
        dbg!(Heuristic::MinAttackers);
        dbg!(Heuristic::Custom(&|_graph: &ArgumentGraph,
                                 _state: &PartialLabelling|
         -> Option<Arg> { None }));
    }

    #[test]
    fn from_str() {
        assert!(matches!(Heuristic::from_str("Simple"), Ok(Heuristic::Simple)));
        assert!(matches!(Heuristic::from_str("MaxDegree"), Ok(Heuristic::MaxDegree)));
        assert!(Heuristic::from_str("Custom").is_err());
    }

    #[test]
    fn choices() {
        // a -> b, c <-> d, d -> b, d -> e
        let graph = ArgumentGraph::build(vec![
            ArgumentInput::new("a").attacking(&["b"]),
            ArgumentInput::new("b"),
            ArgumentInput::new("c").attacking(&["d"]),
            ArgumentInput::new("d").attacking(&["c", "b", "e"]),
            ArgumentInput::new("e"),
        ])
        .unwrap();
        let in_set: ArgSet = [0u32].into_iter().collect();
        let out_set: ArgSet = [1u32].into_iter().collect();
        let mut state = PartialLabelling::from_grounded(&graph, &in_set, &out_set, Goal::All);
        assert!(state.propagate(&graph, graph.universe().clone()));
        assert_eq!(
            state.open().iter().collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        assert_eq!(heu_simple(&graph, &state), Some(Arg(2)));
        assert_eq!(heu_max_degree(&graph, &state), Some(Arg(3)));
        assert_eq!(heu_min_attackers(&graph, &state), Some(Arg(2)));
        assert!(is_open(&state, Arg(4)));
        assert!(!is_open(&state, Arg(0)));
        assert_eq!(
            Heuristic::MaxDegree.get_heuristic()(&graph, &state),
            Some(Arg(3))
        );
    }
}
