//! Labellings, extensions, and the enumerations which select what to compute.

use super::{key, Arg, ArgSet};
use crate::graph::ArgumentGraph;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

/// The label of one argument in a [Labelling].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// The argument is accepted.
    In,
    /// The argument is attacked by an accepted argument.
    Out,
    /// Neither of the above.
    Undec,
}

/// A total function from arguments to [labels][Label], indexed by [Arg].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Labelling(Vec<Label>);

impl Labelling {
    /// Creates a labelling where every argument has the given label.
    pub fn uniform(len: usize, label: Label) -> Self {
        Self(vec![label; len])
    }

    /// Derives a labelling from the three (disjoint) sets; arguments in neither set are [Label::Undec].
    ///
    /// Indices of at least `len` are ignored.
    pub fn from_sets(len: usize, in_set: &ArgSet, out_set: &ArgSet) -> Self {
        let mut result = Self::uniform(len, Label::Undec);
        for (set, label) in [(out_set, Label::Out), (in_set, Label::In)] {
            for idx in set {
                if let Some(entry) = result.0.get_mut(idx as usize) {
                    *entry = label;
                }
            }
        }
        result
    }

    /// The label of the given [Arg].
    pub fn label(&self, arg: Arg) -> Option<Label> {
        self.0.get(arg.value()).copied()
    }

    /// All labels in index order.
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    fn projection(&self, label: Label) -> ArgSet {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &lab)| lab == label)
            .map(|(idx, _)| key(Arg(idx)))
            .collect()
    }

    /// The arguments labelled [Label::In].
    pub fn in_set(&self) -> ArgSet {
        self.projection(Label::In)
    }

    /// The arguments labelled [Label::Out].
    pub fn out_set(&self) -> ArgSet {
        self.projection(Label::Out)
    }

    /// The arguments labelled [Label::Undec].
    pub fn undec_set(&self) -> ArgSet {
        self.projection(Label::Undec)
    }

    /// Checks the labelling conditions with respect to the given graph:
    /// an argument is IN iff all its attackers are OUT and OUT iff some attacker is IN.
    pub fn is_complete_labelling(&self, graph: &ArgumentGraph) -> bool {
        if self.0.len() != graph.len() {
            return false;
        }
        self.0.iter().enumerate().all(|(idx, label)| {
            let attackers = graph.attackers_of(Arg(idx));
            let all_out = attackers
                .iter()
                .all(|att| self.0[att as usize] == Label::Out);
            let some_in = attackers.iter().any(|att| self.0[att as usize] == Label::In);
            match label {
                Label::In => all_out,
                Label::Out => some_in,
                Label::Undec => !all_out && !some_in,
            }
        })
    }
}

/// The argumentation semantics which can be computed.
/// Parsing accepts the full names as well as the ICCMA abbreviations, ignoring the case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Semantics {
    /// The unique least complete extension.
    #[strum(to_string = "grounded", serialize = "gr", serialize = "grd")]
    Grounded,
    /// Admissible sets which contain exactly what they defend.
    #[strum(to_string = "complete", serialize = "co", serialize = "com")]
    Complete,
    /// Subset-maximal complete extensions.
    #[strum(to_string = "preferred", serialize = "pr", serialize = "prf")]
    Preferred,
    /// Conflict-free sets which attack every argument outside of them.
    #[strum(to_string = "stable", serialize = "st", serialize = "stb")]
    Stable,
    /// Complete extensions with a maximal number of decided arguments.
    #[strum(
        to_string = "semi-stable",
        serialize = "sst",
        serialize = "semistable",
        serialize = "semi_stable"
    )]
    SemiStable,
}

impl Semantics {
    /// All semantics, in the order of their computation cost.
    pub const ALL: [Semantics; 5] = [
        Semantics::Grounded,
        Semantics::Complete,
        Semantics::Preferred,
        Semantics::Stable,
        Semantics::SemiStable,
    ];
}

/// An extension, i.e. the IN-labelled arguments of a labelling satisfying the defining property of `semantics`.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// The semantics this extension belongs to.
    pub semantics: Semantics,
    /// The accepted arguments.
    pub arguments: ArgSet,
}

impl Extension {
    /// Creates a new [Extension].
    pub fn new(semantics: Semantics, arguments: ArgSet) -> Self {
        Self {
            semantics,
            arguments,
        }
    }

    /// Returns [true] if the given [Arg] is part of the extension.
    pub fn contains(&self, arg: Arg) -> bool {
        self.arguments.contains(key(arg))
    }

    /// Number of accepted arguments.
    pub fn len(&self) -> usize {
        self.arguments.len() as usize
    }

    /// Returns [true] if no argument is accepted.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// The accepted arguments as a sorted list of indices.
    pub fn indices(&self) -> Vec<usize> {
        self.arguments.iter().map(|idx| Arg::from(idx).value()).collect()
    }
}

/// How a set of extensions is aggregated into a per-argument [Status].
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Policy {
    /// Accepted iff in every extension.
    #[default]
    Skeptical,
    /// Accepted iff in at least one extension.
    Credulous,
}

/// The acceptance status of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Accepted under the chosen [Policy].
    Accepted,
    /// Part of no extension.
    Rejected,
    /// In some, but not all extensions (only under [Policy::Skeptical]).
    Undecided,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use test_log::test;

    #[test]
    fn parse_semantics() {
        assert_eq!(Semantics::from_str("grounded"), Ok(Semantics::Grounded));
        assert_eq!(Semantics::from_str("GR"), Ok(Semantics::Grounded));
        assert_eq!(Semantics::from_str("Preferred"), Ok(Semantics::Preferred));
        assert_eq!(Semantics::from_str("semi-stable"), Ok(Semantics::SemiStable));
        assert_eq!(Semantics::from_str("SST"), Ok(Semantics::SemiStable));
        assert_eq!(Semantics::from_str("stb"), Ok(Semantics::Stable));
        assert!(Semantics::from_str("ideal").is_err());
        assert_eq!(Semantics::SemiStable.to_string(), "semi-stable");
        assert_eq!(
            serde_json::to_string(&Semantics::SemiStable).unwrap(),
            "\"semi-stable\""
        );
    }

    #[test]
    fn parse_policy() {
        assert_eq!(Policy::default(), Policy::Skeptical);
        assert_eq!(Policy::from_str("credulous"), Ok(Policy::Credulous));
        assert_eq!(Policy::from_str("Skeptical"), Ok(Policy::Skeptical));
        assert!(Policy::from_str("sceptical-ish").is_err());
        assert_eq!(Status::Undecided.to_string(), "undecided");
    }

    #[test]
    fn projections() {
        let labelling = Labelling(vec![Label::In, Label::Out, Label::Undec, Label::In]);
        assert_eq!(labelling.in_set().iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(labelling.out_set().iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(labelling.undec_set().iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(
            Labelling::from_sets(4, &labelling.in_set(), &labelling.out_set()),
            labelling
        );
        assert_eq!(labelling.label(Arg(2)), Some(Label::Undec));
        assert_eq!(labelling.label(Arg(4)), None);

        let foreign: ArgSet = [1u32, 7].into_iter().collect();
        let clipped = Labelling::from_sets(2, &foreign, &[9u32].into_iter().collect());
        assert_eq!(clipped, Labelling(vec![Label::Undec, Label::In]));
    }
}
