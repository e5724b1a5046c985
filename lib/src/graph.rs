/*!
This module describes the argument graph, i.e. the abstract argumentation framework itself.

 - validating the input and assigning dense indices to the arguments
 - precomputing the attacker (reverse) and target (forward) indices

The graph is immutable once it is built; every algorithm of this crate only reads from it.
*/

use crate::{
    datatypes::{key, Arg, ArgSet, Argument, ArgumentInput, ArgumentOrder, IdContainer},
    error::GraphValidationError,
};
use derivative::Derivative;
use std::collections::HashSet;

#[derive(Derivative, Clone)]
#[derivative(Debug)]
/// Representation of an argumentation framework, with an ordering and dictionary which relates argument ids to dense indices, the set of attacks, and the (inert) set of supports.
pub struct ArgumentGraph {
    ordering: IdContainer,
    arguments: Vec<Argument>,
    attacks: Vec<(Arg, Arg)>,
    supports: Vec<(Arg, Arg)>,
    #[derivative(Debug = "ignore")]
    attackers: Vec<ArgSet>,
    #[derivative(Debug = "ignore")]
    targets: Vec<ArgSet>,
    #[derivative(Debug = "ignore")]
    universe: ArgSet,
}

impl Default for ArgumentGraph {
    fn default() -> Self {
        Self {
            ordering: IdContainer::default(),
            arguments: Vec::new(),
            attacks: Vec::new(),
            supports: Vec::new(),
            attackers: Vec::new(),
            targets: Vec::new(),
            universe: ArgSet::new(),
        }
    }
}

impl ArgumentGraph {
    /// Builds a graph from a list of [inputs][ArgumentInput], keeping the input order of the arguments.
    ///
    /// Fails with [GraphValidationError::DuplicateArgumentId] if two inputs share an id and with
    /// [GraphValidationError::UnknownTargetReference] if an attack or support references a non-existent id.
    pub fn build(arguments: Vec<ArgumentInput>) -> Result<Self, GraphValidationError> {
        Self::build_ordered(arguments, ArgumentOrder::Input)
    }

    /// Builds a graph like [build][ArgumentGraph::build], but assigns the indices in the given [ArgumentOrder].
    pub fn build_ordered(
        arguments: Vec<ArgumentInput>,
        order: ArgumentOrder,
    ) -> Result<Self, GraphValidationError> {
        let mut builder = GraphBuilder::default().with_order(order);
        for input in arguments {
            for target in input.attacks {
                builder.add_attack(&input.id, &target);
            }
            for target in input.supports {
                builder.add_support(&input.id, &target);
            }
            builder.add_argument(Argument {
                id: input.id,
                content: input.content,
                metadata: input.metadata,
            });
        }
        builder.build()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns [true] if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Number of (distinct) attacks.
    pub fn attack_count(&self) -> usize {
        self.attacks.len()
    }

    /// Number of (distinct) supports.
    pub fn support_count(&self) -> usize {
        self.supports.len()
    }

    /// The dictionary between ids and indices.
    pub fn ordering(&self) -> &IdContainer {
        &self.ordering
    }

    /// Get the [Arg] which corresponds to the given id.
    pub fn arg(&self, id: &str) -> Option<Arg> {
        self.ordering.arg(id)
    }

    /// Get the id which corresponds to the given [Arg].
    pub fn id(&self, arg: Arg) -> Option<&str> {
        self.ordering.id(arg)
    }

    /// Get the [Argument] at the given index.
    pub fn argument(&self, arg: Arg) -> Option<&Argument> {
        self.arguments.get(arg.value())
    }

    /// Iterates over all arguments in index order.
    pub fn arguments(&self) -> impl Iterator<Item = (Arg, &Argument)> + '_ {
        self.arguments
            .iter()
            .enumerate()
            .map(|(idx, argument)| (Arg(idx), argument))
    }

    /// All attacks as `(attacker, target)` pairs, sorted.
    pub fn attacks(&self) -> &[(Arg, Arg)] {
        &self.attacks
    }

    /// All supports as `(supporter, target)` pairs, sorted.
    /// Supports are informational only and never influence a semantics.
    pub fn supports(&self) -> &[(Arg, Arg)] {
        &self.supports
    }

    /// The set of all arguments.
    pub fn universe(&self) -> &ArgSet {
        &self.universe
    }

    /// Returns [true] if `arg` is an argument of this graph.
    pub fn contains(&self, arg: Arg) -> bool {
        arg.value() < self.arguments.len()
    }

    /// The attackers of the given argument, an O(1) lookup in the precomputed reverse index.
    ///
    /// # Panics
    /// If `arg` is not an argument of this graph; [ArgumentGraph::contains] checks this.
    pub fn attackers_of(&self, arg: Arg) -> &ArgSet {
        &self.attackers[arg.value()]
    }

    /// The arguments attacked by the given argument.
    ///
    /// # Panics
    /// If `arg` is not an argument of this graph.
    pub fn targets_of(&self, arg: Arg) -> &ArgSet {
        &self.targets[arg.value()]
    }

    /// Returns [true] if `attacker` attacks `target`; an `attacker` outside of this graph attacks nothing.
    pub fn attacks_arg(&self, attacker: Arg, target: Arg) -> bool {
        self.targets
            .get(attacker.value())
            .map_or(false, |targets| targets.contains(key(target)))
    }

    /// A stable hash over the structure of the graph (ids, attacks, and supports).
    ///
    /// It neither depends on the input order nor on the [ArgumentOrder], nor on the contents, so it can be used to key a cache
    /// of computed extensions.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = xxhash_rust::xxh64::Xxh64::new(0);
        let mut ids: Vec<&str> = self.ordering.names().iter().map(String::as_str).collect();
        ids.sort_unstable();
        for id in ids {
            hasher.update(b"a");
            hasher.update(&(id.len() as u64).to_le_bytes());
            hasher.update(id.as_bytes());
        }
        for (tag, relation) in [(b"t", &self.attacks), (b"s", &self.supports)] {
            let mut pairs: Vec<(&str, &str)> = relation
                .iter()
                .filter_map(|(source, target)| Some((self.id(*source)?, self.id(*target)?)))
                .collect();
            pairs.sort_unstable();
            for (source, target) in pairs {
                hasher.update(tag);
                hasher.update(&(source.len() as u64).to_le_bytes());
                hasher.update(source.as_bytes());
                hasher.update(&(target.len() as u64).to_le_bytes());
                hasher.update(target.as_bytes());
            }
        }
        hasher.digest()
    }
}

/// Collects arguments and relations by id and validates them into an [ArgumentGraph].
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    arguments: Vec<Argument>,
    attacks: Vec<(String, String)>,
    supports: Vec<(String, String)>,
    order: ArgumentOrder,
}

impl GraphBuilder {
    /// Sets the [ArgumentOrder] which is used to assign the indices.
    pub fn with_order(mut self, order: ArgumentOrder) -> Self {
        self.order = order;
        self
    }

    /// Changes the [ArgumentOrder] which is used to assign the indices.
    pub fn set_order(&mut self, order: ArgumentOrder) {
        self.order = order;
    }

    /// Adds an argument.
    pub fn add_argument(&mut self, argument: Argument) -> &mut Self {
        self.arguments.push(argument);
        self
    }

    /// Adds an argument which only consists of its id.
    pub fn add_id(&mut self, id: &str) -> &mut Self {
        self.add_argument(Argument {
            id: id.to_string(),
            content: String::new(),
            metadata: Default::default(),
        })
    }

    /// Adds an attack of `attacker` on `target`.
    pub fn add_attack(&mut self, attacker: &str, target: &str) -> &mut Self {
        self.attacks.push((attacker.to_string(), target.to_string()));
        self
    }

    /// Adds a support of `supporter` for `target`.
    pub fn add_support(&mut self, supporter: &str, target: &str) -> &mut Self {
        self.supports
            .push((supporter.to_string(), target.to_string()));
        self
    }

    /// Number of arguments added so far.
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Validates the collected data and instantiates the [ArgumentGraph].
    pub fn build(self) -> Result<ArgumentGraph, GraphValidationError> {
        log::debug!("[Start] building graph");
        let mut seen = HashSet::with_capacity(self.arguments.len());
        for argument in self.arguments.iter() {
            if !seen.insert(argument.id.as_str()) {
                return Err(GraphValidationError::DuplicateArgumentId(
                    argument.id.clone(),
                ));
            }
        }
        let mut names: Vec<String> = self.arguments.iter().map(|arg| arg.id.clone()).collect();
        self.order.sort(&mut names);
        let ordering = IdContainer::from_names(names);

        let mut arguments: Vec<Option<Argument>> = vec![None; self.arguments.len()];
        for argument in self.arguments {
            let pos = ordering
                .arg(&argument.id)
                .expect("ordering has been created from the same ids")
                .value();
            arguments[pos] = Some(argument);
        }
        let arguments: Vec<Argument> = arguments.into_iter().flatten().collect();

        let attacks = Self::resolve(&ordering, self.attacks, "attack")?;
        let supports = Self::resolve(&ordering, self.supports, "support")?;

        let mut attackers = vec![ArgSet::new(); arguments.len()];
        let mut targets = vec![ArgSet::new(); arguments.len()];
        for (attacker, target) in attacks.iter() {
            attackers[target.value()].insert(key(*attacker));
            targets[attacker.value()].insert(key(*target));
        }
        let universe = (0..arguments.len()).map(|idx| key(Arg(idx))).collect();
        log::debug!(
            "[Done] building graph with {} arguments, {} attacks, and {} supports",
            arguments.len(),
            attacks.len(),
            supports.len()
        );
        Ok(ArgumentGraph {
            ordering,
            arguments,
            attacks,
            supports,
            attackers,
            targets,
            universe,
        })
    }

    fn resolve(
        ordering: &IdContainer,
        relation: Vec<(String, String)>,
        name: &'static str,
    ) -> Result<Vec<(Arg, Arg)>, GraphValidationError> {
        let mut result = relation
            .into_iter()
            .map(|(source, target)| -> Result<(Arg, Arg), GraphValidationError> {
                let unknown = |missing: &str| GraphValidationError::UnknownTargetReference {
                    relation: name,
                    source_id: source.clone(),
                    target_id: missing.to_string(),
                };
                let source_arg = ordering.arg(&source).ok_or_else(|| unknown(&source))?;
                let target_arg = ordering.arg(&target).ok_or_else(|| unknown(&target))?;
                Ok((source_arg, target_arg))
            })
            .collect::<Result<Vec<_>, _>>()?;
        result.sort_unstable();
        result.dedup();
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn input(id: &str, attacks: &[&str]) -> ArgumentInput {
        ArgumentInput::new(id).attacking(attacks)
    }

    #[test]
    fn build() {
        let graph = ArgumentGraph::build(vec![
            input("a", &["b"]),
            input("b", &["c", "c"]).with_content("  kept verbatim "),
            input("c", &["c"]).supporting(&["a"]),
        ])
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.attack_count(), 3);
        assert_eq!(graph.support_count(), 1);
        assert_eq!(graph.arg("b"), Some(Arg(1)));
        assert_eq!(
            graph.argument(Arg(1)).map(|arg| arg.content.as_str()),
            Some("  kept verbatim ")
        );
        assert_eq!(
            graph.attackers_of(Arg(2)).iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(graph.targets_of(Arg(0)).iter().collect::<Vec<_>>(), vec![1]);
        assert!(graph.attacks_arg(Arg(2), Arg(2)));
        assert!(!graph.attacks_arg(Arg(2), Arg(0)));
        assert!(graph.attackers_of(Arg(0)).is_empty());
        assert_eq!(graph.universe().len(), 3);
        assert!(graph.contains(Arg(2)));
        assert!(!graph.contains(Arg(3)));
        assert!(!graph.attacks_arg(Arg(3), Arg(0)));
    }

    #[test]
    #[should_panic]
    fn foreign_argument() {
        let graph = ArgumentGraph::build(vec![input("a", &[])]).unwrap();
        graph.attackers_of(Arg(1));
    }

    #[test]
    fn validation() {
        assert_eq!(
            ArgumentGraph::build(vec![input("a", &[]), input("a", &[])]).unwrap_err(),
            GraphValidationError::DuplicateArgumentId("a".into())
        );
        assert_eq!(
            ArgumentGraph::build(vec![input("a", &["x"])]).unwrap_err(),
            GraphValidationError::UnknownTargetReference {
                relation: "attack",
                source_id: "a".into(),
                target_id: "x".into()
            }
        );
        assert_eq!(
            ArgumentGraph::build(vec![ArgumentInput::new("a").supporting(&["y"])]).unwrap_err(),
            GraphValidationError::UnknownTargetReference {
                relation: "support",
                source_id: "a".into(),
                target_id: "y".into()
            }
        );
        let mut builder = GraphBuilder::default();
        builder.add_id("b").add_attack("z", "b");
        assert!(matches!(
            builder.build(),
            Err(GraphValidationError::UnknownTargetReference { target_id, .. }) if target_id == "z"
        ));
    }

    #[test]
    fn empty() {
        let graph = ArgumentGraph::build(vec![]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.attack_count(), 0);
        assert_eq!(
            graph.content_hash(),
            ArgumentGraph::default().content_hash()
        );
    }

    #[test]
    fn ordered() {
        let graph = ArgumentGraph::build_ordered(
            vec![input("a10", &["a2"]), input("a2", &[]), input("a1", &["a10"])],
            ArgumentOrder::Alphanumeric,
        )
        .unwrap();
        assert_eq!(graph.ordering().names(), ["a1", "a2", "a10"]);
        assert_eq!(graph.attacks(), &[(Arg(0), Arg(2)), (Arg(2), Arg(1))]);
        assert_eq!(graph.argument(Arg(2)).map(|arg| arg.id.as_str()), Some("a10"));
    }

    #[test]
    fn content_hash() {
        let graph = ArgumentGraph::build(vec![
            input("a", &["b"]),
            input("b", &["a"]).with_content("first"),
        ])
        .unwrap();
        let reordered = ArgumentGraph::build_ordered(
            vec![
                input("b", &["a"]).with_content("second"),
                input("a", &["b"]),
            ],
            ArgumentOrder::Lexicographic,
        )
        .unwrap();
        let different =
            ArgumentGraph::build(vec![input("a", &["b"]), input("b", &[])]).unwrap();
        assert_eq!(graph.content_hash(), reordered.content_hash());
        assert_ne!(graph.content_hash(), different.content_hash());
    }
}
