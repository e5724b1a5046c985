//! Representation of arguments and of the dictionary between argument ids and dense indices.

use super::{ArgSet, Label};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, collections::HashMap, fmt::Display, ops::Deref};

/// Representation of an argument by its dense index.
/// Note that the algorithms only use [usize] values to identify arguments.
/// The order of these values is given by the [ArgumentOrder] chosen when the graph is built.
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Arg(pub usize);

impl Deref for Arg {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<usize> for Arg {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl From<u32> for Arg {
    fn from(val: u32) -> Self {
        Self(val as usize)
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Arg({})", self.0)
    }
}

impl Arg {
    /// Returns the value of the [Arg] as [usize]
    pub fn value(self) -> usize {
        self.0
    }
}

/// An argument of the debate graph.
/// Its identity is the `id`, the `content` is an opaque payload which is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Unique identifier.
    pub id: String,
    /// Opaque payload, stored verbatim.
    #[serde(default)]
    pub content: String,
    /// Optional key-value annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// One argument as delivered by an external collaborator, together with its outgoing relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentInput {
    /// Unique identifier.
    pub id: String,
    /// Opaque payload.
    #[serde(default)]
    pub content: String,
    /// Ids of the arguments this argument attacks.
    #[serde(default)]
    pub attacks: Vec<String>,
    /// Ids of the arguments this argument supports (informational only).
    #[serde(default)]
    pub supports: Vec<String>,
    /// Optional key-value annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ArgumentInput {
    /// Creates an input without content or relations.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            content: String::new(),
            attacks: Vec::new(),
            supports: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds attacks on the given ids.
    pub fn attacking(mut self, targets: &[&str]) -> Self {
        self.attacks
            .extend(targets.iter().map(|target| target.to_string()));
        self
    }

    /// Adds supports of the given ids.
    pub fn supporting(mut self, targets: &[&str]) -> Self {
        self.supports
            .extend(targets.iter().map(|target| target.to_string()));
        self
    }

    /// Sets the content.
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }
}

/// Decides how the dense indices are assigned to the argument ids.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentOrder {
    /// Keep the order in which the arguments were given.
    #[default]
    Input,
    /// Sort the ids in a lexicographic manner.
    Lexicographic,
    /// Sort the ids in a natural alphanumeric manner (`a2` before `a10`).
    Alphanumeric,
}

impl ArgumentOrder {
    pub(crate) fn sort(self, ids: &mut [String]) {
        match self {
            ArgumentOrder::Input => {}
            ArgumentOrder::Lexicographic => {
                ids.sort_by(|lhs, rhs| lexical_sort::lexical_cmp(lhs, rhs).then(lhs.cmp(rhs)))
            }
            ArgumentOrder::Alphanumeric => ids.sort_by(|lhs, rhs| {
                lexical_sort::natural_lexical_cmp(lhs, rhs).then(lhs.cmp(rhs))
            }),
        }
    }
}

/// A container which acts as a dictionary as well as an ordering of arguments.
/// *names* is a list of argument ids and the sequence of the values is inducing the order of arguments.
/// *mapping* allows to search for an id and to receive the corresponding position in the id list (`names`).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IdContainer {
    names: Vec<String>,
    mapping: HashMap<String, usize>,
}

impl IdContainer {
    pub(crate) fn from_names(names: Vec<String>) -> IdContainer {
        let mapping = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        IdContainer { names, mapping }
    }

    /// Get the [Arg] which corresponds to the given id.
    /// Returns [None] if no matching value is found.
    pub fn arg(&self, id: &str) -> Option<Arg> {
        self.mapping.get(id).map(|val| Arg(*val))
    }

    /// Get the id which corresponds to the given [Arg].
    /// Returns [None] if no matching value is found.
    pub fn id(&self, arg: Arg) -> Option<&str> {
        self.names.get(arg.value()).map(String::as_str)
    }

    /// Number of known ids.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns [true] if no id is known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All ids in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Translates a set of arguments to their ids, in index order.
    pub fn ids_of(&self, set: &ArgSet) -> Vec<String> {
        set.iter()
            .filter_map(|idx| self.id(Arg::from(idx)).map(str::to_string))
            .collect()
    }

    /// Creates a [PrintableSet] for output purposes.
    pub fn print_set<'a>(&'a self, set: &'a ArgSet) -> PrintableSet<'a> {
        PrintableSet {
            set,
            ordering: self,
        }
    }

    /// Creates a [PrintableLabelling] for output purposes.
    pub fn print_labelling<'a>(&'a self, labels: &'a [Label]) -> PrintableLabelling<'a> {
        PrintableLabelling {
            labels,
            ordering: self,
        }
    }
}

/// A struct to print a set of arguments as `[a, b, c]`.
#[derive(Debug)]
pub struct PrintableSet<'a> {
    set: &'a ArgSet,
    ordering: &'a IdContainer,
}

impl Display for PrintableSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.ordering.ids_of(self.set).join(", "))
    }
}

/// A struct to print a labelling as `I(a) O(b) U(c)`.
#[derive(Debug)]
pub struct PrintableLabelling<'a> {
    labels: &'a [Label],
    ordering: &'a IdContainer,
}

impl Display for PrintableLabelling<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (pos, label) in self.labels.iter().enumerate() {
            let prefix = match label {
                Label::In => "I",
                Label::Out => "O",
                Label::Undec => "U",
            };
            write!(
                f,
                "{}({}) ",
                prefix,
                self.ordering.id(Arg(pos)).unwrap_or("?")
            )?;
        }
        writeln!(f)
    }
}
