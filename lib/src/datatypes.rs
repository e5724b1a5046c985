//! A collection of all the datatypes used by the engine.
//! This module consists of all internally and externally used datatypes, such as
//! [Arg], [Label], [Labelling], [Extension], and [Semantics].
pub mod argument;
pub mod labelling;

pub use argument::{Arg, Argument, ArgumentInput, ArgumentOrder, IdContainer};
pub use labelling::{Extension, Label, Labelling, Policy, Semantics, Status};

/// A set of arguments, given by their dense [indices][Arg].
pub type ArgSet = roaring::RoaringBitmap;

/// Converts an [Arg] into the key type of an [ArgSet].
pub(crate) fn key(arg: Arg) -> u32 {
    arg.value()
        .try_into()
        .expect("argument sets are based on the assumption that only u32::MAX-many arguments are in place")
}
