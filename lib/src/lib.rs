/*!
This library computes the standard semantics of `Abstract Argumentation Frameworks (AF)`, as introduced by Dung, on dense bitmap representations.

# Abstract Argumentation Frameworks
An `abstract argumentation framework` consists of arguments and an attack relation between them. The content of an argument is never interpreted; only the attacks decide which sets of arguments can be accepted together.
A set of arguments is *conflict-free* if no member attacks another member, and it *defends* an argument if it attacks every attacker of that argument.
An admissible set is conflict-free and defends all its members. Based on these notions the following extensions are computed:
- `grounded`: the least fixpoint of the characteristic function `F(S) = {a | S defends a}`
- `complete`: conflict-free sets with `F(S) = S`
- `preferred`: subset-maximal complete extensions
- `stable`: conflict-free sets which attack every argument outside of them
- `semi-stable`: complete extensions with a maximal number of decided arguments

Each extension corresponds to a labelling, which maps every argument to `IN`, `OUT`, or `UNDEC`.

## Noteworthy relations between semantics

- We know that there is always exactly one grounded extension, and it is a subset of every complete extension
- We know that there always exists at least one preferred extension (possibly the empty set)
- We know that there does not need to exist a stable extension (e.g. an odd attack cycle)
- We know that every stable extension is a preferred, semi-stable, and complete extension too

# Computation
The grounded extension is computed by a fixpoint iteration. All other semantics are computed by a backtracking search over three-valued
partial labellings (see [labelling]), which propagates the labelling conditions after every decision and may run on several worker threads.
The search is bounded by a [Budget][config::Budget]; if it is exhausted, a degraded but valid [Outcome][extensions::Outcome] is returned.

# Input-file format
Frameworks can be given as ASPARTIX facts, in the ICCMA format (see [parser]), or as JSON request (see [request]).
*/

/*!
## Example input file:
```prolog
arg(a).
arg(b).
arg(c).
arg(d).

att(a,b).
att(b,a).
att(b,c).
att(c,d).
```
*/

/*!
## Usage examples
First parse a given framework and build the graph.
```rust
use af_semantics::parser::AfParser;
use af_semantics::datatypes::Semantics;
use af_semantics::extensions::ExtensionComputer;
// use the above example as input
let input = "arg(a).arg(b).arg(c).arg(d).att(a,b).att(b,a).att(b,c).att(c,d).";
let graph = match AfParser::default().parse_apx(input) {
    Ok(builder) => builder.build().expect("all attacks reference declared arguments"),
    Err(e) => {
        log::error!("Error during parsing:\n{} \n\n cannot continue, panic!", e);
        panic!("Parsing failed, see log for further details")
    }
};
// compute and print the preferred extensions
let outcome = ExtensionComputer::new(&graph).compute(Semantics::Preferred).unwrap();
for extension in outcome.extensions.iter() {
    println!("{}", graph.ordering().print_set(&extension.arguments));
}
# assert_eq!(outcome.extensions.len(), 2);
```

### Acceptance of single arguments
```rust
# use af_semantics::parser::AfParser;
# use af_semantics::datatypes::{Policy, Semantics, Status};
# use af_semantics::extensions::ExtensionComputer;
use af_semantics::status::StatusAssigner;
# let input = "arg(a).arg(b).arg(c).arg(d).att(a,b).att(b,a).att(b,c).att(c,d).";
# let graph = AfParser::default().parse_apx(input).unwrap().build().unwrap();
let outcome = ExtensionComputer::new(&graph).compute(Semantics::Preferred).unwrap();
let status = StatusAssigner::assign(&graph, &outcome.extensions, Policy::Credulous);
assert_eq!(status["d"], Status::Accepted);
let status = StatusAssigner::assign(&graph, &outcome.extensions, Policy::Skeptical);
assert_eq!(status["d"], Status::Undecided);
```

### Using the search together with the [`crossbeam-channel`] implementation
This can be used to have a worker and a consumer thread to print the results as they are computed.
The enum [`Heuristic`][crate::labelling::heuristics::Heuristic] allows one to choose a pre-defined branching heuristic, or implement a `Custom` one.
```rust
use af_semantics::config::Budget;
use af_semantics::datatypes::{ArgumentInput, Semantics};
use af_semantics::extensions::ExtensionComputer;
use af_semantics::graph::ArgumentGraph;
use af_semantics::labelling::heuristics::Heuristic;
// create a channel
let (s, r) = crossbeam_channel::unbounded();
// spawn a solver thread
let solving = std::thread::spawn(move || {
    let graph = ArgumentGraph::build(vec![
        ArgumentInput::new("a").attacking(&["b"]),
        ArgumentInput::new("b").attacking(&["a"]),
        ArgumentInput::new("c"),
    ])
    .expect("valid graph");
    // compute complete extensions with two workers and the max-degree heuristic
    ExtensionComputer::new(&graph)
        .with_budget(Budget::default().with_threads(2))
        .with_heuristic(Heuristic::MaxDegree)
        .enumerate_channel(Semantics::Complete, s)
        .expect("no internal error");
});

// print results as they are computed
let mut count = 0;
while let Ok(result) = r.recv() {
    println!("complete extension: {:?}", result.indices());
    count += 1;
}
// waiting for the other thread to close
solving.join().unwrap();
# assert_eq!(count, 3);
```
*/
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod config;
pub mod conflict;
pub mod datatypes;
pub mod error;
pub mod extensions;
pub mod graph;
pub mod labelling;
pub mod parser;
pub mod request;
pub mod status;
