/*!
This binary computes the extensions of `Abstract Argumentation Frameworks (AF)` under the grounded, complete, preferred, stable, and semi-stable semantics.

# Abstract Argumentation Frameworks
An `abstract argumentation framework` consists of arguments and attacks between them. An extension is a set of arguments which can be accepted together; each semantics defines which sets qualify.
The acceptance status of every argument is derived from the extensions, either skeptically (in every extension) or credulously (in some extension).

The search for all but the grounded extension is bounded by a node budget and a deadline. If a bound is hit, the grounded extension and the already certain extensions are reported, and the result is marked as partial.

# Usage
```plain
Usage: af-semantics [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Input filename

Options:
      --format <FORMAT>          Input format (apx, iccma, json); guessed from the file extension if omitted
      --rust_log <RUST_LOG>      Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use [env: RUST_LOG=]
  -v...                          Sets log verbosity (multiple times means more verbose)
  -q                             Sets log verbosity to only errors
      --lx                       Sorts arguments in a lexicographic manner
      --an                       Sorts arguments in an alphanumeric manner
      --grd                      Compute the grounded extension
      --com                      Compute the complete extensions
      --prf                      Compute the preferred extensions
      --stb                      Compute the stable extensions
      --sst                      Compute the semi-stable extensions
      --policy <POLICY>          Acceptance policy for the status output (skeptical, credulous)
      --heu <HEU>                Choose the branching heuristic of the search [possible values: Simple, MaxDegree, MinAttackers]
      --max-nodes <MAX_NODES>    Maximal number of search node expansions [env: AF_MAX_NODES=]
      --timeout-ms <TIMEOUT_MS>  Maximal computation time in milliseconds [env: AF_TIMEOUT_MS=]
      --threads <THREADS>        Number of search worker threads [env: AF_THREADS=] [default: 1]
      --unlimited                Disables the node budget and the deadline
      --json                     Print the result as JSON response
      --stream                   Print extensions as soon as they are found
      --labelling                Print labellings instead of sets
  -h, --help                     Print help
  -V, --version                  Print version
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

use std::{error::Error, path::PathBuf, process::ExitCode, str::FromStr};

use af_semantics::{
    config::Budget,
    datatypes::{ArgumentOrder, Extension, Policy, Semantics},
    extensions::{ExtensionComputer, Outcome},
    graph::ArgumentGraph,
    labelling::heuristics::Heuristic,
    parser::{AfParser, Format},
    request::{AnalysisRequest, AnalysisResponse},
    status::StatusAssigner,
};
use clap::{
    builder::{PossibleValuesParser, TypedValueParser},
    ArgAction, Parser,
};
use crossbeam_channel::unbounded;
use strum::VariantNames;

#[derive(Parser, Debug)]
#[command(name = "af-semantics", author, version, about)]
struct App {
    /// Input filename
    input: PathBuf,
    /// Input format (apx, iccma, json); guessed from the file extension if omitted
    #[arg(long)]
    format: Option<Format>,
    /// Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use
    #[arg(long = "rust_log", env)]
    rust_log: Option<String>,
    /// Sets log verbosity (multiple times means more verbose)
    #[arg(short, action = ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Sets log verbosity to only errors
    #[arg(short, group = "verbosity")]
    quiet: bool,
    /// Sorts arguments in a lexicographic manner
    #[arg(long = "lx", group = "sorting")]
    sort_lex: bool,
    /// Sorts arguments in an alphanumeric manner
    #[arg(long = "an", group = "sorting")]
    sort_alphan: bool,
    /// Compute the grounded extension
    #[arg(long = "grd")]
    grounded: bool,
    /// Compute the complete extensions
    #[arg(long = "com")]
    complete: bool,
    /// Compute the preferred extensions
    #[arg(long = "prf")]
    preferred: bool,
    /// Compute the stable extensions
    #[arg(long = "stb")]
    stable: bool,
    /// Compute the semi-stable extensions
    #[arg(long = "sst")]
    semi_stable: bool,
    /// Acceptance policy for the status output (skeptical, credulous)
    #[arg(long)]
    policy: Option<Policy>,
    /// Choose the branching heuristic of the search
    #[arg(long, value_parser = heuristic_parser())]
    heu: Option<Heuristic<'static>>,
    /// Maximal number of search node expansions
    #[arg(long, env = "AF_MAX_NODES")]
    max_nodes: Option<u64>,
    /// Maximal computation time in milliseconds
    #[arg(long = "timeout-ms", env = "AF_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    /// Number of search worker threads
    #[arg(long, env = "AF_THREADS", default_value_t = 1)]
    threads: usize,
    /// Disables the node budget and the deadline
    #[arg(long)]
    unlimited: bool,
    /// Print the result as JSON response
    #[arg(long)]
    json: bool,
    /// Print extensions as soon as they are found
    #[arg(long)]
    stream: bool,
    /// Print labellings instead of sets
    #[arg(long)]
    labelling: bool,
}

impl App {
    fn init_logging(&self) {
        let filter_level = match self.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            3.. => log::LevelFilter::Trace,
            _ => {
                if self.quiet {
                    log::LevelFilter::Error
                } else if let Some(rust_log) = self.rust_log.clone() {
                    match rust_log.as_str() {
                        "error" => log::LevelFilter::Error,
                        "info" => log::LevelFilter::Info,
                        "debug" => log::LevelFilter::Debug,
                        "trace" => log::LevelFilter::Trace,
                        _ => log::LevelFilter::Warn,
                    }
                } else {
                    log::LevelFilter::Warn
                }
            }
        };
        env_logger::builder().filter_level(filter_level).init();
        log::info!("Version: {}", clap::crate_version!());
    }

    fn order(&self) -> ArgumentOrder {
        if self.sort_lex {
            ArgumentOrder::Lexicographic
        } else if self.sort_alphan {
            ArgumentOrder::Alphanumeric
        } else {
            ArgumentOrder::Input
        }
    }

    fn flagged_semantics(&self) -> Vec<Semantics> {
        [
            (self.grounded, Semantics::Grounded),
            (self.complete, Semantics::Complete),
            (self.preferred, Semantics::Preferred),
            (self.stable, Semantics::Stable),
            (self.semi_stable, Semantics::SemiStable),
        ]
        .into_iter()
        .filter_map(|(flag, semantics)| flag.then_some(semantics))
        .collect()
    }

    /// Command line limits override the limits of a JSON request, which override the defaults.
    fn budget(&self, requested: Option<Budget>) -> Budget {
        let mut budget = requested.unwrap_or_default();
        if self.unlimited {
            budget.max_nodes = None;
            budget.max_millis = None;
        }
        if let Some(max_nodes) = self.max_nodes {
            budget = budget.with_max_nodes(max_nodes);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            budget = budget.with_max_millis(timeout_ms);
        }
        if self.threads > 1 {
            budget = budget.with_threads(self.threads);
        }
        budget
    }

    fn run(&self) -> Result<(), Box<dyn Error>> {
        let input = std::fs::read_to_string(&self.input)
            .map_err(|e| format!("cannot read {}: {}", self.input.to_string_lossy(), e))?;
        let format = self
            .format
            .or_else(|| Format::from_path(&self.input))
            .unwrap_or(Format::Apx);
        log::debug!("reading {} as {:?}", self.input.to_string_lossy(), format);

        let mut semantics = self.flagged_semantics();
        let (graph, policy, budget) = if format == Format::Json {
            let request: AnalysisRequest = serde_json::from_str(&input)?;
            if semantics.is_empty() {
                semantics.push(request.semantics()?);
            }
            let policy = match self.policy {
                Some(policy) => policy,
                None => request.policy()?,
            };
            let graph = ArgumentGraph::build_ordered(request.arguments, self.order())?;
            (graph, policy, self.budget(request.budget))
        } else {
            let builder = AfParser::with_order(self.order()).parse(&input, format)?;
            log::info!("[Done] parsing");
            if semantics.is_empty() {
                semantics.push(Semantics::Grounded);
            }
            (builder.build()?, self.policy.unwrap_or_default(), self.budget(None))
        };
        log::info!(
            "{} arguments, {} attacks, budget {:?}",
            graph.len(),
            graph.attack_count(),
            budget
        );

        let computer = ExtensionComputer::new(&graph)
            .with_budget(budget)
            .with_heuristic(self.heu.unwrap_or_default());
        for semantics in semantics {
            let outcome = if self.stream && !self.json {
                self.stream_extensions(&graph, &computer, semantics)?
            } else {
                computer.compute(semantics)?
            };
            if let Some(exhaustion) = &outcome.exhaustion {
                log::warn!("{}", exhaustion);
            }
            if self.json {
                let response = AnalysisResponse::new(&graph, &outcome, policy);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                if !self.stream {
                    for extension in outcome.extensions.iter() {
                        self.print_extension(&graph, extension);
                    }
                }
                self.print_status(&graph, &outcome, policy);
            }
        }
        Ok(())
    }

    fn stream_extensions(
        &self,
        graph: &ArgumentGraph,
        computer: &ExtensionComputer<'_>,
        semantics: Semantics,
    ) -> Result<Outcome, Box<dyn Error>> {
        let (s, r) = unbounded();
        let outcome = std::thread::scope(|scope| {
            scope.spawn(|| {
                for extension in r.iter() {
                    self.print_extension(graph, &extension);
                }
            });
            computer.enumerate_channel(semantics, s)
        })?;
        Ok(outcome)
    }

    fn print_extension(&self, graph: &ArgumentGraph, extension: &Extension) {
        if self.labelling {
            let labelling = graph.conflicts().labelling_of(&extension.arguments);
            print!(
                "{}",
                graph.ordering().print_labelling(labelling.labels())
            );
        } else {
            println!("{}", graph.ordering().print_set(&extension.arguments));
        }
    }

    fn print_status(&self, graph: &ArgumentGraph, outcome: &Outcome, policy: Policy) {
        let status = StatusAssigner::assign(graph, &outcome.extensions, policy);
        for (id, status) in status.iter() {
            println!("{}: {}", id, status);
        }
    }
}

/// Offers every named [Heuristic]; a `Custom` one cannot be given on the command line.
fn heuristic_parser() -> impl TypedValueParser<Value = Heuristic<'static>> {
    PossibleValuesParser::new(
        Heuristic::VARIANTS
            .iter()
            .copied()
            .filter(|name| *name != "Custom"),
    )
    .map(|name| Heuristic::from_str(&name).unwrap_or_default())
}

fn main() -> ExitCode {
    let app = App::parse();
    app.init_logging();
    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
