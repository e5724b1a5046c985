//! Backtracking search over three-valued partial labellings.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, OnceLock, RwLock,
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::{heuristics::Heuristic, Goal, SearchReport};
use crate::{
    config::Budget,
    datatypes::{key, Arg, ArgSet, Label, Labelling},
    error::{Exhaustion, InternalInvariantViolation},
    graph::ArgumentGraph,
};

/// A cooperative cancellation flag, which can be cloned and handed to another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Requests every search using this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns [true] if [cancel][CancellationToken::cancel] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A partial labelling, which stores for each argument whether it can still be labelled IN, OUT, or UNDEC.
///
/// An argument is *fixed* if exactly one label is left, and *open* if at least two labels are left.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialLabelling {
    can_in: ArgSet,
    can_out: ArgSet,
    can_undec: ArgSet,
}

impl PartialLabelling {
    /// The root of the search: the grounded IN and OUT arguments are fixed, everything else is open.
    pub(crate) fn from_grounded(
        graph: &ArgumentGraph,
        in_set: &ArgSet,
        out_set: &ArgSet,
        goal: Goal,
    ) -> Self {
        let open = graph.universe() - &(in_set | out_set);
        Self {
            can_in: in_set | &open,
            can_out: out_set | &open,
            can_undec: if goal == Goal::NoUndec {
                ArgSet::new()
            } else {
                open
            },
        }
    }

    fn domain(&self, label: Label) -> &ArgSet {
        match label {
            Label::In => &self.can_in,
            Label::Out => &self.can_out,
            Label::Undec => &self.can_undec,
        }
    }

    fn domain_mut(&mut self, label: Label) -> &mut ArgSet {
        match label {
            Label::In => &mut self.can_in,
            Label::Out => &mut self.can_out,
            Label::Undec => &mut self.can_undec,
        }
    }

    /// Returns [true] if `arg` may still receive `label`.
    pub fn can_be(&self, arg: Arg, label: Label) -> bool {
        self.domain(label).contains(key(arg))
    }

    fn triple(&self, idx: u32) -> (bool, bool, bool) {
        (
            self.can_in.contains(idx),
            self.can_out.contains(idx),
            self.can_undec.contains(idx),
        )
    }

    /// The label of `arg`, if it is fixed.
    pub fn fixed(&self, arg: Arg) -> Option<Label> {
        match self.triple(key(arg)) {
            (true, false, false) => Some(Label::In),
            (false, true, false) => Some(Label::Out),
            (false, false, true) => Some(Label::Undec),
            _ => None,
        }
    }

    /// All arguments which still have a choice between at least two labels.
    pub fn open(&self) -> ArgSet {
        (&self.can_in & &self.can_out)
            | (&self.can_in & &self.can_undec)
            | (&self.can_out & &self.can_undec)
    }

    /// All arguments which may be IN in some completion; an upper bound of every reachable extension.
    pub fn possibly_in(&self) -> &ArgSet {
        &self.can_in
    }

    /// All arguments which may be decided (IN or OUT) in some completion.
    pub fn possibly_decided(&self) -> ArgSet {
        &self.can_in | &self.can_out
    }

    /// The first label (in the order IN, OUT, UNDEC) which `arg` may still receive.
    fn first_label(&self, arg: Arg) -> Option<Label> {
        [Label::In, Label::Out, Label::Undec]
            .into_iter()
            .find(|label| self.can_be(arg, *label))
    }

    fn remove(&mut self, idx: u32, label: Label) -> bool {
        self.domain_mut(label).remove(idx)
    }

    fn restrict(&mut self, idx: u32, label: Label) -> bool {
        let mut changed = false;
        for other in [Label::In, Label::Out, Label::Undec] {
            if other != label {
                changed |= self.remove(idx, other);
            }
        }
        changed
    }

    /// Converts a fully fixed partial labelling into a [Labelling].
    fn to_labelling(&self, len: usize) -> Option<Labelling> {
        if !self.open().is_empty() {
            return None;
        }
        let labelling = Labelling::from_sets(len, &self.can_in, &self.can_out);
        let covered = &(&self.can_in | &self.can_out) | &self.can_undec;
        (covered.len() == len as u64).then_some(labelling)
    }

    /// Propagates the complete-labelling conditions until nothing changes.
    /// Returns [false] if some argument has no label left.
    ///
    /// Forwards, an argument can only be IN if all attackers can be OUT, only be OUT if some attacker can be IN, and only be UNDEC
    /// if some attacker can be UNDEC while none is fixed to IN.
    /// Backwards, a fixed IN argument forces its attackers OUT, a fixed OUT argument with a single possible IN attacker forces it IN,
    /// and a fixed UNDEC argument excludes IN from its attackers (forcing UNDEC if only one attacker can be UNDEC).
    pub(crate) fn propagate(&mut self, graph: &ArgumentGraph, mut dirty: ArgSet) -> bool {
        while let Some(idx) = dirty.min() {
            dirty.remove(idx);
            let arg = Arg::from(idx);
            let attackers = graph.attackers_of(arg);

            let mut all_can_out = true;
            let mut in_candidates = Vec::new();
            let mut undec_candidates = Vec::new();
            let mut some_fixed_in = false;
            for att in attackers.iter() {
                let (can_in, can_out, can_undec) = self.triple(att);
                all_can_out &= can_out;
                if can_in {
                    in_candidates.push(att);
                    some_fixed_in |= !can_out && !can_undec;
                }
                if can_undec {
                    undec_candidates.push(att);
                }
            }

            let mut changed = false;
            if !all_can_out {
                changed |= self.remove(idx, Label::In);
            }
            if in_candidates.is_empty() {
                changed |= self.remove(idx, Label::Out);
            }
            if undec_candidates.is_empty() || some_fixed_in {
                changed |= self.remove(idx, Label::Undec);
            }

            let mut touched = Vec::new();
            match self.triple(idx) {
                (false, false, false) => {
                    log::trace!("no label left for {}", arg);
                    return false;
                }
                (true, false, false) => {
                    for att in attackers.iter() {
                        if self.restrict(att, Label::Out) {
                            touched.push(att);
                        }
                    }
                }
                (false, true, false) => {
                    if let [single] = in_candidates.as_slice() {
                        if self.restrict(*single, Label::In) {
                            touched.push(*single);
                        }
                    }
                }
                (false, false, true) => {
                    for att in attackers.iter() {
                        if self.remove(att, Label::In) {
                            touched.push(att);
                        }
                    }
                    if let [single] = undec_candidates.as_slice() {
                        if self.restrict(*single, Label::Undec) {
                            touched.push(*single);
                        }
                    }
                }
                _ => {}
            }

            if changed {
                touched.push(idx);
            }
            for other in touched {
                dirty.insert(other);
                dirty |= graph.targets_of(Arg::from(other));
            }
        }
        true
    }
}

/// A read-mostly snapshot of the extensions found so far, used for pruning only.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: usize,
    sets: Arc<Vec<ArgSet>>,
}

/// The shared "best found so far" structure.
///
/// Insertion swaps in a new [Arc] and bumps the version; readers only take the lock when the version moved.
/// A stale or missing snapshot only weakens the pruning.
#[derive(Debug, Default)]
struct Incumbents {
    version: AtomicUsize,
    found: RwLock<Arc<Vec<ArgSet>>>,
    best_range: AtomicU64,
}

impl Incumbents {
    fn refresh(&self, snapshot: &mut Snapshot) {
        let version = self.version.load(Ordering::Acquire);
        if version != snapshot.version {
            if let Ok(guard) = self.found.read() {
                snapshot.sets = Arc::clone(&guard);
                snapshot.version = version;
            }
        }
    }

    fn insert(&self, set: &ArgSet) {
        if let Ok(mut guard) = self.found.write() {
            let mut sets: Vec<ArgSet> = guard
                .iter()
                .filter(|known| !known.is_subset(set))
                .cloned()
                .collect();
            sets.push(set.clone());
            *guard = Arc::new(sets);
            self.version.fetch_add(1, Ordering::Release);
        }
    }
}

#[derive(Debug)]
pub(crate) struct Search<'a> {
    graph: &'a ArgumentGraph,
    goal: Goal,
    heuristic: Heuristic<'a>,
    max_nodes: Option<u64>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
    share: bool,
    nodes: AtomicU64,
    found: AtomicUsize,
    pending: AtomicUsize,
    unexplored: AtomicUsize,
    stopped: OnceLock<Exhaustion>,
    incumbents: Incumbents,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        graph: &'a ArgumentGraph,
        goal: Goal,
        budget: &Budget,
        heuristic: Heuristic<'a>,
        cancel: &CancellationToken,
    ) -> Self {
        Self {
            graph,
            goal,
            heuristic,
            max_nodes: budget.max_nodes,
            deadline: budget.deadline(Instant::now()),
            cancel: cancel.clone(),
            share: budget.workers() > 1,
            nodes: AtomicU64::new(0),
            found: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
            unexplored: AtomicUsize::new(0),
            stopped: OnceLock::new(),
            incumbents: Incumbents::default(),
        }
    }

    /// Explores the search space below `root` with `threads` workers (the calling thread being one of them).
    pub(crate) fn run(
        self,
        mut root: PartialLabelling,
        threads: usize,
        sender: Sender<ArgSet>,
    ) -> Result<SearchReport, InternalInvariantViolation> {
        let (jobs_s, jobs_r) = crossbeam_channel::unbounded();
        if root.propagate(self.graph, self.graph.universe().clone()) {
            self.pending.store(1, Ordering::SeqCst);
            // the receiver is alive, so the send cannot fail
            let _ = jobs_s.send(root);
        } else {
            log::debug!("root of the search is inconsistent");
        }

        let workers = threads.max(1);
        let result = if workers == 1 {
            self.worker(&jobs_r, &jobs_s, &sender)
        } else {
            log::debug!("starting {} search workers", workers);
            std::thread::scope(|scope| {
                let handles: Vec<_> = (1..workers)
                    .map(|_| scope.spawn(|| self.worker(&jobs_r, &jobs_s, &sender)))
                    .collect();
                let own = self.worker(&jobs_r, &jobs_s, &sender);
                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(InternalInvariantViolation(
                                "search worker panicked".to_string(),
                            ))
                        })
                    })
                    .fold(own, |acc, res| acc.and(res))
            })
        };
        result?;

        let unexplored = self.unexplored.load(Ordering::SeqCst) + jobs_r.len();
        Ok(SearchReport {
            nodes: self.nodes.load(Ordering::SeqCst),
            found: self.found.load(Ordering::SeqCst),
            unexplored,
            exhaustion: self.stopped.get().copied(),
        })
    }

    fn worker(
        &self,
        jobs: &Receiver<PartialLabelling>,
        queue: &Sender<PartialLabelling>,
        sender: &Sender<ArgSet>,
    ) -> Result<(), InternalInvariantViolation> {
        let mut snapshot = Snapshot::default();
        loop {
            if self.pending.load(Ordering::SeqCst) == 0 || self.exhausted() {
                return Ok(());
            }
            match jobs.recv_timeout(Duration::from_millis(1)) {
                Ok(job) => {
                    let result = self.explore(job, queue, sender, &mut snapshot);
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                    result?;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    /// Checks cancellation, node budget, and deadline; the first reason to stop is kept.
    fn exhausted(&self) -> bool {
        if self.stopped.get().is_some() {
            return true;
        }
        let reason = if self.cancel.is_cancelled() {
            Some(Exhaustion::Cancelled)
        } else if self
            .max_nodes
            .is_some_and(|max| self.nodes.load(Ordering::Relaxed) >= max)
        {
            Some(Exhaustion::NodeBudget)
        } else if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            Some(Exhaustion::Deadline)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                let _ = self.stopped.set(reason);
                true
            }
            None => false,
        }
    }

    fn pruned(&self, state: &PartialLabelling, snapshot: &mut Snapshot) -> bool {
        match self.goal {
            Goal::Maximal => {
                self.incumbents.refresh(snapshot);
                snapshot
                    .sets
                    .iter()
                    .any(|known| state.possibly_in().is_subset(known))
            }
            Goal::MaxRange => {
                state.possibly_decided().len() < self.incumbents.best_range.load(Ordering::Relaxed)
            }
            Goal::All | Goal::NoUndec => false,
        }
    }

    fn choose(&self, state: &PartialLabelling) -> Option<Arg> {
        let choice = self.heuristic.get_heuristic()(self.graph, state);
        match choice {
            Some(arg) if arg.value() < self.graph.len() && super::heuristics::is_open(state, arg) => {
                Some(arg)
            }
            Some(arg) => {
                log::warn!("heuristic chose {}, which is not open, falling back", arg);
                super::heuristics::heu_simple(self.graph, state)
            }
            None => super::heuristics::heu_simple(self.graph, state),
        }
    }

    fn explore(
        &self,
        job: PartialLabelling,
        queue: &Sender<PartialLabelling>,
        sender: &Sender<ArgSet>,
        snapshot: &mut Snapshot,
    ) -> Result<(), InternalInvariantViolation> {
        let mut stack = vec![job];
        while let Some(state) = stack.pop() {
            if self.exhausted() {
                self.unexplored
                    .fetch_add(stack.len() + 1, Ordering::SeqCst);
                return Ok(());
            }
            self.nodes.fetch_add(1, Ordering::Relaxed);
            if self.pruned(&state, snapshot) {
                log::trace!("pruned branch");
                continue;
            }
            match self.choose(&state) {
                None => self.leaf(&state, sender)?,
                Some(arg) => {
                    let idx = key(arg);
                    let label = state.first_label(arg).ok_or_else(|| {
                        InternalInvariantViolation(format!("{} has no label left", arg))
                    })?;
                    log::trace!("branching on {} with {:?}", arg, label);
                    let mut fixed = state.clone();
                    fixed.restrict(idx, label);
                    let mut removed = state;
                    removed.remove(idx, label);
                    let mut dirty = self.graph.targets_of(arg).clone();
                    dirty.insert(idx);
                    for mut child in [removed, fixed] {
                        if child.propagate(self.graph, dirty.clone()) {
                            if self.exhausted() {
                                self.unexplored.fetch_add(1, Ordering::SeqCst);
                            } else {
                                stack.push(child);
                            }
                        }
                    }
                    if self.share && stack.len() > 1 && queue.is_empty() {
                        let donated = stack.remove(0);
                        self.pending.fetch_add(1, Ordering::SeqCst);
                        if let Err(returned) = queue.send(donated) {
                            self.pending.fetch_sub(1, Ordering::SeqCst);
                            stack.insert(0, returned.into_inner());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(
        &self,
        state: &PartialLabelling,
        sender: &Sender<ArgSet>,
    ) -> Result<(), InternalInvariantViolation> {
        let labelling = state.to_labelling(self.graph.len()).ok_or_else(|| {
            InternalInvariantViolation("search leaf is not a total labelling".to_string())
        })?;
        if !labelling.is_complete_labelling(self.graph) {
            return Err(InternalInvariantViolation(format!(
                "search leaf is not a complete labelling: {}",
                self.graph
                    .ordering()
                    .print_labelling(labelling.labels())
                    .to_string()
                    .trim_end()
            )));
        }
        let in_set = labelling.in_set();
        match self.goal {
            Goal::Maximal => self.incumbents.insert(&in_set),
            Goal::MaxRange => {
                let range = self.graph.len() as u64 - labelling.undec_set().len();
                self.incumbents
                    .best_range
                    .fetch_max(range, Ordering::Relaxed);
            }
            Goal::All | Goal::NoUndec => {}
        }
        log::debug!(
            "found {}",
            self.graph.ordering().print_set(&in_set)
        );
        self.found.fetch_add(1, Ordering::SeqCst);
        if sender.send(in_set).is_err() {
            log::debug!("receiver of the results is gone, stopping");
            let _ = self.stopped.set(Exhaustion::Cancelled);
        }
        Ok(())
    }
}
