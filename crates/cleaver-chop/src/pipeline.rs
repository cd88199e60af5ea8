//! The chopping pipeline: route, cut, merge, check, reconstruct.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use cleaver_ir::ast::Program;

use crate::cut::{smallest_cut_acyclic, smallest_cut_cyclic};
use crate::error::ChopError;
use crate::graph::{GraphIndex, Selector};
use crate::merge::merge_programs;
use crate::penalty::{contravariant_lift, contravariant_sum_lift, DefaultPenalty, Penalty};
use crate::reconstruct::reconstruct;
use crate::scc::condense;
use crate::vertex::Vertex;

/// Selections of at most this many nodes skip condensation: the SCC setup
/// cost dominates on tiny selections, and the cyclic cut needs no acyclicity.
const SCC_SKIP_THRESHOLD: usize = 2;

/// Size facts and phase timings of one chop call.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    /// Sub-program count before merging: one per root obligation.
    pub max_number_of_parts: usize,
    /// Time spent condensing; absent when the small-selection route ran.
    pub time_scc: Option<Duration>,
    pub time_cutting: Duration,
    pub time_merging: Duration,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max parts: {}", self.max_number_of_parts)?;
        if let Some(t) = self.time_scc {
            write!(f, ", scc: {:.2}s", t.as_secs_f64())?;
        }
        write!(
            f,
            ", cutting: {:.2}s, merging: {:.2}s",
            self.time_cutting.as_secs_f64(),
            self.time_merging.as_secs_f64()
        )
    }
}

/// The chopped sub-programs, each closed under the dependency relation, plus
/// the metrics of the run.
#[derive(Debug)]
pub struct ChopResult {
    pub programs: Vec<Program>,
    pub metrics: Metrics,
}

/// Chop with the default member selection and penalty.
pub fn chop_with_defaults(
    program: &Program,
    bound: Option<usize>,
) -> Result<ChopResult, ChopError> {
    chop(program, None, bound, &DefaultPenalty::default())
}

/// Partition `program` into at most `bound` self-contained sub-programs
/// (`None` for the minimal, unbounded partitioning).
///
/// Members matched by `isolate` (default: every method, function, and
/// predicate) are guaranteed to land in exactly one output part together
/// with everything they transitively require. Merges priced ≤ 0 by
/// `penalty` are always taken, so the output can undershoot the bound.
pub fn chop(
    program: &Program,
    isolate: Option<Selector<'_>>,
    bound: Option<usize>,
    penalty: &dyn Penalty<Vertex>,
) -> Result<ChopResult, ChopError> {
    if bound == Some(0) {
        return Err(ChopError::InvalidBound(0));
    }

    let index = GraphIndex::build(program, isolate)?;
    let n = index.len();

    let max_number_of_parts;
    let time_scc;
    let time_cutting;
    let time_merging;

    // Each surviving part as a sorted list of vertex ids.
    let parts: Vec<Vec<usize>> = if index.important.len() <= SCC_SKIP_THRESHOLD {
        let started = Instant::now();
        let cut = smallest_cut_cyclic(n, &index.important, &index.edges);
        time_cutting = started.elapsed();
        time_scc = None;
        max_number_of_parts = cut.len();

        let lifted = contravariant_lift(penalty, |&id: &usize| index.vertex(id).clone());
        let started = Instant::now();
        let merged = merge_and_check(cut, bound, &lifted, &index.important)?;
        time_merging = started.elapsed();
        merged
    } else {
        let started = Instant::now();
        let condensation = condense(n, &index.edges);
        time_scc = Some(started.elapsed());

        let starts: Vec<usize> = index
            .important
            .iter()
            .map(|&id| condensation.proxy_of(id))
            .collect();
        let started = Instant::now();
        let cut = smallest_cut_acyclic(n, &starts, &condensation.component_edges);
        time_cutting = started.elapsed();
        max_number_of_parts = cut.len();

        let lifted = contravariant_sum_lift(penalty, |&proxy: &usize| {
            condensation
                .component_at_proxy(proxy)
                .nodes
                .iter()
                .map(|&id| index.vertex(id).clone())
                .collect()
        });
        let started = Instant::now();
        let merged = merge_and_check(cut, bound, &lifted, &starts)?;
        time_merging = started.elapsed();

        merged
            .into_iter()
            .map(|part| {
                let mut ids = BTreeSet::new();
                for proxy in part {
                    ids.extend(
                        condensation
                            .component_at_proxy(proxy)
                            .nodes
                            .iter()
                            .copied(),
                    );
                }
                ids.into_iter().collect()
            })
            .collect()
    };

    let metrics = Metrics {
        max_number_of_parts,
        time_scc,
        time_cutting,
        time_merging,
    };
    info!("chopped into {} parts ({metrics})", parts.len());

    let mut programs = Vec::with_capacity(parts.len());
    for part in &parts {
        let selection: BTreeSet<Vertex> = part.iter().map(|&id| index.vertex(id).clone()).collect();
        programs.push(reconstruct(program, &selection)?);
    }

    Ok(ChopResult { programs, metrics })
}

/// Weight the cut, merge it under the bound, and verify the merger neither
/// lost an element nor dropped a selected one. The check is part of the
/// release build: a failure here is a bug, not an input problem.
fn merge_and_check<P: Penalty<usize>>(
    cut: Vec<Vec<usize>>,
    bound: Option<usize>,
    penalty: &P,
    selected: &[usize],
) -> Result<Vec<Vec<usize>>, ChopError> {
    let weighted: Vec<Vec<(usize, i64)>> = cut
        .iter()
        .map(|part| part.iter().map(|&e| (e, penalty.price(&e))).collect())
        .collect();
    let merged = merge_programs(weighted, bound, penalty);

    let covered: BTreeSet<usize> = merged
        .iter()
        .flat_map(|p| p.iter().map(|&(e, _)| e))
        .collect();
    for part in &cut {
        for &e in part {
            if !covered.contains(&e) {
                return Err(ChopError::Inconsistent(format!(
                    "node {e} was present before merging but reached no output part"
                )));
            }
        }
    }
    for &s in selected {
        if !covered.contains(&s) {
            return Err(ChopError::Inconsistent(format!(
                "selected node {s} reached no output part"
            )));
        }
    }

    Ok(merged
        .into_iter()
        .map(|p| p.into_iter().map(|(e, _)| e).collect())
        .collect())
}
