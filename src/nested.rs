use std::time::Instant;

use log::debug;
use rustc_hash::FxHashMap;

use crate::intervals::{ContainmentResult, GenomicInterval, IntervalCollection, InvalidInterval};
use crate::overlaps::sweep_line_overlaps;
use crate::sorts::{build_sorted_events, encode_groups};

/// Whether containment keeps intervals that share a boundary with the
/// outer interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// The inner interval must lie strictly inside:
    /// `i.start > o.start && i.end < o.end`.
    Strict,
    /// Boundary-sharing inner intervals are kept:
    /// `i.start >= o.start && i.end <= o.end`.
    Inclusive,
}

impl BoundaryPolicy {
    #[inline]
    fn keeps<A, B>(&self, outer: &GenomicInterval<A>, inner: &GenomicInterval<B>) -> bool {
        match self {
            BoundaryPolicy::Strict => inner.start > outer.start && inner.end < outer.end,
            BoundaryPolicy::Inclusive => inner.start >= outer.start && inner.end <= outer.end,
        }
    }
}

/// Find, for every interval of `outer`, the intervals of `inner` strictly
/// nested inside it.
///
/// An inner interval is nested inside an outer one iff both lie on the same
/// chromosome and strand, `inner.start > outer.start`, and
/// `inner.end < outer.end` — sharing a boundary does not count. The result
/// is parallel to `outer`: entry `k` answers for the outer interval with
/// identifier `k`. `outer` and `inner` may be the same collection; an
/// interval is never reported as nested inside itself.
///
/// Fails whole-operation with [`InvalidInterval`] if any input interval has
/// `end <= start`; no partial results are produced.
pub fn find_nested<A, B>(
    outer: &IntervalCollection<A>,
    inner: &IntervalCollection<B>,
) -> Result<Vec<ContainmentResult>, InvalidInterval> {
    find_contained(outer, inner, BoundaryPolicy::Strict)
}

/// Containment query parameterized by boundary strictness.
///
/// Two phases:
///   1. Candidate generation: sort both collections into one event list
///      and sweep it, collecting every same-chromosome, same-strand
///      overlapping pair. This is a superset of the final answer.
///   2. Containment filter: per outer interval, keep the candidates the
///      boundary policy accepts. Outer intervals without candidates skip
///      the filter entirely.
pub fn find_contained<A, B>(
    outer: &IntervalCollection<A>,
    inner: &IntervalCollection<B>,
    policy: BoundaryPolicy,
) -> Result<Vec<ContainmentResult>, InvalidInterval> {
    outer.validate()?;
    inner.validate()?;

    let phase = Instant::now();
    let (groups, groups2) = encode_groups(outer, inner);
    let events = build_sorted_events(outer, &groups, inner, &groups2);
    let (outer_idxs, inner_idxs) = sweep_line_overlaps(events);
    debug!(
        "candidate generation: {} pairs in {:?}",
        outer_idxs.len(),
        phase.elapsed()
    );

    // Bucket candidate inner identifiers per outer identifier, keeping the
    // sweep's emission order.
    let mut candidates: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for (&o, &i) in outer_idxs.iter().zip(inner_idxs.iter()) {
        candidates.entry(o).or_default().push(i);
    }

    let phase = Instant::now();
    let inner_records = inner.records();
    let mut results = Vec::with_capacity(outer.len());
    for (idx, record) in outer.iter() {
        let result = match candidates.get(&idx) {
            None => ContainmentResult::default(),
            Some(idxs) => {
                let nested: Vec<usize> = idxs
                    .iter()
                    .copied()
                    .filter(|&i| policy.keeps(record, &inner_records[i]))
                    .collect();
                ContainmentResult {
                    has_nested: !nested.is_empty(),
                    nested_identifiers: nested,
                }
            }
        };
        results.push(result);
    }
    debug!("containment filter: {:?}", phase.elapsed());

    Ok(results)
}
