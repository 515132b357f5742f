use rustc_hash::FxHashSet;

use crate::sorts::Event;

/// Returns all overlapping pairs (idx, idx2) between intervals of the first
/// and second collection, using a line-sweep / active-set approach.
///
/// Algorithm steps:
///   1. The caller builds events (start & end) for each interval in both
///      sets, sorted by (group, pos) with end events first on ties.
///   2. Maintain active sets, one per collection, cleared whenever the
///      sweep crosses into a new (chromosome, strand) group.
///   3. For a start event in the first set, record an overlap with all
///      active intervals in the second set, then insert into the first
///      active set. Symmetrically for the second set.
///   4. Return the cross-set overlaps as two parallel identifier vectors,
///      in emission order.
///
/// Only intervals sharing a group code can be active together, so pairs on
/// different chromosomes or strands are never produced. Emission order is
/// deterministic for a fixed input: the hash sets have no randomized state.
pub fn sweep_line_overlaps(events: Vec<Event>) -> (Vec<usize>, Vec<usize>) {
    let mut overlaps = Vec::new();
    let mut overlaps2 = Vec::new();

    if events.is_empty() {
        return (overlaps, overlaps2);
    }

    let mut active1: FxHashSet<usize> = FxHashSet::default();
    let mut active2: FxHashSet<usize> = FxHashSet::default();

    let mut current_group: i64 = events[0].group;

    for e in events {
        if e.group != current_group {
            active1.clear();
            active2.clear();
            current_group = e.group;
        }

        if e.is_start {
            if e.first_set {
                for &idx2 in active2.iter() {
                    overlaps.push(e.idx);
                    overlaps2.push(idx2);
                }
                active1.insert(e.idx);
            } else {
                for &idx1 in active1.iter() {
                    overlaps.push(idx1);
                    overlaps2.push(e.idx);
                }
                active2.insert(e.idx);
            }
        } else if e.first_set {
            active1.remove(&e.idx);
        } else {
            active2.remove(&e.idx);
        }
    }

    (overlaps, overlaps2)
}
