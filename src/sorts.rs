use radsort::sort_by_key;
use rustc_hash::FxHashMap;

use crate::intervals::{IntervalCollection, Strand};

/// An "event" in the sweep line:
/// - `group`: dense code for the interval's `(chromosome, strand)` pair
/// - `pos`: the coordinate (start or end of an interval)
/// - `is_start`: true if it's a start event, false if it's an end event
/// - `first_set`: which collection does this interval belong to?
/// - `idx`: the interval's identifier in its collection
#[derive(Debug, Clone)]
pub struct Event {
    pub group: i64,
    pub pos: i64,
    pub is_start: bool,
    pub first_set: bool,
    pub idx: usize,
}

/// Assign dense `i64` codes to the `(chromosome, strand)` pairs of both
/// collections, through one shared map so equal pairs get equal codes.
///
/// Intervals on different strands never share a code, which is what keeps
/// opposite-strand intervals apart in the sweep without any post-filtering.
pub fn encode_groups<'a, A, B>(
    outer: &'a IntervalCollection<A>,
    inner: &'a IntervalCollection<B>,
) -> (Vec<i64>, Vec<i64>) {
    fn code_of<'m>(
        codes: &mut FxHashMap<(&'m str, Strand), i64>,
        chromosome: &'m str,
        strand: Strand,
    ) -> i64 {
        let next = codes.len() as i64;
        *codes.entry((chromosome, strand)).or_insert(next)
    }

    let mut codes: FxHashMap<(&'a str, Strand), i64> = FxHashMap::default();

    let groups = outer
        .iter()
        .map(|(_, record)| code_of(&mut codes, record.chromosome.as_str(), record.strand))
        .collect();
    let groups2 = inner
        .iter()
        .map(|(_, record)| code_of(&mut codes, record.chromosome.as_str(), record.strand))
        .collect();

    (groups, groups2)
}

/// Build the sorted event list for a cross-set sweep over two collections.
///
/// Sort events by:
/// 1. group (ascending)
/// 2. pos (ascending)
/// 3. is_end before is_start (if pos ties)
///
/// The stacked radix sorts are stable and run least-significant key first.
/// Ordering end events before start events at the same position is what
/// gives the sweep half-open semantics: intervals that merely touch are
/// never active at the same time.
pub fn build_sorted_events<A, B>(
    outer: &IntervalCollection<A>,
    groups: &[i64],
    inner: &IntervalCollection<B>,
    groups2: &[i64],
) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::with_capacity(2 * (outer.len() + inner.len()));

    for (idx, record) in outer.iter() {
        events.push(Event {
            group: groups[idx],
            pos: record.start,
            is_start: true,
            first_set: true,
            idx,
        });
        events.push(Event {
            group: groups[idx],
            pos: record.end,
            is_start: false,
            first_set: true,
            idx,
        });
    }

    for (idx, record) in inner.iter() {
        events.push(Event {
            group: groups2[idx],
            pos: record.start,
            is_start: true,
            first_set: false,
            idx,
        });
        events.push(Event {
            group: groups2[idx],
            pos: record.end,
            is_start: false,
            first_set: false,
            idx,
        });
    }

    sort_by_key(&mut events, |e| e.is_start);
    sort_by_key(&mut events, |e| e.pos);
    sort_by_key(&mut events, |e| e.group);

    events
}
