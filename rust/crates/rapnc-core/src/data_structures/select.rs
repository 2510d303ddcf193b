use std::cmp::Ordering;

const GROUP: usize = 5;

/// An `(id, value)` pair ordered by value, then id.
///
/// Ordering on the id as well makes every record distinct under `Ord`, which
/// the selector relies on to place its pivot unambiguously.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub id: usize,
    pub value: f64,
}

impl Record {
    pub fn new(id: usize, value: f64) -> Self {
        Self { id, value }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Record {}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the `k`-th smallest (1-indexed) element of `records[start..=end]`
/// in worst-case linear time (median of medians).
///
/// On return the range is partitioned around the selected element, which sits
/// at `start + k - 1`: everything before it compares `<=` and everything after
/// it compares `>=`. Returns `None` when the range or `k` is out of bounds.
pub fn select<T: Ord + Clone>(records: &mut [T], start: usize, end: usize, k: usize) -> Option<T> {
    if start > end || end >= records.len() || k == 0 || k > end - start + 1 {
        return None;
    }
    Some(select_in(records, start, end, k))
}

fn select_in<T: Ord + Clone>(records: &mut [T], mut start: usize, mut end: usize, mut k: usize) -> T {
    loop {
        let pivot = median_of_medians(records, start, end);
        let pos = partition(records, start, end, &pivot);
        let rank = pos - start + 1;
        match rank.cmp(&k) {
            Ordering::Equal => return records[pos].clone(),
            Ordering::Greater => end = pos - 1,
            Ordering::Less => {
                k -= rank;
                start = pos + 1;
            }
        }
    }
}

fn median_of_medians<T: Ord + Clone>(records: &mut [T], start: usize, end: usize) -> T {
    let len = end - start + 1;
    let mut medians = Vec::with_capacity(len.div_ceil(GROUP));
    let mut left = start;
    while left <= end {
        let right = (left + GROUP - 1).min(end);
        records[left..=right].sort_unstable();
        medians.push(records[left + (right - left) / 2].clone());
        left = right + 1;
    }
    let count = medians.len();
    if count == 1 {
        return medians.swap_remove(0);
    }
    select_in(&mut medians, 0, count - 1, count.div_ceil(2))
}

fn partition<T: Ord>(records: &mut [T], start: usize, end: usize, pivot: &T) -> usize {
    let found = (start..=end)
        .find(|&i| records[i] == *pivot)
        .unwrap_or(end);
    records.swap(found, end);
    let mut store = start;
    for j in start..end {
        if records[j] <= records[end] {
            records.swap(store, j);
            store += 1;
        }
    }
    records.swap(store, end);
    store
}
