use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy)]
struct PathKey {
    cost: f64,
    id: usize,
}

impl PartialEq for PathKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathKey {}

// Cheapest first; equal costs put the larger id first.
impl Ord for PathKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for PathKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open production periods ordered by their current marginal cost.
///
/// Among equal costs the most recently opened period (largest id) comes out
/// first. Each id holds at most one entry; re-inserting an id replaces its
/// previous cost.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    order: BTreeSet<PathKey>,
    costs: Vec<Option<f64>>,
}

impl PathIndex {
    pub fn with_capacity(ids: usize) -> Self {
        Self {
            order: BTreeSet::new(),
            costs: vec![None; ids],
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.cost(id).is_some()
    }

    pub fn cost(&self, id: usize) -> Option<f64> {
        self.costs.get(id).copied().flatten()
    }

    pub fn insert(&mut self, id: usize, cost: f64) {
        if id >= self.costs.len() {
            self.costs.resize(id + 1, None);
        }
        if let Some(previous) = self.costs[id].replace(cost) {
            self.order.remove(&PathKey { cost: previous, id });
        }
        self.order.insert(PathKey { cost, id });
    }

    pub fn remove(&mut self, id: usize) -> Option<f64> {
        let cost = self.costs.get_mut(id)?.take()?;
        self.order.remove(&PathKey { cost, id });
        Some(cost)
    }

    pub fn peek_cheapest(&self) -> Option<(usize, f64)> {
        self.order.first().map(|key| (key.id, key.cost))
    }

    pub fn pop_cheapest(&mut self) -> Option<(usize, f64)> {
        let key = self.order.pop_first()?;
        self.costs[key.id] = None;
        Some((key.id, key.cost))
    }
}
