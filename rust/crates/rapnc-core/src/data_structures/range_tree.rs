use crate::RangeTreeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMin {
    pub index: usize,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    from: usize,
    to: usize,
    min: i64,
    min_index: usize,
    /// Delta already folded into `min` but not yet pushed to the children.
    pending: Option<i64>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.from == self.to
    }

    fn inside(&self, from: usize, to: usize) -> bool {
        from <= self.from && self.to <= to
    }

    fn disjoint(&self, from: usize, to: usize) -> bool {
        to < self.from || self.to < from
    }
}

/// Range-minimum / range-add tree with lazy propagation.
///
/// Both operations run in `O(log n)`. A range update that covers a node only
/// touches that node's aggregate and records the delta as pending; the delta
/// is pushed one level down whenever a later operation has to descend through
/// the node. Ties in the minimum resolve to the leftmost index.
///
/// Ranges are inclusive. Empty (`from > to`) or out-of-bounds ranges are
/// rejected with [`RangeTreeError::InvalidRange`] instead of being clamped.
#[derive(Debug, Clone)]
pub struct RangeTree {
    nodes: Vec<Node>,
    len: usize,
}

impl RangeTree {
    pub fn new(values: &[i64]) -> Self {
        let len = values.len();
        let mut tree = Self {
            nodes: vec![Node::default(); 4 * len.max(1)],
            len,
        };
        if len > 0 {
            tree.build(1, 0, len - 1, values);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn range_min(&mut self, from: usize, to: usize) -> Result<RangeMin, RangeTreeError> {
        self.check_range(from, to)?;
        self.query(1, from, to).ok_or(RangeTreeError::InvalidRange {
            from,
            to,
            len: self.len,
        })
    }

    pub fn range_add(&mut self, from: usize, to: usize, delta: i64) -> Result<(), RangeTreeError> {
        self.check_range(from, to)?;
        if delta != 0 {
            self.update(1, from, to, delta);
        }
        Ok(())
    }

    pub fn value_at(&mut self, index: usize) -> Result<i64, RangeTreeError> {
        self.range_min(index, index).map(|min| min.value)
    }

    /// Materializes the current leaf values, pushing every pending delta.
    pub fn to_vec(&mut self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.len);
        if self.len > 0 {
            self.collect(1, &mut values);
        }
        values
    }

    fn check_range(&self, from: usize, to: usize) -> Result<(), RangeTreeError> {
        if from > to || to >= self.len {
            return Err(RangeTreeError::InvalidRange {
                from,
                to,
                len: self.len,
            });
        }
        Ok(())
    }

    fn build(&mut self, v: usize, from: usize, to: usize, values: &[i64]) {
        self.nodes[v].from = from;
        self.nodes[v].to = to;
        if from == to {
            self.nodes[v].min = values[from];
            self.nodes[v].min_index = from;
            return;
        }
        let mid = from + (to - from) / 2;
        self.build(2 * v, from, mid, values);
        self.build(2 * v + 1, mid + 1, to, values);
        self.pull(v);
    }

    fn query(&mut self, v: usize, from: usize, to: usize) -> Option<RangeMin> {
        let node = self.nodes[v];
        if node.disjoint(from, to) {
            return None;
        }
        if node.inside(from, to) {
            return Some(RangeMin {
                index: node.min_index,
                value: node.min,
            });
        }
        self.push(v);
        let left = self.query(2 * v, from, to);
        let right = self.query(2 * v + 1, from, to);
        match (left, right) {
            (Some(l), Some(r)) => Some(if r.value < l.value { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn update(&mut self, v: usize, from: usize, to: usize, delta: i64) {
        let node = self.nodes[v];
        if node.disjoint(from, to) {
            return;
        }
        if node.inside(from, to) {
            self.apply(v, delta);
            return;
        }
        self.push(v);
        self.update(2 * v, from, to, delta);
        self.update(2 * v + 1, from, to, delta);
        self.pull(v);
    }

    fn collect(&mut self, v: usize, out: &mut Vec<i64>) {
        if self.nodes[v].is_leaf() {
            out.push(self.nodes[v].min);
            return;
        }
        self.push(v);
        self.collect(2 * v, out);
        self.collect(2 * v + 1, out);
    }

    fn apply(&mut self, v: usize, delta: i64) {
        let node = &mut self.nodes[v];
        node.min += delta;
        if !node.is_leaf() {
            node.pending = Some(node.pending.unwrap_or(0) + delta);
        }
    }

    fn push(&mut self, v: usize) {
        if let Some(delta) = self.nodes[v].pending.take() {
            self.apply(2 * v, delta);
            self.apply(2 * v + 1, delta);
        }
    }

    fn pull(&mut self, v: usize) {
        let left = self.nodes[2 * v];
        let right = self.nodes[2 * v + 1];
        let best = if right.min < left.min { right } else { left };
        self.nodes[v].min = best.min;
        self.nodes[v].min_index = best.min_index;
    }
}
