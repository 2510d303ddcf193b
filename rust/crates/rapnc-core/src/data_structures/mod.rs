pub mod path_index;
pub mod range_tree;
pub mod select;

pub use path_index::PathIndex;
pub use range_tree::{RangeMin, RangeTree};
pub use select::{select, Record};
