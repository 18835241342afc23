//! Change detection between content trees.

pub mod change_set;
pub mod engine;

pub use change_set::ChangeSet;
pub use engine::{
    compute_diff, values_equal, DiffEngine, DiffOptions, DEFAULT_EXCLUDED_KEYS, DEFAULT_MAX_DEPTH,
};
