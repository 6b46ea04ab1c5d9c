//! Transformation stages: pruning, filtering, overload math, grouping,
//! and the pipeline that chains them.

pub mod filter;
pub mod grouper;
pub mod overload;
pub mod pipeline;

pub use filter::{filter_sections, prune_columns};
pub use grouper::group_by_staff;
pub use overload::{compute_overload, compute_pay};
pub use pipeline::{
    process_batch, process_bytes, process_file, process_table, BatchOutcome, FileOutcome,
    NamedInput,
};
