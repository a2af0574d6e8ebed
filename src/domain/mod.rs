pub mod node;
pub mod timefmt;

pub use node::{flatten_rows, tree_connector, FlatRow, TaskKind, TaskNode};
pub use timefmt::{format_clock, format_hms, parse_duration};
