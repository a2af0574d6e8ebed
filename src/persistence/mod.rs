pub mod files;
pub mod plan;

pub use files::{ensure_cadence_dir, get_cadence_dir, init_local_cadence, plan_file};
pub use plan::{load_plan, save_plan, starter_plan};
