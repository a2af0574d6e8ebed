use std::time::Duration;

/// Engine tick rate in ticks per second
pub const TICKS_PER_SEC: u32 = 50;

/// Get the wall-clock duration of one tick
pub fn tick_duration() -> Duration {
    Duration::from_millis(1000 / TICKS_PER_SEC as u64)
}
