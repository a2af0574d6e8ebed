/// Cross-platform notification support
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::Command;

/// Send a notification when a task finishes
pub fn notify_task_done(task_title: &str) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "Cadence - Task Finished""#,
            task_title.replace('"', "\\\"")
        );

        let _ = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output();
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms
        let _ = task_title;
    }
}

/// Send a notification when a running task is close to its duration
pub fn notify_near_finish(task_title: &str, remaining_seconds: u64) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "⏰ {} ({}s left)" with title "Cadence - Almost Done""#,
            task_title.replace('"', "\\\""),
            remaining_seconds
        );

        let _ = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output();
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms
        let _ = (task_title, remaining_seconds);
    }
}
