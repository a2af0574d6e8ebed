use super::files::atomic_write;
use crate::domain::TaskNode;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// The plan a first run starts from: an empty root container
pub fn starter_plan() -> TaskNode {
    TaskNode::plan_root()
}

/// Load a plan tree from disk. A missing file yields the starter plan; a
/// present-but-unreadable one is an error, never silently replaced.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<TaskNode> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(starter_plan());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    let root: TaskNode = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan file: {}", path.display()))?;

    if !root.is_group() {
        bail!(
            "Plan root must be a repeat-group container: {}",
            path.display()
        );
    }
    Ok(root)
}

/// Save a plan tree to disk atomically
pub fn save_plan<P: AsRef<Path>>(path: P, root: &TaskNode) -> Result<()> {
    let json = serde_json::to_string_pretty(root).context("Failed to serialize plan")?;
    atomic_write(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");

        let mut root = TaskNode::plan_root();
        let root_id = root.id;
        root.insert_into(root_id, TaskNode::timer("Focus", 1500));
        let group = TaskNode::repeat("Intervals", 4);
        let group_id = group.id;
        root.insert_into(root_id, group);
        root.insert_into(group_id, TaskNode::stopwatch("Rest"));

        save_plan(&path, &root).unwrap();
        let loaded = load_plan(&path).unwrap();
        assert_eq!(loaded, root);
    }

    #[test]
    fn test_missing_file_yields_starter_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.json");

        let plan = load_plan(&path).unwrap();
        assert!(plan.is_group());
        assert_eq!(plan.leaf_count(), 0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(load_plan(&path).is_err());
    }

    #[test]
    fn test_leaf_root_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");
        let leaf = TaskNode::timer("Lone", 60);
        std::fs::write(&path, serde_json::to_string(&leaf).unwrap()).unwrap();

        assert!(load_plan(&path).is_err());
    }
}
