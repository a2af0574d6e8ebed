use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the plan tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique ID, assigned at creation and treated as opaque afterwards
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Shape of the node (timer, stopwatch, or repeat-group)
    #[serde(flatten)]
    pub kind: TaskKind,
}

/// The three task shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Leaf with a fixed duration in seconds (must be > 0)
    Timer { duration_seconds: u32 },
    /// Leaf with an open-ended duration, runs until stopped
    Stopwatch,
    /// Internal node whose children run `cycles` times, in order
    Repeat { cycles: u32, children: Vec<TaskNode> },
}

impl TaskNode {
    pub fn timer(title: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: TaskKind::Timer { duration_seconds },
        }
    }

    pub fn stopwatch(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: TaskKind::Stopwatch,
        }
    }

    pub fn repeat(title: impl Into<String>, cycles: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: TaskKind::Repeat {
                cycles,
                children: Vec::new(),
            },
        }
    }

    /// The root container every plan hangs off: a repeat-group that runs its
    /// children exactly once
    pub fn plan_root() -> Self {
        Self::repeat("Plan", 1)
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, TaskKind::Repeat { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, TaskKind::Repeat { .. })
    }

    /// Children of a repeat-group, `None` for leaves
    pub fn children(&self) -> Option<&[TaskNode]> {
        match &self.kind {
            TaskKind::Repeat { children, .. } => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<TaskNode>> {
        match &mut self.kind {
            TaskKind::Repeat { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Find a node (including self) by id
    pub fn find(&self, id: Uuid) -> Option<&TaskNode> {
        if self.id == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }

    /// Find a node (including self) by id, mutably
    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut TaskNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            TaskKind::Repeat { children, .. } => {
                children.iter_mut().find_map(|child| child.find_mut(id))
            }
            _ => None,
        }
    }

    /// Append a node to the children of the group with `group_id`.
    /// Returns false (and drops nothing) when the target is missing or a leaf.
    pub fn insert_into(&mut self, group_id: Uuid, node: TaskNode) -> bool {
        match self.find_mut(group_id).and_then(|g| g.children_mut()) {
            Some(children) => {
                children.push(node);
                true
            }
            None => false,
        }
    }

    /// Detach a descendant node by id and return it. The root itself cannot
    /// be removed.
    pub fn remove(&mut self, id: Uuid) -> Option<TaskNode> {
        let children = self.children_mut()?;
        if let Some(pos) = children.iter().position(|child| child.id == id) {
            return Some(children.remove(pos));
        }
        children.iter_mut().find_map(|child| child.remove(id))
    }

    /// Move a node one slot up or down within its sibling list.
    /// Returns false if the node was not found or already at the edge.
    pub fn move_in_siblings(&mut self, id: Uuid, offset: isize) -> bool {
        if let Some(children) = self.children_mut() {
            if let Some(pos) = children.iter().position(|child| child.id == id) {
                let target = pos as isize + offset;
                if target < 0 || target as usize >= children.len() {
                    return false;
                }
                children.swap(pos, target as usize);
                return true;
            }
            return children
                .iter_mut()
                .any(|child| child.move_in_siblings(id, offset));
        }
        false
    }

    /// Count leaf nodes in the subtree (before repeat expansion)
    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some(children) => children.iter().map(|c| c.leaf_count()).sum(),
            None => 1,
        }
    }
}

/// A flattened row for rendering the plan tree
#[derive(Debug, Clone)]
pub struct FlatRow {
    /// Node id (look the node up with `TaskNode::find`)
    pub id: Uuid,
    /// Depth below the root container (0 = top-level task)
    pub depth: usize,
    /// Whether this is the last child of its parent
    pub is_last: bool,
}

/// Flatten the plan into rows for rendering, depth-first. The root container
/// itself is not listed.
pub fn flatten_rows(root: &TaskNode) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    if let Some(children) = root.children() {
        push_rows(children, 0, &mut rows);
    }
    rows
}

fn push_rows(children: &[TaskNode], depth: usize, rows: &mut Vec<FlatRow>) {
    let count = children.len();
    for (idx, child) in children.iter().enumerate() {
        rows.push(FlatRow {
            id: child.id,
            depth,
            is_last: idx == count - 1,
        });
        if let Some(grandchildren) = child.children() {
            push_rows(grandchildren, depth + 1, rows);
        }
    }
}

/// Tree connector glyph for a row
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}
