use crate::domain::{flatten_rows, parse_duration, FlatRow, TaskKind, TaskNode};
use crate::engine::{
    LeafTask, ProgressCalculator, ProgressInfo, RunCoordinator, RunEvent, RunTopic, TimerEvent,
    TimerTopic, TreeIterator,
};
use crate::notifications;
use crate::persistence;
use crate::ticker::{tick_duration, TICKS_PER_SEC};
use anyhow::Result;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Seconds-left threshold at which the near-finish cue fires
pub const NEAR_FINISH_SECONDS: u64 = 10;

/// Which screen the app is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Editor,
    Running,
}

/// Task shape selectable in the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskChoice {
    Timer,
    Stopwatch,
    Repeat,
}

impl TaskChoice {
    pub fn label(&self) -> &'static str {
        match self {
            TaskChoice::Timer => "Timer",
            TaskChoice::Stopwatch => "Stopwatch",
            TaskChoice::Repeat => "Repeat",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TaskChoice::Timer => TaskChoice::Stopwatch,
            TaskChoice::Stopwatch => TaskChoice::Repeat,
            TaskChoice::Repeat => TaskChoice::Timer,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            TaskChoice::Timer => TaskChoice::Repeat,
            TaskChoice::Stopwatch => TaskChoice::Timer,
            TaskChoice::Repeat => TaskChoice::Stopwatch,
        }
    }
}

/// Form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Kind,
    Duration,
    Cycles,
}

/// Input form state for adding or editing a task
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub choice: TaskChoice,
    pub duration_input: String,
    pub cycles_input: String,
    pub field: FormField,
    /// `Some` when editing an existing node; the kind is locked then
    pub editing_id: Option<Uuid>,
    /// Group the new node is appended to
    pub target_group: Uuid,
    pub error: Option<String>,
}

impl TaskForm {
    fn add_into(target_group: Uuid) -> Self {
        Self {
            title: String::new(),
            choice: TaskChoice::Timer,
            duration_input: String::new(),
            cycles_input: String::new(),
            field: FormField::Title,
            editing_id: None,
            target_group,
            error: None,
        }
    }

    /// Fields visible for the current choice, in tab order
    pub fn visible_fields(&self) -> Vec<FormField> {
        let mut fields = vec![FormField::Title];
        if self.editing_id.is_none() {
            fields.push(FormField::Kind);
        }
        match self.choice {
            TaskChoice::Timer => fields.push(FormField::Duration),
            TaskChoice::Repeat => fields.push(FormField::Cycles),
            TaskChoice::Stopwatch => {}
        }
        fields
    }

    pub fn next_field(&mut self) {
        let fields = self.visible_fields();
        let pos = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(pos + 1) % fields.len()];
    }

    /// The text buffer the cursor currently edits, if any
    pub fn active_buffer_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Duration => Some(&mut self.duration_input),
            FormField::Cycles => Some(&mut self.cycles_input),
            FormField::Kind => None,
        }
    }
}

/// Live view of the running plan, mutated only by event handlers
#[derive(Debug, Default)]
pub struct RunView {
    pub current: Option<LeafTask>,
    pub next: Option<LeafTask>,
    pub progress: Option<ProgressInfo>,
    pub seconds: u64,
    pub pause_seconds: u64,
    pub paused: bool,
    pub over: bool,
}

/// One run: the coordinator handle plus the event-fed view
pub struct RunSession {
    pub coordinator: RunCoordinator,
    pub view: Rc<RefCell<RunView>>,
}

/// Main application state
pub struct AppState {
    pub plan: TaskNode,
    pub plan_path: PathBuf,
    pub screen: Screen,
    pub selected: usize,
    pub form: Option<TaskForm>,
    pub status: Option<String>,
    pub needs_save: bool,
    pub run: Option<RunSession>,
    last_tick: Instant,
}

impl AppState {
    pub fn new(plan: TaskNode, plan_path: PathBuf) -> Self {
        Self {
            plan,
            plan_path,
            screen: Screen::Editor,
            selected: 0,
            form: None,
            status: None,
            needs_save: false,
            run: None,
            last_tick: Instant::now(),
        }
    }

    // ---- editor ----

    pub fn rows(&self) -> Vec<FlatRow> {
        flatten_rows(&self.plan)
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.rows().get(self.selected).map(|row| row.id)
    }

    pub fn selected_node(&self) -> Option<&TaskNode> {
        let id = self.rows().get(self.selected)?.id;
        self.plan.find(id)
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let count = self.rows().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    /// Reorder the selected node within its sibling list, keeping it selected
    pub fn move_item(&mut self, offset: isize) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.plan.move_in_siblings(id, offset) {
            if let Some(pos) = self.rows().iter().position(|row| row.id == id) {
                self.selected = pos;
            }
            self.needs_save = true;
        }
    }

    /// Open the add form targeting the root container
    pub fn open_add_form(&mut self) {
        self.status = None;
        self.form = Some(TaskForm::add_into(self.plan.id));
    }

    /// Open the add form targeting the selected repeat-group
    pub fn open_add_into_form(&mut self) {
        self.status = None;
        match self.selected_node() {
            Some(node) if node.is_group() => {
                self.form = Some(TaskForm::add_into(node.id));
            }
            _ => {
                self.status = Some("Select a repeat-group to add into".to_string());
            }
        }
    }

    /// Open the edit form prefilled from the selected node
    pub fn open_edit_form(&mut self) {
        self.status = None;
        let Some(node) = self.selected_node() else {
            return;
        };

        let (choice, duration_input, cycles_input) = match &node.kind {
            TaskKind::Timer { duration_seconds } => (
                TaskChoice::Timer,
                duration_seconds.to_string(),
                String::new(),
            ),
            TaskKind::Stopwatch => (TaskChoice::Stopwatch, String::new(), String::new()),
            TaskKind::Repeat { cycles, .. } => {
                (TaskChoice::Repeat, String::new(), cycles.to_string())
            }
        };

        self.form = Some(TaskForm {
            title: node.title.clone(),
            choice,
            duration_input,
            cycles_input,
            field: FormField::Title,
            editing_id: Some(node.id),
            target_group: self.plan.id,
            error: None,
        });
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validate and apply the open form
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };

        let title = form.title.trim().to_string();
        if title.is_empty() {
            self.form_error("Title is required");
            return;
        }

        let duration = if form.choice == TaskChoice::Timer {
            match parse_duration(&form.duration_input) {
                Ok(0) => {
                    self.form_error("Duration must be greater than zero");
                    return;
                }
                Ok(seconds) => Some(seconds),
                Err(err) => {
                    self.form_error(&err.to_string());
                    return;
                }
            }
        } else {
            None
        };

        let cycles = if form.choice == TaskChoice::Repeat {
            match form.cycles_input.trim().parse::<u32>() {
                Ok(0) => {
                    self.form_error("Cycles must be at least 1");
                    return;
                }
                Ok(n) => Some(n),
                Err(_) => {
                    self.form_error("Cycles must be a whole number");
                    return;
                }
            }
        } else {
            None
        };

        match form.editing_id {
            Some(id) => self.apply_edit(id, title, duration, cycles),
            None => {
                let node = match form.choice {
                    TaskChoice::Timer => TaskNode::timer(title, duration.unwrap_or(1)),
                    TaskChoice::Stopwatch => TaskNode::stopwatch(title),
                    TaskChoice::Repeat => TaskNode::repeat(title, cycles.unwrap_or(1)),
                };
                if !self.plan.insert_into(form.target_group, node) {
                    self.status = Some("Target group no longer exists".to_string());
                }
            }
        }

        self.form = None;
        self.needs_save = true;
    }

    fn apply_edit(&mut self, id: Uuid, title: String, duration: Option<u32>, cycles: Option<u32>) {
        if let Some(node) = self.plan.find_mut(id) {
            node.title = title;
            match &mut node.kind {
                TaskKind::Timer { duration_seconds } => {
                    if let Some(d) = duration {
                        *duration_seconds = d;
                    }
                }
                TaskKind::Repeat { cycles: c, .. } => {
                    if let Some(n) = cycles {
                        *c = n;
                    }
                }
                TaskKind::Stopwatch => {}
            }
        }
    }

    fn form_error(&mut self, message: &str) {
        if let Some(form) = self.form.as_mut() {
            form.error = Some(message.to_string());
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.plan.remove(id).is_some() {
            let count = self.rows().len();
            if count > 0 && self.selected >= count {
                self.selected = count - 1;
            }
            self.needs_save = true;
        }
    }

    /// Plan totals for the editor footer: (seconds, exact, task instances).
    /// `None` when the tree is malformed.
    pub fn plan_totals(&self) -> Option<(u64, bool, usize)> {
        let iterator = TreeIterator::new(&self.plan).ok()?;
        let calc = ProgressCalculator::new(iterator);
        Some((calc.total_seconds(), calc.total_known(), calc.len()))
    }

    // ---- run ----

    /// Snapshot the plan and start executing it
    pub fn start_run(&mut self) {
        self.status = None;

        let mut coordinator = match RunCoordinator::new(&self.plan, TICKS_PER_SEC) {
            Ok(coordinator) => coordinator,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };

        let view = Rc::new(RefCell::new(RunView::default()));

        let handle = Rc::clone(&view);
        coordinator.subscribe(RunTopic::StartTask, move |event| {
            if let RunEvent::StartTask {
                current,
                next,
                progress,
            } = event
            {
                let mut view = handle.borrow_mut();
                view.current = Some(current.clone());
                view.next = next.clone();
                view.progress = Some(*progress);
                view.seconds = 0;
                view.pause_seconds = 0;
                view.paused = false;
            }
        });

        let handle = Rc::clone(&view);
        coordinator.subscribe(RunTopic::StopTask, move |_| {
            if let Some(task) = &handle.borrow().current {
                notifications::notify_task_done(&task.title);
            }
        });

        let handle = Rc::clone(&view);
        coordinator.subscribe(RunTopic::Stop, move |_| {
            handle.borrow_mut().over = true;
        });

        let handle = Rc::clone(&view);
        coordinator.on_timer(TimerTopic::TickSecond, move |event| {
            if let TimerEvent::TickSecond(seconds) = event {
                let mut view = handle.borrow_mut();
                view.seconds = *seconds;

                if let Some(duration) = view.current.as_ref().and_then(|t| t.duration) {
                    let remaining = u64::from(duration).saturating_sub(*seconds);
                    if remaining == NEAR_FINISH_SECONDS {
                        if let Some(task) = &view.current {
                            notifications::notify_near_finish(&task.title, remaining);
                        }
                    }
                }
            }
        });

        let handle = Rc::clone(&view);
        coordinator.on_timer(TimerTopic::PauseTickSecond, move |event| {
            if let TimerEvent::PauseTickSecond(seconds) = event {
                handle.borrow_mut().pause_seconds = *seconds;
            }
        });

        let handle = Rc::clone(&view);
        coordinator.on_timer(TimerTopic::PauseOn, move |_| {
            handle.borrow_mut().paused = true;
        });

        let handle = Rc::clone(&view);
        coordinator.on_timer(TimerTopic::PauseOff, move |_| {
            handle.borrow_mut().paused = false;
        });

        if let Err(err) = coordinator.start() {
            self.status = Some(err.to_string());
            return;
        }

        self.run = Some(RunSession { coordinator, view });
        self.screen = Screen::Running;
        self.last_tick = Instant::now();
    }

    /// Leave the run screen, discarding the session
    pub fn leave_run(&mut self) {
        self.run = None;
        self.screen = Screen::Editor;
    }

    pub fn run_toggle_pause(&mut self) {
        if let Some(run) = &mut self.run {
            if let Err(err) = run.coordinator.toggle_pause() {
                self.status = Some(err.to_string());
            }
        }
    }

    /// Skip the current task, advancing the run
    pub fn run_skip(&mut self) {
        if let Some(run) = &mut self.run {
            if let Err(err) = run.coordinator.stop() {
                self.status = Some(err.to_string());
            }
        }
    }

    /// End the run after the current task
    pub fn run_finish(&mut self) {
        if let Some(run) = &mut self.run {
            if let Err(err) = run.coordinator.finish() {
                self.status = Some(err.to_string());
            }
        }
    }

    /// Convert elapsed wall-clock time into engine ticks. Catching up in a
    /// loop keeps the rate steady when input events wake the poll early.
    pub fn tick(&mut self) -> Result<()> {
        let tick_len = tick_duration();
        while self.last_tick.elapsed() >= tick_len {
            self.last_tick += tick_len;
            if let Some(run) = &mut self.run {
                run.coordinator.tick()?;
            }
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        persistence::save_plan(&self.plan_path, &self.plan)?;
        self.needs_save = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app_with_plan(children: Vec<TaskNode>) -> AppState {
        let mut plan = TaskNode::plan_root();
        let root_id = plan.id;
        for child in children {
            plan.insert_into(root_id, child);
        }
        AppState::new(plan, PathBuf::from("unused.json"))
    }

    fn submit_timer(app: &mut AppState, title: &str, duration: &str) {
        app.open_add_form();
        if let Some(form) = app.form.as_mut() {
            form.title = title.to_string();
            form.duration_input = duration.to_string();
        }
        app.submit_form();
    }

    #[test]
    fn test_add_task_via_form() {
        let mut app = app_with_plan(vec![]);
        submit_timer(&mut app, "Focus", "25m");

        assert!(app.form.is_none());
        assert!(app.needs_save);
        let rows = app.rows();
        assert_eq!(rows.len(), 1);
        let node = app.plan.find(rows[0].id).unwrap();
        assert_eq!(node.title, "Focus");
        assert_eq!(node.kind, TaskKind::Timer { duration_seconds: 1500 });
    }

    #[test]
    fn test_form_validation_keeps_form_open() {
        let mut app = app_with_plan(vec![]);
        submit_timer(&mut app, "", "25m");
        assert!(app.form.as_ref().unwrap().error.is_some());

        submit_timer(&mut app, "Focus", "garbage");
        assert!(app.form.as_ref().unwrap().error.is_some());

        submit_timer(&mut app, "Focus", "0");
        assert!(app.form.as_ref().unwrap().error.is_some());
        assert_eq!(app.rows().len(), 0);
    }

    #[test]
    fn test_add_into_requires_group() {
        let mut app = app_with_plan(vec![TaskNode::timer("a", 60)]);
        app.open_add_into_form();
        assert!(app.form.is_none());
        assert!(app.status.is_some());

        let mut app = app_with_plan(vec![TaskNode::repeat("loop", 2)]);
        app.open_add_into_form();
        let target = app.form.as_ref().unwrap().target_group;
        assert_eq!(Some(target), app.selected_id());
    }

    #[test]
    fn test_edit_keeps_id_and_kind() {
        let mut app = app_with_plan(vec![TaskNode::timer("Old", 60)]);
        let id = app.selected_id().unwrap();

        app.open_edit_form();
        {
            let form = app.form.as_mut().unwrap();
            assert_eq!(form.duration_input, "60");
            form.title = "New".to_string();
            form.duration_input = "2m".to_string();
        }
        app.submit_form();

        let node = app.plan.find(id).unwrap();
        assert_eq!(node.title, "New");
        assert_eq!(node.kind, TaskKind::Timer { duration_seconds: 120 });
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut app = app_with_plan(vec![TaskNode::timer("a", 1), TaskNode::timer("b", 1)]);
        app.selected = 1;
        app.delete_selected();
        assert_eq!(app.rows().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_reorder_follows_node() {
        let mut app = app_with_plan(vec![TaskNode::timer("a", 1), TaskNode::timer("b", 1)]);
        let a_id = app.selected_id().unwrap();

        app.move_item(1);
        assert_eq!(app.selected, 1);
        assert_eq!(app.selected_id(), Some(a_id));

        // At the bottom already
        app.move_item(1);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_plan_totals() {
        let mut app = app_with_plan(vec![
            TaskNode::timer("a", 10),
            TaskNode::stopwatch("open"),
        ]);
        assert_eq!(app.plan_totals(), Some((10, false, 2)));

        app.delete_selected(); // removes "a"
        assert_eq!(app.plan_totals(), Some((0, false, 1)));
    }

    #[test]
    fn test_start_run_with_empty_plan_is_immediately_over() {
        let mut app = app_with_plan(vec![]);
        app.start_run();

        let run = app.run.as_ref().unwrap();
        assert!(run.view.borrow().over);
        assert_eq!(app.screen, Screen::Running);
    }

    #[test]
    fn test_run_view_tracks_events() {
        let mut app = app_with_plan(vec![TaskNode::timer("a", 1), TaskNode::stopwatch("b")]);
        app.start_run();

        {
            let run = app.run.as_mut().unwrap();
            let view = run.view.borrow();
            assert_eq!(view.current.as_ref().map(|t| t.title.as_str()), Some("a"));
            assert_eq!(view.next.as_ref().map(|t| t.title.as_str()), Some("b"));
            assert!(!view.progress.unwrap().remaining_known);
        }

        // Drive one second of engine time directly
        let run = app.run.as_mut().unwrap();
        for _ in 0..TICKS_PER_SEC {
            run.coordinator.tick().unwrap();
        }

        let view = run.view.borrow();
        assert_eq!(view.current.as_ref().map(|t| t.title.as_str()), Some("b"));
        assert_eq!(view.next, None);
        assert_eq!(view.seconds, 0);
        assert!(!view.over);
    }

    #[test]
    fn test_run_pause_updates_view() {
        let mut app = app_with_plan(vec![TaskNode::stopwatch("open")]);
        app.start_run();
        app.run_toggle_pause();

        let run = app.run.as_mut().unwrap();
        for _ in 0..TICKS_PER_SEC {
            run.coordinator.tick().unwrap();
        }
        {
            let view = run.view.borrow();
            assert!(view.paused);
            assert_eq!(view.pause_seconds, 1);
        }

        app.run_toggle_pause();
        let run = app.run.as_ref().unwrap();
        assert!(!run.view.borrow().paused);
    }

    #[test]
    fn test_run_finish_halts_after_current() {
        let mut app = app_with_plan(vec![
            TaskNode::timer("a", 1),
            TaskNode::timer("b", 1),
            TaskNode::timer("c", 1),
        ]);
        app.start_run();
        app.run_finish();

        let run = app.run.as_ref().unwrap();
        assert!(run.view.borrow().over);
        assert_eq!(run.coordinator.finished().len(), 1);
    }

    #[test]
    fn test_skip_past_last_task_ends_run() {
        let mut app = app_with_plan(vec![TaskNode::stopwatch("only")]);
        app.start_run();
        app.run_skip();

        let run = app.run.as_ref().unwrap();
        assert!(run.view.borrow().over);
        assert!(run.coordinator.is_halted());
    }
}
