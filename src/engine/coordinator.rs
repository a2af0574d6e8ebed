use super::linearizer::{LeafTask, TreeIterator};
use super::progress::{ProgressCalculator, ProgressInfo};
use super::timer::{TaskTimer, TimeStats, TimerEvent, TimerTopic};
use super::EngineError;
use crate::domain::TaskNode;
use crate::events::{EventHub, Handler, SubscriptionId, Topical};
use chrono::{DateTime, Local};
use std::rc::Rc;
use uuid::Uuid;

/// Record of one completed task instance, kept by the coordinator (never on
/// the tree)
#[derive(Debug, Clone)]
pub struct FinishedTask {
    pub id: Uuid,
    pub title: String,
    pub stats: TimeStats,
    pub finished_at: DateTime<Local>,
}

/// Run-level events
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A task began; carries the one-ahead preview and progress at its
    /// position
    StartTask {
        current: LeafTask,
        next: Option<LeafTask>,
        progress: ProgressInfo,
    },
    /// The current task ended with these time totals
    StopTask(TimeStats),
    /// The whole run is over; no further events follow
    Stop,
    /// Pause was toggled on the current task
    PauseToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunTopic {
    StartTask,
    StopTask,
    Stop,
    PauseToggle,
}

impl Topical for RunEvent {
    type Topic = RunTopic;

    fn topic(&self) -> RunTopic {
        match self {
            RunEvent::StartTask { .. } => RunTopic::StartTask,
            RunEvent::StopTask(_) => RunTopic::StopTask,
            RunEvent::Stop => RunTopic::Stop,
            RunEvent::PauseToggle => RunTopic::PauseToggle,
        }
    }
}

/// Executes a plan front-to-back: one task timer at a time, a one-ahead
/// lookahead for previews, and an early-finish flag that ends the run after
/// the current task.
///
/// The coordinator owns a value snapshot of the plan for the whole run; the
/// caller's tree is never touched. It holds no clock of its own; the app
/// pumps `tick()` at the agreed rate.
pub struct RunCoordinator {
    sequence: ProgressCalculator,
    position: usize,
    current: Option<LeafTask>,
    next: Option<LeafTask>,
    timer: Option<TaskTimer>,
    ticks_per_sec: u32,
    is_finished: bool,
    halted: bool,
    started: bool,
    hub: EventHub<RunEvent>,
    timer_subs: Vec<(TimerTopic, Handler<TimerEvent>)>,
    finished_tasks: Vec<FinishedTask>,
}

impl RunCoordinator {
    /// Linearize and aggregate the plan. Fails fast with `MalformedTree` on
    /// structural violations; no partial execution is attempted.
    pub fn new(root: &TaskNode, ticks_per_sec: u32) -> Result<Self, EngineError> {
        let iterator = TreeIterator::new(root)?;
        Ok(Self {
            sequence: ProgressCalculator::new(iterator),
            position: 0,
            current: None,
            next: None,
            timer: None,
            ticks_per_sec,
            is_finished: false,
            halted: false,
            started: false,
            hub: EventHub::new(),
            timer_subs: Vec::new(),
            finished_tasks: Vec::new(),
        })
    }

    /// Subscribe to run-level events
    pub fn subscribe(
        &self,
        topic: RunTopic,
        handler: impl Fn(&RunEvent) + 'static,
    ) -> SubscriptionId {
        self.hub.subscribe(topic, handler)
    }

    /// Register a handler that is attached to every task timer this run
    /// creates. Must be called before `start` to catch the first task.
    pub fn on_timer(&mut self, topic: TimerTopic, handler: impl Fn(&TimerEvent) + 'static) {
        self.timer_subs.push((topic, Rc::new(handler)));
    }

    /// Begin the run. An empty plan publishes `Stop` immediately.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Err(EngineError::InvalidState("run already started"));
        }
        self.started = true;

        if self.sequence.is_empty() {
            self.halt();
            return Ok(());
        }

        self.position = 0;
        self.current = self.sequence.task_at(0).cloned();
        self.next = self.sequence.task_at(1).cloned();
        self.start_current_timer()
    }

    /// Pump one engine tick into the current task's timer
    pub fn tick(&mut self) -> Result<(), EngineError> {
        if self.halted {
            return Ok(());
        }
        let finished = self.timer.as_mut().and_then(|timer| timer.tick());
        match finished {
            Some(stats) => self.advance(stats),
            None => Ok(()),
        }
    }

    /// End the current task early, as if its duration had elapsed; the run
    /// then advances normally
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let timer = self
            .timer
            .as_mut()
            .ok_or(EngineError::InvalidState("no task is running"))?;
        let stats = timer.stop()?;
        self.advance(stats)
    }

    /// End the whole run after the current task, regardless of what is
    /// still queued
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.is_finished = true;
        self.stop()
    }

    /// Republish a pause-toggle notification, then flip the current timer
    pub fn toggle_pause(&mut self) -> Result<(), EngineError> {
        if self.timer.is_none() {
            return Err(EngineError::InvalidState("no task is running"));
        }
        self.hub.publish(&RunEvent::PauseToggle);
        match self.timer.as_mut() {
            Some(timer) => timer.toggle_pause(),
            None => Err(EngineError::InvalidState("no task is running")),
        }
    }

    pub fn current(&self) -> Option<&LeafTask> {
        self.current.as_ref()
    }

    pub fn next_task(&self) -> Option<&LeafTask> {
        self.next.as_ref()
    }

    /// Progress at the current position, while a task is active
    pub fn progress(&self) -> Option<ProgressInfo> {
        self.current.as_ref()?;
        Some(self.sequence.progress_at(self.position))
    }

    /// Remaining seconds from the start of the current task to the end of
    /// the plan, and whether that figure is exact
    pub fn remaining_from_current(&self) -> Option<(u64, bool)> {
        self.current.as_ref()?;
        Some(self.sequence.remaining_at(self.position))
    }

    pub fn finished(&self) -> &[FinishedTask] {
        &self.finished_tasks
    }

    /// True once `Stop` has been published; the coordinator ignores ticks
    /// from then on
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn start_current_timer(&mut self) -> Result<(), EngineError> {
        let task = self
            .current
            .clone()
            .ok_or(EngineError::InvalidState("no current task to start"))?;

        let mut timer = TaskTimer::new(task.duration, self.ticks_per_sec);
        for (topic, handler) in &self.timer_subs {
            timer.subscribe_handler(*topic, Rc::clone(handler));
        }
        timer.start()?;
        self.timer = Some(timer);

        let progress = self.sequence.progress_at(self.position);
        self.hub.publish(&RunEvent::StartTask {
            current: task,
            next: self.next.clone(),
            progress,
        });
        Ok(())
    }

    fn advance(&mut self, stats: TimeStats) -> Result<(), EngineError> {
        if let Some(task) = self.current.take() {
            self.finished_tasks.push(FinishedTask {
                id: task.id,
                title: task.title,
                stats,
                finished_at: Local::now(),
            });
        }
        self.hub.publish(&RunEvent::StopTask(stats));

        if self.next.is_none() || self.is_finished {
            self.halt();
            return Ok(());
        }

        self.current = self.next.take();
        self.position += 1;
        self.next = self.sequence.task_at(self.position + 1).cloned();
        self.start_current_timer()
    }

    fn halt(&mut self) {
        self.timer = None;
        self.halted = true;
        self.hub.publish(&RunEvent::Stop);
    }
}
