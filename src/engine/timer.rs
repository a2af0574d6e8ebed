use super::EngineError;
use crate::events::{EventHub, Handler, SubscriptionId, Topical};

/// Lifecycle of one task timer. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Initialized,
    Running,
    Paused,
    Finished,
}

/// Final accounting for one task, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStats {
    pub running_time: u64,
    pub paused_time: u64,
}

/// Events published by a task timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Start,
    PauseOn,
    PauseOff,
    /// Every running tick, with the running tick count
    Tick(u64),
    /// Every whole second of running time
    TickSecond(u64),
    /// Every paused tick, with the paused tick count
    PauseTick(u64),
    /// Every whole second of paused time
    PauseTickSecond(u64),
    Stop(TimeStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTopic {
    Start,
    PauseOn,
    PauseOff,
    Tick,
    TickSecond,
    PauseTick,
    PauseTickSecond,
    Stop,
}

impl Topical for TimerEvent {
    type Topic = TimerTopic;

    fn topic(&self) -> TimerTopic {
        match self {
            TimerEvent::Start => TimerTopic::Start,
            TimerEvent::PauseOn => TimerTopic::PauseOn,
            TimerEvent::PauseOff => TimerTopic::PauseOff,
            TimerEvent::Tick(_) => TimerTopic::Tick,
            TimerEvent::TickSecond(_) => TimerTopic::TickSecond,
            TimerEvent::PauseTick(_) => TimerTopic::PauseTick,
            TimerEvent::PauseTickSecond(_) => TimerTopic::PauseTickSecond,
            TimerEvent::Stop(_) => TimerTopic::Stop,
        }
    }
}

/// Tick-driven state machine counting one task's running and paused time.
///
/// The timer does not own a clock; the caller feeds it ticks at the agreed
/// rate. Fixed-duration timers finish themselves on the whole-second
/// boundary that reaches their duration; stopwatches run until `stop`.
pub struct TaskTimer {
    duration: Option<u32>,
    ticks_per_sec: u32,
    run_ticks: u64,
    total_ticks: u64,
    state: TimerState,
    hub: EventHub<TimerEvent>,
}

impl TaskTimer {
    /// `duration` in seconds; `None` makes an open-ended stopwatch
    pub fn new(duration: Option<u32>, ticks_per_sec: u32) -> Self {
        Self {
            duration,
            ticks_per_sec,
            run_ticks: 0,
            total_ticks: 0,
            state: TimerState::Initialized,
            hub: EventHub::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.run_ticks / u64::from(self.ticks_per_sec)
    }

    fn pause_ticks(&self) -> u64 {
        self.total_ticks - self.run_ticks
    }

    fn stats(&self) -> TimeStats {
        TimeStats {
            running_time: self.run_ticks / u64::from(self.ticks_per_sec),
            paused_time: self.pause_ticks() / u64::from(self.ticks_per_sec),
        }
    }

    pub fn subscribe(
        &self,
        topic: TimerTopic,
        handler: impl Fn(&TimerEvent) + 'static,
    ) -> SubscriptionId {
        self.hub.subscribe(topic, handler)
    }

    pub fn subscribe_handler(&self, topic: TimerTopic, handler: Handler<TimerEvent>) -> SubscriptionId {
        self.hub.subscribe_handler(topic, handler)
    }

    /// Initialized → Running
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.state != TimerState::Initialized {
            return Err(EngineError::InvalidState("timer already started"));
        }
        self.state = TimerState::Running;
        self.hub.publish(&TimerEvent::Start);
        Ok(())
    }

    /// Finish the timer now and publish the final stats. Calling this on a
    /// timer that already finished is a caller error.
    pub fn stop(&mut self) -> Result<TimeStats, EngineError> {
        if self.state == TimerState::Finished {
            return Err(EngineError::InvalidState("timer already finished"));
        }
        Ok(self.finish())
    }

    /// Running ↔ Paused
    pub fn toggle_pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.hub.publish(&TimerEvent::PauseOn);
                Ok(())
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.hub.publish(&TimerEvent::PauseOff);
                Ok(())
            }
            _ => Err(EngineError::InvalidState(
                "pause toggled while not running or paused",
            )),
        }
    }

    /// Advance by one tick. Returns the final stats when this tick finished
    /// a fixed-duration timer. Ticks arriving while Initialized or Finished
    /// are ignored; a straggler tick from the pump is not a state violation.
    pub fn tick(&mut self) -> Option<TimeStats> {
        match self.state {
            TimerState::Running => {
                self.total_ticks += 1;
                self.run_ticks += 1;
                self.hub.publish(&TimerEvent::Tick(self.run_ticks));

                if self.run_ticks % u64::from(self.ticks_per_sec) == 0 {
                    let seconds = self.elapsed_seconds();
                    self.hub.publish(&TimerEvent::TickSecond(seconds));

                    if let Some(duration) = self.duration.filter(|d| *d > 0) {
                        if seconds >= u64::from(duration) {
                            return Some(self.finish());
                        }
                    }
                }
                None
            }
            TimerState::Paused => {
                self.total_ticks += 1;
                let pause_ticks = self.pause_ticks();
                self.hub.publish(&TimerEvent::PauseTick(pause_ticks));

                if pause_ticks % u64::from(self.ticks_per_sec) == 0 {
                    self.hub.publish(&TimerEvent::PauseTickSecond(
                        pause_ticks / u64::from(self.ticks_per_sec),
                    ));
                }
                None
            }
            TimerState::Initialized | TimerState::Finished => None,
        }
    }

    fn finish(&mut self) -> TimeStats {
        self.state = TimerState::Finished;
        let stats = self.stats();
        self.hub.publish(&TimerEvent::Stop(stats));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tick_n(timer: &mut TaskTimer, n: u64) -> Option<TimeStats> {
        let mut finished = None;
        for _ in 0..n {
            if let Some(stats) = timer.tick() {
                finished = Some(stats);
            }
        }
        finished
    }

    #[test]
    fn test_five_second_timer_round_trip() {
        let mut timer = TaskTimer::new(Some(5), 50);
        timer.start().unwrap();

        let stats = tick_n(&mut timer, 250);
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(
            stats,
            Some(TimeStats {
                running_time: 5,
                paused_time: 0
            })
        );
    }

    #[test]
    fn test_finishes_exactly_on_boundary() {
        let mut timer = TaskTimer::new(Some(5), 50);
        timer.start().unwrap();

        assert!(tick_n(&mut timer, 249).is_none());
        assert_eq!(timer.state(), TimerState::Running);
        assert!(timer.tick().is_some());
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn test_stopwatch_never_auto_finishes() {
        let mut timer = TaskTimer::new(None, 50);
        timer.start().unwrap();

        assert!(tick_n(&mut timer, 10_000).is_none());
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.elapsed_seconds(), 200);

        let stats = timer.stop().unwrap();
        assert_eq!(stats.running_time, 200);
        assert_eq!(stats.paused_time, 0);
    }

    #[test]
    fn test_pause_accounting() {
        let mut timer = TaskTimer::new(Some(5), 50);
        timer.start().unwrap();

        tick_n(&mut timer, 100);
        timer.toggle_pause().unwrap();
        tick_n(&mut timer, 75);
        timer.toggle_pause().unwrap();
        let stats = tick_n(&mut timer, 150);

        // 250 run ticks at 50/s = 5s; 75 pause ticks floor to 1s
        assert_eq!(
            stats,
            Some(TimeStats {
                running_time: 5,
                paused_time: 1
            })
        );
    }

    #[test]
    fn test_second_events() {
        let mut timer = TaskTimer::new(Some(3), 50);
        let seconds = Rc::new(RefCell::new(Vec::new()));

        let seconds_sub = Rc::clone(&seconds);
        timer.subscribe(TimerTopic::TickSecond, move |event| {
            if let TimerEvent::TickSecond(n) = event {
                seconds_sub.borrow_mut().push(*n);
            }
        });

        timer.start().unwrap();
        tick_n(&mut timer, 150);
        assert_eq!(*seconds.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pause_second_events() {
        let mut timer = TaskTimer::new(None, 50);
        let paused_seconds = Rc::new(RefCell::new(Vec::new()));

        let paused_sub = Rc::clone(&paused_seconds);
        timer.subscribe(TimerTopic::PauseTickSecond, move |event| {
            if let TimerEvent::PauseTickSecond(n) = event {
                paused_sub.borrow_mut().push(*n);
            }
        });

        timer.start().unwrap();
        tick_n(&mut timer, 10);
        timer.toggle_pause().unwrap();
        tick_n(&mut timer, 120);

        assert_eq!(*paused_seconds.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_stop_publishes_stop_event() {
        let mut timer = TaskTimer::new(None, 50);
        let stopped = Rc::new(RefCell::new(None));

        let stopped_sub = Rc::clone(&stopped);
        timer.subscribe(TimerTopic::Stop, move |event| {
            if let TimerEvent::Stop(stats) = event {
                *stopped_sub.borrow_mut() = Some(*stats);
            }
        });

        timer.start().unwrap();
        tick_n(&mut timer, 60);
        timer.stop().unwrap();

        assert_eq!(
            *stopped.borrow(),
            Some(TimeStats {
                running_time: 1,
                paused_time: 0
            })
        );
    }

    #[test]
    fn test_invalid_transitions() {
        let mut timer = TaskTimer::new(Some(1), 50);

        // Pause before start
        assert!(timer.toggle_pause().is_err());

        timer.start().unwrap();
        assert!(timer.start().is_err());

        tick_n(&mut timer, 50);
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.toggle_pause().is_err());
        assert!(timer.stop().is_err());
    }

    #[test]
    fn test_ticks_ignored_outside_running_or_paused() {
        let mut timer = TaskTimer::new(Some(1), 50);
        assert!(timer.tick().is_none());
        assert_eq!(timer.elapsed_seconds(), 0);

        timer.start().unwrap();
        tick_n(&mut timer, 50);
        assert_eq!(timer.state(), TimerState::Finished);

        assert!(timer.tick().is_none());
        assert_eq!(timer.elapsed_seconds(), 1);
    }
}
