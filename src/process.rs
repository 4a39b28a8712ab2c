//! The cooperative round-robin scheduler for long-running bot tasks.
//!
//! Grounded on `bot_queueProcess`/`bot_dequeueProcess`/`bot_findProcessByPid`/
//! `bot_updateProcesses`: a FIFO of processes visited in round-robin order,
//! each getting at most one step per elapsed work slot.

use std::collections::VecDeque;

use irc_proto::limits::MSG_PER_SECOND_LIM;

/// One step of cooperative work. A negative-equivalent result
/// ([`StepResult::Done`]) dequeues and drops the process; anything else
/// keeps it scheduled.
pub enum StepResult {
    /// More work remains; reschedule for the next round.
    Continue,
    /// This process is finished and should be removed.
    Done,
}

/// A unit of long-running work the engine schedules cooperatively.
///
/// Implementors own whatever state their task needs; dropping a
/// `ProcessStep` (when the process completes or is cancelled) is the
/// direct analogue of the original scheduler's per-process free hook.
pub trait ProcessStep {
    /// Performs one bounded unit of work.
    fn step(&mut self) -> StepResult;
}

/// A single scheduled process.
pub struct Process {
    pid: u32,
    step: Box<dyn ProcessStep>,
    details: String,
    updated_at_ms: u64,
}

impl Process {
    /// The process's unique id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// A human-readable description, formatted as `"PID: <pid>: <cmd> - <caller>"`.
    pub fn details(&self) -> &str {
        &self.details
    }
}

/// The round-robin queue of scheduled processes.
#[derive(Default)]
pub struct ProcessQueue {
    processes: VecDeque<Process>,
    current: usize,
    pid_ticker: u32,
}

impl ProcessQueue {
    /// Creates an empty scheduler queue.
    pub fn new() -> ProcessQueue {
        ProcessQueue::default()
    }

    /// Schedules a new process, returning its assigned pid.
    pub fn enqueue(&mut self, step: Box<dyn ProcessStep>, cmd: &str, caller: &str, now_ms: u64) -> u32 {
        self.pid_ticker += 1;
        let pid = self.pid_ticker;
        self.processes.push_back(Process {
            pid,
            step,
            details: format!("PID: {}: {} - {}", pid, cmd, caller),
            updated_at_ms: now_ms,
        });
        pid
    }

    /// Removes and drops the process with the given pid, if present.
    pub fn dequeue_by_pid(&mut self, pid: u32) -> bool {
        if let Some(idx) = self.processes.iter().position(|p| p.pid == pid) {
            self.processes.remove(idx);
            if self.current > idx {
                self.current -= 1;
            }
            if self.current >= self.processes.len() {
                self.current = 0;
            }
            true
        } else {
            false
        }
    }

    /// Looks up a process's details by pid.
    pub fn find_by_pid(&self, pid: u32) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    /// Number of currently scheduled processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// True if no processes are scheduled.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Advances the scheduler by one slot: the process at `current` either
    /// runs (if its work-slot interval has elapsed) or is skipped to
    /// preserve fairness pacing, then `current` advances.
    pub fn tick(&mut self, now_ms: u64) {
        if self.processes.is_empty() {
            return;
        }
        if self.current >= self.processes.len() {
            self.current = 0;
        }

        let interval_ms = 1000 / MSG_PER_SECOND_LIM;
        let idx = self.current;
        let elapsed = now_ms.saturating_sub(self.processes[idx].updated_at_ms) > interval_ms;

        if elapsed {
            self.processes[idx].updated_at_ms = now_ms;
            let result = self.processes[idx].step.step();
            match result {
                StepResult::Done => {
                    self.processes.remove(idx);
                    if !self.processes.is_empty() {
                        self.current = idx % self.processes.len();
                    } else {
                        self.current = 0;
                    }
                    return;
                }
                StepResult::Continue => {}
            }
        }

        if !self.processes.is_empty() {
            self.current = (self.current + 1) % self.processes.len();
        }
    }
}
