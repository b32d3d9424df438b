use crate::java_thread::{JavaThread, ThreadId, ThreadState};
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::Value;
use crate::object_heap::ObjectHeap;
use crate::stack_frame::MethodCode;
use indexmap::IndexMap;
use log::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Instructions a thread may complete in one turn.
    pub quantum: usize,
    /// Objects the heap can hold.
    pub heap_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            quantum: 16,
            heap_capacity: 1024,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub executed: usize,
    pub terminated: Vec<ThreadId>,
    pub waiting: Vec<ThreadId>,
}

impl RoundReport {
    pub fn made_progress(&self) -> bool {
        self.executed > 0 || !self.terminated.is_empty()
    }
}

/// Cooperative round-robin scheduler.
///
/// Only one thread runs at any time, so monitor transitions never race. A thread that meets a
/// contended monitor gives up the rest of its turn and retries the `monitorenter` on its next
/// one.
pub struct Scheduler<'a> {
    quantum: usize,
    heap: ObjectHeap,
    threads: IndexMap<ThreadId, JavaThread<'a>>,
    next_thread_id: u32,
}

impl<'a> Scheduler<'a> {
    pub fn new(config: SchedulerConfig) -> Scheduler<'a> {
        Scheduler {
            quantum: config.quantum.max(1),
            heap: ObjectHeap::new(config.heap_capacity),
            threads: IndexMap::new(),
            next_thread_id: 0,
        }
    }

    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        &mut self.heap
    }

    pub fn thread(&self, id: ThreadId) -> Option<&JavaThread<'a>> {
        self.threads.get(&id)
    }

    pub fn live_threads(&self) -> usize {
        self.threads.len()
    }

    /// Starts a thread executing `method` with `args` in its first local variables.
    pub fn spawn(&mut self, method: &MethodCode<'a>, args: Vec<Value>) -> VmExecResult<ThreadId> {
        let id = ThreadId(self.next_thread_id);
        let mut thread = JavaThread::new(id);
        thread.push_frame(method, args)?;
        self.next_thread_id += 1;
        self.threads.insert(id, thread);
        debug!("spawned {id}");
        Ok(id)
    }

    /// Gives every live thread one turn, in spawn order, and drops the threads that finished.
    pub fn run_round(&mut self) -> VmExecResult<RoundReport> {
        let mut report = RoundReport::default();
        for (id, thread) in self.threads.iter_mut() {
            let turn = thread
                .run_turn(&mut self.heap, self.quantum)
                .map_err(|e| {
                    error!("{id} aborted: {e}");
                    e
                })?;
            report.executed += turn.executed;
            match turn.state {
                ThreadState::Runnable => {}
                ThreadState::WaitingForMonitor => report.waiting.push(*id),
                ThreadState::Terminated => {
                    debug!("{id} terminated");
                    report.terminated.push(*id);
                }
            }
        }
        self.threads.retain(|_, thread| !thread.is_terminated());
        Ok(report)
    }

    /// Runs rounds until every thread has terminated. Returns the number of rounds.
    ///
    /// A round in which no thread completes an instruction means every live thread is waiting
    /// for a monitor that will never be released.
    pub fn run(&mut self) -> VmExecResult<usize> {
        let mut rounds = 0;
        while !self.threads.is_empty() {
            let report = self.run_round()?;
            rounds += 1;
            if !report.made_progress() {
                let blocked: Vec<ThreadId> = self.threads.keys().copied().collect();
                warn!("no thread can make progress, blocked: {blocked:?}");
                return Err(VmError::Deadlock(blocked));
            }
        }
        Ok(rounds)
    }
}
