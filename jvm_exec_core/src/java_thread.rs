use crate::jvm_error::VmExecResult;
use crate::jvm_values::Value;
use crate::object_heap::ObjectHeap;
use crate::stack_frame::{InstructionResult, MethodCode, StackFrame};
use log::debug;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u32);

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thread-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Runnable,
    /// Gave up its turn on a contended `monitorenter`, retried on the next turn.
    WaitingForMonitor,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub executed: usize,
    pub state: ThreadState,
}

/// A logical thread: its own stack of frames, stepped by the scheduler one turn at a time.
pub struct JavaThread<'a> {
    id: ThreadId,
    frames: Vec<StackFrame<'a>>,
}

impl<'a> JavaThread<'a> {
    pub fn new(id: ThreadId) -> JavaThread<'a> {
        JavaThread {
            id,
            frames: Vec::new(),
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_frame(&self) -> Option<&StackFrame<'a>> {
        self.frames.last()
    }

    pub fn push_frame(&mut self, method: &MethodCode<'a>, args: Vec<Value>) -> VmExecResult<()> {
        let frame = StackFrame::new(self.id, method, args)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Executes at most `quantum` instructions. A frame whose code is exhausted is dropped and
    /// execution continues in the frame below it.
    pub fn run_turn(&mut self, heap: &mut ObjectHeap, quantum: usize) -> VmExecResult<TurnReport> {
        let mut executed = 0;
        while executed < quantum {
            let Some(frame) = self.frames.last_mut() else {
                break;
            };
            match frame.step(heap)? {
                InstructionResult::ContinueMethodExecution => executed += 1,
                InstructionResult::YieldThreadTurn => {
                    return Ok(TurnReport {
                        executed,
                        state: ThreadState::WaitingForMonitor,
                    });
                }
                InstructionResult::ReachedEndOfCode => {
                    self.frames.pop();
                    debug!("{} left a frame, depth {}", self.id, self.frames.len());
                }
            }
        }
        let state = if self.is_terminated() {
            ThreadState::Terminated
        } else {
            ThreadState::Runnable
        };
        Ok(TurnReport { executed, state })
    }
}
