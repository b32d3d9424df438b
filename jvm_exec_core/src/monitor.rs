use crate::java_thread::ThreadId;
use crate::jvm_error::{VmError, VmExecResult};

/// Lock held on an object. Only present while `entry_count >= 1`: the exit that brings the
/// count to zero removes it from the object.
///
///https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-6.html#jvms-6.5.monitorenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    owner: ThreadId,
    entry_count: u32,
}

impl MonitorState {
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEnterOutcome {
    /// The thread holds the monitor, entered this many times.
    Acquired(u32),
    /// Another thread holds it. Nothing changed.
    Contended(ThreadId),
}

pub(crate) fn try_enter(
    monitor: &mut Option<MonitorState>,
    thread: ThreadId,
) -> VmExecResult<MonitorEnterOutcome> {
    if let Some(state) = monitor.as_mut() {
        if state.owner != thread {
            return Ok(MonitorEnterOutcome::Contended(state.owner));
        }
        state.entry_count = state.entry_count.checked_add(1).ok_or_else(|| {
            VmError::InternalInconsistency(format!("monitor entry count overflow in {thread}"))
        })?;
        return Ok(MonitorEnterOutcome::Acquired(state.entry_count));
    }
    *monitor = Some(MonitorState {
        owner: thread,
        entry_count: 1,
    });
    Ok(MonitorEnterOutcome::Acquired(1))
}

/// Returns the remaining entry count.
pub(crate) fn exit(monitor: &mut Option<MonitorState>, thread: ThreadId) -> VmExecResult<u32> {
    let state = monitor.as_mut().ok_or_else(|| {
        VmError::InternalInconsistency(format!("monitorexit by {thread} on an unlocked object"))
    })?;
    if state.owner != thread {
        return Err(VmError::InternalInconsistency(format!(
            "monitorexit by {thread} on a monitor owned by {}",
            state.owner
        )));
    }
    state.entry_count -= 1;
    let remaining = state.entry_count;
    if remaining == 0 {
        *monitor = None;
    }
    Ok(remaining)
}
