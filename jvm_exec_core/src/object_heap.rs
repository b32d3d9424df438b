use crate::java_thread::ThreadId;
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::ObjectReference;
use crate::monitor::{self, MonitorEnterOutcome, MonitorState};
use log::debug;

#[derive(Debug)]
pub struct HeapObject {
    class_name: String,
    monitor: Option<MonitorState>,
}

impl HeapObject {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// `None` while the object is unlocked.
    pub fn monitor(&self) -> Option<&MonitorState> {
        self.monitor.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.monitor.is_some()
    }
}

/// Object store shared by every thread. Objects are never moved or freed, a reference is the
/// index of the object.
pub struct ObjectHeap {
    objects: Vec<HeapObject>,
    capacity: usize,
}

impl ObjectHeap {
    pub fn new(capacity: usize) -> ObjectHeap {
        ObjectHeap {
            objects: Vec::new(),
            capacity,
        }
    }

    pub fn allocate_object(&mut self, class_name: &str) -> VmExecResult<ObjectReference> {
        if self.objects.len() >= self.capacity {
            return Err(VmError::OutOfMemory);
        }
        let reference = ObjectReference(self.objects.len() as u32);
        self.objects.push(HeapObject {
            class_name: class_name.to_string(),
            monitor: None,
        });
        Ok(reference)
    }

    pub fn get(&self, reference: ObjectReference) -> VmExecResult<&HeapObject> {
        self.objects
            .get(reference.index())
            .ok_or(VmError::InvalidObjectReference(reference.0))
    }

    fn get_mut(&mut self, reference: ObjectReference) -> VmExecResult<&mut HeapObject> {
        self.objects
            .get_mut(reference.index())
            .ok_or(VmError::InvalidObjectReference(reference.0))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn monitor_enter(
        &mut self,
        reference: ObjectReference,
        thread: ThreadId,
    ) -> VmExecResult<MonitorEnterOutcome> {
        let object = self.get_mut(reference)?;
        let outcome = monitor::try_enter(&mut object.monitor, thread)?;
        let class_name = object.class_name();
        match outcome {
            MonitorEnterOutcome::Acquired(count) => {
                debug!("{thread} entered monitor of {class_name}{reference} (count {count})")
            }
            MonitorEnterOutcome::Contended(owner) => {
                debug!("{thread} contends for monitor of {class_name}{reference} held by {owner}")
            }
        }
        Ok(outcome)
    }

    pub fn monitor_exit(&mut self, reference: ObjectReference, thread: ThreadId) -> VmExecResult<()> {
        let object = self.get_mut(reference)?;
        let remaining = monitor::exit(&mut object.monitor, thread)?;
        let class_name = object.class_name();
        if remaining == 0 {
            debug!("{thread} released monitor of {class_name}{reference}");
        } else {
            debug!("{thread} exited monitor of {class_name}{reference} (count {remaining})");
        }
        Ok(())
    }
}
