use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::{Category, Value};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalValue {
    Entry(Value),
    /// Upper half of the category 2 value stored in the previous slot.
    PlaceHolder,
    Uninitialized,
}

/// Local variable array of one frame, `max_locals` slots long.
///
///https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-2.html#jvms-2.6.1
#[derive(Debug)]
pub struct LocalVariableTable {
    slots: Vec<LocalValue>,
}

impl LocalVariableTable {
    /// Lays out `args` from slot 0, long and double taking two slots each, and leaves the rest
    /// of the table uninitialized.
    pub fn new(max_locals: usize, args: Vec<Value>) -> VmExecResult<LocalVariableTable> {
        let mut table = LocalVariableTable {
            slots: vec![LocalValue::Uninitialized; max_locals],
        };
        let mut offset = 0;
        for value in args {
            table.set(offset, value)?;
            offset += value.category().slots();
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, offset: usize) -> VmExecResult<Value> {
        match self.slot(offset) {
            None => Err(VmError::IndexOutOfBounds),
            Some(LocalValue::Entry(value)) => Ok(*value),
            Some(LocalValue::PlaceHolder | LocalValue::Uninitialized) => {
                Err(VmError::InvalidLocal(offset))
            }
        }
    }

    pub fn slot(&self, offset: usize) -> Option<&LocalValue> {
        self.slots.get(offset)
    }

    pub fn set(&mut self, offset: usize, value: Value) -> VmExecResult<()> {
        let width = value.category().slots();
        if offset + width > self.slots.len() {
            return Err(VmError::IndexOutOfBounds);
        }
        // a wide value starting one slot below loses its upper half
        if let Some(previous) = offset.checked_sub(1) {
            if let LocalValue::Entry(v) = self.slots[previous] {
                if v.category() == Category::Two {
                    self.slots[previous] = LocalValue::Uninitialized;
                }
            }
        }
        // a wide value that started here loses its upper half
        let last = offset + width - 1;
        if let Some(LocalValue::PlaceHolder) = self.slots.get(last + 1) {
            if let LocalValue::Entry(v) = self.slots[last] {
                if v.category() == Category::Two {
                    self.slots[last + 1] = LocalValue::Uninitialized;
                }
            }
        }
        self.slots[offset] = LocalValue::Entry(value);
        if width == 2 {
            self.slots[offset + 1] = LocalValue::PlaceHolder;
        }
        trace!("--- local variables --- {:?}", self.slots);
        Ok(())
    }
}
