use crate::java_thread::ThreadId;
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::Value::{self, Double, Float, Int, Long, ObjectRef, ReturnAddress};
use crate::jvm_values::ObjectReference;
use crate::local_variables::LocalVariableTable;
use crate::monitor::MonitorEnterOutcome;
use crate::object_heap::ObjectHeap;
use crate::operand_stack::OperandStack;
use jvm_code_reader::byte_buffer::ByteBuffer;
use jvm_code_reader::instruction::{read_one_instruction, Instruction};
use jvm_code_reader::opcode::Opcode;
use log::{log_enabled, trace, Level};

/// What the thread should do after an instruction.
#[derive(Debug, PartialEq, Eq)]
pub enum InstructionResult {
    ContinueMethodExecution,
    /// `monitorenter` found the monitor held by another thread. The frame is back in the state
    /// it had before the instruction, so the next step retries it.
    YieldThreadTurn,
    ReachedEndOfCode,
}

/// The code attribute of a method, as far as execution is concerned.
#[derive(Debug, Clone, Copy)]
pub struct MethodCode<'a> {
    pub code: &'a [u8],
    pub max_stack: u16,
    pub max_locals: u16,
}

pub struct StackFrame<'a> {
    pub(crate) thread_id: ThreadId,
    /// offset of the instruction being executed
    pub(crate) pc: usize,
    //复用bytebuffer。包含了下一条指令的位置和code
    pub(crate) byte_buffer: ByteBuffer<'a>,
    pub(crate) local_var_table: LocalVariableTable,
    pub(crate) op_stack: OperandStack,
}

macro_rules! generate_load {
    ($name:ident, $variant:ident) => {
        fn $name(&mut self, index: usize) -> VmExecResult<()> {
            let local = self.get_local(index)?;
            match local {
                $variant(..) => self.push(local),
                _ => Err(VmError::ValueTypeMissMatch),
            }
        }
    };
}

macro_rules! generate_store {
    ($name:ident, $variant:ident) => {
        fn $name(&mut self, index: usize) -> VmExecResult<()> {
            let value = self.pop()?;
            match value {
                $variant(..) => self.set_local(index, value),
                _ => Err(VmError::ValueTypeMissMatch),
            }
        }
    };
}

impl<'a> StackFrame<'a> {
    pub fn new(
        thread_id: ThreadId,
        method: &MethodCode<'a>,
        args: Vec<Value>,
    ) -> VmExecResult<StackFrame<'a>> {
        Ok(StackFrame {
            thread_id,
            pc: 0,
            byte_buffer: ByteBuffer::new(method.code),
            local_var_table: LocalVariableTable::new(method.max_locals as usize, args)?,
            op_stack: OperandStack::new(method.max_stack as usize),
        })
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn op_stack(&self) -> &OperandStack {
        &self.op_stack
    }

    pub fn local_variables(&self) -> &LocalVariableTable {
        &self.local_var_table
    }

    pub fn pop(&mut self) -> VmExecResult<Value> {
        self.op_stack.pop()
    }

    pub fn push(&mut self, value: Value) -> VmExecResult<()> {
        self.op_stack.push(value)
    }

    pub fn get_local(&self, offset: usize) -> VmExecResult<Value> {
        self.local_var_table.get(offset)
    }

    pub fn set_local(&mut self, offset: usize, value: Value) -> VmExecResult<()> {
        self.local_var_table.set(offset, value)
    }

    pub fn is_code_exhausted(&self) -> bool {
        !self.byte_buffer.has_more_data()
    }

    /// Moves execution to the instruction at `new_pc`, which must lie inside the code.
    fn goto(&mut self, new_pc: usize) -> VmExecResult<()> {
        let code_length = self.byte_buffer.len();
        if new_pc >= code_length {
            return Err(VmError::MalformedBytecode(format!(
                "jump target {new_pc} is outside of {code_length} bytes of code"
            )));
        }
        self.byte_buffer.jump_to(new_pc)?;
        self.pc = new_pc;
        Ok(())
    }

    generate_load!(exec_iload, Int);
    generate_load!(exec_lload, Long);
    generate_load!(exec_fload, Float);
    generate_load!(exec_dload, Double);

    fn exec_aload(&mut self, index: usize) -> VmExecResult<()> {
        let local = self.get_local(index)?;
        if local.is_reference_or_null() {
            self.push(local)
        } else {
            Err(VmError::ValueTypeMissMatch)
        }
    }

    generate_store!(exec_istore, Int);
    generate_store!(exec_lstore, Long);
    generate_store!(exec_fstore, Float);
    generate_store!(exec_dstore, Double);

    /// `astore` also takes the return address pushed by `jsr`.
    fn exec_astore(&mut self, index: usize) -> VmExecResult<()> {
        let value = self.pop()?;
        match value {
            ObjectRef(_) | Value::Null | ReturnAddress(_) => self.set_local(index, value),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    fn exec_iinc(&mut self, index: usize, constant: i32) -> VmExecResult<()> {
        if let Int(value) = self.get_local(index)? {
            self.set_local(index, Int(value.wrapping_add(constant)))
        } else {
            Err(VmError::ValueTypeMissMatch)
        }
    }

    fn exec_ret(&mut self, index: usize) -> VmExecResult<()> {
        if let ReturnAddress(address) = self.get_local(index)? {
            self.goto(address as usize)
        } else {
            Err(VmError::ValueTypeMissMatch)
        }
    }

    fn pop_object(&mut self) -> VmExecResult<ObjectReference> {
        match self.pop()? {
            ObjectRef(reference) => Ok(reference),
            Value::Null => Err(VmError::NullPointer),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    fn exec_monitorenter(&mut self, heap: &mut ObjectHeap) -> VmExecResult<InstructionResult> {
        let reference = self.pop_object()?;
        match heap.monitor_enter(reference, self.thread_id)? {
            MonitorEnterOutcome::Acquired(_) => Ok(InstructionResult::ContinueMethodExecution),
            MonitorEnterOutcome::Contended(_) => {
                self.push(ObjectRef(reference))?;
                self.goto(self.pc)?;
                Ok(InstructionResult::YieldThreadTurn)
            }
        }
    }

    fn exec_monitorexit(&mut self, heap: &mut ObjectHeap) -> VmExecResult<()> {
        let reference = self.pop_object()?;
        heap.monitor_exit(reference, self.thread_id)
    }

    /// `wide <opcode> indexbyte1 indexbyte2 [constbyte1 constbyte2]`
    ///
    /// Re-runs the narrow handler of the modified instruction with the 16 bit index.
    fn exec_wide(&mut self) -> VmExecResult<()> {
        let op_code = self.byte_buffer.read_u8()?;
        let opcode = Opcode::from_repr(op_code)
            .filter(Opcode::is_widenable)
            .ok_or_else(|| {
                VmError::InternalInconsistency(format!("wide cannot modify op code {op_code:#04x}"))
            })?;
        let index = self.byte_buffer.read_u16()? as usize;
        match opcode {
            Opcode::Iinc => {
                let constant = self.byte_buffer.read_i16()?;
                self.exec_iinc(index, constant as i32)
            }
            Opcode::Iload => self.exec_iload(index),
            Opcode::Lload => self.exec_lload(index),
            Opcode::Fload => self.exec_fload(index),
            Opcode::Dload => self.exec_dload(index),
            Opcode::Aload => self.exec_aload(index),
            Opcode::Istore => self.exec_istore(index),
            Opcode::Lstore => self.exec_lstore(index),
            Opcode::Fstore => self.exec_fstore(index),
            Opcode::Dstore => self.exec_dstore(index),
            Opcode::Astore => self.exec_astore(index),
            Opcode::Ret => self.exec_ret(index),
            _ => Err(VmError::InternalInconsistency(format!(
                "wide cannot modify {opcode}"
            ))),
        }
    }

    pub fn execute_instruction(
        &mut self,
        heap: &mut ObjectHeap,
        instruction: Instruction,
    ) -> VmExecResult<InstructionResult> {
        if log_enabled!(Level::Trace) {
            trace!("{} exec {:?} at {}", self.thread_id, instruction, self.pc);
        }
        match instruction {
            Instruction::Nop => {}

            Instruction::Iload(index) => self.exec_iload(index as usize)?,
            Instruction::Lload(index) => self.exec_lload(index as usize)?,
            Instruction::Fload(index) => self.exec_fload(index as usize)?,
            Instruction::Dload(index) => self.exec_dload(index as usize)?,
            Instruction::Aload(index) => self.exec_aload(index as usize)?,
            Instruction::Iload_0 => self.exec_iload(0)?,
            Instruction::Iload_1 => self.exec_iload(1)?,
            Instruction::Iload_2 => self.exec_iload(2)?,
            Instruction::Iload_3 => self.exec_iload(3)?,
            Instruction::Lload_0 => self.exec_lload(0)?,
            Instruction::Lload_1 => self.exec_lload(1)?,
            Instruction::Lload_2 => self.exec_lload(2)?,
            Instruction::Lload_3 => self.exec_lload(3)?,
            Instruction::Fload_0 => self.exec_fload(0)?,
            Instruction::Fload_1 => self.exec_fload(1)?,
            Instruction::Fload_2 => self.exec_fload(2)?,
            Instruction::Fload_3 => self.exec_fload(3)?,
            Instruction::Dload_0 => self.exec_dload(0)?,
            Instruction::Dload_1 => self.exec_dload(1)?,
            Instruction::Dload_2 => self.exec_dload(2)?,
            Instruction::Dload_3 => self.exec_dload(3)?,
            Instruction::Aload_0 => self.exec_aload(0)?,
            Instruction::Aload_1 => self.exec_aload(1)?,
            Instruction::Aload_2 => self.exec_aload(2)?,
            Instruction::Aload_3 => self.exec_aload(3)?,

            Instruction::Istore(index) => self.exec_istore(index as usize)?,
            Instruction::Lstore(index) => self.exec_lstore(index as usize)?,
            Instruction::Fstore(index) => self.exec_fstore(index as usize)?,
            Instruction::Dstore(index) => self.exec_dstore(index as usize)?,
            Instruction::Astore(index) => self.exec_astore(index as usize)?,
            Instruction::Istore_0 => self.exec_istore(0)?,
            Instruction::Istore_1 => self.exec_istore(1)?,
            Instruction::Istore_2 => self.exec_istore(2)?,
            Instruction::Istore_3 => self.exec_istore(3)?,
            Instruction::Lstore_0 => self.exec_lstore(0)?,
            Instruction::Lstore_1 => self.exec_lstore(1)?,
            Instruction::Lstore_2 => self.exec_lstore(2)?,
            Instruction::Lstore_3 => self.exec_lstore(3)?,
            Instruction::Fstore_0 => self.exec_fstore(0)?,
            Instruction::Fstore_1 => self.exec_fstore(1)?,
            Instruction::Fstore_2 => self.exec_fstore(2)?,
            Instruction::Fstore_3 => self.exec_fstore(3)?,
            Instruction::Dstore_0 => self.exec_dstore(0)?,
            Instruction::Dstore_1 => self.exec_dstore(1)?,
            Instruction::Dstore_2 => self.exec_dstore(2)?,
            Instruction::Dstore_3 => self.exec_dstore(3)?,
            Instruction::Astore_0 => self.exec_astore(0)?,
            Instruction::Astore_1 => self.exec_astore(1)?,
            Instruction::Astore_2 => self.exec_astore(2)?,
            Instruction::Astore_3 => self.exec_astore(3)?,

            Instruction::Pop => self.op_stack.pop_category1()?,
            Instruction::Pop2 => self.op_stack.pop2()?,
            Instruction::Dup => self.op_stack.dup()?,
            Instruction::Dup_x1 => self.op_stack.dup_x1()?,
            Instruction::Dup_x2 => self.op_stack.dup_x2()?,
            Instruction::Dup2 => self.op_stack.dup2()?,
            Instruction::Dup2_x1 => self.op_stack.dup2_x1()?,
            Instruction::Dup2_x2 => self.op_stack.dup2_x2()?,
            Instruction::Swap => self.op_stack.swap()?,

            Instruction::Iinc(index, constant) => self.exec_iinc(index as usize, constant as i32)?,
            Instruction::Ret(index) => self.exec_ret(index as usize)?,
            Instruction::Monitorenter => return self.exec_monitorenter(heap),
            Instruction::Monitorexit => self.exec_monitorexit(heap)?,
            Instruction::Wide => self.exec_wide()?,

            Instruction::Invokedynamic(index) => {
                return Err(VmError::UnsupportedFeature(format!(
                    "invokedynamic #{index}: call site linkage is not supported"
                )));
            }
            Instruction::Breakpoint | Instruction::Impdep1 | Instruction::Impdep2 => {
                return Err(VmError::MalformedBytecode(format!(
                    "reserved instruction {instruction:?} at {} must not appear in a class file",
                    self.pc
                )));
            }
        }
        Ok(InstructionResult::ContinueMethodExecution)
    }

    /// Decodes the instruction at the current position, remembering where it starts.
    pub fn read_instruction(&mut self) -> VmExecResult<Instruction> {
        self.pc = self.byte_buffer.position;
        Ok(read_one_instruction(&mut self.byte_buffer)?)
    }

    pub fn step(&mut self, heap: &mut ObjectHeap) -> VmExecResult<InstructionResult> {
        if self.is_code_exhausted() {
            return Ok(InstructionResult::ReachedEndOfCode);
        }
        let instruction = self.read_instruction()?;
        self.execute_instruction(heap, instruction)
    }
}
