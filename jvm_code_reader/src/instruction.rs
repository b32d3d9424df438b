use crate::byte_buffer::ByteBuffer;
use crate::code_read_error::{CodeReadError, Result};
use crate::opcode::Opcode;

//https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-6.html#jvms-6.5
/// A decoded instruction with its narrow operands.
///
/// `Wide` carries nothing: the secondary op code and the 16 bit operands that follow it are
/// read by the handler itself.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,

    Iload(u8),
    Lload(u8),
    Fload(u8),
    Dload(u8),
    Aload(u8),
    Iload_0,
    Iload_1,
    Iload_2,
    Iload_3,
    Lload_0,
    Lload_1,
    Lload_2,
    Lload_3,
    Fload_0,
    Fload_1,
    Fload_2,
    Fload_3,
    Dload_0,
    Dload_1,
    Dload_2,
    Dload_3,
    Aload_0,
    Aload_1,
    Aload_2,
    Aload_3,

    Istore(u8),
    Lstore(u8),
    Fstore(u8),
    Dstore(u8),
    Astore(u8),
    Istore_0,
    Istore_1,
    Istore_2,
    Istore_3,
    Lstore_0,
    Lstore_1,
    Lstore_2,
    Lstore_3,
    Fstore_0,
    Fstore_1,
    Fstore_2,
    Fstore_3,
    Dstore_0,
    Dstore_1,
    Dstore_2,
    Dstore_3,
    Astore_0,
    Astore_1,
    Astore_2,
    Astore_3,

    Pop,
    Pop2,
    Dup,
    Dup_x1,
    Dup_x2,
    Dup2,
    Dup2_x1,
    Dup2_x2,
    Swap,

    Iinc(u8, i8),
    Ret(u8),
    Invokedynamic(u16),
    Monitorenter,
    Monitorexit,
    Wide,

    Breakpoint,
    Impdep1,
    Impdep2,
}

pub fn read_opcode(buffer: &mut ByteBuffer) -> Result<Opcode> {
    let op_code = buffer.read_u8()?;
    Opcode::from_repr(op_code).ok_or(CodeReadError::UnsupportedOpcode(op_code))
}

pub fn read_one_instruction(buffer: &mut ByteBuffer) -> Result<Instruction> {
    let instruction = match read_opcode(buffer)? {
        Opcode::Nop => Instruction::Nop,

        Opcode::Iload => Instruction::Iload(buffer.read_u8()?),
        Opcode::Lload => Instruction::Lload(buffer.read_u8()?),
        Opcode::Fload => Instruction::Fload(buffer.read_u8()?),
        Opcode::Dload => Instruction::Dload(buffer.read_u8()?),
        Opcode::Aload => Instruction::Aload(buffer.read_u8()?),
        Opcode::Iload_0 => Instruction::Iload_0,
        Opcode::Iload_1 => Instruction::Iload_1,
        Opcode::Iload_2 => Instruction::Iload_2,
        Opcode::Iload_3 => Instruction::Iload_3,
        Opcode::Lload_0 => Instruction::Lload_0,
        Opcode::Lload_1 => Instruction::Lload_1,
        Opcode::Lload_2 => Instruction::Lload_2,
        Opcode::Lload_3 => Instruction::Lload_3,
        Opcode::Fload_0 => Instruction::Fload_0,
        Opcode::Fload_1 => Instruction::Fload_1,
        Opcode::Fload_2 => Instruction::Fload_2,
        Opcode::Fload_3 => Instruction::Fload_3,
        Opcode::Dload_0 => Instruction::Dload_0,
        Opcode::Dload_1 => Instruction::Dload_1,
        Opcode::Dload_2 => Instruction::Dload_2,
        Opcode::Dload_3 => Instruction::Dload_3,
        Opcode::Aload_0 => Instruction::Aload_0,
        Opcode::Aload_1 => Instruction::Aload_1,
        Opcode::Aload_2 => Instruction::Aload_2,
        Opcode::Aload_3 => Instruction::Aload_3,

        Opcode::Istore => Instruction::Istore(buffer.read_u8()?),
        Opcode::Lstore => Instruction::Lstore(buffer.read_u8()?),
        Opcode::Fstore => Instruction::Fstore(buffer.read_u8()?),
        Opcode::Dstore => Instruction::Dstore(buffer.read_u8()?),
        Opcode::Astore => Instruction::Astore(buffer.read_u8()?),
        Opcode::Istore_0 => Instruction::Istore_0,
        Opcode::Istore_1 => Instruction::Istore_1,
        Opcode::Istore_2 => Instruction::Istore_2,
        Opcode::Istore_3 => Instruction::Istore_3,
        Opcode::Lstore_0 => Instruction::Lstore_0,
        Opcode::Lstore_1 => Instruction::Lstore_1,
        Opcode::Lstore_2 => Instruction::Lstore_2,
        Opcode::Lstore_3 => Instruction::Lstore_3,
        Opcode::Fstore_0 => Instruction::Fstore_0,
        Opcode::Fstore_1 => Instruction::Fstore_1,
        Opcode::Fstore_2 => Instruction::Fstore_2,
        Opcode::Fstore_3 => Instruction::Fstore_3,
        Opcode::Dstore_0 => Instruction::Dstore_0,
        Opcode::Dstore_1 => Instruction::Dstore_1,
        Opcode::Dstore_2 => Instruction::Dstore_2,
        Opcode::Dstore_3 => Instruction::Dstore_3,
        Opcode::Astore_0 => Instruction::Astore_0,
        Opcode::Astore_1 => Instruction::Astore_1,
        Opcode::Astore_2 => Instruction::Astore_2,
        Opcode::Astore_3 => Instruction::Astore_3,

        Opcode::Pop => Instruction::Pop,
        Opcode::Pop2 => Instruction::Pop2,
        Opcode::Dup => Instruction::Dup,
        Opcode::Dup_x1 => Instruction::Dup_x1,
        Opcode::Dup_x2 => Instruction::Dup_x2,
        Opcode::Dup2 => Instruction::Dup2,
        Opcode::Dup2_x1 => Instruction::Dup2_x1,
        Opcode::Dup2_x2 => Instruction::Dup2_x2,
        Opcode::Swap => Instruction::Swap,

        Opcode::Iinc => {
            let (index, constant) = (buffer.read_u8()?, buffer.read_i8()?);
            Instruction::Iinc(index, constant)
        }
        Opcode::Ret => Instruction::Ret(buffer.read_u8()?),
        Opcode::Invokedynamic => {
            let index = buffer.read_u16()?;
            // the two trailing operand bytes are always zero
            buffer.read_u16()?;
            Instruction::Invokedynamic(index)
        }
        Opcode::Monitorenter => Instruction::Monitorenter,
        Opcode::Monitorexit => Instruction::Monitorexit,
        Opcode::Wide => Instruction::Wide,

        Opcode::Breakpoint => Instruction::Breakpoint,
        Opcode::Impdep1 => Instruction::Impdep1,
        Opcode::Impdep2 => Instruction::Impdep2,
    };
    Ok(instruction)
}
