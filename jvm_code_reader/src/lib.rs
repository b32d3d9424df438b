pub mod byte_buffer;
pub mod code_read_error;
pub mod instruction;
pub mod opcode;
