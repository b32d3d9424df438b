use crate::java_thread::ThreadId;
use jvm_code_reader::code_read_error::CodeReadError;
use thiserror::Error;

/// Fatal conditions raised while executing code. None of them is retried: they abort the
/// running thread and surface to whoever drives the scheduler.
///
/// Monitor contention is not an error, see `InstructionResult::YieldThreadTurn`.
#[derive(Error, Debug, PartialEq)]
pub enum VmError {
    #[error("InternalInconsistency {0}")]
    InternalInconsistency(String),
    #[error("MalformedBytecode {0}")]
    MalformedBytecode(String),
    #[error("UnsupportedFeature {0}")]
    UnsupportedFeature(String),
    #[error("CodeReadError {0}")]
    CodeRead(#[from] CodeReadError),

    #[error("value type miss match")]
    ValueTypeMissMatch,
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("local variable {0} holds no readable value")]
    InvalidLocal(usize),
    #[error("can't pop from empty stack")]
    PopFromEmptyStack,
    #[error("stack over flow")]
    StackOverFlow,

    #[error("NullPointerException")]
    NullPointer,
    #[error("invalid object reference {0}")]
    InvalidObjectReference(u32),
    #[error("out of memory")]
    OutOfMemory,
    #[error("deadlock between threads {0:?}")]
    Deadlock(Vec<ThreadId>),
}

pub type VmExecResult<T> = Result<T, VmError>;
