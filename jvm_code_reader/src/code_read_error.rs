use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Models the possible errors returned when reading the code of a method
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CodeReadError {
    UnexpectedEndOfCode,
    UnsupportedOpcode(u8),
    InvalidJumpTarget(usize),
}

impl Display for CodeReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeReadError::UnexpectedEndOfCode => write!(f, "unexpected end of code"),
            CodeReadError::UnsupportedOpcode(op_code) => {
                write!(f, "unsupported op code {op_code:#04x}")
            }
            CodeReadError::InvalidJumpTarget(position) => {
                write!(f, "invalid jump target {position}")
            }
        }
    }
}

impl Error for CodeReadError {}

pub type Result<T> = std::result::Result<T, CodeReadError>;
