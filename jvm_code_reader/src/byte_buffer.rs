use crate::code_read_error::{CodeReadError, Result};

/// Big-endian cursor over the code bytes of one method.
///
/// `position` always points at the next byte to be read.
#[derive(Debug)]
pub struct ByteBuffer<'a> {
    buffer: &'a [u8],
    pub position: usize,
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteBuffer {
            buffer: data,
            position: 0,
        }
    }

    fn advance<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.position + N;
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or(CodeReadError::UnexpectedEndOfCode)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        self.position = end;
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.advance::<1>().map(u8::from_be_bytes)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.advance::<1>().map(i8::from_be_bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.advance::<2>().map(u16::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.advance::<2>().map(i16::from_be_bytes)
    }

    pub fn has_more_data(&self) -> bool {
        self.position < self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Moves the cursor to an absolute offset. Jumping to the end of the code is allowed, it
    /// simply leaves nothing more to read.
    pub fn jump_to(&mut self, position: usize) -> Result<()> {
        if position > self.buffer.len() {
            return Err(CodeReadError::InvalidJumpTarget(position));
        }
        self.position = position;
        Ok(())
    }
}
