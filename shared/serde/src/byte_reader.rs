use crate::SerdeErr;

/// Cursor over a received packet body.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    position: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let byte = *self
            .buffer
            .get(self.position)
            .ok_or(SerdeErr::UnexpectedEnd {
                needed: 1,
                remaining: 0,
            })?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                needed: count,
                remaining,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.buffer[start..self.position])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    /// Returns the next byte without consuming it
    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.position).copied()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
