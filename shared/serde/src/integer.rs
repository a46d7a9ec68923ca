use crate::{ByteReader, ByteWriter, Serde, SerdeErr};

const SEGMENT_BITS: u32 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;
const MAX_BYTES: usize = 5;

/// A 32-bit integer written in 7-bit groups, least significant group first.
/// Negative values always take the full five bytes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct VarInt(pub i32);

impl VarInt {
    pub fn get(&self) -> i32 {
        self.0
    }

    /// Number of bytes this value occupies on the wire
    pub fn byte_length(&self) -> usize {
        let mut value = self.0 as u32;
        let mut length = 1;
        while value & !SEGMENT_BITS != 0 {
            value >>= 7;
            length += 1;
        }
        length
    }

    /// Reads a VarInt that is used as a length prefix
    pub fn de_length(reader: &mut ByteReader) -> Result<usize, SerdeErr> {
        let length = Self::de(reader)?.0;
        if length < 0 {
            return Err(SerdeErr::NegativeLength { length });
        }
        Ok(length as usize)
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<VarInt> for i32 {
    fn from(value: VarInt) -> Self {
        value.0
    }
}

impl Serde for VarInt {
    fn ser(&self, writer: &mut ByteWriter) {
        let mut value = self.0 as u32;
        loop {
            if value & !SEGMENT_BITS == 0 {
                writer.write_byte(value as u8);
                return;
            }
            writer.write_byte((value & SEGMENT_BITS) as u8 | CONTINUE_BIT);
            value >>= 7;
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut value: u32 = 0;
        for index in 0..MAX_BYTES {
            let byte = reader.read_byte()?;
            value |= ((byte & SEGMENT_BITS as u8) as u32) << (7 * index);
            if byte & CONTINUE_BIT == 0 {
                return Ok(Self(value as i32));
            }
        }
        Err(SerdeErr::VarIntTooLong)
    }
}
