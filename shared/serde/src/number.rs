use crate::{ByteReader, ByteWriter, Serde, SerdeErr};

// Fixed-width numbers, big-endian

macro_rules! impl_serde_number {
    ($type:ty) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut ByteWriter) {
                writer.write_bytes(&self.to_be_bytes());
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(<$type>::from_be_bytes(reader.read_array()?))
            }
        }
    };
}

impl_serde_number!(u8);
impl_serde_number!(i8);
impl_serde_number!(u16);
impl_serde_number!(i16);
impl_serde_number!(i32);
impl_serde_number!(i64);
impl_serde_number!(u64);
impl_serde_number!(f32);
impl_serde_number!(f64);

// Angles

/// A rotation quantized to 1/256 of a full turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Angle(pub u8);

impl Angle {
    /// Truncates toward zero and wraps, so -90 degrees becomes 0xC0.
    pub fn from_degrees(degrees: f32) -> Self {
        Self(((degrees * 256.0 / 360.0) as i32) as u8)
    }

    /// Returns the rotation in degrees, in the range [0, 360)
    pub fn to_degrees(&self) -> f32 {
        self.0 as f32 * 360.0 / 256.0
    }
}

impl Serde for Angle {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_byte(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(reader.read_byte()?))
    }
}
