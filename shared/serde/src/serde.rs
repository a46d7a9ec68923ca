use crate::{ByteReader, ByteWriter, SerdeErr};

/// A type that can be written to and read back from the play protocol's byte layout.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the writer
    fn ser(&self, writer: &mut ByteWriter);

    /// Parses a value from the reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}
