mod byte_reader;
mod byte_writer;
mod error;
mod impls;
mod integer;
mod number;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use error::SerdeErr;
pub use impls::ser_bounded_string;
pub use integer::VarInt;
pub use number::Angle;
pub use serde::Serde;

/// Longest string the client accepts for a protocol string field, in characters.
pub const MAX_STRING_LENGTH: usize = 32767;
