use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerdeErr {
    #[error("Unexpected end of buffer: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("VarInt is longer than 5 bytes")]
    VarIntTooLong,

    #[error("Invalid boolean byte: {value:#04x}")]
    InvalidBool { value: u8 },

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("String length {length} exceeds maximum of {max}")]
    StringTooLong { length: usize, max: usize },

    #[error("Negative length prefix: {length}")]
    NegativeLength { length: i32 },
}
