use uuid::Uuid;

use crate::{ByteReader, ByteWriter, Serde, SerdeErr, VarInt, MAX_STRING_LENGTH};

// Booleans

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            value => Err(SerdeErr::InvalidBool { value }),
        }
    }
}

// Strings

impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) {
        VarInt(self.len() as i32).ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarInt::de_length(reader)?;
        // a UTF-8 character is at most four bytes
        if length > MAX_STRING_LENGTH * 4 {
            return Err(SerdeErr::StringTooLong {
                length,
                max: MAX_STRING_LENGTH * 4,
            });
        }
        let bytes = reader.read_bytes(length)?;
        let output = std::str::from_utf8(bytes)
            .map_err(|_| SerdeErr::InvalidUtf8)?
            .to_string();
        let characters = output.chars().count();
        if characters > MAX_STRING_LENGTH {
            return Err(SerdeErr::StringTooLong {
                length: characters,
                max: MAX_STRING_LENGTH,
            });
        }
        Ok(output)
    }
}

/// Writes a string the way `String::ser` does, but refuses one the reading
/// side would reject for its length.
pub fn ser_bounded_string(value: &str, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
    let characters = value.chars().count();
    if characters > MAX_STRING_LENGTH {
        return Err(SerdeErr::StringTooLong {
            length: characters,
            max: MAX_STRING_LENGTH,
        });
    }
    VarInt(value.len() as i32).ser(writer);
    writer.write_bytes(value.as_bytes());
    Ok(())
}

// Uuids, as most significant then least significant 64 bits

impl Serde for Uuid {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Uuid::from_bytes(reader.read_array()?))
    }
}
