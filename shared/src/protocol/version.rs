use std::fmt;

use serde::{Deserialize, Serialize};

use super::CodecError;

/// Protocol versions the codec has packet tables for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V1_21_4,
    V1_21_5,
    V1_21_6,
    V1_21_7,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 4] = [
        ProtocolVersion::V1_21_4,
        ProtocolVersion::V1_21_5,
        ProtocolVersion::V1_21_6,
        ProtocolVersion::V1_21_7,
    ];

    pub fn protocol_id(&self) -> i32 {
        match self {
            ProtocolVersion::V1_21_4 => 769,
            ProtocolVersion::V1_21_5 => 770,
            ProtocolVersion::V1_21_6 => 771,
            ProtocolVersion::V1_21_7 => 772,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVersion::V1_21_4 => "1.21.4",
            ProtocolVersion::V1_21_5 => "1.21.5",
            ProtocolVersion::V1_21_6 => "1.21.6",
            ProtocolVersion::V1_21_7 => "1.21.7",
        }
    }

    pub fn from_protocol_id(protocol_id: i32) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|version| version.protocol_id() == protocol_id)
            .ok_or(CodecError::UnsupportedProtocolVersion { protocol_id })
    }

    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|version| version.name() == name)
            .ok_or_else(|| CodecError::UnknownVersionName {
                name: name.to_string(),
            })
    }

    pub fn latest() -> Self {
        ProtocolVersion::V1_21_7
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.protocol_id())
    }
}
