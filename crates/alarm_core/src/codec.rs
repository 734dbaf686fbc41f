use crate::{alarm::Alarm, error::CodecError};

pub fn encode_alarms(alarms: &[Alarm]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(alarms).map_err(CodecError::Encode)
}

pub fn decode_alarms(bytes: &[u8]) -> Result<Vec<Alarm>, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}
