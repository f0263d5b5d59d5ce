use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CodecError, CodecResult};

/// Key-value descriptor identifying a codec and its parameters.
///
/// Always carries the codec id under [`ID_KEY`]; every other key is a
/// constructor parameter.
pub type CodecConfig = serde_json::Map<String, Value>;

pub const ID_KEY: &str = "id";

/// Build a descriptor from an id and its parameters.
pub fn build_config(id: &str, params: &[(&str, Value)]) -> CodecConfig {
    let mut config = CodecConfig::new();
    config.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    for (key, value) in params {
        config.insert(key.to_string(), value.clone());
    }
    config
}

/// Read the `"id"` entry of a descriptor.
pub fn config_id(config: &CodecConfig) -> CodecResult<&str> {
    match config.get(ID_KEY) {
        Some(Value::String(id)) => Ok(id.as_str()),
        Some(other) => Err(CodecError::InvalidParameter(format!(
            "Codec id must be a string, got {other}"
        ))),
        None => Err(CodecError::InvalidParameter(
            "Codec descriptor is missing \"id\"".into(),
        )),
    }
}

/// Deserialize the parameters of a descriptor (every key except `"id"`)
/// into `P`, after checking the descriptor names codec `id`.
pub fn parse_params<P: DeserializeOwned>(id: &str, config: &CodecConfig) -> CodecResult<P> {
    let actual = config_id(config)?;
    if actual != id {
        return Err(CodecError::InvalidParameter(format!(
            "Descriptor for codec \"{actual}\" passed to codec \"{id}\""
        )));
    }
    let mut params = config.clone();
    params.remove(ID_KEY);
    serde_json::from_value(Value::Object(params))
        .map_err(|e| CodecError::InvalidParameter(format!("{id}: {e}")))
}
