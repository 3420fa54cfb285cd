//! Pluggable value serialization.
//!
//! Providers only see bytes. Typed access goes through a [`ValueCodec`];
//! [`JsonCodec`] is the default used by the `*_json` helpers.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::CacheResult;

/// Converts typed values to and from cached payloads.
pub trait ValueCodec: Send + Sync {
    /// Encode a value into a payload.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Bytes>;

    /// Decode a payload into a value.
    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> CacheResult<T>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> CacheResult<T> {
        Ok(serde_json::from_slice(payload)?)
    }
}
