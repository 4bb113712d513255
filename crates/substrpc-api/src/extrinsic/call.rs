//! Runtime calls: pallet and call index followed by the encoded arguments.

use substrpc_codec::error::EncodeError;
use substrpc_codec::{encode_to, TypeDescriptor, Value};

/// A dispatchable runtime call.
///
/// Indices come from the runtime metadata; the names are kept for logs only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub pallet: String,
    pub function: String,
    pub pallet_index: u8,
    pub call_index: u8,
    args: Vec<u8>,
}

impl Call {
    pub fn new(pallet: impl Into<String>, function: impl Into<String>, pallet_index: u8, call_index: u8) -> Self {
        Self {
            pallet: pallet.into(),
            function: function.into(),
            pallet_index,
            call_index,
            args: Vec::new(),
        }
    }

    /// Append one argument, encoded as `ty`.
    pub fn arg(mut self, value: &Value, ty: &TypeDescriptor) -> Result<Self, EncodeError> {
        encode_to(value, ty, &mut self.args)?;
        Ok(self)
    }

    /// Append already-encoded argument bytes.
    pub fn raw_args(mut self, bytes: &[u8]) -> Self {
        self.args.extend_from_slice(bytes);
        self
    }

    pub fn args(&self) -> &[u8] {
        &self.args
    }

    pub fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(self.pallet_index);
        out.push(self.call_index);
        out.extend_from_slice(&self.args);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.args.len());
        self.encode_to(&mut out);
        out
    }
}

impl std::fmt::Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.pallet, self.function)
    }
}
