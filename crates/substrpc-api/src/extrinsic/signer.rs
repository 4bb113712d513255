//! The signing seam. Key storage and the signature algorithms themselves
//! live outside this crate.

use substrpc_codec::AccountId32;

/// Signature scheme, with its `MultiSignature` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Ed25519,
    Sr25519,
    Ecdsa,
}

impl SignatureScheme {
    /// `MultiSignature` variant index.
    pub fn tag(self) -> u8 {
        match self {
            Self::Ed25519 => 0,
            Self::Sr25519 => 1,
            Self::Ecdsa => 2,
        }
    }

    /// Expected signature length in bytes.
    pub fn signature_len(self) -> usize {
        match self {
            Self::Ed25519 | Self::Sr25519 => 64,
            Self::Ecdsa => 65,
        }
    }
}

/// Signs extrinsic payloads on behalf of one account.
pub trait Signer: Send + Sync {
    /// The account the signature is checked against.
    fn account_id(&self) -> AccountId32;

    fn scheme(&self) -> SignatureScheme;

    /// Sign `payload` (already hashed if it was longer than 256 bytes).
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, String>;
}

impl<S: Signer + ?Sized> Signer for &S {
    fn account_id(&self) -> AccountId32 {
        (**self).account_id()
    }

    fn scheme(&self) -> SignatureScheme {
        (**self).scheme()
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, String> {
        (**self).sign(payload)
    }
}
