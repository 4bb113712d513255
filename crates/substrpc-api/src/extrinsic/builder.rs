//! Extrinsic v4 encoding and signing.
//!
//! ```text
//! signed:   compact(len) 0x84 0x00 account(32) sig_tag signature era compact(nonce) compact(tip) call
//! unsigned: compact(len) 0x04 call
//! ```
//!
//! The signed payload is `call era compact(nonce) compact(tip) spec_version
//! transaction_version genesis_hash checkpoint_hash`, blake2-256 hashed first
//! when longer than 256 bytes.

use substrpc_codec::compact::{compact_bytes, encode_compact};
use substrpc_codec::hex::to_hex;
use substrpc_codec::{blake2_256, AccountId32};

use super::call::Call;
use super::era::Era;
use super::error::ExtrinsicError;
use super::signer::{SignatureScheme, Signer};
use crate::types::H256;

const EXTRINSIC_VERSION: u8 = 4;
const SIGNED_BIT: u8 = 0b1000_0000;
/// `MultiAddress::Id`
const ADDRESS_ID: u8 = 0;
const MAX_UNHASHED_PAYLOAD: usize = 256;

/// Chain parameters every signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: H256,
}

/// Per-submission signing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtrinsicParams {
    pub era: Era,
    /// Hash of the era's first block. Ignored for immortal extrinsics,
    /// which commit to the genesis hash.
    pub checkpoint: Option<H256>,
    /// Fetched from the node when `None`.
    pub nonce: Option<u64>,
    pub tip: u128,
}

impl ExtrinsicParams {
    pub fn immortal() -> Self {
        Self::default()
    }

    /// Valid for about `period` blocks from `block_number` (whose hash is
    /// `block_hash`).
    pub fn mortal(period: u64, block_number: u64, block_hash: H256) -> Self {
        Self {
            era: Era::mortal(period, block_number),
            checkpoint: Some(block_hash),
            ..Self::default()
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn tip(mut self, tip: u128) -> Self {
        self.tip = tip;
        self
    }

    fn checkpoint_hash(&self, context: &ChainContext) -> Result<H256, ExtrinsicError> {
        match (self.era, self.checkpoint) {
            (Era::Immortal, _) => Ok(context.genesis_hash),
            (Era::Mortal { .. }, Some(hash)) => Ok(hash),
            (Era::Mortal { .. }, None) => Err(ExtrinsicError::Signer(
                "mortal era requires the checkpoint block hash".into(),
            )),
        }
    }
}

/// The signature part of a signed extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicSignature {
    pub signer: AccountId32,
    pub scheme: SignatureScheme,
    pub signature: Vec<u8>,
    pub era: Era,
    pub nonce: u64,
    pub tip: u128,
}

/// A fully encoded extrinsic. Immutable; build a new one to resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extrinsic {
    call: Call,
    signature: Option<ExtrinsicSignature>,
    encoded: Vec<u8>,
}

impl Extrinsic {
    /// An unsigned (inherent-style) extrinsic.
    pub fn unsigned(call: Call) -> Self {
        let mut body = vec![EXTRINSIC_VERSION];
        call.encode_to(&mut body);
        Self { encoded: length_prefixed(body), call, signature: None }
    }

    /// Bytes the signer signs, before the >256-byte hashing rule.
    pub fn signing_payload(
        call: &Call,
        era: Era,
        nonce: u64,
        tip: u128,
        context: &ChainContext,
        checkpoint: H256,
    ) -> Vec<u8> {
        let mut payload = call.encode();
        era.encode_to(&mut payload);
        encode_compact(u128::from(nonce), &mut payload);
        encode_compact(tip, &mut payload);
        payload.extend_from_slice(&context.spec_version.to_le_bytes());
        payload.extend_from_slice(&context.transaction_version.to_le_bytes());
        payload.extend_from_slice(context.genesis_hash.as_bytes());
        payload.extend_from_slice(checkpoint.as_bytes());
        payload
    }

    /// Sign `call` with a known nonce.
    pub fn signed(
        call: Call,
        signer: &dyn Signer,
        nonce: u64,
        params: &ExtrinsicParams,
        context: &ChainContext,
    ) -> Result<Self, ExtrinsicError> {
        let checkpoint = params.checkpoint_hash(context)?;
        let payload = Self::signing_payload(&call, params.era, nonce, params.tip, context, checkpoint);
        let to_sign = if payload.len() > MAX_UNHASHED_PAYLOAD {
            blake2_256(&payload).to_vec()
        } else {
            payload
        };

        let scheme = signer.scheme();
        let signature = signer.sign(&to_sign).map_err(ExtrinsicError::Signer)?;
        if signature.len() != scheme.signature_len() {
            return Err(ExtrinsicError::Signer(format!(
                "{scheme:?} signature must be {} bytes, got {}",
                scheme.signature_len(),
                signature.len()
            )));
        }

        let signature = ExtrinsicSignature {
            signer: signer.account_id(),
            scheme,
            signature,
            era: params.era,
            nonce,
            tip: params.tip,
        };

        let mut body = vec![EXTRINSIC_VERSION | SIGNED_BIT, ADDRESS_ID];
        body.extend_from_slice(signature.signer.as_bytes());
        body.push(scheme.tag());
        body.extend_from_slice(&signature.signature);
        signature.era.encode_to(&mut body);
        encode_compact(u128::from(nonce), &mut body);
        encode_compact(signature.tip, &mut body);
        call.encode_to(&mut body);

        tracing::debug!(call = %call, signer = %signature.signer, nonce, "extrinsic signed");
        Ok(Self { encoded: length_prefixed(body), call, signature: Some(signature) })
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn signature(&self) -> Option<&ExtrinsicSignature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Full encoding, length prefix included.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// `0x`-hex encoding as passed to `author_submitExtrinsic`.
    pub fn to_hex(&self) -> String {
        to_hex(&self.encoded)
    }

    /// Blake2-256 of the full encoding; the hash the pool reports.
    pub fn hash(&self) -> H256 {
        H256(blake2_256(&self.encoded))
    }
}

fn length_prefixed(body: Vec<u8>) -> Vec<u8> {
    let mut out = compact_bytes(body.len() as u128);
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use substrpc_codec::{TypeDescriptor, Value};

    struct FixedSigner {
        scheme: SignatureScheme,
        len: usize,
    }

    impl Signer for FixedSigner {
        fn account_id(&self) -> AccountId32 {
            AccountId32([0xd4; 32])
        }

        fn scheme(&self) -> SignatureScheme {
            self.scheme
        }

        fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, String> {
            // first byte records the payload length so tests can see hashing
            let mut sig = vec![0xee; self.len];
            sig[0] = payload.len().min(255) as u8;
            Ok(sig)
        }
    }

    fn context() -> ChainContext {
        ChainContext { spec_version: 264, transaction_version: 2, genesis_hash: H256([0x11; 32]) }
    }

    fn remark(len: usize) -> Call {
        Call::new("System", "remark", 0, 1)
            .arg(&Value::Bytes(vec![7; len]), &TypeDescriptor::Bytes)
            .unwrap()
    }

    #[test]
    fn unsigned_layout() {
        let xt = Extrinsic::unsigned(remark(3));
        assert_eq!(xt.encoded(), &[0x1c, 0x04, 0, 1, 0x0c, 7, 7, 7]);
        assert!(!xt.is_signed());
        assert_eq!(xt.hash(), H256(blake2_256(xt.encoded())));
    }

    #[test]
    fn signed_layout() {
        let signer = FixedSigner { scheme: SignatureScheme::Sr25519, len: 64 };
        let params = ExtrinsicParams::immortal().tip(0);
        let xt = Extrinsic::signed(remark(3), &signer, 5, &params, &context()).unwrap();
        let bytes = xt.encoded();

        // 1 version + 1 address tag + 32 account + 1 sig tag + 64 sig
        // + 1 era + 1 nonce + 1 tip + 6 call
        let body_len = 1 + 1 + 32 + 1 + 64 + 1 + 1 + 1 + 6;
        assert_eq!(bytes.len(), 2 + body_len);
        assert_eq!(&bytes[..2], &compact_bytes(body_len as u128)[..]);
        assert_eq!(bytes[2], 0x84);
        assert_eq!(bytes[3], 0x00);
        assert_eq!(&bytes[4..36], &[0xd4; 32]);
        assert_eq!(bytes[36], 1);
        let tail = &bytes[37 + 64..];
        assert_eq!(tail, &[0x00, 5 << 2, 0x00, 0, 1, 0x0c, 7, 7, 7]);
        assert_eq!(xt.signature().unwrap().nonce, 5);
    }

    #[test]
    fn signing_payload_order() {
        let ctx = context();
        let checkpoint = H256([0x22; 32]);
        let payload = Extrinsic::signing_payload(&remark(0), Era::mortal(64, 42), 1, 2, &ctx, checkpoint);
        let mut expected = vec![0, 1, 0x00, 0xa5, 0x02, 1 << 2, 2 << 2];
        expected.extend_from_slice(&264u32.to_le_bytes());
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(&[0x11; 32]);
        expected.extend_from_slice(&[0x22; 32]);
        assert_eq!(payload, expected);
    }

    #[test]
    fn long_payload_is_hashed_before_signing() {
        let signer = FixedSigner { scheme: SignatureScheme::Ed25519, len: 64 };
        let short = Extrinsic::signed(remark(10), &signer, 0, &ExtrinsicParams::immortal(), &context()).unwrap();
        let long = Extrinsic::signed(remark(300), &signer, 0, &ExtrinsicParams::immortal(), &context()).unwrap();
        assert_ne!(short.signature().unwrap().signature[0], 32);
        assert_eq!(long.signature().unwrap().signature[0], 32);
    }

    #[test]
    fn wrong_signature_length_rejected() {
        let signer = FixedSigner { scheme: SignatureScheme::Ecdsa, len: 64 };
        let err = Extrinsic::signed(remark(1), &signer, 0, &ExtrinsicParams::immortal(), &context()).unwrap_err();
        assert!(matches!(err, ExtrinsicError::Signer(_)));
    }

    #[test]
    fn mortal_needs_checkpoint() {
        let signer = FixedSigner { scheme: SignatureScheme::Sr25519, len: 64 };
        let params = ExtrinsicParams { era: Era::mortal(64, 10), ..ExtrinsicParams::default() };
        assert!(Extrinsic::signed(remark(1), &signer, 0, &params, &context()).is_err());

        let params = ExtrinsicParams::mortal(64, 10, H256([3; 32]));
        let xt = Extrinsic::signed(remark(1), &signer, 0, &params, &context()).unwrap();
        assert_eq!(xt.signature().unwrap().era, Era::mortal(64, 10));
    }
}
