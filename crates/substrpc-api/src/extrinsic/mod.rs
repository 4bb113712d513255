//! Extrinsic construction, signing and submission.
//!
//! ```text
//! Call ──► Extrinsic::signed(call, signer, nonce, params, context) ──► Submitter::submit
//!                                                                   └─► Submitter::submit_and_watch ──► ExtrinsicWatch
//! ```

pub mod builder;
pub mod call;
pub mod era;
pub mod error;
pub mod signer;
pub mod submit;

pub use builder::{ChainContext, Extrinsic, ExtrinsicParams, ExtrinsicSignature};
pub use call::Call;
pub use era::Era;
pub use error::ExtrinsicError;
pub use signer::{SignatureScheme, Signer};
pub use submit::{fetch_chain_context, ExtrinsicWatch, Submitter, TransactionStatus};
