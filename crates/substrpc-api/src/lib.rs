//! substrpc-api: typed Substrate RPC on top of a [`substrpc_ws::Session`].
//!
//! - [`rpc`]: one module of thin async wrappers per RPC namespace
//! - [`extrinsic`]: build, sign, submit and watch extrinsics
//! - [`types`]: headers, blocks, runtime versions and other fixed-shape results
//!
//! ```no_run
//! use substrpc_api::rpc;
//! use substrpc_core::SessionConfig;
//! use substrpc_ws::Session;
//!
//! # async fn run() -> Result<(), substrpc_core::SessionError> {
//! let session = Session::connect_ws("ws://127.0.0.1:9944", SessionConfig::default()).await?;
//! let head = rpc::chain::get_header(&session, None).await?;
//! println!("best block: {:?}", head.map(|h| h.number));
//! # Ok(())
//! # }
//! ```

pub mod extrinsic;
pub mod rpc;
pub mod types;

pub use extrinsic::{
    Call, ChainContext, Era, Extrinsic, ExtrinsicError, ExtrinsicParams, ExtrinsicWatch, SignatureScheme, Signer,
    Submitter, TransactionStatus,
};
pub use types::{Block, Header, Health, RuntimeVersion, SignedBlock, StorageKind, H256};
