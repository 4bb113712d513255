//! Submitting extrinsics and following them through the pool.

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use substrpc_codec::AccountId32;
use substrpc_core::error::SessionError;
use substrpc_ws::{Session, SubscriptionStream};

use super::builder::{ChainContext, Extrinsic, ExtrinsicParams};
use super::call::Call;
use super::error::ExtrinsicError;
use super::signer::Signer;
use crate::rpc;
use crate::types::H256;

/// Pool status of a watched extrinsic, as pushed by
/// `author_submitAndWatchExtrinsic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    /// Waiting on an earlier nonce.
    Future,
    Ready,
    /// Gossiped to these peers.
    Broadcast(Vec<String>),
    InBlock(H256),
    /// The block it was included in left the best chain.
    Retracted(H256),
    /// Included in a block that was not finalized in time.
    FinalityTimeout(H256),
    Finalized(H256),
    /// Replaced by another extrinsic with the same nonce.
    Usurped(H256),
    Dropped,
    Invalid,
}

impl TransactionStatus {
    /// No further status will follow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finalized(_) | Self::Usurped(_) | Self::Dropped | Self::Invalid | Self::FinalityTimeout(_)
        )
    }

    /// Block hash carried by this status, if any.
    pub fn block_hash(&self) -> Option<H256> {
        match self {
            Self::InBlock(h) | Self::Retracted(h) | Self::FinalityTimeout(h) | Self::Finalized(h) => Some(*h),
            _ => None,
        }
    }
}

/// Status updates for one submitted extrinsic.
///
/// Ends after the first terminal status, after [`unwatch`](Self::unwatch),
/// or when the connection closes (yielding a connection error first).
pub struct ExtrinsicWatch {
    hash: H256,
    stream: Option<SubscriptionStream<TransactionStatus>>,
}

impl ExtrinsicWatch {
    /// Hash of the watched extrinsic.
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Next status update; `None` once the watch is over.
    pub async fn next(&mut self) -> Option<Result<TransactionStatus, ExtrinsicError>> {
        let stream = self.stream.as_mut()?;
        match stream.next_item().await {
            Some(Ok(status)) => {
                tracing::debug!(hash = %self.hash, ?status, "extrinsic status");
                if status.is_terminal() {
                    // the node ends the subscription itself
                    if let Some(stream) = self.stream.take() {
                        stream.release().await;
                    }
                }
                Some(Ok(status))
            }
            Some(Err(e)) => Some(Err(e.into())),
            None => {
                self.stream = None;
                Some(Err(SessionError::disconnected().into()))
            }
        }
    }

    /// Wait for a terminal status and return it.
    pub async fn wait_terminal(mut self) -> Result<TransactionStatus, ExtrinsicError> {
        while let Some(status) = self.next().await {
            let status = status?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
        Err(ExtrinsicError::WatchEnded { expected: "a terminal status" })
    }

    /// Wait until the extrinsic is finalized and return the block hash.
    /// Any other terminal status becomes an error.
    pub async fn wait_for_finalized(self) -> Result<H256, ExtrinsicError> {
        match self.wait_terminal().await? {
            TransactionStatus::Finalized(block) => Ok(block),
            other => Err(ExtrinsicError::NotFinalized(other)),
        }
    }

    /// Stop watching (`author_unwatchExtrinsic`). The extrinsic itself stays
    /// in the pool.
    pub async fn unwatch(mut self) {
        if let Some(stream) = self.stream.take() {
            stream.unsubscribe().await;
        }
    }
}

/// Builds, signs and submits extrinsics over one session.
pub struct Submitter {
    session: Session,
    context: OnceCell<ChainContext>,
}

impl Submitter {
    pub fn new(session: Session) -> Self {
        Self { session, context: OnceCell::new() }
    }

    /// Use a known chain context instead of fetching it.
    pub fn with_context(session: Session, context: ChainContext) -> Self {
        Self { session, context: OnceCell::new_with(Some(context)) }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The chain context, fetched on first use and then cached.
    pub async fn chain_context(&self) -> Result<ChainContext, ExtrinsicError> {
        let context = self
            .context
            .get_or_try_init(|| fetch_chain_context(&self.session))
            .await?;
        Ok(*context)
    }

    /// Next nonce for `account` as the node sees it, pool included.
    pub async fn next_nonce(&self, account: &AccountId32) -> Result<u64, ExtrinsicError> {
        Ok(rpc::system::account_next_index(&self.session, account).await?)
    }

    /// Sign `call`, fetching the nonce unless `params` carries one.
    pub async fn sign(
        &self,
        call: Call,
        signer: &dyn Signer,
        params: ExtrinsicParams,
    ) -> Result<Extrinsic, ExtrinsicError> {
        let context = self.chain_context().await?;
        let nonce = match params.nonce {
            Some(nonce) => nonce,
            None => self.next_nonce(&signer.account_id()).await?,
        };
        Extrinsic::signed(call, signer, nonce, &params, &context)
    }

    /// Fire-and-forget submission; returns the hash the pool assigned.
    pub async fn submit(&self, extrinsic: &Extrinsic) -> Result<H256, ExtrinsicError> {
        let hash = rpc::author::submit_extrinsic(&self.session, &extrinsic.to_hex()).await?;
        tracing::info!(%hash, call = %extrinsic.call(), "extrinsic submitted");
        Ok(hash)
    }

    /// Submit and follow the extrinsic's status.
    pub async fn submit_and_watch(&self, extrinsic: &Extrinsic) -> Result<ExtrinsicWatch, ExtrinsicError> {
        let stream = rpc::author::submit_and_watch_extrinsic(&self.session, &extrinsic.to_hex()).await?;
        let hash = extrinsic.hash();
        tracing::info!(%hash, call = %extrinsic.call(), subscription = %stream.id(), "extrinsic submitted, watching");
        Ok(ExtrinsicWatch { hash, stream: Some(stream) })
    }

    pub async fn sign_and_submit(
        &self,
        call: Call,
        signer: &dyn Signer,
        params: ExtrinsicParams,
    ) -> Result<H256, ExtrinsicError> {
        let extrinsic = self.sign(call, signer, params).await?;
        self.submit(&extrinsic).await
    }

    pub async fn sign_and_watch(
        &self,
        call: Call,
        signer: &dyn Signer,
        params: ExtrinsicParams,
    ) -> Result<ExtrinsicWatch, ExtrinsicError> {
        let extrinsic = self.sign(call, signer, params).await?;
        self.submit_and_watch(&extrinsic).await
    }
}

/// Runtime versions and genesis hash from the node.
pub async fn fetch_chain_context(session: &Session) -> Result<ChainContext, ExtrinsicError> {
    let version = rpc::state::get_runtime_version(session, None).await?;
    let genesis_hash = rpc::chain::get_block_hash(session, Some(0))
        .await?
        .ok_or_else(|| SessionError::Decode("node reported no genesis hash".into()))?;
    Ok(ChainContext {
        spec_version: version.spec_version,
        transaction_version: version.transaction_version,
        genesis_hash,
    })
}
