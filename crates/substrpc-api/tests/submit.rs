//! Extrinsic submission and typed RPC calls against an in-memory node.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

use substrpc_api::extrinsic::fetch_chain_context;
use substrpc_api::{
    rpc, Call, ChainContext, Extrinsic, ExtrinsicError, ExtrinsicParams, SignatureScheme, Signer, StorageKind,
    Submitter, TransactionStatus, H256,
};
use substrpc_codec::{AccountId32, TypeDescriptor, Value};
use substrpc_core::config::SessionConfig;
use substrpc_core::request::{JsonRpcRequest, SubscriptionId};
use substrpc_core::transport::Endpoint;
use substrpc_ws::memory::{self, RemoteEnd};
use substrpc_ws::Session;

// ─── Helpers ──────────────────────────────────────────────────────────────────

const ALICE: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
const GENESIS: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const BLOCK: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

/// Deterministic signer: the signature is a fixed pattern.
struct MockSigner;

impl Signer for MockSigner {
    fn account_id(&self) -> AccountId32 {
        ALICE.parse().unwrap()
    }

    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Sr25519
    }

    fn sign(&self, _payload: &[u8]) -> Result<Vec<u8>, String> {
        Ok(vec![0x5a; 64])
    }
}

fn open() -> (Session, RemoteEnd) {
    let (conn, node) = memory::pair();
    let session = Session::from_connection(Endpoint::new("memory://node"), conn, SessionConfig::default());
    (session, node)
}

fn context() -> ChainContext {
    ChainContext {
        spec_version: 264,
        transaction_version: 2,
        genesis_hash: GENESIS.parse().unwrap(),
    }
}

fn remark() -> Call {
    Call::new("System", "remark", 0, 1)
        .arg(&Value::Bytes(vec![0, 1, 2]), &TypeDescriptor::Bytes)
        .unwrap()
}

/// Receive the next request and check its method.
async fn expect(node: &mut RemoteEnd, method: &str) -> JsonRpcRequest {
    let req = timeout(Duration::from_secs(2), node.recv_request())
        .await
        .expect("no request in time")
        .expect("session closed");
    assert_eq!(req.method, method);
    req
}

fn id(req: &JsonRpcRequest) -> u64 {
    req.id.as_u64().unwrap()
}

// ─── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_fetches_context_and_nonce() {
    let (session, mut node) = open();
    let submitter = Arc::new(Submitter::new(session));

    let task = tokio::spawn({
        let submitter = Arc::clone(&submitter);
        async move {
            submitter
                .sign_and_submit(remark(), &MockSigner, ExtrinsicParams::immortal())
                .await
        }
    });

    let req = expect(&mut node, "state_getRuntimeVersion").await;
    node.respond(
        id(&req),
        json!({
            "specName": "node",
            "implName": "substrate-node",
            "specVersion": 264,
            "transactionVersion": 2,
            "apis": []
        }),
    );
    let req = expect(&mut node, "chain_getBlockHash").await;
    assert_eq!(req.params, vec![json!(0)]);
    node.respond(id(&req), json!(GENESIS));

    let req = expect(&mut node, "system_accountNextIndex").await;
    assert_eq!(req.params, vec![json!(ALICE_SS58)]);
    node.respond(id(&req), json!(3));

    let req = expect(&mut node, "author_submitExtrinsic").await;
    let expected = Extrinsic::signed(remark(), &MockSigner, 3, &ExtrinsicParams::immortal(), &context()).unwrap();
    assert_eq!(req.params, vec![json!(expected.to_hex())]);
    node.respond(id(&req), json!(expected.hash().to_string()));

    assert_eq!(task.await.unwrap().unwrap(), expected.hash());

    // the context is cached; a second signature only asks for the nonce
    let task = tokio::spawn({
        let submitter = Arc::clone(&submitter);
        async move {
            submitter
                .sign(remark(), &MockSigner, ExtrinsicParams::immortal())
                .await
        }
    });
    let req = expect(&mut node, "system_accountNextIndex").await;
    node.respond(id(&req), json!(4));
    assert_eq!(task.await.unwrap().unwrap().signature().unwrap().nonce, 4);
}

#[tokio::test]
async fn stale_nonce_is_invalid_transaction() {
    let (session, mut node) = open();
    let submitter = Submitter::with_context(session, context());

    let task = tokio::spawn(async move {
        submitter
            .sign_and_submit(remark(), &MockSigner, ExtrinsicParams::immortal().nonce(0))
            .await
    });

    let req = expect(&mut node, "author_submitExtrinsic").await;
    node.respond_error(id(&req), 1010, "Invalid Transaction", Some(json!("Transaction is outdated")));

    let err = timeout(Duration::from_secs(2), task)
        .await
        .expect("stale nonce must not hang")
        .unwrap()
        .unwrap_err();
    match err {
        ExtrinsicError::InvalidTransaction { code, message, data } => {
            assert_eq!(code, 1010);
            assert_eq!(message, "Invalid Transaction");
            assert_eq!(data, Some(json!("Transaction is outdated")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ─── Watching ─────────────────────────────────────────────────────────────────

/// Submit with watch and confirm the subscription as `sub`.
async fn watch(session: &Session, node: &mut RemoteEnd, sub: &SubscriptionId) -> substrpc_api::ExtrinsicWatch {
    let submitter = Submitter::with_context(session.clone(), context());
    let xt = Extrinsic::signed(remark(), &MockSigner, 0, &ExtrinsicParams::immortal(), &context()).unwrap();
    let task = tokio::spawn(async move { submitter.submit_and_watch(&xt).await });
    let req = expect(node, "author_submitAndWatchExtrinsic").await;
    node.respond(id(&req), sub.to_value());
    task.await.unwrap().unwrap()
}

#[tokio::test]
async fn watch_follows_status_until_finalized() {
    let (session, mut node) = open();
    let sub = SubscriptionId::String("0xwatch".into());
    let mut watch = watch(&session, &mut node, &sub).await;

    node.notify("author_extrinsicUpdate", &sub, json!("ready"));
    node.notify("author_extrinsicUpdate", &sub, json!({ "broadcast": ["12D3KooW"] }));
    node.notify("author_extrinsicUpdate", &sub, json!({ "inBlock": BLOCK }));
    node.notify("author_extrinsicUpdate", &sub, json!({ "finalized": BLOCK }));

    let block: H256 = BLOCK.parse().unwrap();
    let mut seen = Vec::new();
    while let Some(status) = watch.next().await {
        seen.push(status.unwrap());
    }
    assert_eq!(
        seen,
        vec![
            TransactionStatus::Ready,
            TransactionStatus::Broadcast(vec!["12D3KooW".into()]),
            TransactionStatus::InBlock(block),
            TransactionStatus::Finalized(block),
        ]
    );
    assert!(session.registry().is_empty());
}

#[tokio::test]
async fn usurped_is_not_finalized() {
    let (session, mut node) = open();
    let sub = SubscriptionId::Number(3);
    let watch = watch(&session, &mut node, &sub).await;

    node.notify("author_extrinsicUpdate", &sub, json!("future"));
    node.notify("author_extrinsicUpdate", &sub, json!({ "usurped": BLOCK }));

    let err = watch.wait_for_finalized().await.unwrap_err();
    assert!(matches!(err, ExtrinsicError::NotFinalized(TransactionStatus::Usurped(_))));
}

#[tokio::test]
async fn watch_reports_connection_loss() {
    let (session, mut node) = open();
    let sub = SubscriptionId::String("0xlost".into());
    let mut watch = watch(&session, &mut node, &sub).await;

    node.notify("author_extrinsicUpdate", &sub, json!("ready"));
    assert_eq!(watch.next().await.unwrap().unwrap(), TransactionStatus::Ready);

    node.close();
    let err = timeout(Duration::from_secs(2), watch.next())
        .await
        .expect("watch must end on close")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ExtrinsicError::Session(ref e) if e.is_connection_error()));
    assert!(watch.next().await.is_none());
}

#[tokio::test]
async fn unwatch_sends_unwatch_extrinsic() {
    let (session, mut node) = open();
    let sub = SubscriptionId::String("0xunwatch".into());
    let watch = watch(&session, &mut node, &sub).await;

    let task = tokio::spawn(watch.unwatch());
    let req = expect(&mut node, "author_unwatchExtrinsic").await;
    assert_eq!(req.params, vec![json!("0xunwatch")]);
    node.respond(id(&req), json!(true));
    task.await.unwrap();
    assert!(session.registry().is_empty());
}

// ─── Typed wrappers ───────────────────────────────────────────────────────────

#[tokio::test]
async fn header_and_block_hash() {
    let (session, mut node) = open();

    let s = session.clone();
    let task = tokio::spawn(async move { rpc::chain::get_header(&s, None).await });
    let req = expect(&mut node, "chain_getHeader").await;
    assert_eq!(req.params, vec![json!(null)]);
    node.respond(
        id(&req),
        json!({
            "parentHash": GENESIS,
            "number": "0x10",
            "stateRoot": BLOCK,
            "extrinsicsRoot": BLOCK,
            "digest": { "logs": [] }
        }),
    );
    let header = task.await.unwrap().unwrap().unwrap();
    assert_eq!(header.number, 16);
    assert_eq!(header.parent_hash, GENESIS.parse::<H256>().unwrap());

    let s = session.clone();
    let task = tokio::spawn(async move { rpc::chain::get_block_hash(&s, Some(99)).await });
    let req = expect(&mut node, "chain_getBlockHash").await;
    assert_eq!(req.params, vec![json!(99)]);
    node.respond(id(&req), json!(null));
    assert_eq!(task.await.unwrap().unwrap(), None);
}

#[tokio::test]
async fn offchain_storage_kinds() {
    let (session, mut node) = open();

    let s = session.clone();
    let task = tokio::spawn(async move {
        rpc::offchain::local_storage_get(&s, StorageKind::Persistent, "0x010101").await
    });
    let req = expect(&mut node, "offchain_localStorageGet").await;
    assert_eq!(req.params, vec![json!("PERSISTENT"), json!("0x010101")]);
    node.respond(id(&req), json!("0x040404"));
    assert_eq!(task.await.unwrap().unwrap().as_deref(), Some("0x040404"));
}

#[tokio::test]
async fn babe_epoch_authorship() {
    let (session, mut node) = open();

    let s = session.clone();
    let task = tokio::spawn(async move { rpc::babe::epoch_authorship(&s).await });
    let req = expect(&mut node, "babe_epochAuthorship").await;
    assert!(req.params.is_empty());
    let slots = json!({
        "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY": {
            "primary": [12, 15],
            "secondary": [],
            "secondary_vrf": [13]
        }
    });
    node.respond(id(&req), slots.clone());
    assert_eq!(task.await.unwrap().unwrap(), slots);
}

#[tokio::test]
async fn new_heads_stream() {
    use futures::StreamExt;

    let (session, mut node) = open();
    let s = session.clone();
    let task = tokio::spawn(async move { rpc::chain::subscribe_new_heads(&s).await });
    let req = expect(&mut node, "chain_subscribeNewHeads").await;
    let sub = SubscriptionId::String("0xheads".into());
    node.respond(id(&req), sub.to_value());
    let mut heads = task.await.unwrap().unwrap();

    for n in 1..=2u64 {
        node.notify(
            "chain_newHead",
            &sub,
            json!({
                "parentHash": GENESIS,
                "number": format!("0x{n:x}"),
                "stateRoot": BLOCK,
                "extrinsicsRoot": BLOCK,
                "digest": { "logs": [] }
            }),
        );
    }
    assert_eq!(heads.next().await.unwrap().unwrap().number, 1);
    assert_eq!(heads.next().await.unwrap().unwrap().number, 2);

    let unsubscribe = tokio::spawn(heads.unsubscribe());
    let req = expect(&mut node, "chain_unsubscribeNewHeads").await;
    node.respond(id(&req), json!(true));
    unsubscribe.await.unwrap();
}

#[tokio::test]
async fn context_from_node() {
    let (session, mut node) = open();
    let s = session.clone();
    let task = tokio::spawn(async move { fetch_chain_context(&s).await });

    let req = expect(&mut node, "state_getRuntimeVersion").await;
    node.respond(
        id(&req),
        json!({ "specName": "node", "implName": "node", "specVersion": 100, "transactionVersion": 1 }),
    );
    let req = expect(&mut node, "chain_getBlockHash").await;
    node.respond(id(&req), json!(GENESIS));

    let ctx = task.await.unwrap().unwrap();
    assert_eq!(ctx.spec_version, 100);
    assert_eq!(ctx.transaction_version, 1);
    assert_eq!(ctx.genesis_hash, GENESIS.parse::<H256>().unwrap());
}
