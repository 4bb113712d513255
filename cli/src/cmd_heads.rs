//! `substrpc heads`: follow best or finalized headers.

use anyhow::Result;
use substrpc_api::rpc::chain;
use substrpc_ws::Session;

pub async fn run(session: &Session, count: usize, finalized: bool) -> Result<()> {
    let mut stream = if finalized {
        chain::subscribe_finalized_heads(session).await?
    } else {
        chain::subscribe_new_heads(session).await?
    };
    tracing::debug!(subscription = %stream.id(), finalized, "following heads");

    let mut seen = 0;
    while seen < count {
        let Some(header) = stream.next_item().await else {
            anyhow::bail!("connection closed after {seen} headers");
        };
        let header = header?;
        println!("#{:<10} parent {}", header.number, header.parent_hash);
        seen += 1;
    }
    stream.unsubscribe().await;
    Ok(())
}
