//! `substrpc info`: node identity and health.

use anyhow::Result;
use substrpc_api::rpc::{chain, state, system};
use substrpc_ws::Session;

pub async fn run(session: &Session) -> Result<()> {
    let (name, version, chain_name, health) = tokio::try_join!(
        system::name(session),
        system::version(session),
        system::chain(session),
        system::health(session),
    )?;
    let runtime = state::get_runtime_version(session, None).await?;
    let finalized = chain::get_finalized_head(session).await?;

    println!("Node:       {name} v{version}");
    println!("Chain:      {chain_name}");
    println!("Runtime:    {} spec {} tx {}", runtime.spec_name, runtime.spec_version, runtime.transaction_version);
    println!(
        "Peers:      {}{}",
        health.peers,
        if health.is_syncing { " (syncing)" } else { "" }
    );
    println!("Finalized:  {finalized}");
    Ok(())
}
