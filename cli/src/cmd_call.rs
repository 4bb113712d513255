//! `substrpc call`: one raw request.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use substrpc_ws::Session;

pub async fn run(session: &Session, method: &str, params: &str) -> Result<()> {
    let params = parse_params(params)?;
    let result = session.call(method, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_params(raw: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(raw).context("--params is not valid JSON")? {
        Value::Array(items) => Ok(items),
        other => bail!("--params must be a JSON array, got {other}"),
    }
}
