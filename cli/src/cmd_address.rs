//! `substrpc address`: SS58 <-> public key.

use anyhow::Result;
use substrpc_codec::hex::{from_hex_array, to_hex};
use substrpc_codec::AccountId32;

pub fn run(input: &str, prefix: u16) -> Result<()> {
    println!("{}", convert(input, prefix)?);
    Ok(())
}

fn convert(input: &str, prefix: u16) -> Result<String> {
    if input.starts_with("0x") {
        let account = AccountId32::new(from_hex_array::<32>(input)?);
        Ok(account.to_ss58(prefix)?)
    } else {
        let (account, network) = AccountId32::from_ss58(input)?;
        Ok(format!("{} (prefix {network})", to_hex(account.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn pubkey_to_address() {
        assert_eq!(convert(ALICE, 42).unwrap(), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
    }

    #[test]
    fn address_to_pubkey() {
        let out = convert("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY", 0).unwrap();
        assert_eq!(out, format!("{ALICE} (prefix 42)"));
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(convert("0x1234", 42).is_err());
        assert!(convert("not-an-address", 42).is_err());
        assert!(convert(ALICE, 20_000).is_err());
    }
}
