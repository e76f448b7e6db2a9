//! Hashing and Address Helpers

use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use tiny_keccak::{Hasher, Keccak};

use crate::error::{CardResult, CardSignError};

/// Keccak256 hash (transaction hashes and Ethereum addresses)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// EIP-55 checksummed form of an address
pub fn to_checksum_address(address: &Address) -> String {
    to_checksum(address, None)
}

/// Parse a `0x`-prefixed or bare 40-digit hex address
pub fn parse_address(input: &str) -> CardResult<Address> {
    let hex_part = input.trim().trim_start_matches("0x");
    if hex_part.len() != 40 {
        return Err(CardSignError::invalid_input(format!(
            "address must be 20 bytes, got {} hex digits",
            hex_part.len()
        )));
    }
    let bytes = hex::decode(hex_part)?;
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"");
        assert_eq!(
            hex::encode(hash),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_checksum_address() {
        let address = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            to_checksum_address(&address),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_parse_address_rejects_short() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }
}
