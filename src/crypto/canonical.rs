//! Low-S Canonicalization
//!
//! Ethereum rejects signatures whose `s` lies in the upper half of the
//! secp256k1 group order. The card gives no guarantee about which half it
//! returns, so every signature is folded into the lower half here.

use ethers_core::types::U256;

use crate::crypto::der::trim_leading_zeros;
use crate::error::{CardResult, CardSignError};
use crate::types::SignatureComponents;

/// secp256k1 group order `n`
pub const CURVE_ORDER: U256 = U256([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// `n / 2`, the largest canonical `s`
pub const HALF_CURVE_ORDER: U256 = U256([
    0xdfe9_2f46_681b_20a0,
    0x5d57_6e73_57a4_501d,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);

/// Replace `s` with `min(s, n - s)`; `r` passes through unchanged
pub fn canonicalize(components: SignatureComponents) -> CardResult<SignatureComponents> {
    let s = components.s_u256();
    if s.is_zero() || s >= CURVE_ORDER {
        return Err(CardSignError::decoding("s is outside the curve order"));
    }

    if is_canonical(s) {
        return Ok(components);
    }

    Ok(SignatureComponents::new(components.r, to_trimmed_bytes(CURVE_ORDER - s)))
}

pub fn is_canonical(s: U256) -> bool {
    s <= HALF_CURVE_ORDER
}

/// Big-endian bytes of `value` with no leading zeros
pub fn to_trimmed_bytes(value: U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    trim_leading_zeros(&buf).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_agree() {
        assert_eq!(CURVE_ORDER >> 1, HALF_CURVE_ORDER);
        assert_eq!(
            format!("{:x}", CURVE_ORDER),
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
    }

    #[test]
    fn test_low_s_passes_through() {
        let components = SignatureComponents::new(vec![0x05], vec![0x01, 0x00]);
        let canonical = canonicalize(components.clone()).unwrap();
        assert_eq!(canonical, components);
    }

    #[test]
    fn test_high_s_is_folded() {
        let high = CURVE_ORDER - U256::from(7u64);
        let components = SignatureComponents::new(vec![0x05], to_trimmed_bytes(high));

        let canonical = canonicalize(components).unwrap();
        assert_eq!(canonical.s, vec![0x07]);
        assert_eq!(canonical.r, vec![0x05]);
    }

    #[test]
    fn test_half_order_boundary() {
        let at_half = SignatureComponents::new(vec![1], to_trimmed_bytes(HALF_CURVE_ORDER));
        assert_eq!(canonicalize(at_half.clone()).unwrap(), at_half);

        let above = SignatureComponents::new(vec![1], to_trimmed_bytes(HALF_CURVE_ORDER + 1));
        let folded = canonicalize(above).unwrap();
        assert_eq!(folded.s_u256(), HALF_CURVE_ORDER);
    }

    #[test]
    fn test_out_of_range_s_rejected() {
        let zero = SignatureComponents::new(vec![1], vec![]);
        assert!(canonicalize(zero).is_err());

        let order = SignatureComponents::new(vec![1], to_trimmed_bytes(CURVE_ORDER));
        assert!(matches!(canonicalize(order), Err(CardSignError::Decoding(_))));
    }
}
