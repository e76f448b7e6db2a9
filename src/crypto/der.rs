//! DER Signature Extraction
//!
//! The card returns `SEQUENCE { INTEGER r, INTEGER s }`. Only the bytes
//! needed to locate the two integers are interpreted; anything that would
//! read past the buffer or hit an unexpected tag is a decoding error.

use crate::error::{CardResult, CardSignError};
use crate::types::SignatureComponents;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;
const LONG_FORM_BIT: u8 = 0x80;

/// Split a DER signature into raw unsigned `r` and `s`
pub fn extract_components(der: &[u8]) -> CardResult<SignatureComponents> {
    let tag = byte_at(der, 0, "sequence tag")?;
    if tag != SEQUENCE_TAG {
        return Err(CardSignError::decoding(format!(
            "expected SEQUENCE tag 0x30, found 0x{:02x}",
            tag
        )));
    }

    // Long-form length (0x81 NN) pushes the first INTEGER one byte further in
    let length_byte = byte_at(der, 1, "sequence length")?;
    let r_start = if length_byte & LONG_FORM_BIT != 0 {
        if length_byte & !LONG_FORM_BIT != 1 {
            return Err(CardSignError::decoding(format!(
                "unsupported sequence length encoding 0x{:02x}",
                length_byte
            )));
        }
        3
    } else {
        2
    };

    let (r, s_start) = read_integer(der, r_start, "r")?;
    let (s, _) = read_integer(der, s_start, "s")?;

    Ok(SignatureComponents::new(r, s))
}

/// Encode `r` and `s` as minimal short-form DER
pub fn encode_der(components: &SignatureComponents) -> CardResult<Vec<u8>> {
    let r = der_integer(&components.r, "r")?;
    let s = der_integer(&components.s, "s")?;

    // Two 35-byte integers at most, so the sequence length fits short form
    let mut out = Vec::with_capacity(2 + r.len() + s.len());
    out.push(SEQUENCE_TAG);
    out.push((r.len() + s.len()) as u8);
    out.extend_from_slice(&r);
    out.extend_from_slice(&s);
    Ok(out)
}

/// Strip leading zero bytes, keeping an all-zero value as empty
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

fn read_integer(der: &[u8], offset: usize, name: &str) -> CardResult<(Vec<u8>, usize)> {
    let tag = byte_at(der, offset, name)?;
    if tag != INTEGER_TAG {
        return Err(CardSignError::decoding(format!(
            "expected INTEGER tag for {}, found 0x{:02x}",
            name, tag
        )));
    }

    let len = byte_at(der, offset + 1, name)? as usize;
    if len == 0 || len & LONG_FORM_BIT as usize != 0 {
        return Err(CardSignError::decoding(format!("invalid length {} for {}", len, name)));
    }

    let start = offset + 2;
    let end = start + len;
    let raw = der.get(start..end).ok_or_else(|| {
        CardSignError::decoding(format!(
            "{} needs {} bytes at offset {}, signature has {}",
            name,
            len,
            start,
            der.len()
        ))
    })?;

    let value = trim_leading_zeros(raw);
    if value.is_empty() {
        return Err(CardSignError::decoding(format!("{} is zero", name)));
    }
    if value.len() > 32 {
        return Err(CardSignError::decoding(format!(
            "{} is {} bytes, wider than the curve field",
            name,
            value.len()
        )));
    }

    Ok((value.to_vec(), end))
}

fn der_integer(value: &[u8], name: &str) -> CardResult<Vec<u8>> {
    let value = trim_leading_zeros(value);
    if value.len() > 32 {
        return Err(CardSignError::invalid_input(format!(
            "{} is {} bytes, wider than the curve field",
            name,
            value.len()
        )));
    }
    let pad = value.first().map_or(true, |b| b & 0x80 != 0);

    let mut out = Vec::with_capacity(value.len() + 3);
    out.push(INTEGER_TAG);
    out.push((value.len() + pad as usize) as u8);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(value);
    Ok(out)
}

fn byte_at(der: &[u8], index: usize, what: &str) -> CardResult<u8> {
    der.get(index).copied().ok_or_else(|| {
        CardSignError::decoding(format!(
            "signature truncated reading {} at offset {}",
            what, index
        ))
    })
}
