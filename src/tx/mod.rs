//! Transaction Module
//!
//! Handles transaction assembly, card signing, encoding and broadcasting.

mod assembler;
mod broadcaster;
pub mod codec;
pub mod replay_protection;

pub use assembler::*;
pub use broadcaster::*;
pub use codec::{LegacyEip155Codec, TransactionCodec};
pub use replay_protection::chain_ids;
