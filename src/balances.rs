//! Balance Query
//!
//! Confirmed balance plus the unconfirmed change, from two ledger reads.
//! A null balance from the node counts as zero.

use ethers_core::types::{Address, I256, U256};
use ethers_core::utils::format_units;

use crate::error::{CardResult, CardSignError};
use crate::ledger::LedgerClient;
use crate::types::{BalanceSnapshot, BlockSelector};
use crate::utils::logging::redact_address;

/// Decimal places between wei and ether
pub const ETHER_DECIMALS: u32 = 18;

pub struct BalanceQuery<L> {
    ledger: L,
}

impl<L: LedgerClient> BalanceQuery<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Confirmed and pending balance of `address`
    pub fn get_balance(&self, address: Address) -> CardResult<BalanceSnapshot> {
        let confirmed = self
            .ledger
            .get_balance(address, BlockSelector::Latest)?
            .unwrap_or_default();
        let pending = self
            .ledger
            .get_balance(address, BlockSelector::Pending)?
            .unwrap_or_default();

        tracing::debug!(
            address = %redact_address(&address),
            %confirmed,
            %pending,
            "balance read"
        );
        snapshot(confirmed, pending)
    }
}

/// Build a snapshot from the two raw wei readings
pub fn snapshot(confirmed_wei: U256, pending_wei: U256) -> CardResult<BalanceSnapshot> {
    let (negative, magnitude) = if pending_wei >= confirmed_wei {
        (false, pending_wei - confirmed_wei)
    } else {
        (true, confirmed_wei - pending_wei)
    };

    let delta = I256::try_from(magnitude)
        .map_err(|_| CardSignError::network("pending balance delta out of range"))?;
    let pending_delta_wei = if negative { -delta } else { delta };

    let magnitude_ether = to_ether(magnitude)?;
    let pending_delta_ether = if negative {
        format!("-{}", magnitude_ether)
    } else {
        magnitude_ether
    };

    Ok(BalanceSnapshot {
        confirmed_wei,
        confirmed_ether: to_ether(confirmed_wei)?,
        pending_delta_wei,
        pending_delta_ether,
    })
}

/// Format wei as an ether decimal string
pub fn to_ether(wei: U256) -> CardResult<String> {
    format_units(wei, ETHER_DECIMALS)
        .map_err(|e| CardSignError::invalid_input(format!("cannot scale {} wei: {}", wei, e)))
}
