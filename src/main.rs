//! card-eth-signer
//!
//! Read-only ledger queries for a card-held Ethereum account. Settings
//! come from `CARD_SIGNER_*` environment variables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use card_eth_signer::utils::logging;
use card_eth_signer::{
    parse_address, to_checksum_address, BalanceQuery, CardResult, JsonRpcLedger, LedgerClient,
    SignerConfig,
};
use card_eth_signer::BlockSelector;

#[derive(Parser)]
#[command(name = "card-eth-signer", version, about = "Ethereum ledger queries for a hardware-card account")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "CARD_SIGNER_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Confirmed balance and pending delta of an address
    Balance {
        /// 0x-prefixed account address
        address: String,
    },
    /// Next nonce of an address, counting pending transactions
    Nonce {
        /// 0x-prefixed account address
        address: String,
    },
}

fn run(command: &Command) -> CardResult<serde_json::Value> {
    let config = SignerConfig::from_env()?;
    let ledger = JsonRpcLedger::from_config(&config)?;

    match command {
        Command::Balance { address } => {
            let address = parse_address(address)?;
            let snapshot = BalanceQuery::new(&ledger).get_balance(address)?;
            Ok(json!({
                "address": to_checksum_address(&address),
                "chain_id": config.chain_id,
                "balance": snapshot,
            }))
        }
        Command::Nonce { address } => {
            let address = parse_address(address)?;
            let nonce = ledger.get_transaction_count(address, BlockSelector::Pending)?;
            Ok(json!({
                "address": to_checksum_address(&address),
                "chain_id": config.chain_id,
                "nonce": nonce.to_string(),
            }))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match run(&cli.command) {
        Ok(output) => {
            let rendered = serde_json::to_string_pretty(&output).context("rendering output")?;
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            let report = serde_json::to_string(&e.to_report()).context("rendering error")?;
            eprintln!("{}", report);
            std::process::exit(1);
        }
    }
}
