//! chain-gateway command line.
//!
//! Every command builds the coin registry from the configuration file,
//! runs one operation and prints the result as JSON on stdout. Logs go to
//! stderr.
//!
//! Account chains (ETH, BNB, TRX) sign with the key in
//! `GATEWAY_SENDER_PRIVATE_KEY`; it is never accepted on the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use chain_gateway::blockchain::{Account, AddressFormat};
use chain_gateway::chain::{CreatedWalletView, FileLedger, Source};
use chain_gateway::config::loader::parse_config;
use chain_gateway::config::{load_config, GatewayConfig};
use chain_gateway::lifecycle::signals::spawn_ctrl_c_handler;
use chain_gateway::observability::logging::init_logging;
use chain_gateway::resilience::{poll_until, PollOutcome, PollPolicy};
use chain_gateway::{ChainError, Coin, Registry, Shutdown, WalletTag};

#[derive(Parser)]
#[command(name = "chain-gateway")]
#[command(about = "Deposit and withdrawal operations across chain nodes", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a receiving wallet
    CreateWallet {
        #[arg(long)]
        coin: Coin,
        /// Wallet name; required on UTXO nodes, ignored by account chains
        #[arg(long)]
        tag: Option<String>,
    },
    /// Balance of an address or wallet name
    Balance {
        #[arg(long)]
        coin: Coin,
        address: String,
    },
    /// Balance of the custody wallet
    CustodyBalance {
        #[arg(long)]
        coin: Coin,
    },
    /// Send funds to an external address
    Send {
        #[arg(long)]
        coin: Coin,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Decimal,
        /// Spend from this tag wallet instead of custody (UTXO coins)
        #[arg(long)]
        tag: Option<String>,
    },
    /// Move funds from a deposit wallet into custody
    Sweep {
        #[arg(long)]
        coin: Coin,
        #[arg(long)]
        main_address: String,
        #[arg(long)]
        amount: Decimal,
        /// Deposit wallet to sweep (UTXO coins)
        #[arg(long)]
        tag: Option<String>,
    },
    /// Confirmation depth of a transaction
    Confirmations {
        #[arg(long)]
        coin: Coin,
        txid: String,
    },
    /// Wait for a tag transaction and print its amount, address and intent
    Lookup {
        #[arg(long)]
        coin: Coin,
        #[arg(long)]
        tag: String,
        txid: String,
    },
    /// Newest incoming transaction of a tag not yet in the ledger
    Unprocessed {
        #[arg(long)]
        coin: Coin,
        #[arg(long)]
        tag: String,
        #[arg(long, default_value = "income-ledger.json")]
        ledger: PathBuf,
    },
    /// Mark an incoming transaction as processed
    RecordIncome {
        #[arg(long)]
        tag: String,
        #[arg(long, default_value = "income-ledger.json")]
        ledger: PathBuf,
        txid: String,
    },
    /// Poll confirmations until a target depth (Ctrl-C to stop)
    Watch {
        #[arg(long)]
        coin: Coin,
        #[arg(long, default_value_t = 6)]
        depth: u64,
        #[arg(long, default_value_t = 30_000)]
        interval_ms: u64,
        #[arg(long, default_value_t = 120)]
        max_checks: u32,
        txid: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = read_config(&cli.config)?;
    init_logging(&config.observability);

    // The ledger commands need no node
    if let Commands::RecordIncome { tag, ledger, txid } = &cli.command {
        let ledger = FileLedger::open(ledger)?;
        let inserted = ledger.record(txid, tag);
        ledger.save()?;
        return print(&json!({ "txid": txid, "tag": tag, "inserted": inserted }));
    }

    let registry = Registry::from_config(&config).await?;
    let shutdown = Arc::new(Shutdown::new());
    spawn_ctrl_c_handler(shutdown.clone());

    match cli.command {
        Commands::CreateWallet { coin, tag } => {
            let tag = match tag {
                Some(tag) => WalletTag::new(tag),
                None if coin.uses_wallet_tags() => {
                    return Err("create-wallet needs --tag for UTXO coins".into())
                }
                None => WalletTag::new("unused"),
            };
            let wallet = registry.get(coin)?.create_wallet(&tag).await?;
            print(&CreatedWalletView::from(&wallet))?;
        }
        Commands::Balance { coin, address } => {
            let balance = registry.get(coin)?.balance_of(&address).await?;
            print(&json!({ "coin": coin, "address": address, "balance": balance }))?;
        }
        Commands::CustodyBalance { coin } => {
            let balance = registry.get(coin)?.custody_balance().await?;
            print(&json!({ "coin": coin, "balance": balance }))?;
        }
        Commands::Send { coin, to, amount, tag } => {
            let service = registry.get(coin)?;
            let txid = match (sender(coin)?, tag) {
                (Some(account), _) => service.send(&to, amount, Source::Account(&account)).await?,
                (None, Some(tag)) => {
                    let tag = WalletTag::new(tag);
                    service.send(&to, amount, Source::Tag(&tag)).await?
                }
                (None, None) => service.send(&to, amount, Source::Custody).await?,
            };
            print(&json!({ "coin": coin, "txid": txid }))?;
        }
        Commands::Sweep { coin, main_address, amount, tag } => {
            let service = registry.get(coin)?;
            let outcome = match (sender(coin)?, tag) {
                (Some(account), _) => {
                    service
                        .sweep(&main_address, Source::Account(&account), amount)
                        .await?
                }
                (None, Some(tag)) => {
                    let tag = WalletTag::new(tag);
                    service.sweep(&main_address, Source::Tag(&tag), amount).await?
                }
                (None, None) => return Err("sweep needs --tag for UTXO coins".into()),
            };
            print(&json!({ "coin": coin, "outcome": outcome }))?;
        }
        Commands::Confirmations { coin, txid } => {
            let confirmations = registry.get(coin)?.confirmations(&txid).await?;
            print(&json!({
                "txid": txid,
                "confirmations": confirmations.as_sentinel(),
            }))?;
        }
        Commands::Lookup { coin, tag, txid } => {
            let summary = registry
                .utxo(coin)?
                .transaction_summary(&WalletTag::new(tag), &txid, &mut shutdown.signal())
                .await?;
            print(&summary)?;
        }
        Commands::Unprocessed { coin, tag, ledger } => {
            let ledger = FileLedger::open(ledger)?;
            let income = registry
                .utxo(coin)?
                .unprocessed_income(&WalletTag::new(tag), &ledger)
                .await?;
            print(&income)?;
        }
        Commands::Watch { coin, depth, interval_ms, max_checks, txid } => {
            let service = registry.get(coin)?;
            let policy = PollPolicy::fixed(max_checks, Duration::from_millis(interval_ms));
            let outcome = poll_until(
                &policy,
                "watch_confirmations",
                &mut shutdown.signal(),
                |attempt| {
                    let service = service.clone();
                    let txid = txid.clone();
                    async move {
                        let confirmations = service.confirmations(&txid).await?;
                        tracing::info!(txid = %txid, attempt = attempt, confirmations = confirmations.as_sentinel(), "Checked confirmations");
                        Ok::<_, ChainError>(confirmations)
                    }
                },
                |confirmations| confirmations.depth().is_some_and(|d| d >= depth),
            )
            .await?;

            let (status, attempts) = match &outcome {
                PollOutcome::Ready { attempts, .. } => ("reached", *attempts),
                PollOutcome::Exhausted { attempts, .. } => ("pending", *attempts),
                PollOutcome::Cancelled { attempts, .. } => ("cancelled", *attempts),
            };
            let last = outcome.into_last().map(|c| c.as_sentinel());
            print(&json!({
                "txid": txid,
                "target": depth,
                "status": status,
                "checks": attempts,
                "confirmations": last,
            }))?;
        }
        Commands::RecordIncome { .. } => {}
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        return Ok(load_config(path)?);
    }
    eprintln!("{} not found, using defaults", path.display());
    Ok(parse_config("", |key| std::env::var(key).ok())?)
}

/// Signing account for coins that spend from a local key.
fn sender(coin: Coin) -> Result<Option<Account>, ChainError> {
    let format = match coin {
        Coin::Ethereum | Coin::Bnb => AddressFormat::Evm,
        Coin::Tron => AddressFormat::Tron,
        Coin::Bitcoin | Coin::Litecoin | Coin::Dogecoin => return Ok(None),
    };
    Account::from_env(format).map(Some)
}

fn print<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
