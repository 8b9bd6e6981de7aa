mod chain;
mod config;
mod confirm;
mod fees;
mod network;
mod orchestrator;
mod scheduler;
mod wallet;

use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use crate::config::Config;
use crate::confirm::{prompt, StdinConfirmer};
use crate::network::{ProxyPool, Session};
use crate::orchestrator::{ActionRequest, Approval};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Tea Sepolia staking and transfer bot")]
struct Args {
    /// Path to config file
    #[clap(short, long, default_value = "config.json")]
    config: String,

    /// Generate default config file
    #[clap(short, long)]
    init: bool,

    /// Show wallet address (useful for funding)
    #[clap(short, long)]
    show_wallet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stdout)
        .init();
    dotenvy::dotenv().ok();

    if args.init {
        let config = Config::default();
        config.save(&args.config)?;
        println!("Default config generated at: {}", args.config);
        return Ok(());
    }

    let config = Config::load(&args.config)?;

    if args.show_wallet {
        let key = std::env::var("PRIVATE_KEY")
            .context("PRIVATE_KEY not set in the environment")?;
        let signer = key
            .trim()
            .parse::<PrivateKeySigner>()
            .ok()
            .context("PRIVATE_KEY is not a valid private key")?;
        println!("Wallet address: {}", signer.address());
        println!("Please fund this wallet before running transfers");
        return Ok(());
    }

    let pool = ProxyPool::load(&config.proxy_file);
    let mut rng = rand::thread_rng();

    // A missing credential or unreachable endpoint is an operator error;
    // exit instead of retrying.
    let session = Session::connect(&config, &pool, &mut rng)
        .await
        .context("failed to connect to the network")?;

    let network = session.network.clone();
    let address = session.address;
    let proxy = session.proxy.clone();
    let mut confirmer = StdinConfirmer;

    wallet::print_banner(&session, &network).await;
    wallet::report(&session, address, &network, proxy.as_deref()).await;

    loop {
        println!("\n===== MENU =====");
        println!("1. Stake {}", network.symbol);
        println!("2. Withdraw {}", network.staked_symbol);
        println!("3. Claim Rewards");
        println!("4. Send To Random Address");
        println!("5. Execute Random Transfers");
        println!("6. Exit");

        let choice = match prompt("\nSelect an option (1-6): ") {
            Ok(line) => line,
            // stdin closed
            Err(_) => break,
        };

        match choice.as_str() {
            "1" => {
                let Some(amount) =
                    read_amount(&format!("Enter amount to stake ({}): ", network.symbol))
                else {
                    continue;
                };
                let outcome = orchestrator::execute(
                    &session,
                    &network,
                    &mut confirmer,
                    Approval::Required,
                    &ActionRequest::Stake { amount },
                )
                .await;
                debug!("stake outcome: {:?}", outcome);
                wallet::report(&session, address, &network, proxy.as_deref()).await;
            }
            "2" => {
                let Some(amount) = read_amount(&format!(
                    "Enter amount to withdraw ({}): ",
                    network.staked_symbol
                )) else {
                    continue;
                };
                let outcome = orchestrator::execute(
                    &session,
                    &network,
                    &mut confirmer,
                    Approval::Required,
                    &ActionRequest::Withdraw { amount },
                )
                .await;
                debug!("withdraw outcome: {:?}", outcome);
                wallet::report(&session, address, &network, proxy.as_deref()).await;
            }
            "3" => {
                let outcome = orchestrator::execute(
                    &session,
                    &network,
                    &mut confirmer,
                    Approval::Required,
                    &ActionRequest::ClaimRewards,
                )
                .await;
                debug!("claim outcome: {:?}", outcome);
                wallet::report(&session, address, &network, proxy.as_deref()).await;
            }
            "4" => {
                let request = ActionRequest::Transfer {
                    to: scheduler::random_recipient(&mut rng),
                    amount: scheduler::random_amount(&mut rng, &config.transfer),
                };
                let outcome = orchestrator::execute(
                    &session,
                    &network,
                    &mut confirmer,
                    Approval::Required,
                    &request,
                )
                .await;
                debug!("transfer outcome: {:?}", outcome);
                wallet::report(&session, address, &network, proxy.as_deref()).await;
            }
            "5" => {
                let Some(count) = read_count("Enter number of transfers: ") else {
                    continue;
                };
                scheduler::run_batch(
                    &session,
                    &network,
                    &mut confirmer,
                    &mut rng,
                    &config.transfer,
                    count,
                )
                .await;
                wallet::report(&session, address, &network, proxy.as_deref()).await;
            }
            "6" => {
                println!("Exiting... Goodbye!");
                break;
            }
            _ => println!("Invalid option. Please try again."),
        }
    }

    Ok(())
}

fn read_amount(message: &str) -> Option<U256> {
    let line = prompt(message).ok()?;
    match fees::parse_native(&line) {
        Ok(amount) => Some(amount),
        Err(e) => {
            println!("{}", e);
            None
        }
    }
}

fn read_count(message: &str) -> Option<usize> {
    let line = prompt(message).ok()?;
    match line.parse::<usize>() {
        Ok(count) if count > 0 => Some(count),
        _ => {
            println!("Enter a positive whole number.");
            None
        }
    }
}
