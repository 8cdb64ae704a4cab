use std::process::ExitCode;

use tally_core::Query;
use tally_sim::{Account, ChainGenerator, InMemoryWallet, SimConfig, cross_check};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match SimConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let addresses = config.addresses as Account;
    let generator = match ChainGenerator::new(config) {
        Ok(generator) => generator,
        Err(e) => {
            error!("Failed to start generator: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sim = generator.generate();
    let ledger = sim.ledger();
    info!(
        transactions = ledger.len(),
        unspent = ledger.unspent_outputs().len(),
        fees = sim.total_fees(),
        valid = ledger.is_valid(),
        "ledger built"
    );

    let owned: Query<Account> = (0..addresses).collect();
    let mut wallet = InMemoryWallet::new(owned.clone());
    let mismatches = cross_check(&mut wallet, &owned, &sim.bootstrap, &sim.chain);
    if mismatches.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
