/*!
Configuration loader for simulations.

Use `SimConfig::from_env()` to construct a configuration from environment
variables or a `.env` file.
*/

use std::env;

/// Default seed for the chain generator.
const DEFAULT_SEED: u64 = 0;
/// Default number of blocks to generate.
const DEFAULT_BLOCKS: usize = 8;
/// Default number of transactions per block.
const DEFAULT_TXS_PER_BLOCK: usize = 4;
/// Default number of distinct addresses value moves between.
const DEFAULT_ADDRESSES: usize = 4;
/// Default value minted by the bootstrap transaction.
const DEFAULT_INITIAL_SUPPLY: u64 = 1_000_000;
/// Default upper bound on the fee of a generated transaction.
const DEFAULT_MAX_FEE: u64 = 10;
/// Default upper bound on the outputs of a generated transaction.
const DEFAULT_MAX_OUTPUTS: usize = 3;

/// Error type for config parsing issues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("failed to parse {var}='{value}': {reason}")]
    Parse {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The values parsed but cannot drive a simulation.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Simulation configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed for the generator's random number generator.
    pub seed: u64,

    /// Number of blocks in the generated chain.
    pub blocks: usize,

    /// Number of transactions attempted per block.
    pub txs_per_block: usize,

    /// Number of addresses, numbered from 0. Address 0 receives the initial supply.
    pub addresses: usize,

    /// Value minted by the bootstrap transaction.
    pub initial_supply: u64,

    /// Largest fee a generated transaction may pay.
    pub max_fee: u64,

    /// Largest number of outputs a generated transaction may create.
    pub max_outputs: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            blocks: DEFAULT_BLOCKS,
            txs_per_block: DEFAULT_TXS_PER_BLOCK,
            addresses: DEFAULT_ADDRESSES,
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            max_fee: DEFAULT_MAX_FEE,
            max_outputs: DEFAULT_MAX_OUTPUTS,
        }
    }
}

impl SimConfig {
    /// Load configuration from environment variables or a `.env` file.
    ///
    /// Recognized environment variables, all optional:
    /// - `TALLY_SEED` - u64, defaults to 0
    /// - `TALLY_BLOCKS` - usize, defaults to 8
    /// - `TALLY_TXS_PER_BLOCK` - usize, defaults to 4
    /// - `TALLY_ADDRESSES` - usize, defaults to 4
    /// - `TALLY_INITIAL_SUPPLY` - u64, defaults to 1_000_000
    /// - `TALLY_MAX_FEE` - u64, defaults to 10
    /// - `TALLY_MAX_OUTPUTS` - usize, defaults to 3
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present, ignore errors
        let _ = dotenv::dotenv();
        Self::from_vars(|var| env::var(var).ok())
    }

    /// Build a configuration from a variable lookup, then validate it.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = SimConfig {
            seed: parse_var(&lookup, "TALLY_SEED", DEFAULT_SEED)?,
            blocks: parse_var(&lookup, "TALLY_BLOCKS", DEFAULT_BLOCKS)?,
            txs_per_block: parse_var(&lookup, "TALLY_TXS_PER_BLOCK", DEFAULT_TXS_PER_BLOCK)?,
            addresses: parse_var(&lookup, "TALLY_ADDRESSES", DEFAULT_ADDRESSES)?,
            initial_supply: parse_var(&lookup, "TALLY_INITIAL_SUPPLY", DEFAULT_INITIAL_SUPPLY)?,
            max_fee: parse_var(&lookup, "TALLY_MAX_FEE", DEFAULT_MAX_FEE)?,
            max_outputs: parse_var(&lookup, "TALLY_MAX_OUTPUTS", DEFAULT_MAX_OUTPUTS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the generator cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses == 0 {
            return Err(ConfigError::Invalid("at least one address is required"));
        }
        if self.addresses > u32::MAX as usize {
            return Err(ConfigError::Invalid("addresses must fit in a u32"));
        }
        if self.initial_supply == 0 {
            return Err(ConfigError::Invalid("initial supply must be positive"));
        }
        if self.max_outputs == 0 {
            return Err(ConfigError::Invalid("transactions need at least one output"));
        }
        Ok(())
    }
}

/// Parse `var` if it is set and non-blank, otherwise fall back to `default`.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(s) if !s.trim().is_empty() => {
            s.trim().parse::<T>().map_err(|e| ConfigError::Parse {
                var,
                value: s.clone(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn missing_vars_use_defaults() {
        assert_eq!(SimConfig::from_vars(lookup(&[])), Ok(SimConfig::default()));
    }

    #[test]
    fn blank_vars_use_defaults() {
        let config = SimConfig::from_vars(lookup(&[("TALLY_BLOCKS", "  ")])).unwrap();
        assert_eq!(config.blocks, DEFAULT_BLOCKS);
    }

    #[test]
    fn set_vars_override_defaults() {
        let config = SimConfig::from_vars(lookup(&[
            ("TALLY_SEED", "42"),
            ("TALLY_BLOCKS", " 3 "),
            ("TALLY_ADDRESSES", "2"),
            ("TALLY_MAX_FEE", "0"),
        ]))
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.blocks, 3);
        assert_eq!(config.addresses, 2);
        assert_eq!(config.max_fee, 0);
        assert_eq!(config.initial_supply, DEFAULT_INITIAL_SUPPLY);
    }

    #[test]
    fn unparsable_vars_name_the_variable() {
        let err = SimConfig::from_vars(lookup(&[("TALLY_SEED", "seven")])).unwrap_err();
        match err {
            ConfigError::Parse { var, value, .. } => {
                assert_eq!(var, "TALLY_SEED");
                assert_eq!(value, "seven");
            }
            other => panic!("Expected Parse error, got: {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_degenerate_configs() {
        for config in [
            SimConfig {
                addresses: 0,
                ..SimConfig::default()
            },
            SimConfig {
                initial_supply: 0,
                ..SimConfig::default()
            },
            SimConfig {
                max_outputs: 0,
                ..SimConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }
}
