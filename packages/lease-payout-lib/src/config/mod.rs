pub mod database;
pub mod distribution;
pub mod indexer;
pub mod node;

pub use crate::{
    config::{
        database::DatabaseConfig,
        distribution::{DistributionConfig, FeeAssetConfig, RewardTokenConfig, TransferMode},
        indexer::{FeePolicyConfig, IndexerConfig},
        node::NodeConfig,
    },
    defaults,
};
pub use clap::{Args, Parser};
use serde::Deserialize;
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum PayoutConfigError {
    #[error("Error parsing env variables from config: {0:?}")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("URL parser error: {0:?}")]
    ParseError(#[from] url::ParseError),
    #[error("Unsupported database: {0:?}")]
    UnsupportedDatabase(String),
}

/// Result type returned by configuration operations.
pub type PayoutConfigResult<T> = core::result::Result<T, PayoutConfigError>;

/// Set of environment variables consulted when an option is not provided.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "POSTGRES_HOST")]
    PostgresHost,
    #[strum(serialize = "POSTGRES_PASSWORD")]
    PostgresPassword,
    #[strum(serialize = "POSTGRES_DATABASE")]
    PostgresDatabase,
    #[strum(serialize = "POSTGRES_PORT")]
    PostgresPort,
    #[strum(serialize = "POSTGRES_USER")]
    PostgresUser,
    #[strum(serialize = "NODE_API_KEY")]
    NodeApiKey,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

/// Options shared by every `lease-payout` command.
#[derive(Debug, Args, Clone)]
pub struct PayoutArgs {
    /// Log level passed to the payout tooling.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn", "trace"]), help = "Log level passed to the payout tooling.")]
    pub log_level: String,

    /// Configuration file.
    #[clap(short, long, value_name = "FILE", help = "Configuration file.")]
    pub config: Option<PathBuf>,

    /// URL of the node REST API.
    #[clap(long, default_value = defaults::NODE_URL, help = "URL of the node REST API.")]
    pub node_url: String,

    /// Timeout (in seconds) applied to every node request.
    #[clap(long, default_value_t = defaults::NODE_REQUEST_TIMEOUT_SECS, help = "Timeout (in seconds) applied to every node request.")]
    pub node_request_timeout: u64,

    /// Node API key, required to submit transfers.
    #[clap(long, help = "Node API key, required to submit transfers.")]
    pub api_key: Option<String>,

    /// Database type.
    #[clap(long, help = "Database type.", default_value = defaults::DATABASE, value_parser(["sqlite", "postgres"]))]
    pub database: String,

    /// Path of the SQLite ledger.
    #[clap(long, help = "Path of the SQLite ledger.")]
    pub sqlite_path: Option<String>,

    /// Postgres username.
    #[clap(long, help = "Postgres username.")]
    pub postgres_user: Option<String>,

    /// Postgres database.
    #[clap(long, help = "Postgres database.")]
    pub postgres_database: Option<String>,

    /// Postgres password.
    #[clap(long, help = "Postgres password.")]
    pub postgres_password: Option<String>,

    /// Postgres host.
    #[clap(long, help = "Postgres host.")]
    pub postgres_host: Option<String>,

    /// Postgres port.
    #[clap(long, help = "Postgres port.")]
    pub postgres_port: Option<String>,

    /// Do not run database migrations before starting.
    #[clap(long, help = "Do not run database migrations before starting.")]
    pub skip_migrations: bool,

    /// Number of blocks fetched from the node per batch.
    #[clap(long, default_value_t = defaults::BATCH_SIZE, help = "Number of blocks fetched from the node per batch.")]
    pub batch_size: u64,

    /// Generator address whose leasers are paid.
    #[clap(long, help = "Generator address whose leasers are paid.")]
    pub address: Option<String>,

    /// First block of the payout window.
    #[clap(long, help = "First block of the payout window.")]
    pub start_block: Option<i64>,

    /// Last block (inclusive) of the payout window.
    #[clap(long, help = "Last block (inclusive) of the payout window.")]
    pub end_block: Option<i64>,

    /// Percentage of the generator's earnings distributed to leasers.
    #[clap(long, help = "Percentage of the generator's earnings distributed to leasers.")]
    pub percentage: Option<f64>,

    /// Flat fee (in whole native units) deducted from every leaser's payout.
    #[clap(long, help = "Flat fee (in whole native units) deducted from every leaser's payout.")]
    pub leaser_transfer_fee: Option<f64>,

    /// Payout file written by `payout` and read by `transfer` and `check`.
    #[clap(long, value_name = "FILE", help = "Payout file written by `payout` and read by `transfer` and `check`.")]
    pub filename: Option<PathBuf>,

    /// Submit one transfer per payment instead of mass transfers.
    #[clap(long, help = "Submit one transfer per payment instead of mass transfers.")]
    pub individual_transfers: bool,

    /// Write Prometheus metrics of the run to this file.
    #[clap(long, value_name = "FILE", help = "Write Prometheus metrics of the run to this file.")]
    pub metrics_file: Option<PathBuf>,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for PayoutArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            node_url: defaults::NODE_URL.to_string(),
            node_request_timeout: defaults::NODE_REQUEST_TIMEOUT_SECS,
            api_key: None,
            database: defaults::DATABASE.to_string(),
            sqlite_path: None,
            postgres_user: None,
            postgres_database: None,
            postgres_password: None,
            postgres_host: None,
            postgres_port: None,
            skip_migrations: !defaults::RUN_MIGRATIONS,
            batch_size: defaults::BATCH_SIZE,
            address: None,
            start_block: None,
            end_block: None,
            percentage: None,
            leaser_transfer_fee: None,
            filename: None,
            individual_transfers: false,
            metrics_file: None,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> PayoutConfigResult<()>;
}

/// Lease payout configuration.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct PayoutConfig {
    pub log_level: String,
    pub verbose: bool,
    pub run_migrations: bool,
    pub node: NodeConfig,
    pub database: DatabaseConfig,
    pub indexer: IndexerConfig,
    pub payout: DistributionConfig,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            run_migrations: defaults::RUN_MIGRATIONS,
            node: NodeConfig::default(),
            database: DatabaseConfig::default(),
            indexer: IndexerConfig::default(),
            payout: DistributionConfig::default(),
        }
    }
}

impl TryFrom<PayoutArgs> for PayoutConfig {
    type Error = PayoutConfigError;

    fn try_from(args: PayoutArgs) -> PayoutConfigResult<Self> {
        let database = match args.database.as_str() {
            "sqlite" => DatabaseConfig::Sqlite {
                path: args
                    .sqlite_path
                    .clone()
                    .unwrap_or_else(|| defaults::SQLITE_PATH.to_string()),
            },
            "postgres" => DatabaseConfig::Postgres {
                user: args.postgres_user.clone().unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresUser,
                        defaults::POSTGRES_USER.to_string(),
                    )
                }),
                password: args.postgres_password.clone().unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPassword,
                        defaults::POSTGRES_PASSWORD.to_string(),
                    )
                }),
                host: args.postgres_host.clone().unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresHost,
                        defaults::POSTGRES_HOST.to_string(),
                    )
                }),
                port: args.postgres_port.clone().unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPort,
                        defaults::POSTGRES_PORT.to_string(),
                    )
                }),
                database: args.postgres_database.clone().unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresDatabase,
                        defaults::POSTGRES_DATABASE.to_string(),
                    )
                }),
            },
            other => return Err(PayoutConfigError::UnsupportedDatabase(other.into())),
        };

        let mut config = PayoutConfig {
            log_level: args.log_level.clone(),
            verbose: args.verbose,
            run_migrations: !args.skip_migrations,
            node: NodeConfig {
                url: args.node_url.clone(),
                request_timeout_secs: args.node_request_timeout,
                api_key: args
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(EnvVar::NodeApiKey.as_ref()).ok()),
            },
            database,
            indexer: IndexerConfig {
                batch_size: args.batch_size,
                ..IndexerConfig::default()
            },
            payout: DistributionConfig::default(),
        };

        config.apply_window_overrides(&args);
        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

impl PayoutConfig {
    /// Build the configuration from a file if one was given, otherwise from
    /// the command line. Payout window options given on the command line
    /// always take precedence.
    pub fn load(args: PayoutArgs) -> PayoutConfigResult<Self> {
        match &args.config {
            Some(path) => {
                let mut config = PayoutConfig::from_file(path)?;
                config.apply_window_overrides(&args);
                Ok(config)
            }
            None => PayoutConfig::try_from(args),
        }
    }

    /// Read a YAML configuration file. Missing sections or settings fall
    /// back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> PayoutConfigResult<Self> {
        let file = File::open(path)?;
        let mut config: PayoutConfig = serde_yaml::from_reader(file)?;
        config.inject_opt_env_vars()?;
        Ok(config)
    }

    fn apply_window_overrides(&mut self, args: &PayoutArgs) {
        if let Some(address) = &args.address {
            self.payout.address = address.clone();
        }
        if let Some(start_block) = args.start_block {
            self.payout.start_block = start_block;
        }
        if let Some(end_block) = args.end_block {
            self.payout.end_block = end_block;
        }
        if let Some(percentage) = args.percentage {
            self.payout.percentage = percentage;
        }
        if let Some(fee) = args.leaser_transfer_fee {
            self.payout.leaser_transfer_fee = Some(fee);
        }
        if let Some(filename) = &args.filename {
            self.payout.filename = filename.clone();
        }
        if args.individual_transfers {
            self.payout.transfer_mode = TransferMode::Individual;
        }
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> PayoutConfigResult<()> {
        self.node.inject_opt_env_vars()?;
        self.database.inject_opt_env_vars()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_payout_config_will_supplement_top_level_config_vars() {
        let file_path: &str = "payout1.yaml";
        let config_str = r#"
    verbose: true

    ## Node configuration
    #
    node:
      url: http://10.0.0.1:6869
    "#;

        fs::write(file_path, config_str).unwrap();
        let config = PayoutConfig::from_file(file_path).unwrap();
        fs::remove_file(file_path).unwrap();

        assert!(config.verbose);
        assert!(config.run_migrations);
        assert_eq!(config.node.url, "http://10.0.0.1:6869");
        assert_eq!(
            config.node.request_timeout_secs,
            defaults::NODE_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.indexer.batch_size, defaults::BATCH_SIZE);
        assert_eq!(
            config.indexer.fee_policy.sponsorship_activation_height,
            defaults::SPONSORSHIP_ACTIVATION_HEIGHT
        );
        assert_eq!(config.payout.percentage, defaults::DISTRIBUTION_PERCENTAGE);

        match config.database {
            DatabaseConfig::Sqlite { path } => assert_eq!(path, defaults::SQLITE_PATH),
            _ => panic!("Expected the default SQLite ledger."),
        }
    }

    #[test]
    fn test_payout_config_will_supplement_individual_config_vars_in_sections() {
        let file_path: &str = "payout2.yaml";
        let config_str = r#"
        database:
          postgres:
            user: jimmy
            database: ledger
            password: super_secret_password

        payout:
          address: 3PGeneratorAddress
          start_block: 3000
          end_block: 4000
          percentage: 90
          reward_token:
            amount_per_block: 1.5
        "#;

        fs::write(file_path, config_str).unwrap();
        let config = PayoutConfig::from_file(file_path).unwrap();
        fs::remove_file(file_path).unwrap();

        assert_eq!(config.payout.address, "3PGeneratorAddress");
        assert_eq!(config.payout.start_block, 3000);
        assert_eq!(config.payout.end_block, 4000);
        assert_eq!(config.payout.percentage, 90.0);
        assert_eq!(config.payout.transfer_fee, defaults::TRANSFER_FEE);

        let token = config.payout.reward_token.unwrap();
        assert_eq!(token.asset_id, defaults::REWARD_TOKEN_ASSET_ID);
        assert_eq!(token.decimals, defaults::REWARD_TOKEN_DECIMALS);
        assert_eq!(token.amount_per_block, 1.5);

        match config.database {
            DatabaseConfig::Postgres {
                user,
                password,
                database,
                host,
                ..
            } => {
                assert_eq!(user, "jimmy".to_string());
                assert_eq!(database, "ledger".to_string());
                assert_eq!(password, "super_secret_password".to_string());
                assert_eq!(host, defaults::POSTGRES_HOST.to_string());
            }
            _ => panic!("Expected a Postgres configuration."),
        }
    }

    #[test]
    fn test_payout_config_injects_env_vars() {
        let file_path: &str = "payout3.yaml";
        let config_str = r#"
        node:
          api_key: ${LEASE_PAYOUT_TEST_API_KEY}
        "#;

        std::env::set_var("LEASE_PAYOUT_TEST_API_KEY", "secret-from-env");
        fs::write(file_path, config_str).unwrap();
        let config = PayoutConfig::from_file(file_path).unwrap();
        fs::remove_file(file_path).unwrap();

        assert_eq!(config.node.api_key.as_deref(), Some("secret-from-env"));
    }

    #[test]
    fn test_command_line_window_overrides_config_file() {
        let file_path: &str = "payout4.yaml";
        let config_str = r#"
        payout:
          address: 3PGeneratorAddress
          start_block: 1
          end_block: 2
        "#;

        fs::write(file_path, config_str).unwrap();
        let args = PayoutArgs {
            config: Some(PathBuf::from(file_path)),
            start_block: Some(5000),
            end_block: Some(6000),
            ..PayoutArgs::default()
        };
        let config = PayoutConfig::load(args).unwrap();
        fs::remove_file(file_path).unwrap();

        assert_eq!(config.payout.address, "3PGeneratorAddress");
        assert_eq!(config.payout.start_block, 5000);
        assert_eq!(config.payout.end_block, 6000);
    }

    #[test]
    fn test_config_from_args_uses_sqlite_path() {
        let args = PayoutArgs {
            sqlite_path: Some("ledger.db".to_string()),
            batch_size: 50,
            ..PayoutArgs::default()
        };
        let config = PayoutConfig::try_from(args).unwrap();

        assert_eq!(config.indexer.batch_size, 50);
        assert_eq!(config.database.to_string(), "sqlite://ledger.db");
    }

    #[test]
    fn test_individual_transfers_with_sponsored_fee() {
        let file_path: &str = "payout5.yaml";
        let config_str = r#"
        payout:
          address: 3PGeneratorAddress
          fee_asset:
            asset_id: SponsoredAsset
            fee: 7
        "#;

        fs::write(file_path, config_str).unwrap();
        let config = PayoutConfig::from_file(file_path).unwrap();
        assert_eq!(config.payout.transfer_mode, TransferMode::Mass);
        assert_eq!(
            config.payout.fee_asset,
            Some(FeeAssetConfig {
                asset_id: "SponsoredAsset".to_string(),
                fee: 7,
            })
        );

        let args = PayoutArgs {
            config: Some(PathBuf::from(file_path)),
            individual_transfers: true,
            ..PayoutArgs::default()
        };
        let config = PayoutConfig::load(args).unwrap();
        fs::remove_file(file_path).unwrap();

        assert_eq!(config.payout.transfer_mode, TransferMode::Individual);
    }
}
