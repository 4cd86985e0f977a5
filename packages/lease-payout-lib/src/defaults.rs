pub const LOG_LEVEL: &str = "info";

pub const NODE_URL: &str = "http://127.0.0.1:6869";
pub const NODE_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DATABASE: &str = "sqlite";
pub const SQLITE_PATH: &str = "blocks.db";
pub const POSTGRES_DATABASE: &str = "postgres";
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_HOST: &str = "127.0.0.1";
pub const POSTGRES_PORT: &str = "5432";
pub const POSTGRES_PASSWORD: &str = "";

pub const RUN_MIGRATIONS: bool = true;
pub const VERBOSE_LOGGING: bool = false;

pub const MAX_DATABASE_CONNECTION_ATTEMPTS: usize = 5;
pub const INITIAL_RETRY_DELAY_SECS: u64 = 2;

/// Blocks requested from the node per batch. The node refuses larger `/blocks/seq` ranges.
pub const BATCH_SIZE: u64 = 100;

/// Number of blocks a lease must wait before it counts towards revenue share.
pub const ACTIVATION_DELAY: i64 = 1000;

/// Native fees at or above this value (in minimal units) are treated as spam.
pub const FEE_CEILING: i64 = 1_000_000_000;

/// Flat fee credited for a sponsored transfer.
pub const SPONSORED_FEE: i64 = 100_000;
pub const SPONSORSHIP_ACTIVATION_HEIGHT: i64 = 1_090_000;
pub const REWARD_ACTIVATION_HEIGHT: i64 = 1_740_000;

pub const DISTRIBUTION_PERCENTAGE: f64 = 100.0;
pub const TRANSFER_FEE: i64 = 100_000;
pub const PAYOUT_FILENAME: &str = "payout.json";

pub const NATIVE_ASSET: &str = "WAVES";
pub const NATIVE_ASSET_DECIMALS: u32 = 8;

pub const REWARD_TOKEN_ASSET_ID: &str = "4uK8i4ThRGbehENwa6MxyLtxAjAo1Rj9fduborGExarC";
pub const REWARD_TOKEN_DECIMALS: u32 = 2;

pub const MASS_TRANSFER_MAX_RECIPIENTS: usize = 100;
