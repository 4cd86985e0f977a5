use crate::{config::PayoutConfig, defaults};
use std::{env, future::Future, str::FromStr};
use tokio::time::{sleep, Duration};
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

// Dependencies that are only heard from in verbose mode.
const QUIET_DEPENDENCIES: &str = "sqlx=warn,hyper=warn,reqwest=warn,rustls=warn";

/// Strip the `$` or `${...}` wrapper from an environment variable reference.
pub fn trim_opt_env_key(key: &str) -> &str {
    key.strip_prefix("${")
        .and_then(|k| k.strip_suffix('}'))
        .or_else(|| key.strip_prefix('$'))
        .unwrap_or(key)
}

/// Determine whether a given key is an environment variable.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with('$') || (k.starts_with("${") && k.ends_with('}'))
}

/// Attempt to connect to a database, with retries.
///
/// This function takes a closure with a database connection
/// function as an argument; said function should return a future that
/// resolves to a final value of type `Result<T, sqlx::Error>`. The last
/// error is returned once the attempts are exhausted.
pub async fn attempt_database_connection<F, Fut, T, U>(mut fut: F) -> Result<T, U>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, U>>,
    U: std::error::Error,
{
    let mut remaining_retries = defaults::MAX_DATABASE_CONNECTION_ATTEMPTS;
    let mut delay = defaults::INITIAL_RETRY_DELAY_SECS;
    loop {
        match fut().await {
            Ok(t) => break Ok(t),
            Err(e) => {
                if remaining_retries > 0 {
                    warn!(
                        "Could not connect to database: {e}. Retrying in {delay} seconds...",
                    );
                    remaining_retries -= 1;
                    sleep(Duration::from_secs(delay)).await;
                    delay *= 2;
                } else {
                    break Err(e);
                }
            }
        }
    }
}

/// Initialize `tracing` for the payout tooling.
///
/// `RUST_LOG` takes precedence over the configured level. Output is human
/// readable unless `HUMAN_LOGGING=false`, which switches to JSON lines.
pub fn init_logging(config: &PayoutConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());
    let directives = if config.verbose {
        level
    } else {
        format!("{level},{QUIET_DEPENDENCIES}")
    };
    let filter = EnvFilter::try_new(directives)?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(value) => bool::from_str(&value).map_err(|_| {
            anyhow::anyhow!("HUMAN_LOGGING must be `true` or `false`, got {value:?}")
        })?,
        Err(_) => true,
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_level(true)
        .with_line_number(true);

    let installed = if human_logging {
        builder.with_ansi(true).try_init()
    } else {
        builder.with_ansi(false).json().try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("{e}"))
}
