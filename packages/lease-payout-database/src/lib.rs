pub use lease_payout_database_types::DbType;
use lease_payout_lib::utils::attempt_database_connection;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
};
use std::{str::FromStr, time::Duration};
use thiserror::Error;
use tracing::info;

pub mod queries;
pub mod types {
    pub use lease_payout_database_types::*;
}

#[derive(Debug, Error)]
pub enum LedgerDatabaseError {
    #[error("Invalid connection string: {0:?}")]
    InvalidConnectionString(String),
    #[error("Database backend not supported: {0:?}")]
    BackendNotSupported(String),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] SqlxError),
}

#[derive(Debug)]
pub enum LedgerConnection {
    Postgres(Box<PoolConnection<sqlx::Postgres>>),
    Sqlite(PoolConnection<sqlx::Sqlite>),
}

#[derive(Clone, Debug)]
pub enum LedgerConnectionPool {
    Postgres(sqlx::Pool<sqlx::Postgres>),
    Sqlite(sqlx::Pool<sqlx::Sqlite>),
}

impl LedgerConnectionPool {
    pub fn database_type(&self) -> DbType {
        match self {
            LedgerConnectionPool::Postgres(_) => DbType::Postgres,
            LedgerConnectionPool::Sqlite(_) => DbType::Sqlite,
        }
    }

    /// Open a pool on the ledger named by `database_url`. The backend is
    /// chosen from the URL scheme; the first connection is retried with
    /// exponential backoff.
    pub async fn connect(
        database_url: &str,
    ) -> Result<LedgerConnectionPool, LedgerDatabaseError> {
        let url = url::Url::parse(database_url).map_err(|_| {
            LedgerDatabaseError::InvalidConnectionString(database_url.into())
        })?;

        let db_type = DbType::from_str(url.scheme()).map_err(|_| {
            LedgerDatabaseError::BackendNotSupported(url.scheme().into())
        })?;

        match db_type {
            DbType::Postgres => {
                let options = PgConnectOptions::from_str(database_url)?;
                let pool = attempt_database_connection(|| {
                    PgPoolOptions::new().connect_with(options.clone())
                })
                .await?;

                info!("Connected to Postgres ledger.");
                Ok(LedgerConnectionPool::Postgres(pool))
            }
            DbType::Sqlite => {
                let options = SqliteConnectOptions::from_str(database_url)?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true);
                let pool = attempt_database_connection(|| {
                    SqlitePoolOptions::new()
                        .max_connections(10)
                        .idle_timeout(Duration::from_secs(2))
                        .connect_with(options.clone())
                })
                .await?;

                info!("Connected to SQLite ledger.");
                Ok(LedgerConnectionPool::Sqlite(pool))
            }
        }
    }

    pub async fn acquire(&self) -> sqlx::Result<LedgerConnection> {
        match self {
            LedgerConnectionPool::Postgres(p) => {
                Ok(LedgerConnection::Postgres(Box::new(p.acquire().await?)))
            }
            LedgerConnectionPool::Sqlite(p) => {
                Ok(LedgerConnection::Sqlite(p.acquire().await?))
            }
        }
    }
}
