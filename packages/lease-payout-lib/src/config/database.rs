use std::str::FromStr;

use crate::{
    config::{Env, PayoutConfigResult},
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::Deserialize;
use url::{ParseError, Url};

fn default_sqlite_path() -> String {
    defaults::SQLITE_PATH.to_string()
}

fn default_postgres_user() -> String {
    defaults::POSTGRES_USER.to_string()
}

fn default_postgres_password() -> String {
    defaults::POSTGRES_PASSWORD.to_string()
}

fn default_postgres_host() -> String {
    defaults::POSTGRES_HOST.to_string()
}

fn default_postgres_port() -> String {
    defaults::POSTGRES_PORT.to_string()
}

fn default_postgres_database() -> String {
    defaults::POSTGRES_DATABASE.to_string()
}

/// Where the ledger lives.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseConfig {
    Sqlite {
        #[serde(default = "default_sqlite_path")]
        path: String,
    },
    Postgres {
        #[serde(default = "default_postgres_user")]
        user: String,
        #[serde(default = "default_postgres_password")]
        password: String,
        #[serde(default = "default_postgres_host")]
        host: String,
        #[serde(default = "default_postgres_port")]
        port: String,
        #[serde(default = "default_postgres_database")]
        database: String,
    },
}

/// Replace a `$VAR` / `${VAR}` value by the variable's content.
fn resolve(value: &mut String) -> PayoutConfigResult<()> {
    if is_opt_env_var(value) {
        *value = std::env::var(trim_opt_env_key(value))?;
    }
    Ok(())
}

impl Env for DatabaseConfig {
    fn inject_opt_env_vars(&mut self) -> PayoutConfigResult<()> {
        match self {
            DatabaseConfig::Sqlite { path } => resolve(path),
            DatabaseConfig::Postgres {
                user,
                password,
                host,
                port,
                database,
            } => [user, password, host, port, database]
                .into_iter()
                .try_for_each(resolve),
        }
    }
}

impl std::fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Sqlite { path } => write!(f, "sqlite://{path}"),
            DatabaseConfig::Postgres {
                user,
                password,
                host,
                port,
                database,
            } => {
                write!(f, "postgres://{user}:{password}@{host}:{port}/{database}")
            }
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Sqlite { path } => {
                f.debug_struct("SqliteConfig").field("path", &path).finish()
            }
            DatabaseConfig::Postgres {
                user,
                host,
                port,
                database,
                ..
            } => f
                .debug_struct("PostgresConfig")
                .field("user", &user)
                .field("password", &"XXXX")
                .field("host", &host)
                .field("port", &port)
                .field("database", &database)
                .finish(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Sqlite {
            path: defaults::SQLITE_PATH.into(),
        }
    }
}

impl FromStr for DatabaseConfig {
    type Err = ParseError;

    fn from_str(db_url: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(db_url)?;

        match url.scheme() {
            "postgres" => {
                let host = url.host_str().ok_or(ParseError::EmptyHost)?;
                let port = url
                    .port()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| defaults::POSTGRES_PORT.to_string());
                let database = url
                    .path_segments()
                    .and_then(|mut segments| segments.next())
                    .unwrap_or_default();

                Ok(DatabaseConfig::Postgres {
                    user: url.username().to_string(),
                    password: url.password().unwrap_or_default().to_string(),
                    host: host.to_string(),
                    port,
                    database: database.to_string(),
                })
            }
            "sqlite" => {
                let path = db_url.trim_start_matches("sqlite://");
                Ok(DatabaseConfig::Sqlite {
                    path: path.to_string(),
                })
            }
            _ => Err(ParseError::InvalidDomainCharacter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_round_trips_through_urls() {
        let pg = DatabaseConfig::from_str("postgres://alice:pw@db.local:5433/ledger")
            .unwrap();
        assert_eq!(pg.to_string(), "postgres://alice:pw@db.local:5433/ledger");
        assert!(!format!("{pg:?}").contains("pw"));

        let sqlite = DatabaseConfig::from_str("sqlite://data/blocks.db").unwrap();
        match sqlite {
            DatabaseConfig::Sqlite { path } => assert_eq!(path, "data/blocks.db"),
            _ => panic!("Expected a SQLite configuration."),
        }
    }
}
