use crate::{types::*, LedgerConnection};
use lease_payout_postgres as postgres;
use lease_payout_sqlite as sqlite;

pub async fn run_migration(conn: &mut LedgerConnection) -> sqlx::Result<()> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::run_migration(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::run_migration(c).await,
    }
}

/// Insert a block, replacing any row already stored at its height.
pub async fn upsert_block(
    conn: &mut LedgerConnection,
    block: &Block,
) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::upsert_block(c, block).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::upsert_block(c, block).await,
    }
}

/// Insert a lease by id. Re-applying the creation of a known lease keeps
/// its recorded end height.
pub async fn upsert_lease_create(
    conn: &mut LedgerConnection,
    lease: &Lease,
) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => {
            postgres::upsert_lease_create(c, lease).await
        }
        LedgerConnection::Sqlite(ref mut c) => sqlite::upsert_lease_create(c, lease).await,
    }
}

/// Set the end height of a lease. Returns the number of rows touched, which
/// is zero when the lease id is unknown.
pub async fn upsert_lease_close(
    conn: &mut LedgerConnection,
    lease_id: &str,
    end_height: i64,
) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => {
            postgres::upsert_lease_close(c, lease_id, end_height).await
        }
        LedgerConnection::Sqlite(ref mut c) => {
            sqlite::upsert_lease_close(c, lease_id, end_height).await
        }
    }
}

pub async fn lease_by_id(
    conn: &mut LedgerConnection,
    lease_id: &str,
) -> sqlx::Result<Option<Lease>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::lease_by_id(c, lease_id).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::lease_by_id(c, lease_id).await,
    }
}

pub async fn all_leases(conn: &mut LedgerConnection) -> sqlx::Result<Vec<Lease>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::all_leases(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::all_leases(c).await,
    }
}

pub async fn upsert_alias(
    conn: &mut LedgerConnection,
    alias: &Alias,
) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::upsert_alias(c, alias).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::upsert_alias(c, alias).await,
    }
}

pub async fn get_alias_address(
    conn: &mut LedgerConnection,
    alias: &str,
) -> sqlx::Result<Option<String>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => {
            postgres::get_alias_address(c, alias).await
        }
        LedgerConnection::Sqlite(ref mut c) => sqlite::get_alias_address(c, alias).await,
    }
}

/// Smallest height `h + 1` such that block `h` is stored and block `h + 1`
/// is not. `None` on an empty ledger.
pub async fn first_gap_height(conn: &mut LedgerConnection) -> sqlx::Result<Option<i64>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::first_gap_height(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::first_gap_height(c).await,
    }
}

/// Stored blocks in `[start, end]`, ordered by height.
pub async fn blocks_in_range(
    conn: &mut LedgerConnection,
    start: i64,
    end: i64,
) -> sqlx::Result<Vec<Block>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => {
            postgres::blocks_in_range(c, start, end).await
        }
        LedgerConnection::Sqlite(ref mut c) => sqlite::blocks_in_range(c, start, end).await,
    }
}

/// Every stored block, optionally bounded on either side.
pub async fn all_blocks(
    conn: &mut LedgerConnection,
    start: Option<i64>,
    end: Option<i64>,
) -> sqlx::Result<Vec<Block>> {
    blocks_in_range(conn, start.unwrap_or(0), end.unwrap_or(i64::MAX)).await
}

/// Per-height, per-leaser sums of the leases active at each block of
/// `[start, end]` generated by `generator` and leased to it.
pub async fn lease_shares(
    conn: &mut LedgerConnection,
    generator: &str,
    start: i64,
    end: i64,
    activation_delay: i64,
) -> sqlx::Result<Vec<LeaseShare>> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => {
            postgres::lease_shares(c, generator, start, end, activation_delay).await
        }
        LedgerConnection::Sqlite(ref mut c) => {
            sqlite::lease_shares(c, generator, start, end, activation_delay).await
        }
    }
}

pub async fn start_transaction(conn: &mut LedgerConnection) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::start_transaction(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::start_transaction(c).await,
    }
}

pub async fn commit_transaction(conn: &mut LedgerConnection) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::commit_transaction(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::commit_transaction(c).await,
    }
}

pub async fn revert_transaction(conn: &mut LedgerConnection) -> sqlx::Result<usize> {
    match conn {
        LedgerConnection::Postgres(ref mut c) => postgres::revert_transaction(c).await,
        LedgerConnection::Sqlite(ref mut c) => sqlite::revert_transaction(c).await,
    }
}
