use lease_payout_database_types::*;
use sqlx::{pool::PoolConnection, postgres::PgRow, Postgres, Row};
use tracing::debug;

pub async fn run_migration(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<()> {
    debug!("Running Postgres ledger migrations.");
    sqlx::migrate!().run(conn).await?;
    Ok(())
}

pub async fn execute_query(
    conn: &mut PoolConnection<Postgres>,
    query: String,
) -> sqlx::Result<usize> {
    let mut builder = sqlx::QueryBuilder::new(query);

    let query = builder.build();

    let result = query.execute(conn).await?;

    Ok(result.rows_affected() as usize)
}

fn block_from_row(row: PgRow) -> Block {
    Block {
        height: row.get(0),
        generator: row.get(1),
        fees: row.get(2),
        reward: row.get(3),
        tx_count: row.get(4),
        timestamp: row.get(5),
    }
}

fn lease_from_row(row: PgRow) -> Lease {
    Lease {
        id: row.get(0),
        sender: row.get(1),
        recipient: row.get(2),
        start_height: row.get(3),
        end_height: row.get(4),
        amount: row.get(5),
    }
}

pub async fn upsert_block(
    conn: &mut PoolConnection<Postgres>,
    block: &Block,
) -> sqlx::Result<usize> {
    let result = sqlx::query(
        r#"INSERT INTO blocks (height, generator, fees, reward, tx_count, timestamp)
           VALUES ($1, $2, $3, $4, $5, $6)
           ON CONFLICT(height) DO UPDATE SET
               generator = excluded.generator,
               fees = excluded.fees,
               reward = excluded.reward,
               tx_count = excluded.tx_count,
               timestamp = excluded.timestamp"#,
    )
    .bind(block.height)
    .bind(&block.generator)
    .bind(block.fees)
    .bind(block.reward)
    .bind(block.tx_count)
    .bind(block.timestamp)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() as usize)
}

pub async fn upsert_lease_create(
    conn: &mut PoolConnection<Postgres>,
    lease: &Lease,
) -> sqlx::Result<usize> {
    let result = sqlx::query(
        r#"INSERT INTO leases (id, sender, recipient, start_height, end_height, amount)
           VALUES ($1, $2, $3, $4, $5, $6)
           ON CONFLICT(id) DO UPDATE SET
               sender = excluded.sender,
               recipient = excluded.recipient,
               start_height = excluded.start_height,
               amount = excluded.amount"#,
    )
    .bind(&lease.id)
    .bind(&lease.sender)
    .bind(&lease.recipient)
    .bind(lease.start_height)
    .bind(lease.end_height)
    .bind(lease.amount)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() as usize)
}

pub async fn upsert_lease_close(
    conn: &mut PoolConnection<Postgres>,
    lease_id: &str,
    end_height: i64,
) -> sqlx::Result<usize> {
    let result = sqlx::query("UPDATE leases SET end_height = $1 WHERE id = $2")
        .bind(end_height)
        .bind(lease_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() as usize)
}

pub async fn lease_by_id(
    conn: &mut PoolConnection<Postgres>,
    lease_id: &str,
) -> sqlx::Result<Option<Lease>> {
    let row = sqlx::query(
        r#"SELECT id, sender, recipient, start_height, end_height, amount
           FROM leases WHERE id = $1"#,
    )
    .bind(lease_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(lease_from_row))
}

pub async fn all_leases(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<Vec<Lease>> {
    let rows = sqlx::query(
        r#"SELECT id, sender, recipient, start_height, end_height, amount
           FROM leases ORDER BY id"#,
    )
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(lease_from_row).collect())
}

pub async fn upsert_alias(
    conn: &mut PoolConnection<Postgres>,
    alias: &Alias,
) -> sqlx::Result<usize> {
    let result = sqlx::query(
        r#"INSERT INTO aliases (alias, address) VALUES ($1, $2)
           ON CONFLICT(alias) DO UPDATE SET address = excluded.address"#,
    )
    .bind(&alias.alias)
    .bind(&alias.address)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() as usize)
}

pub async fn get_alias_address(
    conn: &mut PoolConnection<Postgres>,
    alias: &str,
) -> sqlx::Result<Option<String>> {
    let row = sqlx::query("SELECT address FROM aliases WHERE alias = $1")
        .bind(alias)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(|row| row.get(0)))
}

pub async fn first_gap_height(
    conn: &mut PoolConnection<Postgres>,
) -> sqlx::Result<Option<i64>> {
    let row = sqlx::query(
        r#"SELECT MIN(a.height + 1)
           FROM blocks a
           WHERE NOT EXISTS (SELECT 1 FROM blocks b WHERE b.height = a.height + 1)"#,
    )
    .fetch_one(conn)
    .await?;

    Ok(row.get::<Option<i64>, usize>(0))
}

pub async fn blocks_in_range(
    conn: &mut PoolConnection<Postgres>,
    start: i64,
    end: i64,
) -> sqlx::Result<Vec<Block>> {
    let rows = sqlx::query(
        r#"SELECT height, generator, fees, reward, tx_count, timestamp
           FROM blocks
           WHERE height BETWEEN $1 AND $2
           ORDER BY height"#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(block_from_row).collect())
}

pub async fn lease_shares(
    conn: &mut PoolConnection<Postgres>,
    generator: &str,
    start: i64,
    end: i64,
    activation_delay: i64,
) -> sqlx::Result<Vec<LeaseShare>> {
    let rows = sqlx::query(
        r#"SELECT b.height, l.sender, CAST(SUM(l.amount) AS BIGINT)
           FROM blocks b
           INNER JOIN leases l
               ON b.height >= l.start_height + $1
               AND (l.end_height IS NULL OR b.height <= l.end_height)
               AND l.recipient = b.generator
           WHERE b.height BETWEEN $2 AND $3
               AND b.generator = $4
           GROUP BY b.height, l.sender
           ORDER BY b.height, l.sender"#,
    )
    .bind(activation_delay)
    .bind(start)
    .bind(end)
    .bind(generator)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| LeaseShare {
            height: row.get(0),
            sender: row.get(1),
            amount: row.get(2),
        })
        .collect())
}

pub async fn start_transaction(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<usize> {
    execute_query(conn, "BEGIN".into()).await
}

pub async fn commit_transaction(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<usize> {
    execute_query(conn, "COMMIT".into()).await
}

pub async fn revert_transaction(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<usize> {
    execute_query(conn, "ROLLBACK".into()).await
}
