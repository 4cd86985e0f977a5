use crate::{PayoutError, PayoutResult};
use lease_payout_database::{
    queries,
    types::{Alias, Block, Lease},
    LedgerConnection, LedgerConnectionPool,
};

/// Write handle on the ledger. Every write goes through the connection
/// holding the open transaction.
#[derive(Debug)]
pub struct Ledger {
    pub pool: LedgerConnectionPool,
    stashed: Option<LedgerConnection>,
}

impl Ledger {
    pub fn new(pool: LedgerConnectionPool) -> Self {
        Self {
            pool,
            stashed: None,
        }
    }

    pub async fn start_transaction(&mut self) -> PayoutResult<usize> {
        let mut conn = self.pool.acquire().await?;
        let result = queries::start_transaction(&mut conn).await?;

        self.stashed = Some(conn);

        Ok(result)
    }

    pub async fn commit_transaction(&mut self) -> PayoutResult<usize> {
        let mut conn = self
            .stashed
            .take()
            .ok_or(PayoutError::NoTransactionError)?;
        Ok(queries::commit_transaction(&mut conn).await?)
    }

    pub async fn revert_transaction(&mut self) -> PayoutResult<usize> {
        let mut conn = self
            .stashed
            .take()
            .ok_or(PayoutError::NoTransactionError)?;
        Ok(queries::revert_transaction(&mut conn).await?)
    }

    fn conn(&mut self) -> PayoutResult<&mut LedgerConnection> {
        self.stashed.as_mut().ok_or(PayoutError::NoTransactionError)
    }

    pub async fn put_block(&mut self, block: &Block) -> PayoutResult<()> {
        queries::upsert_block(self.conn()?, block).await?;
        Ok(())
    }

    pub async fn open_lease(&mut self, lease: &Lease) -> PayoutResult<()> {
        queries::upsert_lease_create(self.conn()?, lease).await?;
        Ok(())
    }

    /// Returns `false` when no lease with this id is stored.
    pub async fn close_lease(&mut self, lease_id: &str, end_height: i64) -> PayoutResult<bool> {
        let rows = queries::upsert_lease_close(self.conn()?, lease_id, end_height).await?;
        Ok(rows > 0)
    }

    pub async fn alias_address(&mut self, alias: &str) -> PayoutResult<Option<String>> {
        Ok(queries::get_alias_address(self.conn()?, alias).await?)
    }

    pub async fn put_alias(&mut self, alias: &Alias) -> PayoutResult<()> {
        queries::upsert_alias(self.conn()?, alias).await?;
        Ok(())
    }
}
