use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction kinds the ledger cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Transfer,
    Lease,
    LeaseCancel,
    Other(u8),
}

impl From<u8> for TransactionKind {
    fn from(kind: u8) -> Self {
        match kind {
            4 => Self::Transfer,
            8 => Self::Lease,
            9 => Self::LeaseCancel,
            other => Self::Other(other),
        }
    }
}

/// Transaction as served by the node. Every field is optional since the
/// payload differs per transaction kind.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransaction {
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fee: Option<i64>,
    #[serde(default)]
    pub fee_asset_id: Option<String>,
    /// Legacy name of `feeAssetId`. Nodes may send both keys.
    #[serde(default)]
    pub fee_asset: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub lease_id: Option<String>,
}

/// A record that cannot be applied to the ledger. The record is skipped and
/// the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Lease cancellation references unknown lease {0:?}.")]
    UnknownLease(String),
    #[error("Malformed transaction {id:?}: {reason}.")]
    MalformedTransaction { id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseCreate {
    pub id: String,
    pub sender: String,
    /// Address or `alias:<chain>:<name>`.
    pub recipient: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseClose {
    pub lease_id: String,
}

/// What a transaction means for the lease ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    LeaseCreate(LeaseCreate),
    LeaseClose(LeaseClose),
    Other,
}

impl NodeTransaction {
    pub fn kind(&self) -> TransactionKind {
        self.kind.map(TransactionKind::from).unwrap_or(TransactionKind::Other(0))
    }

    /// Asset the fee is paid in, `None` for the native asset. Either key
    /// may carry it; a null or empty value means native.
    pub fn paid_fee_asset(&self) -> Option<&str> {
        [&self.fee_asset_id, &self.fee_asset]
            .into_iter()
            .filter_map(|asset| asset.as_deref())
            .find(|asset| !asset.is_empty())
    }

    pub fn pays_native_fee(&self) -> bool {
        self.paid_fee_asset().is_none()
    }

    fn malformed(&self, reason: &str) -> DataIntegrityError {
        DataIntegrityError::MalformedTransaction {
            id: self.id.clone().unwrap_or_else(|| "<unknown>".to_string()),
            reason: reason.to_string(),
        }
    }

    /// Classify the transaction into a ledger event.
    pub fn event(&self) -> Result<LedgerEvent, DataIntegrityError> {
        match self.kind() {
            TransactionKind::Lease => {
                let id = self.id.clone().ok_or_else(|| self.malformed("missing id"))?;
                let sender = self
                    .sender
                    .clone()
                    .ok_or_else(|| self.malformed("missing sender"))?;
                let recipient = self
                    .recipient
                    .clone()
                    .ok_or_else(|| self.malformed("missing recipient"))?;
                let amount = self
                    .amount
                    .ok_or_else(|| self.malformed("missing amount"))?;

                if amount <= 0 {
                    return Err(self.malformed("non-positive lease amount"));
                }

                Ok(LedgerEvent::LeaseCreate(LeaseCreate {
                    id,
                    sender,
                    recipient,
                    amount,
                }))
            }
            TransactionKind::LeaseCancel => {
                let lease_id = self
                    .lease_id
                    .clone()
                    .ok_or_else(|| self.malformed("missing lease id"))?;
                Ok(LedgerEvent::LeaseClose(LeaseClose { lease_id }))
            }
            TransactionKind::Transfer | TransactionKind::Other(_) => Ok(LedgerEvent::Other),
        }
    }
}
