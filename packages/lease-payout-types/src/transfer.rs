use serde::{Deserialize, Serialize};

/// One payable record of a payout list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub amount: i64,
    pub fee: i64,
    pub sender: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// `None` for the native asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MassTransferEntry {
    pub recipient: String,
    pub amount: i64,
}

impl From<&Transfer> for MassTransferEntry {
    fn from(transfer: &Transfer) -> Self {
        Self {
            recipient: transfer.recipient.clone(),
            amount: transfer.amount,
        }
    }
}

/// Body of `POST /assets/masstransfer`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MassTransferRequest {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub sender: String,
    pub fee: i64,
    pub transfers: Vec<MassTransferEntry>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MassTransferResponse {
    pub id: String,
}

/// Body of `POST /assets/transfer`, one payment per transaction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub amount: i64,
    pub fee: i64,
    pub sender: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Sponsored asset the fee is paid in. `None` pays in the native asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_asset_id: Option<String>,
}

impl From<&Transfer> for TransferRequest {
    fn from(transfer: &Transfer) -> Self {
        Self {
            amount: transfer.amount,
            fee: transfer.fee,
            sender: transfer.sender.clone(),
            recipient: transfer.recipient.clone(),
            attachment: transfer.attachment.clone(),
            asset_id: transfer.asset_id.clone(),
            fee_asset_id: None,
        }
    }
}

impl TransferRequest {
    /// Pay `fee` in `asset_id` instead of the record's native fee.
    pub fn with_fee_asset(self, asset_id: impl Into<String>, fee: i64) -> Self {
        Self {
            fee,
            fee_asset_id: Some(asset_id.into()),
            ..self
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TransferResponse {
    pub id: String,
}

/// Subset of `GET /assets/details/{id}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub asset_id: String,
    pub name: String,
    pub decimals: u32,
}

/// Response of `GET /alias/by-alias/{name}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AliasAddress {
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_omits_missing_optional_fields() {
        let transfer = Transfer {
            amount: 180000,
            fee: 100000,
            sender: "3PGenerator".to_string(),
            recipient: "3PLeaser".to_string(),
            attachment: None,
            asset_id: None,
        };
        let json = serde_json::to_value(&transfer).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "amount": 180000,
                "fee": 100000,
                "sender": "3PGenerator",
                "recipient": "3PLeaser",
            })
        );
    }

    #[test]
    fn test_transfer_reads_asset_id() {
        let raw = r#"{"amount": 5, "fee": 100000, "sender": "G", "recipient": "L",
                      "attachment": "", "assetId": "Token"}"#;
        let transfer: Transfer = serde_json::from_str(raw).unwrap();

        assert_eq!(transfer.asset_id.as_deref(), Some("Token"));
        assert_eq!(transfer.attachment.as_deref(), Some(""));
    }

    #[test]
    fn test_transfer_request_with_sponsored_fee() {
        let transfer = Transfer {
            amount: 180000,
            fee: 100000,
            sender: "3PGenerator".to_string(),
            recipient: "3PLeaser".to_string(),
            attachment: None,
            asset_id: Some("Token".to_string()),
        };

        let request = TransferRequest::from(&transfer).with_fee_asset("Sponsor", 7);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "amount": 180000,
                "fee": 7,
                "sender": "3PGenerator",
                "recipient": "3PLeaser",
                "assetId": "Token",
                "feeAssetId": "Sponsor",
            })
        );
    }
}
