use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Closed set of transaction categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionType {
    #[serde(alias = "rent")]
    Rent,
    #[serde(alias = "groceries")]
    Groceries,
    #[serde(alias = "entertainment")]
    Entertainment,
}

/// Transaction document in the `Transactions` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Stored as a decimal string so no digits are lost.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Field-level changes for a partial transaction update. Only `Some` fields
/// are written, so a zero amount is a real change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionChanges {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.date.is_none() && self.amount.is_none()
    }

    /// In-place counterpart of the `$set` the Mongo store issues.
    #[cfg(test)]
    pub fn apply(self, tx: &mut TransactionDocument) {
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
    }
}
