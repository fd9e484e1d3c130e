use rust_decimal::Decimal;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use crate::transactions::repo_types::{TransactionChanges, TransactionDocument, TransactionType};

const LOCAL_DATETIME: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const LOCAL_DATETIME_FRACTION: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Accepts RFC 3339, an offset-less local timestamp (read as UTC) or a bare
/// calendar date (midnight UTC). The result is always in UTC.
pub(crate) fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC));
    }
    for format in [LOCAL_DATETIME_FRACTION, LOCAL_DATETIME] {
        if let Ok(dt) = PrimitiveDateTime::parse(raw, format) {
            return Some(dt.assume_utc());
        }
    }
    Date::parse(raw, DATE_ONLY)
        .ok()
        .map(|d| d.midnight().assume_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_date(&s).ok_or_else(|| D::Error::custom(format!("invalid date: {s}"))))
        .transpose()
}

/// Request body for `POST /transactions`. `date` defaults to now.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<OffsetDateTime>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

/// Request body for `PATCH /transactions/{id}`. Omitted or null fields are
/// left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionType>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<OffsetDateTime>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
}

impl From<UpdateTransactionRequest> for TransactionChanges {
    fn from(r: UpdateTransactionRequest) -> Self {
        Self {
            kind: r.kind,
            date: r.date,
            amount: r.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

impl From<TransactionDocument> for Transaction {
    fn from(t: TransactionDocument) -> Self {
        Self {
            id: t.id,
            kind: t.kind,
            date: t.date,
            amount: t.amount,
        }
    }
}
