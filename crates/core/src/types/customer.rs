//! Customer purchase record as returned by the customer-management API.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{CustomerCode, CustomerId};
use super::money::Brl;
use super::name;
use super::status::CustomerStatus;

/// A customer's purchase, as listed by the remote API.
///
/// Records are created server-side and only ever read by the client, except
/// for `status`, which is updated in memory after a confirmed remote update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    /// Human-readable purchase code.
    pub code: CustomerCode,
    pub fullname: String,
    pub phone: String,
    /// Brazilian tax id (CPF); often blank.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cpf: Option<String>,
    /// Number of quotas purchased.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    /// Gross amount.
    #[serde(default, deserialize_with = "required_amount")]
    pub total_amount: Brl,
    #[serde(default, deserialize_with = "optional_amount")]
    pub discount_amount: Option<Brl>,
    /// Net amount (gross minus discount).
    #[serde(default, deserialize_with = "required_amount")]
    pub final_amount: Brl,
    pub status: CustomerStatus,
}

impl CustomerRecord {
    /// Returns `true` when the purchase carries a non-zero discount.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_some_and(|discount| !discount.is_zero())
    }

    /// Amount to refund: the net amount when discounted, the gross otherwise.
    #[must_use]
    pub fn refund_amount(&self) -> Brl {
        if self.has_discount() {
            self.final_amount
        } else {
            self.total_amount
        }
    }

    /// Capitalized first name used in greetings.
    #[must_use]
    pub fn first_name(&self) -> String {
        name::first_name(&self.fullname)
    }
}

/// Scalar shapes the API has been seen to use for numeric fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn scalar_to_decimal<E: serde::de::Error>(scalar: Scalar) -> Result<Option<Decimal>, E> {
    match scalar {
        Scalar::Text(text) if text.trim().is_empty() => Ok(None),
        Scalar::Text(text) => Brl::parse(&text)
            .map(|brl| Some(brl.amount()))
            .map_err(E::custom),
        Scalar::Integer(n) => Ok(Some(Decimal::from(n))),
        Scalar::Float(f) => Decimal::try_from(f).map(Some).map_err(E::custom),
    }
}

fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Brl>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer)?
        .map_or(Ok(None), scalar_to_decimal)
        .map(|amount| amount.map(Brl::new))
}

fn required_amount<'de, D>(deserializer: D) -> Result<Brl, D::Error>
where
    D: Deserializer<'de>,
{
    optional_amount(deserializer).map(Option::unwrap_or_default)
}

/// Quantities that cannot be read as a non-negative integer count as zero.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text.trim().parse::<Decimal>().ok().and_then(whole_count),
        Some(Scalar::Integer(n)) => u32::try_from(n).ok(),
        Some(Scalar::Float(f)) => Decimal::try_from(f).ok().and_then(whole_count),
        None => None,
    };
    Ok(quantity.unwrap_or(0))
}

/// `Some` only for a non-negative whole number that fits in `u32`.
fn whole_count(value: Decimal) -> Option<u32> {
    value.fract().is_zero().then(|| value.to_u32()).flatten()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> CustomerRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserializes_api_shape() {
        let customer = record(json!({
            "id": "7f3a",
            "code": "C-001",
            "fullname": "Maria da Silva",
            "phone": "11987654321",
            "cpf": "123.456.789-00",
            "quantity": "2",
            "total_amount": "200.00",
            "discount_amount": "20.00",
            "final_amount": "180.00",
            "status": "paid"
        }));

        assert_eq!(customer.id.as_str(), "7f3a");
        assert_eq!(customer.quantity, 2);
        assert_eq!(customer.status, CustomerStatus::Paid);
        assert!(customer.has_discount());
        assert_eq!(customer.refund_amount().to_string(), "R$ 180,00");
    }

    #[test]
    fn test_blank_and_null_fields() {
        let customer = record(json!({
            "id": "1",
            "code": "C-002",
            "fullname": "João",
            "phone": "11900000000",
            "cpf": "",
            "quantity": 1,
            "total_amount": 100,
            "discount_amount": null,
            "final_amount": 100.0,
            "status": "pending"
        }));

        assert_eq!(customer.cpf, None);
        assert_eq!(customer.discount_amount, None);
        assert!(!customer.has_discount());
        assert_eq!(customer.refund_amount().to_string(), "R$ 100,00");
    }

    #[test]
    fn test_zero_discount_is_no_discount() {
        let customer = record(json!({
            "id": "1",
            "code": "C-003",
            "fullname": "Ana",
            "phone": "1",
            "quantity": "3",
            "total_amount": "300.00",
            "discount_amount": "0",
            "final_amount": "300.00",
            "status": "pending"
        }));

        assert!(!customer.has_discount());
        assert_eq!(customer.refund_amount(), customer.total_amount);
    }

    #[test]
    fn test_unreadable_quantity_is_zero() {
        let customer = record(json!({
            "id": "1",
            "code": "C-004",
            "fullname": "Ana",
            "phone": "1",
            "quantity": "dois",
            "total_amount": "10",
            "final_amount": "10",
            "status": "refunded"
        }));

        assert_eq!(customer.quantity, 0);
    }

    #[test]
    fn test_decimal_text_quantity() {
        let quantity = |value: serde_json::Value| {
            record(json!({
                "id": "1",
                "code": "C-006",
                "fullname": "Ana",
                "phone": "1",
                "quantity": value,
                "total_amount": "10",
                "final_amount": "10",
                "status": "pending"
            }))
            .quantity
        };

        assert_eq!(quantity(json!("1.0")), 1);
        assert_eq!(quantity(json!("2.00")), 2);
        assert_eq!(quantity(json!(" 3 ")), 3);
        assert_eq!(quantity(json!(1.0)), 1);
        assert_eq!(quantity(json!("1.5")), 0);
        assert_eq!(quantity(json!("-1")), 0);
    }

    #[test]
    fn test_malformed_amount_is_an_error() {
        let result = serde_json::from_value::<CustomerRecord>(json!({
            "id": "1",
            "code": "C-005",
            "fullname": "Ana",
            "phone": "1",
            "quantity": "1",
            "total_amount": "cem reais",
            "final_amount": "10",
            "status": "paid"
        }));

        assert!(result.is_err());
    }
}
