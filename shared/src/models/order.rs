//! Customer order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
pub enum OrderStatus {
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_status", rename_all = "lowercase")
)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Operator decision in the payment verification view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDecision {
    Approve,
    Reject,
    Reset,
}

impl PaymentDecision {
    pub fn target_status(&self) -> PaymentStatus {
        match self {
            PaymentDecision::Approve => PaymentStatus::Paid,
            PaymentDecision::Reject => PaymentStatus::Failed,
            PaymentDecision::Reset => PaymentStatus::Pending,
        }
    }
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_name: String,
    pub size_name: Option<String>,
    #[serde(default)]
    pub varieties: Vec<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A customer order placed through the storefront
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub payment_proof_url: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing orders
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<String>,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self
                .payment_method
                .as_deref()
                .map_or(true, |m| order.payment_method.eq_ignore_ascii_case(m))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentStatusInput {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDecisionInput {
    pub decision: PaymentDecision,
}

/// Change notification published for the live order feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderChange {
    pub order_id: Uuid,
    pub operation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_decisions() {
        assert_eq!(PaymentDecision::Approve.target_status(), PaymentStatus::Paid);
        assert_eq!(PaymentDecision::Reject.target_status(), PaymentStatus::Failed);
        assert_eq!(PaymentDecision::Reset.target_status(), PaymentStatus::Pending);
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            product_name: "Bibingka".into(),
            size_name: Some("Solo".into()),
            varieties: vec!["Bibingka".into()],
            quantity: 3,
            unit_price: Decimal::new(4550, 2),
        };
        assert_eq!(item.line_total(), Decimal::new(13650, 2));
    }

    #[test]
    fn test_status_serializes_capitalized() {
        let json = serde_json::to_string(&OrderStatus::Ready).unwrap();
        assert_eq!(json, "\"Ready\"");
    }
}
