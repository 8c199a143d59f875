//! Order entity and lifecycle rules.
//!
//! Pricing is computed once at creation: `items_price` is the sum of
//! `qty * price` over the items, and `total_price` adds tax and shipping.
//! Later transitions only touch the paid/delivered state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};

/// Payment method that defers the paid state until external confirmation.
pub const CASH_ON_DELIVERY: &str = "COD";

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    pub product: Uuid,
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Item quantity must be at least 1"))]
    pub qty: u32,
    pub price: Decimal,
    pub image: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Shipping city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

/// Confirmation payload sent by the payment provider on `PUT /:id/pay`.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub payer: Option<Payer>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Stored outcome of a successful payment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    pub email_address: String,
}

impl PaymentResult {
    /// Validates the confirmation payload. The payer email is the one field
    /// the provider must supply; the rest is mirrored verbatim.
    pub fn from_confirmation(confirmation: PaymentConfirmation) -> Result<Self> {
        let email_address = confirmation
            .payer
            .and_then(|p| p.email_address)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::BadInput("Payer email address is required".into()))?;
        Ok(Self {
            id: confirmation.id,
            status: confirmation.status,
            update_time: confirmation.update_time,
            email_address,
        })
    }
}

/// A fully priced order that has not been persisted yet. The store assigns
/// the id and the timestamps.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl NewOrder {
    pub fn place(
        user_id: Uuid,
        order_items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: String,
        tax_input: Option<serde_json::Value>,
        shipping_input: Option<serde_json::Value>,
    ) -> Result<Self> {
        if order_items.is_empty() {
            return Err(ApiError::Validation("No order items provided".into()));
        }
        for item in &order_items {
            if item.qty == 0 {
                return Err(ApiError::Validation("Item quantity must be at least 1".into()));
            }
            if item.price.is_sign_negative() {
                return Err(ApiError::Validation("Item price must not be negative".into()));
            }
        }

        let items_price = items_total(&order_items)
            .ok_or_else(|| ApiError::Validation("Invalid total amount calculation".into()))?;

        let tax_price = parse_price(tax_input.as_ref());
        let shipping_price = parse_price(shipping_input.as_ref());
        if tax_price.is_sign_negative() || shipping_price.is_sign_negative() {
            return Err(ApiError::Validation("Tax and shipping must not be negative".into()));
        }

        let total_price = items_price
            .checked_add(tax_price)
            .and_then(|t| t.checked_add(shipping_price))
            .ok_or_else(|| ApiError::Validation("Invalid total amount calculation".into()))?;

        let is_paid = payment_method != CASH_ON_DELIVERY;
        let paid_at = is_paid.then(Utc::now);

        Ok(Self {
            user_id,
            order_items,
            shipping_address,
            payment_method,
            items_price,
            tax_price,
            shipping_price,
            total_price,
            is_paid,
            paid_at,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaymentResult>,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    /// Duplicated alias of `total_price` carried by the wire format.
    pub total_amount: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Marks the order paid. Re-applying keeps the stored result shape but
    /// advances `paid_at`.
    pub fn record_payment(&mut self, result: PaymentResult) {
        self.is_paid = true;
        self.paid_at = Some(Utc::now());
        self.payment_result = Some(result);
    }

    pub fn mark_delivered(&mut self) {
        self.is_delivered = true;
        self.delivered_at = Some(Utc::now());
    }
}

/// Sum of `qty * price` with checked arithmetic. `None` signals overflow.
pub fn items_total(items: &[OrderItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        let line = item.price.checked_mul(Decimal::from(item.qty))?;
        acc.checked_add(line)
    })
}

/// Coerces a tax/shipping input into a decimal. Accepts a JSON number or a
/// numeric string; anything else (or absence) counts as zero.
pub fn parse_price(raw: Option<&serde_json::Value>) -> Decimal {
    match raw {
        Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string()).unwrap_or(Decimal::ZERO),
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
