//! Invoices, payments and the two payment-time queries.

use serde::{Deserialize, Serialize};

use super::chat::User;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_parameter: String,
    pub currency: String,
    pub total_amount: i64,
}

/// A successful payment notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub currency: String,
    pub total_amount: i64,
    #[serde(rename = "invoice_payload")]
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_id: Option<String>,
    #[serde(default)]
    pub telegram_payment_charge_id: String,
    #[serde(default)]
    pub provider_payment_charge_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundedPayment {
    pub currency: String,
    pub total_amount: i64,
    #[serde(rename = "invoice_payload")]
    pub payload: String,
    #[serde(default)]
    pub telegram_payment_charge_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub country_code: String,
    #[serde(default)]
    pub state: String,
    pub city: String,
    pub street_line1: String,
    #[serde(default)]
    pub street_line2: String,
    pub post_code: String,
}

/// Asked before checkout for invoices with flexible pricing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingQuery {
    pub id: String,
    pub from: User,
    #[serde(rename = "invoice_payload")]
    pub payload: String,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: i64,
    #[serde(rename = "invoice_payload")]
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_id: Option<String>,
}
