use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PosError;

pub const DEFAULT_THRESHOLD: i32 = 5;

fn default_threshold() -> i32 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "cajero")]
    Cashier,
}

/// A user as seen by the rest of the app. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl StoredUser {
    pub fn user(&self) -> User {
        User {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUser {
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default = "default_threshold")]
    pub threshold: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::of(self.quantity, self.threshold)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub threshold: Option<i32>,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub threshold: i32,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Medium,
    Good,
}

impl StockStatus {
    pub fn of(quantity: i32, threshold: i32) -> Self {
        if quantity <= threshold {
            StockStatus::Low
        } else if quantity <= threshold.saturating_mul(2) {
            StockStatus::Medium
        } else {
            StockStatus::Good
        }
    }
}

/// A cart line. `quantity` is the transaction quantity, not stock.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: i32,
}

impl CartItem {
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Stored records carry mixed-case and Spanish names (`"Efectivo"`,
/// `"tarjeta"`); decoding goes through [`FromStr`] so all of them load.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Yappy,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Yappy => "yappy",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            "yappy" => Ok(PaymentMethod::Yappy),
            other => Err(PosError::Validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// A parked cart saved under a client name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSale {
    pub id: i64,
    pub client_name: String,
    pub items: Vec<CartItem>,
    pub total: f64,
    pub date: DateTime<Utc>,
    pub shift_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: f64,
    pub date: DateTime<Utc>,
    pub shift_id: i64,
    // Early records were written without a payment method.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub shift_id: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFixedExpense {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub initial_cash: f64,
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub number_of_transactions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_by: Option<String>,
}

impl Shift {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Pointer to the open shift, kept apart from the shift list so the POS can
/// gate the cart without scanning it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveShift {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub initial_cash: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_by: Option<String>,
}

impl From<&Shift> for ActiveShift {
    fn from(shift: &Shift) -> Self {
        ActiveShift {
            id: shift.id,
            start_time: shift.start_time,
            initial_cash: shift.initial_cash,
            started_by: shift.started_by.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub net_total: f64,
    pub payment_breakdown: BTreeMap<String, f64>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ShiftClosing {
    pub shift: Shift,
    pub summary: ShiftSummary,
}
