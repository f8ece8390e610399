//! Core records and error types for the bookkeeping core
//!
//! Field names on the wire follow the remote API exactly: `userID` on users
//! and customers, `userId` on staff, camel case everywhere else.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// Server-assigned user identifier
pub type UserId = i64;
/// Server-assigned customer identifier
pub type CustomerId = i64;
/// Server-assigned staff identifier
pub type StaffId = i64;

/// Whether a discount is a share of the subtotal or a flat currency amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    /// Discount is a percentage of `rate * quantity`
    #[default]
    Percentage,
    /// Discount is an absolute amount in rupees
    Absolute,
}

impl DiscountMode {
    /// Map the entry-form toggle (on = percentage) to a mode
    pub fn from_toggle(is_percentage: bool) -> Self {
        if is_percentage {
            DiscountMode::Percentage
        } else {
            DiscountMode::Absolute
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, DiscountMode::Percentage)
    }
}

/// Business owner account, including the server-maintained running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    pub mobile: String,
    pub password: String,
    #[serde(default)]
    pub business_name: String,
    /// Sum of bill totals across this user's customers
    #[serde(with = "amount_format", default)]
    pub paid_amount: BigDecimal,
    /// Sum of amounts received across this user's customers
    #[serde(with = "amount_format", default)]
    pub rec_amount: BigDecimal,
    #[serde(default)]
    pub staffs: Vec<Staff>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl User {
    /// Create an unsaved user with zeroed totals
    pub fn new(name: String, mobile: String, password: String, business_name: String) -> Self {
        Self {
            user_id: None,
            name,
            mobile,
            password,
            business_name,
            paid_amount: BigDecimal::zero(),
            rec_amount: BigDecimal::zero(),
            staffs: Vec::new(),
            customers: Vec::new(),
        }
    }

    /// Amount still owed to this user across all customers
    pub fn outstanding(&self) -> BigDecimal {
        &self.paid_amount - &self.rec_amount
    }
}

/// One billed ledger entry for a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "customerID", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub name: String,
    pub mobile: String,
    #[serde(with = "amount_format", default)]
    pub rate: BigDecimal,
    #[serde(with = "amount_format", default)]
    pub quantity: BigDecimal,
    #[serde(with = "amount_format", default)]
    pub discount_in_rs: BigDecimal,
    #[serde(with = "amount_format", default)]
    pub discount_in_per: BigDecimal,
    #[serde(default)]
    pub description: String,
    #[serde(with = "amount_format", default)]
    pub received_amt: BigDecimal,
    /// Bill total captured when the record was saved
    #[serde(with = "amount_format", default)]
    pub total: BigDecimal,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

impl Customer {
    /// The mode implied by the stored discount columns
    pub fn discount_mode(&self) -> DiscountMode {
        if self.discount_in_per.is_zero() && !self.discount_in_rs.is_zero() {
            DiscountMode::Absolute
        } else {
            DiscountMode::Percentage
        }
    }

    /// The discount figure for the active mode
    pub fn discount(&self) -> &BigDecimal {
        match self.discount_mode() {
            DiscountMode::Percentage => &self.discount_in_per,
            DiscountMode::Absolute => &self.discount_in_rs,
        }
    }

    /// Amount this customer still owes, never negative
    pub fn balance_due(&self) -> BigDecimal {
        let due = &self.total - &self.received_amt;
        if due < BigDecimal::zero() {
            BigDecimal::zero()
        } else {
            due
        }
    }
}

/// Staff member working under a business owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(rename = "staffID", default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    pub name: String,
    pub mobile: String,
    pub password: String,
    pub user_id: UserId,
}

/// Title and message pair shown to the user when an operation fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Errors that can occur in the bookkeeping core
#[derive(Debug, thiserror::Error)]
pub enum HisabError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("No user is signed in")]
    NotSignedIn,
    #[error("Invalid mobile number or password")]
    InvalidCredentials,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    /// The customer write went through but re-fetching the user failed
    #[error("Customer saved but totals were not refreshed: {reason}")]
    TotalsNotRefreshed {
        customer: Box<Customer>,
        reason: String,
    },
}

impl HisabError {
    /// Convert the error into the alert a front end should display
    ///
    /// Validation messages are shown verbatim. Remote and decoding failures
    /// collapse into one generic message.
    pub fn alert(&self) -> Alert {
        match self {
            HisabError::Validation(message) => Alert::new("Validation Error", message),
            HisabError::NotSignedIn => {
                Alert::new("Error", "Unable to retrieve user ID. Please try again.")
            }
            HisabError::InvalidCredentials => {
                Alert::new("Login Failed", "Invalid mobile number or password.")
            }
            HisabError::Config(_) => Alert::new("Error", "The app is not configured correctly."),
            HisabError::TotalsNotRefreshed { .. } => Alert::new(
                "Saved",
                "Customer saved, but the latest totals could not be loaded. Please refresh.",
            ),
            HisabError::NotFound(_) | HisabError::Remote(_) | HisabError::Decode(_) => {
                Alert::new("Error", "Something went wrong. Please try again.")
            }
        }
    }

    /// The record that was stored despite the error, if any
    ///
    /// Callers should keep editing this record rather than resubmit the
    /// original entry, which would create a second customer.
    pub fn saved_customer(&self) -> Option<&Customer> {
        match self {
            HisabError::TotalsNotRefreshed { customer, .. } => Some(customer.as_ref()),
            _ => None,
        }
    }

    /// True for failures caused by user input rather than the remote service
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            HisabError::Validation(_) | HisabError::NotSignedIn | HisabError::InvalidCredentials
        )
    }
}

/// Result type for bookkeeping operations
pub type HisabResult<T> = Result<T, HisabError>;

/// Amounts travel as JSON numbers; numeric strings and `null` are accepted on read.
pub(crate) mod amount_format {
    use bigdecimal::{BigDecimal, ToPrimitive, Zero};
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    use crate::ledger::calculator::parse_amount_strict;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
        Null,
    }

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.to_f64() {
            Some(number) if number.is_finite() => serializer.serialize_f64(number),
            _ => Err(S::Error::custom(format!(
                "amount {value} cannot be written as a JSON number"
            ))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            // Display on f64 yields the shortest round-trip form, so 0.1 stays 0.1
            RawAmount::Number(number) => {
                BigDecimal::from_str(&number.to_string()).map_err(D::Error::custom)
            }
            RawAmount::Text(text) if text.trim().is_empty() => Ok(BigDecimal::zero()),
            RawAmount::Text(text) => parse_amount_strict(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid amount '{text}'"))),
            RawAmount::Null => Ok(BigDecimal::zero()),
        }
    }
}
