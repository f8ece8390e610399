//! # Hisab Kitab Core
//!
//! Bookkeeping core for small-business ledgers: customer bills with
//! discounts, amounts received, staff records, and the per-user running
//! totals the server keeps for them.
//!
//! ## Features
//!
//! - **Bill calculation**: subtotal, percentage or rupee discount, clamped and rounded totals
//! - **Customer records**: validated create/update with the user's totals refreshed after every write
//! - **Accounts and staff**: registration, sign-in and staff management over the same backend
//! - **Reconciliation**: cross-check cached `paidAmount`/`recAmount` against customer records
//! - **Backend abstraction**: trait-based services with an HTTP client and an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use hisab_kitab_core::{calculate, CustomerEntry, DiscountMode};
//!
//! let total = calculate("100", "2", "10", DiscountMode::Percentage);
//! assert_eq!(total.to_string(), "180.00");
//!
//! let entry = CustomerEntry::new("Ramesh", "9876543210")
//!     .rate("100")
//!     .quantity("2")
//!     .discount("10", DiscountMode::Absolute);
//! assert_eq!(entry.preview().total.to_string(), "190.00");
//!
//! // Saving needs a backend and a signed-in user:
//! // let mut hisab = Hisab::new(RestClient::new(&ClientConfig::load()?)?);
//! // hisab.sign_in("9876543210", "secret").await?;
//! // hisab.save_customer(&entry).await?;
//! ```

pub mod client;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use client::{ClientConfig, RestClient};
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
