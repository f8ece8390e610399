//! Ledger module containing bill calculation and customer/staff bookkeeping

pub mod calculator;
pub mod customer;
pub mod hisab;
pub mod session;
pub mod staff;

pub use calculator::*;
pub use customer::*;
pub use hisab::*;
pub use session::*;
pub use staff::*;
