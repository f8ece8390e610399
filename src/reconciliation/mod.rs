//! Reconciliation of per-customer records against the user's running totals
//!
//! The server keeps `paidAmount` and `recAmount` on the user as denormalized
//! sums. This module recomputes both from the customer records and also
//! recomputes each bill from its stored inputs, so a cache that drifted or a
//! record saved with a stale total shows up as an issue.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::ledger::calculator::{round_money, BillBreakdown};
use crate::types::*;

/// Outcome of comparing a user's aggregate with their customer records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub user_id: Option<UserId>,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub customer_count: usize,
    /// Sum of stored bill totals
    pub billed_total: BigDecimal,
    /// Sum of stored received amounts
    pub received_total: BigDecimal,
    /// `paidAmount` as cached
    pub paid_amount: BigDecimal,
    /// `recAmount` as cached
    pub rec_amount: BigDecimal,
    /// `billed_total - received_total`
    pub outstanding: BigDecimal,
}

fn label(customer: &Customer) -> String {
    match customer.customer_id {
        Some(id) => format!("Customer {id} ({})", customer.name),
        None => format!("Unsaved customer ({})", customer.name),
    }
}

/// Reconcile `user`'s cached totals with the given customer records
pub fn reconcile(user: &User, customers: &[Customer]) -> ReconciliationReport {
    let mut issues = Vec::new();
    let mut billed_total = BigDecimal::zero();
    let mut received_total = BigDecimal::zero();
    let mut customer_count = 0;

    for customer in customers {
        if Some(customer.user_id) != user.user_id {
            issues.push(format!(
                "{} belongs to user {}",
                label(customer),
                customer.user_id
            ));
            continue;
        }
        customer_count += 1;

        billed_total += &customer.total;
        received_total += &customer.received_amt;

        if !customer.discount_in_rs.is_zero() && !customer.discount_in_per.is_zero() {
            issues.push(format!(
                "{} has both a rupee and a percentage discount",
                label(customer)
            ));
        }

        let recomputed = BillBreakdown::for_customer(customer).total;
        if recomputed != round_money(&customer.total) {
            issues.push(format!(
                "{} total is {} but its rate, quantity and discount give {}",
                label(customer),
                customer.total,
                recomputed
            ));
        }
    }

    let billed_total = round_money(&billed_total);
    let received_total = round_money(&received_total);

    if billed_total != round_money(&user.paid_amount) {
        issues.push(format!(
            "Paid amount is {} but customer bills add up to {}",
            user.paid_amount, billed_total
        ));
    }

    if received_total != round_money(&user.rec_amount) {
        issues.push(format!(
            "Received amount is {} but customer receipts add up to {}",
            user.rec_amount, received_total
        ));
    }

    let outstanding = &billed_total - &received_total;

    ReconciliationReport {
        user_id: user.user_id,
        is_valid: issues.is_empty(),
        issues,
        customer_count,
        billed_total,
        received_total,
        paid_amount: user.paid_amount.clone(),
        rec_amount: user.rec_amount.clone(),
        outstanding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::customer::CustomerEntry;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn owner(paid: &str, rec: &str) -> User {
        let mut user = User::new(
            "Asha".to_string(),
            "9876543210".to_string(),
            "pw".to_string(),
            "Asha Dairy".to_string(),
        );
        user.user_id = Some(1);
        user.paid_amount = dec(paid);
        user.rec_amount = dec(rec);
        user
    }

    fn bill(rate: &str, quantity: &str, received: &str) -> Customer {
        CustomerEntry::new("Ramesh", "9000000000")
            .rate(rate)
            .quantity(quantity)
            .received(received)
            .to_customer(1)
            .unwrap()
    }

    #[test]
    fn test_matching_totals_are_valid() {
        let customers = vec![bill("100", "2", "50"), bill("30", "1.5", "0")];
        let report = reconcile(&owner("245", "50"), &customers);

        assert!(report.is_valid, "{:?}", report.issues);
        assert_eq!(report.customer_count, 2);
        assert_eq!(report.billed_total, dec("245"));
        assert_eq!(report.outstanding, dec("195"));
    }

    #[test]
    fn test_drifted_aggregate_is_reported() {
        let customers = vec![bill("100", "2", "50")];
        let report = reconcile(&owner("150", "50"), &customers);

        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].starts_with("Paid amount is 150"));
    }

    #[test]
    fn test_stale_snapshot_and_foreign_records() {
        let mut stale = bill("100", "2", "0");
        stale.total = dec("150");
        let mut foreign = bill("10", "1", "0");
        foreign.user_id = 9;

        let report = reconcile(&owner("150", "0"), &[stale, foreign]);

        assert!(!report.is_valid);
        assert_eq!(report.customer_count, 1);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().any(|i| i.contains("belongs to user 9")));
        assert!(report.issues.iter().any(|i| i.contains("give 200.00")));
    }
}
