//! Customer entry form and customer record management

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::ledger::calculator::{parse_amount, parse_amount_strict, BillBreakdown};
use crate::traits::*;
use crate::types::*;

/// Raw values from the customer entry form
///
/// Numeric fields stay as typed so the live total can be previewed while
/// the user is still editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerEntry {
    /// Set when editing an existing record
    pub customer_id: Option<CustomerId>,
    pub name: String,
    pub mobile: String,
    pub rate: String,
    pub quantity: String,
    pub discount: String,
    pub discount_mode: DiscountMode,
    pub received: String,
    pub description: String,
}

impl CustomerEntry {
    /// Start a new entry for a customer
    pub fn new(name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mobile: mobile.into(),
            ..Self::default()
        }
    }

    /// Prefill the form from a stored record for editing
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.name.clone(),
            mobile: customer.mobile.clone(),
            rate: customer.rate.to_string(),
            quantity: customer.quantity.to_string(),
            discount: customer.discount().to_string(),
            discount_mode: customer.discount_mode(),
            received: customer.received_amt.to_string(),
            description: customer.description.clone(),
        }
    }

    pub fn rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = rate.into();
        self
    }

    pub fn quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    pub fn discount(mut self, discount: impl Into<String>, mode: DiscountMode) -> Self {
        self.discount = discount.into();
        self.discount_mode = mode;
        self
    }

    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.received = received.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Live bill for the form as typed, with unparsable fields read as zero
    pub fn preview(&self) -> BillBreakdown {
        BillBreakdown::compute(
            &parse_amount(&self.rate),
            &parse_amount(&self.quantity),
            &parse_amount(&self.discount),
            self.discount_mode,
            &parse_amount(&self.received),
        )
    }

    /// Build the record to submit for `user_id`
    ///
    /// Rate and quantity must parse; discount and received amount fall back
    /// to zero. Only the discount column of the active mode is filled.
    pub fn to_customer(&self, user_id: UserId) -> HisabResult<Customer> {
        let rate = parse_amount_strict(&self.rate).ok_or_else(|| {
            HisabError::Validation("Please enter a valid rate greater than 0.".to_string())
        })?;
        let quantity = parse_amount_strict(&self.quantity).ok_or_else(|| {
            HisabError::Validation("Please enter a valid quantity greater than 0.".to_string())
        })?;
        let discount = parse_amount(&self.discount);
        let received = parse_amount(&self.received);

        let bill = BillBreakdown::compute(&rate, &quantity, &discount, self.discount_mode, &received);

        let (discount_in_rs, discount_in_per) = match self.discount_mode {
            DiscountMode::Percentage => (BigDecimal::zero(), discount),
            DiscountMode::Absolute => (discount, BigDecimal::zero()),
        };

        Ok(Customer {
            customer_id: self.customer_id,
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            rate,
            quantity,
            discount_in_rs,
            discount_in_per,
            description: self.description.clone(),
            received_amt: received,
            total: bill.total,
            user_id,
        })
    }
}

/// Customer manager for handling customer record operations
pub struct CustomerManager<S: CustomerService> {
    service: S,
    validator: Arc<dyn RecordValidator>,
}

impl<S: CustomerService> CustomerManager<S> {
    /// Create a new customer manager
    pub fn new(service: S) -> Self {
        Self {
            service,
            validator: Arc::new(DefaultRecordValidator),
        }
    }

    /// Create a new customer manager with custom validator
    pub fn with_validator(service: S, validator: Arc<dyn RecordValidator>) -> Self {
        Self { service, validator }
    }

    /// Validate an entry and create or update the record it describes
    pub async fn save(&self, entry: &CustomerEntry, user_id: UserId) -> HisabResult<Customer> {
        let customer = entry.to_customer(user_id)?;
        self.validator.validate_customer(&customer)?;

        match customer.customer_id {
            Some(customer_id) => {
                let existing = self.get_owned(customer_id, user_id).await?;
                debug!(customer_id, previous_total = %existing.total, "updating customer");

                self.service.update_customer(customer_id, &customer).await?;
                info!(customer_id, user_id, total = %customer.total, "customer updated");
                Ok(customer)
            }
            None => {
                let created = self.service.create_customer(&customer).await?;
                info!(
                    customer_id = ?created.customer_id,
                    user_id,
                    total = %created.total,
                    "customer created"
                );
                Ok(created)
            }
        }
    }

    /// Get a customer, requiring it to belong to `user_id`
    pub async fn get_owned(&self, customer_id: CustomerId, user_id: UserId) -> HisabResult<Customer> {
        let customer = self.service.get_customer(customer_id).await?;
        if customer.user_id != user_id {
            return Err(HisabError::NotFound(format!(
                "customer {customer_id} for user {user_id}"
            )));
        }
        Ok(customer)
    }

    /// List the customers of a user
    pub async fn list(&self, user_id: UserId) -> HisabResult<Vec<Customer>> {
        self.service.list_customers_for_user(user_id).await
    }

    /// Case-insensitive name search over a user's customers
    pub async fn search(&self, user_id: UserId, query: &str) -> HisabResult<Vec<Customer>> {
        let customers = self.list(user_id).await?;
        Ok(filter_by_name(customers, query))
    }

    /// Delete a customer owned by `user_id`
    pub async fn delete(&self, customer_id: CustomerId, user_id: UserId) -> HisabResult<()> {
        self.get_owned(customer_id, user_id).await?;
        self.service.delete_customer(customer_id).await?;
        info!(customer_id, user_id, "customer deleted");
        Ok(())
    }
}

/// Keep the customers whose name contains `query`, ignoring case
pub fn filter_by_name(customers: Vec<Customer>, query: &str) -> Vec<Customer> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return customers;
    }

    customers
        .into_iter()
        .filter(|customer| customer.name.to_lowercase().contains(&needle))
        .collect()
}
