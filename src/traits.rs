//! Service abstraction over the remote API and pluggable record validation

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};

use crate::types::*;

/// Access to the `/Users` resource
///
/// The server owns `paidAmount`/`recAmount`; clients only read them.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List every user
    async fn list_users(&self) -> HisabResult<Vec<User>>;

    /// Get a user by ID
    async fn get_user(&self, user_id: UserId) -> HisabResult<User>;

    /// Create a user, returning the stored record with its assigned ID
    async fn create_user(&self, user: &User) -> HisabResult<User>;

    /// Replace a user record
    async fn update_user(&self, user_id: UserId, user: &User) -> HisabResult<()>;

    /// Delete a user
    async fn delete_user(&self, user_id: UserId) -> HisabResult<()>;
}

/// Access to the `/Customers` resource
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// List every customer record
    async fn list_customers(&self) -> HisabResult<Vec<Customer>>;

    /// List the customers owned by one user
    async fn list_customers_for_user(&self, user_id: UserId) -> HisabResult<Vec<Customer>>;

    /// Get a customer by ID
    async fn get_customer(&self, customer_id: CustomerId) -> HisabResult<Customer>;

    /// Create a customer, returning the stored record with its assigned ID
    async fn create_customer(&self, customer: &Customer) -> HisabResult<Customer>;

    /// Replace a customer record
    async fn update_customer(
        &self,
        customer_id: CustomerId,
        customer: &Customer,
    ) -> HisabResult<()>;

    /// Delete a customer
    async fn delete_customer(&self, customer_id: CustomerId) -> HisabResult<()>;
}

/// Access to the `/Staffs` resource
#[async_trait]
pub trait StaffService: Send + Sync {
    /// List every staff member
    async fn list_staff(&self) -> HisabResult<Vec<Staff>>;

    /// List the staff working for one user
    async fn list_staff_for_user(&self, user_id: UserId) -> HisabResult<Vec<Staff>>;

    /// Create a staff member, returning the stored record with its assigned ID
    async fn create_staff(&self, staff: &Staff) -> HisabResult<Staff>;

    /// Delete a staff member
    async fn delete_staff(&self, staff_id: StaffId) -> HisabResult<()>;
}

/// Everything the bookkeeping workflows need from the backend
pub trait HisabBackend: UserService + CustomerService + StaffService {}

impl<T: UserService + CustomerService + StaffService> HisabBackend for T {}

/// Trait for implementing custom rules on records before they are submitted
pub trait RecordValidator: Send + Sync {
    /// Validate a user before registration
    fn validate_user(&self, user: &User) -> HisabResult<()>;

    /// Validate a customer before create or update
    fn validate_customer(&self, customer: &Customer) -> HisabResult<()>;

    /// Validate a staff member before creation
    fn validate_staff(&self, staff: &Staff) -> HisabResult<()>;
}

fn require(value: &str, message: &str) -> HisabResult<()> {
    if value.trim().is_empty() {
        return Err(HisabError::Validation(message.to_string()));
    }
    Ok(())
}

/// Default validator carrying the entry rules of the mobile app
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_user(&self, user: &User) -> HisabResult<()> {
        for field in [&user.name, &user.mobile, &user.password, &user.business_name] {
            require(field, "All fields are required.")?;
        }

        if user.mobile.trim().chars().count() < 10 {
            return Err(HisabError::Validation(
                "Mobile number must be at least 10 digits.".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_customer(&self, customer: &Customer) -> HisabResult<()> {
        if customer.rate <= BigDecimal::zero() {
            return Err(HisabError::Validation(
                "Please enter a valid rate greater than 0.".to_string(),
            ));
        }

        if customer.quantity <= BigDecimal::zero() {
            return Err(HisabError::Validation(
                "Please enter a valid quantity greater than 0.".to_string(),
            ));
        }

        if !customer.discount_in_rs.is_zero() && !customer.discount_in_per.is_zero() {
            return Err(HisabError::Validation(
                "A discount can be in rupees or in percent, not both.".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_staff(&self, staff: &Staff) -> HisabResult<()> {
        for field in [&staff.name, &staff.mobile, &staff.password] {
            require(field, "All fields are required!")?;
        }

        let mobile = staff.mobile.trim();
        if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(HisabError::Validation(
                "Enter a valid 10-digit mobile number!".to_string(),
            ));
        }

        Ok(())
    }
}
