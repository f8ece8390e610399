//! Main bookkeeping orchestrator that ties the cached user to customer and staff workflows

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ledger::{CustomerEntry, CustomerManager, StaffManager, UserCache};
use crate::reconciliation::{reconcile, ReconciliationReport};
use crate::traits::*;
use crate::types::*;

/// Bookkeeping session for one business owner
///
/// Every operation that changes customer records refreshes the cached user
/// from the server afterwards, so `paidAmount`/`recAmount` always reflect
/// the last confirmed write.
pub struct Hisab<S: HisabBackend> {
    users: S,
    customer_manager: CustomerManager<S>,
    staff_manager: StaffManager<S>,
    validator: Arc<dyn RecordValidator>,
    cache: UserCache,
}

impl<S: HisabBackend + Clone> Hisab<S> {
    /// Create a new session with the given backend
    pub fn new(service: S) -> Self {
        Self::with_validator(service, Box::new(DefaultRecordValidator))
    }

    /// Create a new session with a custom validator
    pub fn with_validator(service: S, validator: Box<dyn RecordValidator>) -> Self {
        let validator: Arc<dyn RecordValidator> = Arc::from(validator);
        Self {
            users: service.clone(),
            customer_manager: CustomerManager::with_validator(service.clone(), validator.clone()),
            staff_manager: StaffManager::with_validator(service, validator.clone()),
            validator,
            cache: UserCache::new(),
        }
    }

    /// The locally cached user
    pub fn cache(&self) -> &UserCache {
        &self.cache
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<&User> {
        self.cache.user()
    }

    // Account operations
    /// Register a new business owner
    ///
    /// Does not sign the new user in.
    pub async fn register(
        &self,
        name: &str,
        mobile: &str,
        password: &str,
        business_name: &str,
    ) -> HisabResult<User> {
        let user = User::new(
            name.trim().to_string(),
            mobile.trim().to_string(),
            password.to_string(),
            business_name.trim().to_string(),
        );
        self.validator.validate_user(&user)?;

        let created = self.users.create_user(&user).await?;
        info!(user_id = ?created.user_id, "user registered");
        Ok(created)
    }

    /// Sign in with mobile number and password and cache the matching user
    pub async fn sign_in(&mut self, mobile: &str, password: &str) -> HisabResult<&User> {
        let mobile = mobile.trim();
        if mobile.is_empty() || password.is_empty() {
            return Err(HisabError::Validation(
                "Please enter both mobile number and password.".to_string(),
            ));
        }

        let user = self
            .users
            .list_users()
            .await?
            .into_iter()
            .find(|user| user.mobile == mobile && user.password == password)
            .ok_or(HisabError::InvalidCredentials)?;

        info!(user_id = ?user.user_id, "signed in");
        Ok(self.cache.replace(user))
    }

    /// Forget the cached user
    pub fn sign_out(&mut self) {
        if let Some(user_id) = self.cache.user().and_then(|user| user.user_id) {
            info!(user_id, "signed out");
        }
        self.cache.clear();
    }

    /// Re-fetch the signed-in user and overwrite the cache
    pub async fn refresh(&mut self) -> HisabResult<&User> {
        let user_id = self.cache.user_id()?;
        let user = self.users.get_user(user_id).await?;
        debug!(
            user_id,
            paid_amount = %user.paid_amount,
            rec_amount = %user.rec_amount,
            "user totals refreshed"
        );
        Ok(self.cache.replace(user))
    }

    // Customer operations
    /// Save a customer entry for the signed-in user
    ///
    /// Creates the record when the entry has no ID and updates it otherwise,
    /// then refreshes the cached totals. Nothing is sent when validation
    /// fails. When the refresh fails the write stands, the previous cache is
    /// kept and `TotalsNotRefreshed` carries the stored record.
    pub async fn save_customer(&mut self, entry: &CustomerEntry) -> HisabResult<Customer> {
        let user_id = self.cache.user_id()?;

        let saved = self
            .customer_manager
            .save(entry, user_id)
            .await
            .inspect_err(|err| warn!(user_id, error = %err, "customer not saved"))?;

        if let Err(err) = self.refresh().await {
            warn!(
                user_id,
                customer_id = ?saved.customer_id,
                error = %err,
                "customer saved but totals not refreshed"
            );
            return Err(HisabError::TotalsNotRefreshed {
                customer: Box::new(saved),
                reason: err.to_string(),
            });
        }

        Ok(saved)
    }

    /// Delete one of the signed-in user's customers and refresh the totals
    pub async fn delete_customer(&mut self, customer_id: CustomerId) -> HisabResult<()> {
        let user_id = self.cache.user_id()?;
        self.customer_manager.delete(customer_id, user_id).await?;
        self.refresh().await?;
        Ok(())
    }

    /// List the signed-in user's customers
    pub async fn list_customers(&self) -> HisabResult<Vec<Customer>> {
        self.customer_manager.list(self.cache.user_id()?).await
    }

    /// Search the signed-in user's customers by name
    pub async fn search_customers(&self, query: &str) -> HisabResult<Vec<Customer>> {
        self.customer_manager
            .search(self.cache.user_id()?, query)
            .await
    }

    // Staff operations
    /// Add a staff member for the signed-in user
    pub async fn add_staff(&self, name: &str, mobile: &str, password: &str) -> HisabResult<Staff> {
        let user_id = self.cache.user_id()?;
        self.staff_manager.add(name, mobile, password, user_id).await
    }

    /// List the signed-in user's staff
    pub async fn list_staff(&self) -> HisabResult<Vec<Staff>> {
        self.staff_manager.list(self.cache.user_id()?).await
    }

    /// Remove a staff member
    pub async fn remove_staff(&self, staff_id: StaffId) -> HisabResult<()> {
        self.cache.user_id()?;
        self.staff_manager.remove(staff_id).await
    }

    // Reporting
    /// Compare the cached totals with the signed-in user's customer records
    pub async fn reconcile(&self) -> HisabResult<ReconciliationReport> {
        let user = self.cache.require_user()?;
        let customers = self.list_customers().await?;
        let report = reconcile(user, &customers);

        if !report.is_valid {
            warn!(
                user_id = ?report.user_id,
                issues = report.issues.len(),
                "ledger does not reconcile"
            );
        }

        Ok(report)
    }
}
