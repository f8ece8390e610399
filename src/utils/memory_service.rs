//! In-memory backend implementation for testing and development
//!
//! Behaves like the remote API: IDs are assigned on create, and a user's
//! `paidAmount`/`recAmount` are recomputed from their customers after every
//! customer write. Record references are not enforced.

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    customers: BTreeMap<CustomerId, Customer>,
    staff: BTreeMap<StaffId, Staff>,
    last_user_id: UserId,
    last_customer_id: CustomerId,
    last_staff_id: StaffId,
}

impl MemoryState {
    /// Recompute the denormalized totals of one user
    fn recompute_totals(&mut self, user_id: UserId) {
        let (paid, received) = self
            .customers
            .values()
            .filter(|customer| customer.user_id == user_id)
            .fold(
                (BigDecimal::zero(), BigDecimal::zero()),
                |(paid, received), customer| {
                    (paid + &customer.total, received + &customer.received_amt)
                },
            );

        if let Some(user) = self.users.get_mut(&user_id) {
            user.paid_amount = paid;
            user.rec_amount = received;
        }
    }

    /// A user as the API returns it, with staff and customers attached
    fn hydrate(&self, user: &User) -> User {
        let mut user = user.clone();
        if let Some(user_id) = user.user_id {
            user.customers = self
                .customers
                .values()
                .filter(|customer| customer.user_id == user_id)
                .cloned()
                .collect();
            user.staffs = self
                .staff
                .values()
                .filter(|staff| staff.user_id == user_id)
                .cloned()
                .collect();
        }
        user
    }
}

/// In-memory backend implementing every service trait
#[derive(Debug, Clone, Default)]
pub struct MemoryService {
    state: Arc<RwLock<MemoryState>>,
    offline: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
}

impl MemoryService {
    /// Create a new empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following request fail as if the server were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of requests received so far, including failed ones
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> HisabResult<()> {
        *self.write()? = MemoryState::default();
        Ok(())
    }

    fn begin(&self) -> HisabResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(HisabError::Remote("service unavailable".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> HisabResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| HisabError::Remote("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> HisabResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| HisabError::Remote("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserService for MemoryService {
    async fn list_users(&self) -> HisabResult<Vec<User>> {
        self.begin()?;
        let state = self.read()?;
        Ok(state.users.values().map(|user| state.hydrate(user)).collect())
    }

    async fn get_user(&self, user_id: UserId) -> HisabResult<User> {
        self.begin()?;
        let state = self.read()?;
        state
            .users
            .get(&user_id)
            .map(|user| state.hydrate(user))
            .ok_or_else(|| HisabError::NotFound(format!("user {user_id}")))
    }

    async fn create_user(&self, user: &User) -> HisabResult<User> {
        self.begin()?;
        let mut state = self.write()?;

        if state.users.values().any(|existing| existing.mobile == user.mobile) {
            return Err(HisabError::Remote(format!(
                "HTTP 409: mobile {} is already registered",
                user.mobile
            )));
        }

        state.last_user_id += 1;
        let user_id = state.last_user_id;
        let mut stored = user.clone();
        stored.user_id = Some(user_id);
        stored.staffs.clear();
        stored.customers.clear();
        state.users.insert(user_id, stored);
        state.recompute_totals(user_id);

        let created = state
            .users
            .get(&user_id)
            .map(|user| state.hydrate(user))
            .ok_or_else(|| HisabError::NotFound(format!("user {user_id}")))?;
        Ok(created)
    }

    async fn update_user(&self, user_id: UserId, user: &User) -> HisabResult<()> {
        self.begin()?;
        let mut state = self.write()?;
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| HisabError::NotFound(format!("user {user_id}")))?;

        stored.name = user.name.clone();
        stored.mobile = user.mobile.clone();
        stored.password = user.password.clone();
        stored.business_name = user.business_name.clone();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> HisabResult<()> {
        self.begin()?;
        let mut state = self.write()?;
        if state.users.remove(&user_id).is_none() {
            return Err(HisabError::NotFound(format!("user {user_id}")));
        }
        state.customers.retain(|_, customer| customer.user_id != user_id);
        state.staff.retain(|_, staff| staff.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl CustomerService for MemoryService {
    async fn list_customers(&self) -> HisabResult<Vec<Customer>> {
        self.begin()?;
        Ok(self.read()?.customers.values().cloned().collect())
    }

    async fn list_customers_for_user(&self, user_id: UserId) -> HisabResult<Vec<Customer>> {
        self.begin()?;
        Ok(self
            .read()?
            .customers
            .values()
            .filter(|customer| customer.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_customer(&self, customer_id: CustomerId) -> HisabResult<Customer> {
        self.begin()?;
        self.read()?
            .customers
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| HisabError::NotFound(format!("customer {customer_id}")))
    }

    async fn create_customer(&self, customer: &Customer) -> HisabResult<Customer> {
        self.begin()?;
        let mut state = self.write()?;
        state.last_customer_id += 1;
        let customer_id = state.last_customer_id;

        let mut stored = customer.clone();
        stored.customer_id = Some(customer_id);
        state.customers.insert(customer_id, stored.clone());
        state.recompute_totals(stored.user_id);
        Ok(stored)
    }

    async fn update_customer(
        &self,
        customer_id: CustomerId,
        customer: &Customer,
    ) -> HisabResult<()> {
        self.begin()?;
        let mut state = self.write()?;
        let previous_owner = state
            .customers
            .get(&customer_id)
            .map(|existing| existing.user_id)
            .ok_or_else(|| HisabError::NotFound(format!("customer {customer_id}")))?;

        let mut stored = customer.clone();
        stored.customer_id = Some(customer_id);
        state.customers.insert(customer_id, stored);

        state.recompute_totals(previous_owner);
        state.recompute_totals(customer.user_id);
        Ok(())
    }

    async fn delete_customer(&self, customer_id: CustomerId) -> HisabResult<()> {
        self.begin()?;
        let mut state = self.write()?;
        let removed = state
            .customers
            .remove(&customer_id)
            .ok_or_else(|| HisabError::NotFound(format!("customer {customer_id}")))?;
        state.recompute_totals(removed.user_id);
        Ok(())
    }
}

#[async_trait]
impl StaffService for MemoryService {
    async fn list_staff(&self) -> HisabResult<Vec<Staff>> {
        self.begin()?;
        Ok(self.read()?.staff.values().cloned().collect())
    }

    async fn list_staff_for_user(&self, user_id: UserId) -> HisabResult<Vec<Staff>> {
        self.begin()?;
        Ok(self
            .read()?
            .staff
            .values()
            .filter(|staff| staff.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_staff(&self, staff: &Staff) -> HisabResult<Staff> {
        self.begin()?;
        let mut state = self.write()?;
        state.last_staff_id += 1;
        let staff_id = state.last_staff_id;

        let mut stored = staff.clone();
        stored.staff_id = Some(staff_id);
        state.staff.insert(staff_id, stored.clone());
        Ok(stored)
    }

    async fn delete_staff(&self, staff_id: StaffId) -> HisabResult<()> {
        self.begin()?;
        self.write()?
            .staff
            .remove(&staff_id)
            .map(|_| ())
            .ok_or_else(|| HisabError::NotFound(format!("staff {staff_id}")))
    }
}
