//! Integration tests for hisab-kitab-core

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use hisab_kitab_core::{
    calculate,
    utils::{EnhancedRecordValidator, MemoryService},
    Customer, CustomerEntry, CustomerId, CustomerService, DiscountMode, Hisab, HisabError,
    HisabResult, Staff, StaffId, StaffService, User, UserId, UserService,
};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory backend whose user fetches can be made to fail on their own
#[derive(Clone, Default)]
struct UnreachableUsers {
    inner: MemoryService,
    fail_get_user: Arc<AtomicBool>,
}

impl UnreachableUsers {
    fn fail_user_fetches(&self, fail: bool) {
        self.fail_get_user.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserService for UnreachableUsers {
    async fn list_users(&self) -> HisabResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn get_user(&self, user_id: UserId) -> HisabResult<User> {
        if self.fail_get_user.load(Ordering::SeqCst) {
            return Err(HisabError::Remote("HTTP 503 from Users".to_string()));
        }
        self.inner.get_user(user_id).await
    }

    async fn create_user(&self, user: &User) -> HisabResult<User> {
        self.inner.create_user(user).await
    }

    async fn update_user(&self, user_id: UserId, user: &User) -> HisabResult<()> {
        self.inner.update_user(user_id, user).await
    }

    async fn delete_user(&self, user_id: UserId) -> HisabResult<()> {
        self.inner.delete_user(user_id).await
    }
}

#[async_trait]
impl CustomerService for UnreachableUsers {
    async fn list_customers(&self) -> HisabResult<Vec<Customer>> {
        self.inner.list_customers().await
    }

    async fn list_customers_for_user(&self, user_id: UserId) -> HisabResult<Vec<Customer>> {
        self.inner.list_customers_for_user(user_id).await
    }

    async fn get_customer(&self, customer_id: CustomerId) -> HisabResult<Customer> {
        self.inner.get_customer(customer_id).await
    }

    async fn create_customer(&self, customer: &Customer) -> HisabResult<Customer> {
        self.inner.create_customer(customer).await
    }

    async fn update_customer(
        &self,
        customer_id: CustomerId,
        customer: &Customer,
    ) -> HisabResult<()> {
        self.inner.update_customer(customer_id, customer).await
    }

    async fn delete_customer(&self, customer_id: CustomerId) -> HisabResult<()> {
        self.inner.delete_customer(customer_id).await
    }
}

#[async_trait]
impl StaffService for UnreachableUsers {
    async fn list_staff(&self) -> HisabResult<Vec<Staff>> {
        self.inner.list_staff().await
    }

    async fn list_staff_for_user(&self, user_id: UserId) -> HisabResult<Vec<Staff>> {
        self.inner.list_staff_for_user(user_id).await
    }

    async fn create_staff(&self, staff: &Staff) -> HisabResult<Staff> {
        self.inner.create_staff(staff).await
    }

    async fn delete_staff(&self, staff_id: StaffId) -> HisabResult<()> {
        self.inner.delete_staff(staff_id).await
    }
}

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

async fn signed_in(service: &MemoryService) -> Hisab<MemoryService> {
    let mut hisab = Hisab::new(service.clone());
    hisab
        .register("Asha", "9876543210", "secret", "Asha Dairy")
        .await
        .unwrap();
    hisab.sign_in("9876543210", "secret").await.unwrap();
    hisab
}

#[test]
fn test_calculator_properties() {
    assert_eq!(calculate("100", "2", "10", DiscountMode::Percentage), dec("180.00"));
    assert_eq!(calculate("100", "2", "10", DiscountMode::Absolute), dec("190.00"));
    assert_eq!(calculate("0", "5", "0", DiscountMode::Percentage), dec("0.00"));
    assert_eq!(calculate("100", "2", "250", DiscountMode::Absolute), dec("0.00"));
    assert_eq!(calculate("x", "y", "z", DiscountMode::Absolute), BigDecimal::zero());
}

#[tokio::test]
async fn test_complete_bookkeeping_workflow() {
    let service = MemoryService::new();
    let mut hisab = signed_in(&service).await;

    let user = hisab.current_user().unwrap();
    assert_eq!(user.paid_amount, BigDecimal::zero());
    assert_eq!(user.rec_amount, BigDecimal::zero());

    // First bill, 10% off, part paid
    let ramesh = hisab
        .save_customer(
            &CustomerEntry::new("Ramesh", "9000000001")
                .rate("100")
                .quantity("2")
                .discount("10", DiscountMode::Percentage)
                .received("80")
                .description("milk, 2 cans"),
        )
        .await
        .unwrap();
    assert_eq!(ramesh.total, dec("180"));

    // Second bill, flat discount
    hisab
        .save_customer(
            &CustomerEntry::new("Sita", "9000000002")
                .rate("45")
                .quantity("4")
                .discount("30", DiscountMode::Absolute),
        )
        .await
        .unwrap();

    let user = hisab.current_user().unwrap();
    assert_eq!(user.paid_amount, dec("330"));
    assert_eq!(user.rec_amount, dec("80"));
    assert_eq!(user.outstanding(), dec("250"));

    // Ramesh settles the rest
    let mut edit = CustomerEntry::from_customer(&ramesh);
    edit.received = "180".to_string();
    let updated = hisab.save_customer(&edit).await.unwrap();
    assert_eq!(updated.customer_id, ramesh.customer_id);
    assert_eq!(updated.balance_due(), BigDecimal::zero());

    let user = hisab.current_user().unwrap();
    assert_eq!(user.paid_amount, dec("330"));
    assert_eq!(user.rec_amount, dec("180"));

    let customers = hisab.list_customers().await.unwrap();
    assert_eq!(customers.len(), 2);

    let report = hisab.reconcile().await.unwrap();
    assert!(report.is_valid, "{:?}", report.issues);
    assert_eq!(report.customer_count, 2);
    assert_eq!(report.outstanding, dec("150"));

    // Removing a customer drops it from the totals
    hisab
        .delete_customer(ramesh.customer_id.unwrap())
        .await
        .unwrap();
    let user = hisab.current_user().unwrap();
    assert_eq!(user.paid_amount, dec("150"));
    assert_eq!(user.rec_amount, BigDecimal::zero());
}

#[tokio::test]
async fn test_invalid_entry_makes_no_remote_call() {
    let service = MemoryService::new();
    let mut hisab = signed_in(&service).await;
    let before = service.request_count();

    for (rate, quantity) in [("0", "2"), ("-5", "2"), ("abc", "2"), ("10", "0"), ("10", "")] {
        let entry = CustomerEntry::new("Ramesh", "9000000001")
            .rate(rate)
            .quantity(quantity);
        let err = hisab.save_customer(&entry).await.unwrap_err();
        assert!(matches!(err, HisabError::Validation(_)), "{rate} x {quantity}");
        assert_eq!(err.alert().title, "Validation Error");
    }

    assert_eq!(service.request_count(), before);
}

#[tokio::test]
async fn test_remote_failure_keeps_cache_and_shows_generic_alert() {
    let service = MemoryService::new();
    let mut hisab = signed_in(&service).await;
    let cached = hisab.current_user().unwrap().clone();

    service.set_offline(true);
    let entry = CustomerEntry::new("Ramesh", "9000000001")
        .rate("10")
        .quantity("3");
    let err = hisab.save_customer(&entry).await.unwrap_err();

    assert!(matches!(err, HisabError::Remote(_)));
    let alert = err.alert();
    assert_eq!(alert.title, "Error");
    assert_eq!(alert.message, "Something went wrong. Please try again.");
    assert_eq!(hisab.current_user(), Some(&cached));

    service.set_offline(false);
    assert!(service.list_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_drifted_cache_is_caught_by_reconciliation() {
    let service = MemoryService::new();
    let mut hisab = signed_in(&service).await;

    hisab
        .save_customer(&CustomerEntry::new("Ramesh", "9000000001").rate("50").quantity("2"))
        .await
        .unwrap();

    // A write from another device that this session has not refreshed
    let user_id = hisab.cache().user_id().unwrap();
    let other = CustomerEntry::new("Sita", "9000000002")
        .rate("20")
        .quantity("1")
        .to_customer(user_id)
        .unwrap();
    service.create_customer(&other).await.unwrap();

    let report = hisab.reconcile().await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.billed_total, dec("120"));
    assert_eq!(report.paid_amount, dec("100"));

    hisab.refresh().await.unwrap();
    assert!(hisab.reconcile().await.unwrap().is_valid);
}

#[tokio::test]
async fn test_staff_workflow() {
    let service = MemoryService::new();
    let hisab = signed_in(&service).await;

    let err = hisab.add_staff("Ravi", "91234", "pw").await.unwrap_err();
    assert_eq!(err.alert().message, "Enter a valid 10-digit mobile number!");

    let ravi = hisab.add_staff("Ravi", "9123456780", "pw").await.unwrap();
    hisab.add_staff("Meena", "9123456781", "pw").await.unwrap();
    assert_eq!(ravi.user_id, hisab.cache().user_id().unwrap());

    let staff = hisab.list_staff().await.unwrap();
    assert_eq!(staff.len(), 2);

    hisab.remove_staff(ravi.staff_id.unwrap()).await.unwrap();
    let staff = hisab.list_staff().await.unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].name, "Meena");

    let user = service
        .get_user(hisab.cache().user_id().unwrap())
        .await
        .unwrap();
    assert_eq!(user.staffs.len(), 1);
}

#[tokio::test]
async fn test_customers_are_scoped_to_signed_in_user() {
    let service = MemoryService::new();
    let mut asha = signed_in(&service).await;

    let mut vikram = Hisab::new(service.clone());
    vikram
        .register("Vikram", "9811111111", "pw", "Vikram Papers")
        .await
        .unwrap();
    vikram.sign_in("9811111111", "pw").await.unwrap();

    let asha_customer = asha
        .save_customer(&CustomerEntry::new("John Doe", "9000000001").rate("10").quantity("1"))
        .await
        .unwrap();
    vikram
        .save_customer(&CustomerEntry::new("Jane Smith", "9000000002").rate("5").quantity("1"))
        .await
        .unwrap();

    let found = asha.search_customers("j").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "John Doe");

    let err = vikram
        .delete_customer(asha_customer.customer_id.unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, HisabError::NotFound(_)));
    assert_eq!(asha.list_customers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_rules() {
    let service = MemoryService::new();
    let hisab = Hisab::new(service.clone());

    let err = hisab
        .register("Asha", "98765", "secret", "Asha Dairy")
        .await
        .unwrap_err();
    assert_eq!(err.alert().message, "Mobile number must be at least 10 digits.");

    let err = hisab
        .register("", "9876543210", "secret", "Asha Dairy")
        .await
        .unwrap_err();
    assert_eq!(err.alert().message, "All fields are required.");
    assert_eq!(service.request_count(), 0);

    let user = hisab
        .register("Asha", "9876543210", "secret", "Asha Dairy")
        .await
        .unwrap();
    assert!(user.user_id.is_some());
    assert!(user.customers.is_empty());

    // Same mobile again is refused by the server
    let err = hisab
        .register("Asha", "9876543210", "other", "Asha Dairy")
        .await
        .unwrap_err();
    assert!(!err.is_user_error());
}

#[tokio::test]
async fn test_enhanced_validator() {
    let service = MemoryService::new();
    let mut hisab = Hisab::with_validator(service.clone(), Box::new(EnhancedRecordValidator));
    hisab
        .register("Asha", "9876543210", "secret", "Asha Dairy")
        .await
        .unwrap();
    hisab.sign_in("9876543210", "secret").await.unwrap();

    let err = hisab
        .save_customer(
            &CustomerEntry::new("Ramesh", "9000000001")
                .rate("10")
                .quantity("1")
                .discount("150", DiscountMode::Percentage),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HisabError::Validation(_)));
    assert!(hisab.list_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_the_saved_customer() {
    let service = UnreachableUsers::default();
    let mut hisab = Hisab::new(service.clone());
    hisab
        .register("Asha", "9876543210", "secret", "Asha Dairy")
        .await
        .unwrap();
    hisab.sign_in("9876543210", "secret").await.unwrap();
    let cached = hisab.current_user().unwrap().clone();

    service.fail_user_fetches(true);
    let entry = CustomerEntry::new("Ramesh", "9000000001")
        .rate("100")
        .quantity("2")
        .discount("10", DiscountMode::from_toggle(true))
        .received("80");
    let err = hisab.save_customer(&entry).await.unwrap_err();

    assert!(matches!(err, HisabError::TotalsNotRefreshed { .. }));
    let alert = err.alert();
    assert_eq!(alert.title, "Saved");
    assert_ne!(alert.message, "Something went wrong. Please try again.");
    assert_eq!(hisab.current_user(), Some(&cached));

    let saved = err.saved_customer().unwrap().clone();
    assert!(saved.customer_id.is_some());
    assert_eq!(saved.total, dec("180"));

    // Continuing from the saved record updates it instead of adding another
    service.fail_user_fetches(false);
    let mut edit = CustomerEntry::from_customer(&saved);
    edit.received = "180".to_string();
    let updated = hisab.save_customer(&edit).await.unwrap();
    assert_eq!(updated.customer_id, saved.customer_id);

    assert_eq!(hisab.list_customers().await.unwrap().len(), 1);
    let user = hisab.current_user().unwrap();
    assert_eq!(user.paid_amount, dec("180"));
    assert_eq!(user.rec_amount, dec("180"));
}
