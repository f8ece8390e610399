//! Staff enrolment and listing

use std::sync::Arc;
use tracing::info;

use crate::traits::*;
use crate::types::*;

/// Staff manager for handling staff operations of a business owner
pub struct StaffManager<S: StaffService> {
    service: S,
    validator: Arc<dyn RecordValidator>,
}

impl<S: StaffService> StaffManager<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            validator: Arc::new(DefaultRecordValidator),
        }
    }

    pub fn with_validator(service: S, validator: Arc<dyn RecordValidator>) -> Self {
        Self { service, validator }
    }

    /// Enrol a staff member under `user_id`
    pub async fn add(
        &self,
        name: &str,
        mobile: &str,
        password: &str,
        user_id: UserId,
    ) -> HisabResult<Staff> {
        let staff = Staff {
            staff_id: None,
            name: name.trim().to_string(),
            mobile: mobile.trim().to_string(),
            password: password.to_string(),
            user_id,
        };
        self.validator.validate_staff(&staff)?;

        let created = self.service.create_staff(&staff).await?;
        info!(staff_id = ?created.staff_id, user_id, "staff added");
        Ok(created)
    }

    /// List the staff working for `user_id`
    pub async fn list(&self, user_id: UserId) -> HisabResult<Vec<Staff>> {
        self.service.list_staff_for_user(user_id).await
    }

    /// Remove a staff member
    pub async fn remove(&self, staff_id: StaffId) -> HisabResult<()> {
        self.service.delete_staff(staff_id).await?;
        info!(staff_id, "staff removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_service::MemoryService;

    #[tokio::test]
    async fn test_add_list_remove() {
        let manager = StaffManager::new(MemoryService::new());

        let ravi = manager.add("Ravi", "9123456780", "pw", 1).await.unwrap();
        manager.add("Meena", "9123456781", "pw", 2).await.unwrap();

        let staff = manager.list(1).await.unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].name, "Ravi");

        manager.remove(ravi.staff_id.unwrap()).await.unwrap();
        assert!(manager.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_staff_is_not_submitted() {
        let service = MemoryService::new();
        let manager = StaffManager::new(service.clone());

        let err = manager.add("Ravi", "12345", "pw", 1).await.unwrap_err();
        assert!(matches!(err, HisabError::Validation(_)));
        assert_eq!(service.request_count(), 0);
    }
}
