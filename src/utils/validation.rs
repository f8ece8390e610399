//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::{BigDecimal, Zero};

/// Validate that an amount is not negative
pub fn validate_non_negative(amount: &BigDecimal, field: &str) -> HisabResult<()> {
    if *amount < BigDecimal::zero() {
        Err(HisabError::Validation(format!("{field} cannot be negative")))
    } else {
        Ok(())
    }
}

/// Validate that a person or business name is valid
pub fn validate_name(name: &str) -> HisabResult<()> {
    if name.trim().is_empty() {
        return Err(HisabError::Validation("Name cannot be empty".to_string()));
    }

    if name.chars().count() > 100 {
        return Err(HisabError::Validation(
            "Name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a mobile number made of 10 to 15 digits, with an optional leading `+`
pub fn validate_mobile(mobile: &str) -> HisabResult<()> {
    let digits = mobile.trim().strip_prefix('+').unwrap_or(mobile.trim());

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(HisabError::Validation(
            "Mobile number can only contain digits".to_string(),
        ));
    }

    if !(10..=15).contains(&digits.len()) {
        return Err(HisabError::Validation(
            "Mobile number must have 10 to 15 digits".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a description is valid
pub fn validate_description(description: &str) -> HisabResult<()> {
    if description.chars().count() > 500 {
        return Err(HisabError::Validation(
            "Description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced validator with checks beyond the entry form rules
pub struct EnhancedRecordValidator;

impl RecordValidator for EnhancedRecordValidator {
    fn validate_user(&self, user: &User) -> HisabResult<()> {
        DefaultRecordValidator.validate_user(user)?;

        validate_name(&user.name)?;
        validate_name(&user.business_name)?;
        validate_mobile(&user.mobile)?;

        Ok(())
    }

    fn validate_customer(&self, customer: &Customer) -> HisabResult<()> {
        DefaultRecordValidator.validate_customer(customer)?;

        validate_name(&customer.name)?;
        validate_mobile(&customer.mobile)?;
        validate_description(&customer.description)?;
        validate_non_negative(&customer.discount_in_rs, "Discount")?;
        validate_non_negative(&customer.discount_in_per, "Discount")?;
        validate_non_negative(&customer.received_amt, "Received amount")?;

        if customer.discount_in_per > BigDecimal::from(100) {
            return Err(HisabError::Validation(
                "Discount cannot exceed 100%".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_staff(&self, staff: &Staff) -> HisabResult<()> {
        DefaultRecordValidator.validate_staff(staff)?;
        validate_name(&staff.name)
    }
}
