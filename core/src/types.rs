//! Wire DTOs for the admin API.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently;
//! integration tests catch drift. Request payloads derive `Validate` so the
//! services can reject bad input before anything is sent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use validator::{Validate, ValidationError};

use crate::multipart::{FileUpload, MultipartForm};

/// The authenticated administrator. The password is write-only and is never
/// read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdmin {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// `data` of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub admin: Option<Admin>,
}

/// Partial profile update. Absent fields are not sent; the server decides
/// which fields it accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdmin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "new_password_differs"))]
pub struct ChangePassword {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_new_password: String,
}

fn new_password_differs(input: &ChangePassword) -> Result<(), ValidationError> {
    if input.new_password == input.old_password {
        return Err(ValidationError::new("same_password")
            .with_message(Cow::Borrowed("New password cannot be the same as old password")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymOwner {
    pub id: u64,
    #[serde(default)]
    pub unique_id: Option<String>,
    pub owner_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gym_name: Option<String>,
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub gym_logo: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields for creating a gym owner, sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewGymOwner {
    #[validate(length(min = 1, message = "Owner name is required"))]
    pub owner_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Gym name is required"))]
    pub gym_name: String,
    pub unique_id: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub subscription_type: Option<String>,
    pub active: Option<bool>,
    pub profile_image: Option<FileUpload>,
    pub gym_logo: Option<FileUpload>,
}

impl NewGymOwner {
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text("ownerName", self.owner_name.as_str())
            .text("email", self.email.as_str())
            .text("gymName", self.gym_name.as_str())
            .text_opt("uniqueId", self.unique_id.as_deref())
            .text_opt("phoneNumber", self.phone_number.as_deref())
            .text_opt("address", self.address.as_deref())
            .text_opt("subscriptionType", self.subscription_type.as_deref())
            .text_opt("active", self.active.map(|a| a.to_string()))
            .file_opt("profileImage", self.profile_image.clone())
            .file_opt("gymLogo", self.gym_logo.clone())
    }
}

/// Partial gym-owner update; only present fields are sent.
#[derive(Debug, Clone, Default, Validate)]
pub struct GymOwnerUpdate {
    #[validate(length(min = 1, message = "Owner name cannot be empty"))]
    pub owner_name: Option<String>,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    pub gym_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub subscription_type: Option<String>,
    pub active: Option<bool>,
    pub profile_image: Option<FileUpload>,
    pub gym_logo: Option<FileUpload>,
}

impl GymOwnerUpdate {
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text_opt("ownerName", self.owner_name.as_deref())
            .text_opt("email", self.email.as_deref())
            .text_opt("gymName", self.gym_name.as_deref())
            .text_opt("phoneNumber", self.phone_number.as_deref())
            .text_opt("address", self.address.as_deref())
            .text_opt("subscriptionType", self.subscription_type.as_deref())
            .text_opt("active", self.active.map(|a| a.to_string()))
            .file_opt("profileImage", self.profile_image.clone())
            .file_opt("gymLogo", self.gym_logo.clone())
    }
}

/// Rich-text health page. `content` is HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub id: u64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHealthInfo {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQuery {
    pub id: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::Part;

    #[test]
    fn login_rejects_malformed_email_and_short_password() {
        let errors = LoginCredentials::new("bad", "short").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn register_requires_every_field() {
        let input = RegisterAdmin {
            first_name: String::new(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            password: "secret1".into(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn change_password_requires_matching_confirmation() {
        let input = ChangePassword {
            old_password: "secret1".into(),
            new_password: "secret2".into(),
            confirm_new_password: "secret3".into(),
        };
        assert!(input.validate().is_err());

        let input = ChangePassword {
            confirm_new_password: "secret2".into(),
            ..input
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn admin_ignores_password_field() {
        let admin: Admin = serde_json::from_str(
            r#"{"id":1,"firstName":"A","lastName":"B","email":"a@b.com","role":"admin","password":"hash"}"#,
        )
        .unwrap();
        assert_eq!(admin.role.as_deref(), Some("admin"));
        assert!(serde_json::to_value(&admin).unwrap().get("password").is_none());
    }

    #[test]
    fn update_admin_omits_absent_fields() {
        let update = UpdateAdmin {
            first_name: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"firstName": "New"}));
    }

    #[test]
    fn gym_owner_defaults_optional_fields() {
        let owner: GymOwner =
            serde_json::from_str(r#"{"id":1,"ownerName":"Jane","email":"jane@gym.com"}"#).unwrap();
        assert_eq!(owner.id, 1);
        assert!(!owner.active);
        assert!(owner.created_at.is_none());
    }

    #[test]
    fn update_form_only_carries_present_fields() {
        let update = GymOwnerUpdate {
            address: Some("1 Main St".into()),
            active: Some(false),
            ..Default::default()
        };
        let form = update.to_form();
        let names: Vec<_> = form.parts().iter().map(Part::name).collect();
        assert_eq!(names, vec!["address", "active"]);
    }
}
