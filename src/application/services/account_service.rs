//! Account sign-up and login.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::entities::{NewUser, OwnerId, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::slug_generator::new_id;

/// Service for account creation and credential checks.
pub struct AccountService<U: UserRepository + ?Sized> {
    repository: Arc<U>,
}

impl<U: UserRepository + ?Sized> AccountService<U> {
    pub fn new(repository: Arc<U>) -> Self {
        Self { repository }
    }

    /// Creates an account with an argon2-hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(email_taken(&email));
        }

        let password_hash = hash_password(password).map_err(|e| {
            AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
        })?;

        let user = self
            .repository
            .create(NewUser {
                id: new_id(),
                name: name.trim().to_string(),
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => email_taken(&email),
                other => other,
            })?;

        info!(user = %user.id, "Account created");
        Ok(user)
    }

    /// Checks credentials and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with the same message whether the email
    /// is unknown or the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.repository.find_by_email(&email).await? else {
            return Err(invalid_credentials());
        };

        let matches = verify_password(password, &user.password_hash).map_err(|e| {
            tracing::error!(user = %user.id, "Stored password hash unreadable: {}", e);
            invalid_credentials()
        })?;

        if !matches {
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Loads the account behind a verified session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the account no longer exists.
    pub async fn current_user(&self, owner: &OwnerId) -> Result<User, AppError> {
        self.repository
            .find_by_id(owner.as_uuid())
            .await?
            .ok_or_else(|| {
                AppError::unauthorized("Unauthorized", json!({ "reason": "Unknown account" }))
            })
    }
}

fn email_taken(email: &str) -> AppError {
    AppError::conflict("Email already registered", json!({ "email": email }))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid email or password", json!({}))
}
