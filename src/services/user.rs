//! User service
//!
//! Implements business logic for user management:
//! - Registration (the first user becomes admin)
//! - Login/logout with session tokens
//! - Session validation
//! - Admin user management (list, update, delete)

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{ListParams, PagedResult, Session, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Account is banned
    #[error("Account is banned")]
    Banned,

    /// User not found
    #[error("User not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Username or email address
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(user_repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user.
    ///
    /// The first registered user becomes an administrator; everyone after
    /// that defaults to the seeker role.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self
            .user_repo
            .exists_by_username(&input.username)
            .await
            .context("Failed to check username")?
        {
            return Err(UserServiceError::UserExists(input.username));
        }
        if self
            .user_repo
            .exists_by_email(&input.email)
            .await
            .context("Failed to check email")?
        {
            return Err(UserServiceError::UserExists(input.email));
        }

        let count = self.user_repo.count().await.context("Failed to count users")?;
        let role = if count == 0 {
            UserRole::Admin
        } else {
            UserRole::Seeker
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.username, input.email, password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user {} ({})", created.username, created.role);
        Ok(created)
    }

    /// Log in with username or email, returning a new session.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .find_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid credentials".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid credentials".to_string(),
            ));
        }

        if user.is_banned() {
            return Err(UserServiceError::Banned);
        }

        self.create_session(user.id).await
    }

    /// Validate a session token.
    ///
    /// Returns the owning user when the token exists, hasn't expired and the
    /// account is still active. Expired sessions are removed on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to load session")?;

        let Some(session) = session else {
            return Ok(None);
        };

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to load session user")?;

        Ok(user.filter(|u| u.is_active()))
    }

    /// Log out (delete the session)
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?)
    }

    /// List users (admin)
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        Ok(self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?)
    }

    /// Update a user (admin, or the user itself for profile fields).
    ///
    /// Banning a user also drops their sessions.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))?;

        if let Some(username) = input.username {
            if username != user.username {
                validate_username(&username)?;
                if self
                    .user_repo
                    .exists_by_username(&username)
                    .await
                    .context("Failed to check username")?
                {
                    return Err(UserServiceError::UserExists(username));
                }
                user.username = username;
            }
        }
        if let Some(email) = input.email {
            if email != user.email {
                validate_email(&email)?;
                if self
                    .user_repo
                    .exists_by_email(&email)
                    .await
                    .context("Failed to check email")?
                {
                    return Err(UserServiceError::UserExists(email));
                }
                user.email = email;
            }
        }
        if let Some(password) = input.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password).context("Failed to hash password")?;
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(status) = input.status {
            user.status = status;
        }

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        if updated.is_banned() {
            self.session_repo
                .delete_by_user(updated.id)
                .await
                .context("Failed to drop sessions of banned user")?;
        }

        Ok(updated)
    }

    /// Delete a user and their sessions
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))?;

        self.session_repo
            .delete_by_user(user.id)
            .await
            .context("Failed to delete user sessions")?;
        self.user_repo
            .delete(user.id)
            .await
            .context("Failed to delete user")?;

        Ok(())
    }

    /// Check whether no user exists yet (first-run setup)
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self.user_repo.count().await.context("Failed to count users")?;
        Ok(count == 0)
    }

    /// Remove expired sessions
    pub async fn purge_expired_sessions(&self) -> Result<i64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to purge sessions")?)
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let by_username = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to look up username")?;
        if by_username.is_some() {
            return Ok(by_username);
        }

        Ok(self
            .user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to look up email")?)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        Ok(self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if username.len() < 3 || username.len() > 50 {
        return Err(UserServiceError::ValidationError(
            "Username must be between 3 and 50 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(UserServiceError::ValidationError(
            "Username may only contain letters, digits, underscores and hyphens".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    let parts: Vec<&str> = email.splitn(2, '@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(UserServiceError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() < 8 {
        return Err(UserServiceError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::UserStatus;

    async fn setup_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn register_input(name: &str) -> RegisterInput {
        RegisterInput {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup_service().await;

        let first = service.register(register_input("alice")).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);

        let second = service.register(register_input("bob")).await.unwrap();
        assert_eq!(second.role, UserRole::Seeker);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = setup_service().await;
        service.register(register_input("carol")).await.unwrap();

        let mut dup = register_input("carol");
        dup.email = "other@example.com".to_string();
        let result = service.register(dup).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup_service().await;

        let mut bad = register_input("ok");
        bad.username = "ab".to_string();
        assert!(matches!(
            service.register(bad).await,
            Err(UserServiceError::ValidationError(_))
        ));

        let mut bad = register_input("dave");
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            service.register(bad).await,
            Err(UserServiceError::ValidationError(_))
        ));

        let mut bad = register_input("erin");
        bad.password = "short".to_string();
        assert!(matches!(
            service.register(bad).await,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_username_and_email() {
        let service = setup_service().await;
        service.register(register_input("frank")).await.unwrap();

        let session = service
            .login(LoginInput::new("frank", "password123"))
            .await
            .expect("Login by username failed");
        assert!(!session.id.is_empty());

        let session = service
            .login(LoginInput::new("frank@example.com", "password123"))
            .await
            .expect("Login by email failed");
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup_service().await;
        service.register(register_input("grace")).await.unwrap();

        let result = service.login(LoginInput::new("grace", "wrongpassword")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let service = setup_service().await;
        let result = service.login(LoginInput::new("nobody", "password123")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_banned_user_cannot_login_or_keep_sessions() {
        let service = setup_service().await;
        let user = service.register(register_input("henry")).await.unwrap();

        let session = service
            .login(LoginInput::new("henry", "password123"))
            .await
            .unwrap();

        service
            .update(
                user.id,
                UpdateUserInput {
                    status: Some(UserStatus::Banned),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Existing sessions no longer validate
        let validated = service.validate_session(&session.id).await.unwrap();
        assert!(validated.is_none());

        // And a new login is refused
        let result = service.login(LoginInput::new("henry", "password123")).await;
        assert!(matches!(result, Err(UserServiceError::Banned)));
    }

    #[tokio::test]
    async fn test_validate_session_lifecycle() {
        let service = setup_service().await;
        service.register(register_input("iris")).await.unwrap();
        let session = service
            .login(LoginInput::new("iris", "password123"))
            .await
            .unwrap();

        let user = service
            .validate_session(&session.id)
            .await
            .unwrap()
            .expect("Session should validate");
        assert_eq!(user.username, "iris");

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            -1, // Sessions are born expired
        );

        service.register(register_input("jack")).await.unwrap();
        let session = service
            .login(LoginInput::new("jack", "password123"))
            .await
            .unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let service = setup_service().await;
        let user = service.register(register_input("kate")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UpdateUserInput {
                    email: Some("kate.new@example.com".to_string()),
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "kate.new@example.com");
        assert_eq!(updated.role, UserRole::Admin);

        service.delete(user.id).await.unwrap();
        assert!(service.get_by_id(user.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(user.id).await,
            Err(UserServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_is_first_user() {
        let service = setup_service().await;
        assert!(service.is_first_user().await.unwrap());

        service.register(register_input("liam")).await.unwrap();
        assert!(!service.is_first_user().await.unwrap());
    }
}
