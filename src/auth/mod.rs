//! Caller identity and role checks.
//!
//! Sign-in exchanges a username and password for a bearer token. Handlers
//! declare the identity they need through the extractors in [`guards`], which
//! run before the handler body.

pub mod guards;
pub mod password;
mod token;

pub use guards::{AuthUser, RequireSuperAdmin};
pub use token::{Claims, TokenKeys};

use chrono::Utc;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::storage::models::{Role, UserRecord};
use crate::storage::{Database, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Password error: {0}")]
    Password(#[from] password::PasswordError),
    #[error("Failed to encode token: {0}")]
    Token(jsonwebtoken::errors::Error),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Reject callers whose role is below `required`.
pub fn require_role(claims: &Claims, required: Role) -> Result<(), AuthError> {
    if claims.role < required {
        return Err(AuthError::Forbidden(format!(
            "{} access required",
            match required {
                Role::SuperAdmin => "Super admin",
                Role::User => "User",
            }
        )));
    }
    Ok(())
}

/// Look up a user and check their password.
pub fn authenticate(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<UserRecord, AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = db
        .get_user_by_username(username)?
        .ok_or(AuthError::InvalidCredentials)?;

    password::verify_password(password, &user.password_hash)
        .map_err(|_| AuthError::InvalidCredentials)?;

    Ok(user)
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Role,
}

pub fn register_user(db: &Database, new_user: NewUser) -> Result<UserRecord, AuthError> {
    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(AuthError::Validation("username is required".to_string()));
    }

    let password_hash = password::hash_password(&new_user.password)?;

    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: new_user
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
        password_hash,
        role: new_user.role,
        created_at: Utc::now(),
    };

    if !db.create_user(&user)? {
        return Err(AuthError::UsernameTaken(user.username));
    }

    tracing::info!(user_id = %user.id, username = %user.username, role = user.role.as_str(), "Registered user");
    Ok(user)
}

/// Create the configured super admin when no users exist yet.
/// Returns `true` if an account was created.
pub fn seed_super_admin(db: &Database, config: &AuthConfig) -> Result<bool, AuthError> {
    let (Some(username), Some(password)) =
        (&config.superadmin_username, &config.superadmin_password)
    else {
        return Ok(false);
    };

    if db.count_users()? > 0 {
        return Ok(false);
    }

    register_user(
        db,
        NewUser {
            username: username.clone(),
            password: password.clone(),
            email: None,
            role: Role::SuperAdmin,
        },
    )?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("data")).unwrap();
        (dir, db)
    }

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "u".to_string(),
            username: "u".to_string(),
            role,
            iat: 0,
            exp: 0,
            jti: String::new(),
        }
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "password123".to_string(),
            email: Some("emily@example.com".to_string()),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&claims(Role::SuperAdmin), Role::SuperAdmin).is_ok());
        assert!(require_role(&claims(Role::SuperAdmin), Role::User).is_ok());
        assert!(require_role(&claims(Role::User), Role::User).is_ok());
        assert!(matches!(
            require_role(&claims(Role::User), Role::SuperAdmin),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_register_and_authenticate() {
        let (_dir, db) = test_db();
        let user = register_user(&db, new_user("emily", Role::User)).unwrap();
        assert_eq!(user.email.as_deref(), Some("emily@example.com"));

        let signed_in = authenticate(&db, "emily", "password123").unwrap();
        assert_eq!(signed_in.id, user.id);

        assert!(matches!(
            authenticate(&db, "emily", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "nobody", "password123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_duplicate_username() {
        let (_dir, db) = test_db();
        register_user(&db, new_user("emily", Role::User)).unwrap();
        assert!(matches!(
            register_user(&db, new_user("emily", Role::User)),
            Err(AuthError::UsernameTaken(_))
        ));
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn test_seed_super_admin_only_when_empty() {
        let (_dir, db) = test_db();
        let config = AuthConfig {
            jwt_secret: "x".repeat(32),
            superadmin_username: Some("root".to_string()),
            superadmin_password: Some("password123".to_string()),
            ..Default::default()
        };

        assert!(seed_super_admin(&db, &config).unwrap());
        assert!(!seed_super_admin(&db, &config).unwrap());

        let root = db.get_user_by_username("root").unwrap().unwrap();
        assert_eq!(root.role, Role::SuperAdmin);
    }

    #[test]
    fn test_seed_skipped_without_credentials() {
        let (_dir, db) = test_db();
        assert!(!seed_super_admin(&db, &AuthConfig::default()).unwrap());
        assert_eq!(db.count_users().unwrap(), 0);
    }
}
