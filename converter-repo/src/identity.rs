//! In-memory identity provider.
//!
//! Credentials are held as salted SHA-256 hashes. One session is active at a
//! time, matching a single signed-in device. User ids are name-based UUIDs of
//! the normalized email, so a provider rebuilt from the same credential list
//! hands out the same ids and stored records stay attributable.

use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use converter_types::{AuthError, IdentityProvider, UserId};

use crate::security::{generate_salt, hash_password, verify_password};

/// Namespace for user ids derived from email addresses.
const USER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b9e_4d3a_5e8f_9a71_c0de_5a1e_ca11);

struct Credential {
    user_id: UserId,
    salt: String,
    password_hash: String,
}

/// Identity provider over a registered credential list.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    users: DashMap<String, Credential>,
    session: RwLock<Option<UserId>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with the given `(email, password)` pairs registered.
    pub fn with_users<'a>(users: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let provider = Self::new();
        for (email, password) in users {
            provider.register(email, password);
        }
        provider
    }

    /// Registers (or replaces) a user and returns their id.
    ///
    /// The id depends only on the normalized email.
    pub fn register(&self, email: &str, password: &str) -> UserId {
        let email = normalize_email(email);
        let user_id = user_id_for(&email);
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);

        self.users.insert(
            email,
            Credential {
                user_id: user_id.clone(),
                salt,
                password_hash,
            },
        );
        debug!(user_id = %user_id, "Registered user");
        user_id
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn set_session(&self, user_id: Option<UserId>) {
        match self.session.write() {
            Ok(mut guard) => *guard = user_id,
            Err(poisoned) => *poisoned.into_inner() = user_id,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_id_for(normalized_email: &str) -> UserId {
    UserId::new(Uuid::new_v5(&USER_ID_NAMESPACE, normalized_email.as_bytes()).to_string())
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let user_id = {
            let credential = self
                .users
                .get(&normalize_email(email))
                .ok_or(AuthError::InvalidCredentials)?;

            if !verify_password(password, &credential.salt, &credential.password_hash) {
                return Err(AuthError::InvalidCredentials);
            }
            credential.user_id.clone()
        };

        self.set_session(Some(user_id.clone()));
        info!(user_id = %user_id, "Session started");
        Ok(user_id)
    }

    fn current_user(&self) -> Option<UserId> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn sign_out(&self) {
        self.set_session(None);
    }
}
