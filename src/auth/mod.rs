use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Coarse permission level carried by every authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

/// The authenticated caller, as far as the engine cares: a stable id, an
/// address for notifications and a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this caller may operate on a resource owned by `owner_id`.
    /// Admins may act on anything.
    pub fn can_act_for(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

/// Turns a bearer token into an [`Identity`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<Identity>;
}

/// In-process token table. Real deployments would sit a JWT verifier or an
/// auth service behind [`IdentityProvider`]; this keeps development and
/// tests self-contained.
#[derive(Default)]
pub struct TokenDirectory {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl TokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.write().await.insert(token.into(), identity);
    }
}

#[async_trait]
impl IdentityProvider for TokenDirectory {
    async fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.read().await.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn someone(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), "someone@example.com", role)
    }

    #[test]
    fn admins_act_for_anyone() {
        let admin = someone(Role::Admin);
        assert!(admin.can_act_for(Uuid::new_v4()));
        assert!(admin.can_act_for(admin.user_id));
    }

    #[test]
    fn users_act_only_for_themselves() {
        let user = someone(Role::User);
        assert!(user.can_act_for(user.user_id));
        assert!(!user.can_act_for(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn directory_resolves_registered_tokens_only() {
        let directory = TokenDirectory::new();
        let identity = someone(Role::User);
        directory.register("secret-token", identity.clone()).await;

        assert_eq!(directory.resolve("secret-token").await, Some(identity));
        assert_eq!(directory.resolve("other-token").await, None);
    }
}
