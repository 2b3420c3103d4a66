use async_trait::async_trait;
use chrono::Utc;
use session_backend::domain::{Role, User, UserPatch};
use session_backend::error::AppResult;
use session_backend::infrastructure::repositories::UserRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MockUserRepo {
    pub users: Mutex<Vec<User>>,
    lookups: AtomicUsize,
}

impl MockUserRepo {
    pub fn push(&self, user: User) {
        self.users.lock().expect("users mutex poisoned").push(user);
    }

    /// Number of store lookups observed, for cache hit assertions.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().expect("users mutex poisoned").len()
    }
}

#[async_trait]
impl UserRepository for MockUserRepo {
    async fn find_by_id_or_email(&self, identifier: &str) -> AppResult<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|user| user.id.to_string() == identifier || user.email == identifier)
            .cloned())
    }

    async fn upsert_by_email(&self, email: &str, patch: &UserPatch) -> AppResult<User> {
        let mut users = self.users.lock().expect("users mutex poisoned");

        if let Some(existing) = users.iter_mut().find(|user| user.email == email) {
            if let Some(hash) = &patch.password_hash {
                existing.password_hash = Some(hash.clone());
            }
            if let Some(provider) = patch.provider {
                existing.provider = Some(provider);
            }
            if let Some(roles) = &patch.roles {
                existing.roles = roles.clone();
            }
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: patch.password_hash.clone(),
            provider: patch.provider,
            roles: patch.roles.clone().unwrap_or_else(|| vec![Role::User]),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .expect("users mutex poisoned")
            .retain(|user| user.id != id);
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().expect("users mutex poisoned").clone())
    }
}
