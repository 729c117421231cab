use std::sync::Arc;

use crate::domain::ports::{AuthApi, SessionStore};
use crate::domain::session::{Credentials, PasswordReset, Registration, Session};
use crate::errors::ApiError;

/// Login, registration and password recovery. A successful login or
/// registration persists the session (token + profile); logout clears it.
pub struct AuthWorkflow<G, S> {
    gateway: Arc<G>,
    store: S,
}

impl<G, S> AuthWorkflow<G, S>
where
    G: AuthApi,
    S: SessionStore,
{
    pub fn new(gateway: Arc<G>, store: S) -> Self {
        AuthWorkflow { gateway, store }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let session = self.gateway.login(credentials).await?;
        self.store.save(&session).await?;
        log::info!("Logged in as {}", session.user.email);
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
        let session = self.gateway.register(registration).await?;
        self.store.save(&session).await?;
        log::info!("Registered {}", session.user.email);
        Ok(session)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.gateway.forgot_password(email).await
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<(), ApiError> {
        self.gateway.reset_password(reset).await
    }

    /// The session a previous run persisted, if any.
    pub async fn current_session(&self) -> Result<Option<Session>, ApiError> {
        self.store.load().await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::session::UserProfile;
    use crate::errors::FieldError;

    fn session(email: &str) -> Session {
        Session {
            token: "tok-123".to_string(),
            user: UserProfile {
                id: Uuid::new_v4(),
                name: "Dana".to_string(),
                email: email.to_string(),
                is_admin: false,
                created_at: Utc::now(),
            },
        }
    }

    struct FakeAuthApi {
        outcome: Result<Session, String>,
        validation: Option<Vec<FieldError>>,
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn login(&self, _credentials: &Credentials) -> Result<Session, ApiError> {
            match (&self.outcome, &self.validation) {
                (_, Some(fields)) => Err(ApiError::Validation {
                    message: "The given data was invalid.".to_string(),
                    fields: fields.clone(),
                }),
                (Ok(s), _) => Ok(s.clone()),
                (Err(msg), _) => Err(ApiError::Server(msg.clone())),
            }
        }

        async fn register(&self, _registration: &Registration) -> Result<Session, ApiError> {
            self.login(&Credentials {
                email: String::new(),
                password: String::new(),
            })
            .await
        }

        async fn forgot_password(&self, _email: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn reset_password(&self, _reset: &PasswordReset) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySessionStore {
        session: StdMutex<Option<Session>>,
    }

    #[async_trait]
    impl SessionStore for Arc<MemorySessionStore> {
        async fn save(&self, session: &Session) -> Result<(), ApiError> {
            *self.session.lock().expect("lock") = Some(session.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<Session>, ApiError> {
            Ok(self.session.lock().expect("lock").clone())
        }

        async fn clear(&self) -> Result<(), ApiError> {
            *self.session.lock().expect("lock") = None;
            Ok(())
        }
    }

    fn creds() -> Credentials {
        Credentials {
            email: "dana@example.test".to_string(),
            password: "hunter2!".to_string(),
        }
    }

    #[tokio::test]
    async fn login_persists_the_session() {
        let store = Arc::new(MemorySessionStore::default());
        let workflow = AuthWorkflow::new(
            Arc::new(FakeAuthApi {
                outcome: Ok(session("dana@example.test")),
                validation: None,
            }),
            Arc::clone(&store),
        );

        let session = workflow.login(&creds()).await.expect("login");

        assert_eq!(session.token, "tok-123");
        let saved = store.session.lock().expect("lock").clone();
        assert_eq!(saved.map(|s| s.user.email), Some("dana@example.test".to_string()));
    }

    #[tokio::test]
    async fn failed_login_persists_nothing() {
        let store = Arc::new(MemorySessionStore::default());
        let workflow = AuthWorkflow::new(
            Arc::new(FakeAuthApi {
                outcome: Err("Invalid credentials".to_string()),
                validation: None,
            }),
            Arc::clone(&store),
        );

        let err = workflow.login(&creds()).await.expect_err("login fails");

        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(store.session.lock().expect("lock").is_none());
    }

    #[tokio::test]
    async fn validation_errors_surface_field_names() {
        let store = Arc::new(MemorySessionStore::default());
        let workflow = AuthWorkflow::new(
            Arc::new(FakeAuthApi {
                outcome: Err(String::new()),
                validation: Some(vec![FieldError {
                    field: "password".to_string(),
                    message: "The password must be at least 8 characters.".to_string(),
                }]),
            }),
            store,
        );

        let err = workflow.login(&creds()).await.expect_err("login fails");

        match err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields[0].field, "password");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn logout_clears_the_persisted_session() {
        let store = Arc::new(MemorySessionStore::default());
        let workflow = AuthWorkflow::new(
            Arc::new(FakeAuthApi {
                outcome: Ok(session("dana@example.test")),
                validation: None,
            }),
            Arc::clone(&store),
        );

        workflow.login(&creds()).await.expect("login");
        workflow.logout().await.expect("logout");

        assert!(workflow.current_session().await.expect("load").is_none());
    }
}
