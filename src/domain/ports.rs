use crate::domain::model::{AccountRecord, Field, RegistrationInput, SessionHandle, SignInInput};
use async_trait::async_trait;

/// Remote account service. Failures are reported as `None` / `false`, never as errors.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_account(&self, input: &RegistrationInput) -> Option<AccountRecord>;
    async fn sign_in(&self, credentials: &SignInInput) -> Option<SessionHandle>;
    async fn check_current_user(&self) -> bool;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn navigate(&self, route: &str) {
        (**self).navigate(route)
    }
}

/// Read access to form values by field, shared by every schema.
pub trait FieldSource {
    fn value(&self, field: Field) -> Option<&str>;
}

impl FieldSource for RegistrationInput {
    fn value(&self, field: Field) -> Option<&str> {
        Some(match field {
            Field::Name => &self.name,
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Password => &self.password,
        })
    }
}

impl FieldSource for SignInInput {
    fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::Email => Some(&self.email),
            Field::Password => Some(&self.password),
            Field::Name | Field::Username => None,
        }
    }
}
