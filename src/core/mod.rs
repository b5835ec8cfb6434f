pub mod registration;
pub mod schema;

pub use crate::domain::model::{AccountRecord, Field, RegistrationInput, SessionHandle, SignInInput};
pub use crate::domain::ports::{AccountService, FieldSource, Navigator, Notifier};
pub use crate::utils::error::Result;
