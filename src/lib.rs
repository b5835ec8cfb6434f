pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::appwrite::AppwriteAccountService;
pub use core::registration::{FlowState, RegistrationFlow, Stage, SubmitOutcome};
pub use core::schema::{FieldErrors, ValidationSchema};
pub use domain::model::{AccountRecord, Field, RegistrationInput, SessionHandle, SignInInput};
pub use utils::error::{AuthError, Result};
