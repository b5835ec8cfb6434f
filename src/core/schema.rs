use crate::domain::model::Field;
use crate::domain::ports::FieldSource;
use email_address::{EmailAddress, Options};
use std::collections::BTreeMap;
use std::fmt;

pub const TOO_SHORT: &str = "too short";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const PASSWORD_TOO_SHORT: &str = "password must be atleast 8 characters";
pub const WRONG_PASSWORD: &str = "wrong password";

/// The password threshold is 0 although its message mentions 8 characters.
/// Kept permissive until a deployment opts into a real minimum.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Minimum length in UTF-16 code units, the unit browsers report.
    MinLength(usize),
    Email,
}

impl Check {
    fn passes(&self, value: &str) -> bool {
        match self {
            Check::MinLength(min) => value.encode_utf16().count() >= *min,
            Check::Email => is_plain_email(value),
        }
    }
}

/// RFC syntax plus the narrower shape users type into forms: no quoted
/// local part, no `[...]` address literal, no `Name <addr>` display form,
/// and a TLD of two or more letters.
fn is_plain_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) || value.contains('<') {
        return false;
    }

    let Ok(address) =
        EmailAddress::parse_with_options(value, Options::default().with_required_tld())
    else {
        return false;
    };

    let domain = address.domain();
    if address.local_part().starts_with('"') || domain.starts_with('[') {
        return false;
    }

    domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub field: Field,
    pub check: Check,
    pub message: String,
}

impl Rule {
    pub fn new(field: Field, check: Check, message: impl Into<String>) -> Self {
        Self {
            field,
            check,
            message: message.into(),
        }
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub(crate) fn set(&mut self, field: Field, message: Option<String>) {
        match message {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Ordered rule list, evaluated independently per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSchema {
    rules: Vec<Rule>,
}

impl ValidationSchema {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// 註冊表單：name / username / email / password
    pub fn sign_up() -> Self {
        Self::sign_up_with_password_min(DEFAULT_PASSWORD_MIN_LENGTH)
    }

    pub fn sign_up_with_password_min(password_min_length: usize) -> Self {
        Self::new(vec![
            Rule::new(Field::Name, Check::MinLength(2), TOO_SHORT),
            Rule::new(Field::Username, Check::MinLength(2), TOO_SHORT),
            Rule::new(Field::Email, Check::Email, INVALID_EMAIL),
            Rule::new(
                Field::Password,
                Check::MinLength(password_min_length),
                PASSWORD_TOO_SHORT,
            ),
        ])
    }

    /// 登入表單：email / password
    pub fn sign_in() -> Self {
        Self::new(vec![
            Rule::new(Field::Email, Check::Email, INVALID_EMAIL),
            Rule::new(
                Field::Password,
                Check::MinLength(DEFAULT_PASSWORD_MIN_LENGTH),
                WRONG_PASSWORD,
            ),
        ])
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        let mut seen = Vec::new();
        self.rules.iter().filter_map(move |rule| {
            if seen.contains(&rule.field) {
                None
            } else {
                seen.push(rule.field);
                Some(rule.field)
            }
        })
    }

    /// First failing rule for `field`, if any.
    pub fn validate_field(&self, field: Field, value: &str) -> Option<String> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find(|rule| !rule.check.passes(value))
            .map(|rule| rule.message.clone())
    }

    pub fn validate<S: FieldSource + ?Sized>(&self, input: &S) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        for field in self.fields() {
            // a schema field the input does not carry is checked as empty
            let value = input.value(field).unwrap_or("");
            errors.set(field, self.validate_field(field, value));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ValidationSchema {
    fn default() -> Self {
        Self::sign_up()
    }
}
