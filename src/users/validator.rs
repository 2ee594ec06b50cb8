use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::users::repo_types::User;

pub const MAX_FIELD_LEN: usize = 255;

const NOT_BLANK: &str = "This value should not be blank.";
const INVALID_EMAIL: &str = "This value is not a valid email address.";
const TOO_LONG: &str = "This value is too long. It should have 255 characters or less.";

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub property: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    fn push(&mut self, property: &'static str, message: &'static str) {
        self.0.push(Violation { property, message });
    }
}

/// One `property: message` line per violation.
impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", v.property, v.message)?;
        }
        Ok(())
    }
}

pub trait UserValidator: Send + Sync {
    fn validate(&self, user: &User) -> Violations;
}

/// Field constraints every stored user must satisfy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl UserValidator for ConstraintValidator {
    fn validate(&self, user: &User) -> Violations {
        let mut out = Violations::default();

        match non_blank(&user.name) {
            None => out.push("name", NOT_BLANK),
            Some(name) if name.chars().count() > MAX_FIELD_LEN => out.push("name", TOO_LONG),
            Some(_) => {}
        }

        match non_blank(&user.email) {
            None => out.push("email", NOT_BLANK),
            Some(email) => {
                if !is_valid_email(email) {
                    out.push("email", INVALID_EMAIL);
                }
                if email.chars().count() > MAX_FIELD_LEN {
                    out.push("email", TOO_LONG);
                }
            }
        }

        out
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
