use super::{FieldErrors, RawSubmission, REQUIRED};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// A registration that passed the stateless checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

pub fn validate_registration(raw: &RawSubmission, min_password_length: usize) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = raw.get("username").map(|v| v.trim()).unwrap_or("").to_string();
    let password1 = raw.get("password1").cloned().unwrap_or_default();
    let password2 = raw.get("password2").cloned().unwrap_or_default();

    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else {
        if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this value has at most {} characters (it has {}).", USERNAME_MAX_LEN, username.chars().count()),
            );
        }
        if !username.chars().all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c)) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
    }

    if password1.is_empty() {
        errors.add("password1", REQUIRED);
    }
    if password2.is_empty() {
        errors.add("password2", REQUIRED);
    }

    if !password1.is_empty() && !password2.is_empty() {
        if password1 != password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        } else {
            if password1.chars().count() < min_password_length {
                errors.add(
                    "password2",
                    format!(
                        "This password is too short. It must contain at least {} characters.",
                        min_password_length
                    ),
                );
            }
            if password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            }
        }
    }

    errors.into_result(|| Registration {
        username,
        password: password1,
    })
}
