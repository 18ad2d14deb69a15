use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Input validation utilities for identity service

// These patterns are hardcoded and always valid, so expect() cannot fire
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{3,30}$")
        .expect("hardcoded username regex is invalid - fix source code")
});

static USERNAME_STRIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_]").expect("hardcoded strip regex is invalid - fix source code")
});

/// Longest base kept when deriving a username, leaving room for a suffix
pub const DERIVED_USERNAME_MAX: usize = 23;

/// Validate username format (3-30 characters, alphanumeric and `_`)
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// validator crate compatible custom validator for username shape
pub fn validate_username_shape_validator(username: &str) -> Result<(), ValidationError> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Username candidate taken from an email's local-part
///
/// `alice@example.com` gives `alice`; `j.doe+news@x.io` gives `j_doe_news`.
/// Characters outside `[A-Za-z0-9_]` are replaced and short results padded
/// so the candidate always satisfies [`validate_username`].
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut base = USERNAME_STRIP.replace_all(local, "_").to_string();
    base.truncate(DERIVED_USERNAME_MAX);

    match base.len() {
        0 => "user".to_string(),
        1 | 2 => format!("{base}_user"),
        _ => base,
    }
}
