//! Normalization and field rules for signup input.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{Error, Result};

/// Maximum avatar length in characters, URL or data URI.
pub const MAX_AVATAR_LEN: u64 = 500_000;

pub const REQUIRED_SIGNUP_FIELDS: &str = "Name, email, and password are required.";
pub const REQUIRED_LOGIN_FIELDS: &str = "Email and password are required.";
pub const INVALID_EMAIL: &str = "Please provide a valid email address.";
const INVALID_NAME: &str = "Name must be between 2 and 50 characters.";
const INVALID_PASSWORD: &str = "Password must be between 8 and 128 characters.";
const INVALID_AVATAR: &str =
    "Avatar must be an http(s) URL or a PNG, JPEG, or WEBP data URI under 500 KB.";

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

const AVATAR_DATA_URI_PREFIXES: [&str; 4] = [
    "data:image/png;base64,",
    "data:image/jpeg;base64,",
    "data:image/jpg;base64,",
    "data:image/webp;base64,",
];

/// Signup fields after trimming and case folding.
///
/// Rules are declared in the order their messages take precedence.
#[derive(Clone, Validate)]
pub(crate) struct NormalizedSignup {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters."))]
    pub name: String,

    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters."
    ))]
    pub password: String,

    #[validate(length(
        max = MAX_AVATAR_LEN,
        message = "Avatar must be an http(s) URL or a PNG, JPEG, or WEBP data URI under 500 KB."
    ))]
    #[validate(custom(function = "validate_avatar_format"))]
    pub avatar: Option<String>,
}

impl NormalizedSignup {
    /// Trims the name, trims and lowercases the email, and drops an empty avatar.
    /// The avatar is otherwise kept as sent.
    ///
    /// Fails when any required field is empty.
    pub fn new(
        name: &str,
        email: &str,
        password: String,
        avatar: Option<String>,
    ) -> Result<Self> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::validation(REQUIRED_SIGNUP_FIELDS));
        }

        let avatar = avatar.filter(|avatar| !avatar.is_empty());

        Ok(Self {
            name: name.trim().to_owned(),
            email: normalize_email(email),
            password,
            avatar,
        })
    }

    /// Checks the email shape; runs before the uniqueness lookup.
    pub fn check_email(&self) -> Result<()> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(Error::validation(INVALID_EMAIL))
        }
    }

    /// Checks the name, password and avatar rules, reporting the first failing
    /// field.
    pub fn check_fields(&self) -> Result<()> {
        self.validate().map_err(first_field_error)
    }
}

impl fmt::Debug for NormalizedSignup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedSignup")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("avatar", &self.avatar.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

/// Trims and lowercases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns whether `email` has a plausible `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

fn validate_avatar_format(avatar: &str) -> Result<(), ValidationError> {
    let accepted = avatar.starts_with("http")
        || AVATAR_DATA_URI_PREFIXES
            .iter()
            .any(|prefix| avatar.starts_with(prefix));

    if accepted {
        Ok(())
    } else {
        Err(ValidationError::new("avatar_format").with_message(Cow::Borrowed(INVALID_AVATAR)))
    }
}

fn first_field_error(errors: ValidationErrors) -> Error {
    let field_errors = errors.field_errors();

    let precedence = [
        ("name", INVALID_NAME),
        ("password", INVALID_PASSWORD),
        ("avatar", INVALID_AVATAR),
    ];

    for (field, default_message) in precedence {
        if let Some(error) = field_errors.get(field).and_then(|errors| errors.first()) {
            let message = error
                .message
                .clone()
                .unwrap_or(Cow::Borrowed(default_message));
            return Error::validation(message);
        }
    }

    Error::validation(REQUIRED_SIGNUP_FIELDS)
}
