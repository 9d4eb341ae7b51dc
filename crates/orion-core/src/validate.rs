//! Field validation rules for the location, login, profile and prediction forms.
//!
//! Each field check returns the first failing rule's message; form-level
//! checks collect one [`FieldError`] per failing field.

use std::sync::LazyLock;

use regex::Regex;

pub const MAX_NAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[a-z][\s\S]*>").expect("valid regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?://|www\.)\S+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Farm names are free text shown back to other pages, so markup and links
/// are refused outright.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn farm_name(name: &str) -> Result<(), FieldError> {
    const FIELD: &str = "farmName";
    if name.trim().is_empty() {
        return Err(FieldError::new(FIELD, "Farm name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new(
            FIELD,
            "Farm name must be less than 100 characters",
        ));
    }
    if SCRIPT_RE.is_match(name) {
        return Err(FieldError::new(FIELD, "Script tags are not allowed"));
    }
    if HTML_TAG_RE.is_match(name) {
        return Err(FieldError::new(FIELD, "HTML tags are not allowed"));
    }
    if URL_RE.is_match(name) {
        return Err(FieldError::new(FIELD, "URLs are not allowed"));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error when the text is empty, not a number, or outside `[-90, 90]`.
pub fn latitude_text(text: &str) -> Result<(), FieldError> {
    coordinate_text("latitude", "Latitude", text, 90.0)
}

/// # Errors
///
/// Returns an error when the text is empty, not a number, or outside `[-180, 180]`.
pub fn longitude_text(text: &str) -> Result<(), FieldError> {
    coordinate_text("longitude", "Longitude", text, 180.0)
}

fn coordinate_text(
    field: &'static str,
    label: &str,
    text: &str,
    bound: f64,
) -> Result<(), FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FieldError::new(field, format!("{label} is required")));
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && (-bound..=bound).contains(&v) => Ok(()),
        _ => Err(FieldError::new(
            field,
            format!("{label} must be between -{bound} and {bound}"),
        )),
    }
}

/// Validates the location dialog's three fields together.
///
/// # Errors
///
/// Returns every failing field.
pub fn location_form(name: &str, latitude: &str, longitude: &str) -> Result<(), Vec<FieldError>> {
    collect([
        farm_name(name),
        latitude_text(latitude),
        longitude_text(longitude),
    ])
}

/// # Errors
///
/// Returns every failing field.
pub fn login(email: &str, password: &str) -> Result<(), Vec<FieldError>> {
    let email_check = if is_plausible_email(email) {
        Ok(())
    } else {
        Err(FieldError::new("email", "Invalid email address"))
    };
    let password_check = if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ))
    };
    collect([email_check, password_check])
}

/// # Errors
///
/// Returns an error when the name is empty or longer than 100 characters.
pub fn profile_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::new("name", "Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new("name", "Name is too long"));
    }
    Ok(())
}

/// # Errors
///
/// Returns every failing field.
pub fn prediction_search(crop: &str, location_id: &str) -> Result<(), Vec<FieldError>> {
    let crop_check = if crop.is_empty() {
        Err(FieldError::new("crop", "Crop is required"))
    } else {
        Ok(())
    };
    let location_check = if location_id.is_empty() {
        Err(FieldError::new("location", "Location is required"))
    } else {
        Ok(())
    };
    collect([crop_check, location_check])
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn collect<const N: usize>(checks: [Result<(), FieldError>; N]) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
