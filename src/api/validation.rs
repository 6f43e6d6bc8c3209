use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Field name to messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 1000;

const MAX_RECIPE_NAME_LEN: usize = 200;
const MAX_USER_FIELD_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Collects per-field errors so every validator runs before the request
/// is rejected.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(msg) = result {
            self.add(field, msg);
        }
    }

    pub fn add(&mut self, field: &str, msg: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(msg.into());
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn validate_cooking_time(minutes: i32, min: i32, max: i32) -> Result<(), String> {
    if !(min..=max).contains(&minutes) {
        return Err(format!(
            "Cooking time must be between {min} and {max} minutes"
        ));
    }
    Ok(())
}

pub fn validate_amount(amount: i32) -> Result<(), String> {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(format!(
            "Amount must be between {MIN_AMOUNT} and {MAX_AMOUNT}"
        ));
    }
    Ok(())
}

pub fn validate_recipe_name(name: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if name.trim().is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }

    if name.chars().count() > MAX_RECIPE_NAME_LEN {
        return Err(format!(
            "Recipe name must be {MAX_RECIPE_NAME_LEN} characters or less"
        ));
    }

    if !get_regex(&RE, r"^[а-яА-ЯёЁa-zA-Z0-9 ]+$").is_match(name) {
        return Err("Recipe name can only contain letters, digits and spaces".to_string());
    }

    if name.chars().all(|c| c.is_ascii_digit() || c == ' ') {
        return Err("Recipe name cannot consist of digits only".to_string());
    }

    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Text cannot be empty".to_string());
    }
    Ok(())
}

/// Non-empty and free of repeated ids
pub fn validate_id_set(ids: &[i32], what: &str) -> Result<(), String> {
    if ids.is_empty() {
        return Err(format!("At least one {what} is required"));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(format!("{what} {id} is listed more than once"));
        }
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.chars().count() > MAX_USER_FIELD_LEN {
        return Err(format!(
            "Username must be {MAX_USER_FIELD_LEN} characters or less"
        ));
    }

    if !get_regex(&RE, r"^[\w.@+-]+$").is_match(username) {
        return Err(
            "Username can only contain letters, digits and the characters . @ + - _".to_string(),
        );
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be {MAX_EMAIL_LEN} characters or less"));
    }

    if !get_regex(&RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_match(email) {
        return Err("Enter a valid email address".to_string());
    }

    Ok(())
}

pub fn validate_person_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("This field cannot be empty".to_string());
    }

    if name.chars().count() > MAX_USER_FIELD_LEN {
        return Err(format!(
            "This field must be {MAX_USER_FIELD_LEN} characters or less"
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if slug.len() > 200 || !get_regex(&RE, r"^[-a-zA-Z0-9_]+$").is_match(slug) {
        return Err(format!("Invalid slug: '{slug}'"));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if !get_regex(&RE, r"^#[0-9A-Fa-f]{6}$").is_match(color) {
        return Err(format!("Invalid color: '{color}'. Expected #RRGGBB"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cooking_time() {
        assert!(validate_cooking_time(5, 5, 2880).is_ok());
        assert!(validate_cooking_time(2880, 5, 2880).is_ok());
        assert!(validate_cooking_time(4, 5, 2880).is_err());
        assert!(validate_cooking_time(2881, 5, 2880).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(1000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(1001).is_err());
    }

    #[test]
    fn test_validate_recipe_name() {
        assert!(validate_recipe_name("Pancakes").is_ok());
        assert!(validate_recipe_name("Блины с мёдом").is_ok());
        assert!(validate_recipe_name("Soup 2").is_ok());
        assert!(validate_recipe_name("").is_err());
        assert!(validate_recipe_name("   ").is_err());
        assert!(validate_recipe_name("12345").is_err());
        assert!(validate_recipe_name("Fish & Chips").is_err());
        assert!(validate_recipe_name(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_id_set() {
        assert!(validate_id_set(&[1, 2, 3], "tag").is_ok());
        assert!(validate_id_set(&[], "tag").is_err());
        assert!(validate_id_set(&[1, 2, 1], "tag").is_err());
    }

    #[test]
    fn test_validate_user_fields() {
        assert!(validate_username("chef.anna+1@home").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email("anna@example").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_person_name("Anna").is_ok());
        assert!(validate_person_name(" ").is_err());
    }

    #[test]
    fn test_validate_tag_fields() {
        assert!(validate_slug("breakfast_2-day").is_ok());
        assert!(validate_slug("no spaces").is_err());
        assert!(validate_color("#E26C2D").is_ok());
        assert!(validate_color("E26C2D").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validator_collects_all_fields() {
        let mut v = Validator::new();
        v.check("name", validate_recipe_name(""));
        v.check("cooking_time", validate_cooking_time(1, 5, 2880));
        v.check("text", validate_text("fine"));
        assert!(!v.is_valid());

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("cooking_time"));
    }
}
