//! Field rules shared by the use cases. Each check names the offending field.

use std::collections::HashSet;

use larder_domain::user::is_valid_username;

use crate::domain::types::IngredientAmount;
use crate::error::RecipesServiceError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const TAG_MAX_LEN: usize = 32;
pub const INGREDIENT_NAME_MAX_LEN: usize = 128;
pub const MEASUREMENT_UNIT_MAX_LEN: usize = 64;
pub const RECIPE_NAME_MAX_LEN: usize = 256;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 32_000;

type Result<T = ()> = std::result::Result<T, RecipesServiceError>;

/// Trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecipesServiceError::invalid(field, "this field may not be blank"));
    }
    if value.chars().count() > max {
        return Err(RecipesServiceError::invalid(
            field,
            format!("ensure this field has no more than {max} characters"),
        ));
    }
    Ok(value.to_owned())
}

pub fn username(value: &str) -> Result<String> {
    let value = required_text("username", value, USERNAME_MAX_LEN)?;
    if value == "me" {
        return Err(RecipesServiceError::invalid("username", "\"me\" is reserved"));
    }
    if !is_valid_username(&value) {
        return Err(RecipesServiceError::invalid(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(value)
}

pub fn email(value: &str) -> Result<String> {
    let value = required_text("email", value, EMAIL_MAX_LEN)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(RecipesServiceError::invalid("email", "enter a valid email address"));
    }
    Ok(value.to_lowercase())
}

pub fn password(field: &'static str, value: &str) -> Result {
    let len = value.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(RecipesServiceError::invalid(
            field,
            format!("must contain at least {PASSWORD_MIN_LEN} characters"),
        ));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(RecipesServiceError::invalid(
            field,
            format!("must contain at most {PASSWORD_MAX_LEN} characters"),
        ));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecipesServiceError::invalid(field, "must not be entirely numeric"));
    }
    Ok(())
}

pub fn slug(value: &str) -> Result<String> {
    let value = required_text("slug", value, TAG_MAX_LEN)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RecipesServiceError::invalid(
            "slug",
            "may contain only latin letters, digits, hyphens and underscores",
        ));
    }
    Ok(value)
}

pub fn cooking_time(value: i32) -> Result<i32> {
    if value < MIN_COOKING_TIME {
        return Err(RecipesServiceError::invalid(
            "cooking_time",
            format!("must be at least {MIN_COOKING_TIME}"),
        ));
    }
    Ok(value)
}

/// Non-empty, no repeated ids, every amount in range.
pub fn ingredient_amounts(items: &[IngredientAmount]) -> Result {
    if items.is_empty() {
        return Err(RecipesServiceError::invalid("ingredients", "this field is required"));
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.ingredient_id) {
            return Err(RecipesServiceError::invalid(
                "ingredients",
                format!("ingredient {} is listed more than once", item.ingredient_id),
            ));
        }
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(RecipesServiceError::invalid(
                "ingredients",
                format!("amount must be between {MIN_AMOUNT} and {MAX_AMOUNT}"),
            ));
        }
    }
    Ok(())
}

pub fn tag_ids(ids: &[i32]) -> Result {
    if ids.is_empty() {
        return Err(RecipesServiceError::invalid("tags", "this field is required"));
    }
    let unique: HashSet<_> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err(RecipesServiceError::invalid("tags", "tags must not repeat"));
    }
    Ok(())
}
