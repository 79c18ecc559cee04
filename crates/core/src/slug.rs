//! Slug generation for games, account types and field definitions.

use crate::error::CoreError;

/// Maximum length of a display name.
pub const MAX_NAME_LEN: usize = 255;

/// Generate a URL-safe slug from a display name.
///
/// Lowercases, replaces anything that is not ASCII alphanumeric with a
/// hyphen, collapses runs of hyphens and trims them from both ends.
pub fn generate_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_hyphen = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_matches('-').to_string()
}

/// Use `explicit` when given, otherwise derive a slug from `name`.
pub fn slug_or_generate(explicit: Option<&str>, name: &str) -> Result<String, CoreError> {
    let slug = match explicit {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => generate_slug(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

/// Slug for an update: an explicit slug wins, a new name regenerates it,
/// and neither keeps the stored one (`None`).
pub fn updated_slug(explicit: Option<&str>, name: Option<&str>) -> Result<Option<String>, CoreError> {
    match (explicit, name) {
        (None, None) => Ok(None),
        (explicit, name) => slug_or_generate(explicit, name.unwrap_or("")).map(Some),
    }
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Slugs are non-empty lowercase alphanumerics and hyphens.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_slug_precedence() {
        assert_eq!(updated_slug(None, None).unwrap(), None);
        assert_eq!(updated_slug(None, Some("Dota 2")).unwrap().as_deref(), Some("dota-2"));
        assert_eq!(
            updated_slug(Some("dota"), Some("Dota 2")).unwrap().as_deref(),
            Some("dota")
        );
        assert!(updated_slug(Some("Bad Slug"), None).is_err());
    }

    #[test]
    fn slug_from_game_name() {
        assert_eq!(generate_slug("League of Legends"), "league-of-legends");
        assert_eq!(generate_slug("  Genshin Impact!! (EU) "), "genshin-impact-eu");
        assert_eq!(generate_slug("Pokémon GO"), "pok-mon-go");
        assert_eq!(generate_slug("---"), "");
    }

    #[test]
    fn explicit_slug_wins() {
        assert_eq!(slug_or_generate(Some("lol"), "League").unwrap(), "lol");
        assert_eq!(slug_or_generate(Some("  "), "Free Fire").unwrap(), "free-fire");
        assert_eq!(slug_or_generate(None, "Free Fire").unwrap(), "free-fire");
    }

    #[test]
    fn invalid_slugs_rejected() {
        assert!(slug_or_generate(Some("Bad Slug"), "x").is_err());
        assert!(slug_or_generate(None, "!!!").is_err());
        assert!(validate_slug("ok-123").is_ok());
    }

    #[test]
    fn name_length() {
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
