//! Project name and color rules.
//!
//! # Invariants
//! - Stored project names are trimmed, non-empty, at most
//!   `MAX_PROJECT_NAME_CHARS` characters and free of control characters.
//! - Generated colors are always `#rrggbb`.

use crate::model::task::ValidationError;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

pub const MAX_PROJECT_NAME_CHARS: usize = 64;

static CSS_CLASS_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid class separator regex"));
static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid hex regex")
});
static FUNCTIONAL_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:rgba?|hsla?)\(\s*[0-9.]+%?\s*(?:,\s*[0-9.]+%?\s*){2,3}\)$")
        .expect("valid functional color regex")
});

/// Returns the trimmed project name when it is acceptable.
pub fn validate_project_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_PROJECT_NAME_CHARS
        || trimmed.chars().any(char::is_control)
    {
        return Err(ValidationError::InvalidProjectName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Lowercase class token safe to use as a CSS selector.
///
/// `"Side Projects!"` becomes `"side-projects"`. Names with no ASCII
/// alphanumerics map to `"project"`.
pub fn css_class_for(name: &str) -> String {
    let lowered = name.to_lowercase();
    let token = CSS_CLASS_SEPARATOR_RE.replace_all(&lowered, "-");
    let token = token.trim_matches('-');
    if token.is_empty() {
        "project".to_string()
    } else {
        token.to_string()
    }
}

/// Returns the trimmed color when it is a hex or rgb/hsl functional color.
pub fn validate_color(color: &str) -> Result<String, ValidationError> {
    let trimmed = color.trim();
    if HEX_COLOR_RE.is_match(trimmed) || FUNCTIONAL_COLOR_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

/// Random `#rrggbb` color for a new project.
pub fn random_color() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    format!("#{value:06x}")
}

/// Stable color for projects that never had one stored.
pub fn fallback_color(name: &str) -> String {
    // FNV-1a keeps the hue stable across runs and platforms.
    let hash = name.bytes().fold(0x811c_9dc5_u32, |acc, byte| {
        (acc ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    format!("hsl({}, 65%, 55%)", hash % 360)
}

#[cfg(test)]
mod tests {
    use super::{
        css_class_for, fallback_color, random_color, validate_color, validate_project_name,
    };

    #[test]
    fn project_names_are_trimmed_and_bounded() {
        assert_eq!(validate_project_name("  Home ").unwrap(), "Home");
        assert!(validate_project_name("   ").is_err());
        assert!(validate_project_name("tab\tname").is_err());
        assert!(validate_project_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn css_class_collapses_unsafe_characters() {
        assert_eq!(css_class_for("Work"), "work");
        assert_eq!(css_class_for("Side Projects!"), "side-projects");
        assert_eq!(css_class_for("<script>"), "script");
        assert_eq!(css_class_for("日本"), "project");
    }

    #[test]
    fn color_forms() {
        assert!(validate_color("#abc").is_ok());
        assert!(validate_color("#A1B2C3").is_ok());
        assert!(validate_color("#a1b2c3d4").is_ok());
        assert!(validate_color("hsla(120, 50%, 40%, 0.5)").is_ok());
        assert!(validate_color("rgb(1, 2, 3)").is_ok());
        assert!(validate_color("red; background: url(x)").is_err());
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn random_color_is_zero_padded_hex() {
        for _ in 0..64 {
            let color = random_color();
            assert_eq!(color.len(), 7);
            assert!(validate_color(&color).is_ok());
        }
    }

    #[test]
    fn fallback_color_is_deterministic() {
        assert_eq!(fallback_color("Work"), fallback_color("Work"));
        assert!(validate_color(&fallback_color("Personal")).is_ok());
    }
}
