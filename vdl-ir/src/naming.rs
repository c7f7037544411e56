//! Identifier case conversion.

use convert_case::{Case, Casing};

/// Convert to PascalCase: `in_progress` -> `InProgress`.
pub fn to_pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// Convert to camelCase: `UserId` -> `userId`.
pub fn to_camel(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// Convert to SCREAMING_SNAKE_CASE: `maxUsers` -> `MAX_USERS`.
pub fn to_screaming_snake(name: &str) -> String {
    name.to_case(Case::UpperSnake)
}

/// Stable name of an inline object: the parent name followed by the
/// PascalCase form of each field on the path.
pub fn synthesized_name<'a>(parent: &str, path: impl IntoIterator<Item = &'a str>) -> String {
    let mut name = parent.to_string();
    for segment in path {
        name.push_str(&to_pascal(segment));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_pascal("in_progress"), "InProgress");
        assert_eq!(to_pascal("ACTIVE"), "Active");
        assert_eq!(to_pascal("Admin"), "Admin");
        assert_eq!(to_camel("UserId"), "userId");
        assert_eq!(to_screaming_snake("maxUsers"), "MAX_USERS");
    }

    #[test]
    fn test_synthesized_name() {
        assert_eq!(synthesized_name("User", ["preferences"]), "UserPreferences");
        assert_eq!(
            synthesized_name("User", ["preferences", "notifications"]),
            "UserPreferencesNotifications"
        );
    }
}
