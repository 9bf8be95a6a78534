//! Folder-name cleaning rules
//!
//! A [`RenameRules`] value is the user's recipe for turning a messy imported
//! folder name into a clean one: strip fixed-length prefixes/suffixes, cut
//! around marker strings, drop digits or special characters, swap
//! underscores for spaces, title-case the result. Rules are pure string
//! transforms; conflict handling happens later in the resolver.
//!
//! Rule sets can be saved to and loaded from JSON preset files.

use crate::core::error::{CleanupError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// User-configurable renaming rules, applied in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenameRules {
    /// Drop this many characters from the start of the name
    pub remove_first: usize,

    /// Drop this many characters from the end of the name
    pub remove_last: usize,

    /// Drop everything up to and including the first occurrence of this marker
    pub cut_before: String,

    /// Drop everything from the first occurrence of this marker onwards
    pub cut_after: String,

    /// Drop all digits
    pub remove_digits: bool,

    /// Drop special characters (keeps letters, digits, underscores,
    /// whitespace and hyphens)
    pub remove_special: bool,

    /// Replace underscores with spaces
    pub replace_underscores: bool,

    /// Title Case The Result
    pub title_case: bool,
}

impl Default for RenameRules {
    fn default() -> Self {
        Self {
            remove_first: 0,
            remove_last: 0,
            cut_before: String::new(),
            cut_after: String::new(),
            remove_digits: false,
            remove_special: false,
            replace_underscores: true,
            title_case: true,
        }
    }
}

impl RenameRules {
    /// Apply the rules to a name.
    ///
    /// Whitespace is always collapsed and trimmed at the end. The result may
    /// be empty if the rules consume the entire name; callers keep the
    /// original name in that case.
    pub fn apply(&self, name: &str) -> String {
        let mut cleaned: String = name.to_string();

        if self.remove_first > 0 {
            cleaned = cleaned.chars().skip(self.remove_first).collect();
        }

        if self.remove_last > 0 {
            let count = cleaned.chars().count();
            cleaned = cleaned
                .chars()
                .take(count.saturating_sub(self.remove_last))
                .collect();
        }

        if !self.cut_before.is_empty() {
            if let Some(pos) = cleaned.find(&self.cut_before) {
                cleaned = cleaned[pos + self.cut_before.len()..].to_string();
            }
        }

        if !self.cut_after.is_empty() {
            if let Some(pos) = cleaned.find(&self.cut_after) {
                cleaned.truncate(pos);
            }
        }

        if self.remove_digits {
            cleaned.retain(|c| !c.is_numeric());
        }

        if self.remove_special {
            cleaned.retain(|c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace());
        }

        if self.replace_underscores {
            cleaned = cleaned.replace('_', " ");
        }

        if self.title_case {
            cleaned = title_case(&cleaned);
        }

        // Collapse runs of whitespace and trim the edges
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Load a rule preset from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| CleanupError::InvalidInput(format!("Bad rules preset: {}", e)))
    }

    /// Save this rule set as a JSON preset file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CleanupError::IoError(format!("Failed to serialize rules: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Uppercase the first letter of each whitespace-separated word, lowercase
/// the rest.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_tidy_underscores_and_case() {
        let rules = RenameRules::default();
        assert_eq!(rules.apply("my_holiday_VIDEOS"), "My Holiday Videos");
    }

    #[test]
    fn test_remove_first_and_last() {
        let rules = RenameRules {
            remove_first: 3,
            remove_last: 2,
            title_case: false,
            replace_underscores: false,
            ..Default::default()
        };
        assert_eq!(rules.apply("01-Trip-HD"), "Trip-");
    }

    #[test]
    fn test_remove_last_longer_than_name_yields_empty() {
        let rules = RenameRules {
            remove_last: 50,
            ..Default::default()
        };
        assert_eq!(rules.apply("short"), "");
    }

    #[test]
    fn test_cut_around_markers() {
        let rules = RenameRules {
            cut_before: "] ".to_string(),
            cut_after: " - ".to_string(),
            title_case: false,
            ..Default::default()
        };
        assert_eq!(rules.apply("[site] Concert - 1080p"), "Concert");
    }

    #[test]
    fn test_remove_digits_and_special() {
        let rules = RenameRules {
            remove_digits: true,
            remove_special: true,
            replace_underscores: false,
            title_case: false,
            ..Default::default()
        };
        assert_eq!(rules.apply("Trip #42 (final)!"), "Trip final");
    }

    #[test]
    fn test_whitespace_always_collapsed() {
        let rules = RenameRules {
            title_case: false,
            ..Default::default()
        };
        assert_eq!(rules.apply("  a   b _ c  "), "a b c");
    }

    #[test]
    fn test_preset_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");

        let rules = RenameRules {
            remove_first: 4,
            cut_after: "-".to_string(),
            remove_digits: true,
            ..Default::default()
        };
        rules.save_json(&path).unwrap();

        let loaded = RenameRules::load_json(&path).unwrap();
        assert_eq!(loaded, rules);
    }

    #[test]
    fn test_preset_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(RenameRules::load_json(&path).is_err());
    }
}
