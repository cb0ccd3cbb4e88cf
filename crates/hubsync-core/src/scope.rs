//! Deny-list classification of records
//!
//! The scope filter decides whether a record takes part in a sync pass at
//! all, keeping virtual, system and disabled entries out of matching.
//! Rules are external configuration ([`ScopeRules`], loaded from TOML)
//! injected at construction, so the lists can be edited without touching
//! code.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Record fields the scope filter inspects
///
/// Implemented by record types on either side of a sync. The defaults
/// suit records that carry nothing beyond a name.
pub trait ScopeFields {
    /// Display name of the record
    fn name(&self) -> &str;

    /// Manufacturer-equivalent metadata, if any
    fn manufacturer(&self) -> Option<&str> {
        None
    }

    /// Model-equivalent metadata, if any
    fn model(&self) -> Option<&str> {
        None
    }

    /// Whether the record carries an explicit disabled marker
    fn is_disabled(&self) -> bool {
        false
    }
}

/// Deny lists for scope classification
///
/// All lists default to empty, so a missing section in `rules.toml`
/// simply denies nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeRules {
    /// Case-insensitive regex patterns matched against the record name
    #[serde(default)]
    pub name_patterns: Vec<String>,
    /// Manufacturers excluded by exact match
    #[serde(default)]
    pub manufacturers: Vec<String>,
    /// Case-insensitive substrings excluded from the model field
    #[serde(default)]
    pub model_keywords: Vec<String>,
}

impl ScopeRules {
    /// Parse rules from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Compiled scope filter
///
/// Construction validates every name pattern; classification itself is
/// infallible and side-effect free.
#[derive(Debug)]
pub struct ScopeFilter {
    name_patterns: Vec<Regex>,
    manufacturers: Vec<String>,
    model_keywords: Vec<String>,
}

impl ScopeFilter {
    /// Compile a filter from deny rules
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a name pattern is not a valid
    /// regex.
    pub fn new(rules: &ScopeRules) -> Result<Self> {
        let mut name_patterns = Vec::with_capacity(rules.name_patterns.len());
        for pattern in &rules.name_patterns {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source: Box::new(source),
                })?;
            name_patterns.push(compiled);
        }

        Ok(Self {
            name_patterns,
            manufacturers: rules.manufacturers.clone(),
            model_keywords: rules
                .model_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .collect(),
        })
    }

    /// A filter with no deny rules
    ///
    /// Named and enabled records are always in scope.
    pub fn permit_all() -> Self {
        Self {
            name_patterns: Vec::new(),
            manufacturers: Vec::new(),
            model_keywords: Vec::new(),
        }
    }

    /// Decide whether a record takes part in the sync pass
    ///
    /// A pure function of the record fields and the injected rules. A
    /// record is out of scope when its name is empty, it is disabled, its
    /// name matches a deny pattern, its manufacturer is deny-listed, or
    /// its model contains a deny keyword.
    pub fn is_in_scope<R: ScopeFields>(&self, record: &R) -> bool {
        let name = record.name();
        if name.is_empty() || record.is_disabled() {
            return false;
        }

        if self.name_patterns.iter().any(|p| p.is_match(name)) {
            return false;
        }

        if let Some(manufacturer) = record.manufacturer()
            && self.manufacturers.iter().any(|m| m == manufacturer)
        {
            return false;
        }

        if let Some(model) = record.model() {
            let model = model.to_lowercase();
            if self.model_keywords.iter().any(|k| model.contains(k)) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Probe {
        name: &'static str,
        manufacturer: Option<&'static str>,
        model: Option<&'static str>,
        disabled: bool,
    }

    impl Probe {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                manufacturer: None,
                model: None,
                disabled: false,
            }
        }
    }

    impl ScopeFields for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn manufacturer(&self) -> Option<&str> {
            self.manufacturer
        }

        fn model(&self) -> Option<&str> {
            self.model
        }

        fn is_disabled(&self) -> bool {
            self.disabled
        }
    }

    fn filter(rules: ScopeRules) -> ScopeFilter {
        ScopeFilter::new(&rules).unwrap()
    }

    #[test]
    fn permit_all_accepts_named_records() {
        let filter = ScopeFilter::permit_all();
        assert!(filter.is_in_scope(&Probe::named("Desk Lamp")));
    }

    #[test]
    fn empty_name_is_out_of_scope() {
        let filter = ScopeFilter::permit_all();
        assert!(!filter.is_in_scope(&Probe::named("")));
    }

    #[test]
    fn disabled_record_is_out_of_scope() {
        let filter = ScopeFilter::permit_all();
        let probe = Probe {
            disabled: true,
            ..Probe::named("Desk Lamp")
        };
        assert!(!filter.is_in_scope(&probe));
    }

    #[rstest]
    #[case("Sun", false)]
    #[case("sun", false)]
    #[case("Sunroom Light", true)]
    #[case("Forecast", false)]
    fn name_patterns_are_case_insensitive_and_anchored(
        #[case] name: &'static str,
        #[case] in_scope: bool,
    ) {
        let filter = filter(ScopeRules {
            name_patterns: vec!["^Sun$".into(), "^Forecast$".into()],
            ..ScopeRules::default()
        });
        assert_eq!(filter.is_in_scope(&Probe::named(name)), in_scope);
    }

    #[test]
    fn manufacturer_matches_exactly() {
        let filter = filter(ScopeRules {
            manufacturers: vec!["piitaya".into()],
            ..ScopeRules::default()
        });

        let denied = Probe {
            manufacturer: Some("piitaya"),
            ..Probe::named("Mushroom Card")
        };
        let allowed = Probe {
            manufacturer: Some("Piitaya Industries"),
            ..Probe::named("Mushroom Card")
        };

        assert!(!filter.is_in_scope(&denied));
        assert!(filter.is_in_scope(&allowed));
    }

    #[test]
    fn model_keywords_match_substrings_case_insensitively() {
        let filter = filter(ScopeRules {
            model_keywords: vec!["plugin".into(), "theme".into()],
            ..ScopeRules::default()
        });

        let denied = Probe {
            model: Some("Lovelace Plugin v2"),
            ..Probe::named("Bubble Card")
        };
        let allowed = Probe {
            model: Some("Hue Bulb"),
            ..Probe::named("Bubble Card")
        };

        assert!(!filter.is_in_scope(&denied));
        assert!(filter.is_in_scope(&allowed));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_construction() {
        let rules = ScopeRules {
            name_patterns: vec!["([unclosed".into()],
            ..ScopeRules::default()
        };
        let result = ScopeFilter::new(&rules);
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn rules_parse_from_toml() {
        let rules = ScopeRules::parse(
            r#"
name_patterns = ["^Sun$", "iPhone"]
manufacturers = ["piitaya"]
model_keywords = ["integration"]
"#,
        )
        .unwrap();

        assert_eq!(rules.name_patterns.len(), 2);
        assert_eq!(rules.manufacturers, vec!["piitaya"]);
        assert_eq!(rules.model_keywords, vec!["integration"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let rules = ScopeRules::parse("name_patterns = [\"^Backup$\"]").unwrap();
        assert!(rules.manufacturers.is_empty());
        assert!(rules.model_keywords.is_empty());
    }

    #[test]
    fn rules_load_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "manufacturers = [\"piitaya\"]\n").unwrap();

        let rules = ScopeRules::load(&path).unwrap();
        assert_eq!(rules.manufacturers, vec!["piitaya"]);
    }

    #[test]
    fn missing_rules_file_is_an_io_error() {
        let result = ScopeRules::load(Path::new("/nonexistent/rules.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn classification_is_stable_for_same_input() {
        let filter = filter(ScopeRules {
            name_patterns: vec!["^HACS$".into()],
            ..ScopeRules::default()
        });
        let probe = Probe::named("HACS");

        let first = filter.is_in_scope(&probe);
        let second = filter.is_in_scope(&probe);
        assert_eq!(first, second);
    }
}
