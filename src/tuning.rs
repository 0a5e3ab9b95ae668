//! Tuning registry: maps a tuning identifier to a LilyPond string-tuning
//! declaration.

use serde::Serialize;

use crate::error::{Result, TabError};

/// Named tunings and their `\makeDefaultStringTuning` arguments.
pub const NAMED_TUNINGS: [(&str, &str); 6] = [
    ("standard", "#'standard \\stringTuning <e, a, d g b e'>"),
    ("drop-d", "#'drop-d \\stringTuning <d, a, d g b e'>"),
    ("open-g", "#'open-g \\stringTuning <d, g, d g b d'>"),
    ("dadgad", "#'dadgad \\stringTuning <d, a, d g a d'>"),
    (
        "guitar-cello-tuning",
        "#'guitar-cello-tuning \\stringTuning <c, g, d g a e'>",
    ),
    ("bouzouki", "#'bouzouki \\stringTuning <g, d a d'>"),
];

/// Length of a custom tuning identifier: one character per string.
pub const CUSTOM_TUNING_LEN: usize = 6;

/// A resolved tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tuning {
    /// Identifier the tuning was requested by
    pub name: String,
    /// Declaration text consumed by `\makeDefaultStringTuning`
    pub descriptor: String,
}

/// Resolve `identifier` to a tuning.
///
/// Named tunings win; otherwise any 6-character identifier is read as one
/// pitch letter per string, lowest string first. The letters are not
/// checked, so an unplayable tuning is only rejected by the renderer, but
/// path separators are refused.
pub fn lookup(identifier: &str) -> Result<Tuning> {
    if let Some((name, descriptor)) = NAMED_TUNINGS.iter().find(|(n, _)| *n == identifier) {
        return Ok(Tuning {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }

    // The identifier ends up in the output file name.
    let file_name_safe = !identifier.chars().any(|c| c == '\0' || std::path::is_separator(c));
    if identifier.chars().count() == CUSTOM_TUNING_LEN && file_name_safe {
        let strings: Vec<String> = identifier.chars().map(String::from).collect();
        return Ok(Tuning {
            name: identifier.to_string(),
            descriptor: format!("#'{identifier} \\stringTuning <{}>", strings.join(", ")),
        });
    }

    Err(TabError::UnrecognizedTuning(identifier.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tuning_descriptors() {
        let standard = lookup("standard").unwrap();
        assert_eq!(standard.name, "standard");
        assert_eq!(
            standard.descriptor,
            "#'standard \\stringTuning <e, a, d g b e'>"
        );

        for (name, descriptor) in NAMED_TUNINGS {
            assert_eq!(lookup(name).unwrap().descriptor, descriptor);
        }
    }

    #[test]
    fn custom_tuning_is_built_per_character() {
        let custom = lookup("abcdef").unwrap();
        assert_eq!(custom.name, "abcdef");
        assert_eq!(custom.descriptor, "#'abcdef \\stringTuning <a, b, c, d, e, f>");
    }

    #[test]
    fn custom_tuning_has_no_trailing_quote() {
        // Older output closed the chord with a stray typographic quote (’),
        // which LilyPond cannot parse.
        let custom = lookup("dgdgbd").unwrap();
        assert!(custom.descriptor.ends_with('>'));
        assert!(!custom.descriptor.contains('\u{2019}'));
    }

    #[test]
    fn custom_tuning_letters_are_not_validated() {
        assert!(lookup("xyz123").is_ok());
    }

    #[test]
    fn unknown_tunings_are_rejected() {
        for id in ["abc", "", "invalid_tuning", "abcdefg", "ab/cde", "/abcde", "abcd\0e"] {
            match lookup(id) {
                Err(TabError::UnrecognizedTuning(got)) => assert_eq!(got, id),
                other => panic!("expected UnrecognizedTuning for {id:?}, got {other:?}"),
            }
        }
    }
}
