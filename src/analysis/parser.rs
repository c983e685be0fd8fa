use crate::models::{PartCatalog, PartType};

/// Blade, ratchet and bit keys recovered from a combo string.
///
/// All three fields are empty when the combo could not be split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParsedBuild {
    pub blade: String,
    pub ratchet: String,
    pub bit: String,
}

impl ParsedBuild {
    pub fn unknown() -> Self {
        ParsedBuild::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.blade.is_empty() && self.ratchet.is_empty() && self.bit.is_empty()
    }

    pub fn key(&self, part_type: PartType) -> &str {
        match part_type {
            PartType::Blade => &self.blade,
            PartType::Ratchet => &self.ratchet,
            PartType::Bit => &self.bit,
        }
    }

    /// Canonical "<blade> <ratchet><bit>" form, independent of how the
    /// source combo was spaced.
    pub fn build_string(&self) -> String {
        format!("{} {}{}", self.blade, self.ratchet, self.bit)
    }
}

/// Splits combo strings like "Dran Sword 3-60F" using the known bit shortcuts.
///
/// There is no delimiter between ratchet and bit, so the bit is found by
/// suffix match, longest key first.
#[derive(Debug, Clone)]
pub struct BuildParser {
    bit_keys: Vec<String>,
}

impl BuildParser {
    pub fn new<I, S>(bit_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bit_keys: Vec<String> = bit_keys
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        // stable: equal lengths keep their input order
        bit_keys.sort_by(|a, b| b.len().cmp(&a.len()));
        BuildParser { bit_keys }
    }

    pub fn from_catalog(catalog: &PartCatalog) -> Self {
        BuildParser::new(catalog.bit.keys().cloned())
    }

    pub fn bit_keys(&self) -> &[String] {
        &self.bit_keys
    }

    pub fn parse(&self, combo: &str) -> ParsedBuild {
        let Some(bit) = self.bit_keys.iter().find(|bit| combo.ends_with(bit.as_str())) else {
            return ParsedBuild::unknown();
        };

        let without_bit = combo[..combo.len() - bit.len()].trim();
        // only the last space separates blade from ratchet; blade names may contain spaces
        match without_bit.rfind(' ') {
            Some(idx) => ParsedBuild {
                blade: without_bit[..idx].trim().to_string(),
                ratchet: without_bit[idx + 1..].trim().to_string(),
                bit: bit.clone(),
            },
            None => ParsedBuild::unknown(),
        }
    }
}

/// One-shot form of [`BuildParser::parse`].
pub fn parse_build(combo: &str, bit_keys: &[&str]) -> ParsedBuild {
    BuildParser::new(bit_keys.iter().copied()).parse(combo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_bit_wins() {
        let parsed = parse_build("Blade RatchetAB", &["B", "AB"]);
        assert_eq!(parsed.bit, "AB");
        assert_eq!(parsed.ratchet, "Ratchet");
        assert_eq!(parsed.blade, "Blade");
    }

    #[test]
    fn test_multi_word_blade() {
        let parsed = parse_build("Dran Sword 3-60F", &["F", "N"]);
        assert_eq!(
            parsed,
            ParsedBuild {
                blade: "Dran Sword".into(),
                ratchet: "3-60".into(),
                bit: "F".into(),
            }
        );
    }

    #[test]
    fn test_three_word_blade_keeps_inner_spaces() {
        let parsed = parse_build("Shark Edge  Prime 1-60LF", &["F", "LF"]);
        assert_eq!(parsed.blade, "Shark Edge  Prime");
        assert_eq!(parsed.ratchet, "1-60");
        assert_eq!(parsed.bit, "LF");
    }

    #[test]
    fn test_unknown_bit_suffix() {
        let parsed = parse_build("Dran Sword 3-60X", &["F", "N"]);
        assert!(parsed.is_unknown());
    }

    #[test]
    fn test_no_space_before_ratchet() {
        assert!(parse_build("3-60F", &["F"]).is_unknown());
        assert!(parse_build("DranSword3-60F", &["F"]).is_unknown());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse_build("", &["F"]).is_unknown());
        assert!(parse_build("Dran Sword 3-60F", &[]).is_unknown());
        assert!(parse_build("Dran Sword 3-60F", &[""]).is_unknown());
    }

    #[test]
    fn test_non_ascii_combo_does_not_panic() {
        let parsed = parse_build("Drän Swörd 3-60F", &["F", "ö"]);
        assert_eq!(parsed.blade, "Drän Swörd");
        assert!(parse_build("ö", &["F"]).is_unknown());
    }

    #[test]
    fn test_build_string_is_canonical() {
        let parsed = parse_build("Dran Sword   3-60F", &["F"]);
        assert_eq!(parsed.build_string(), "Dran Sword 3-60F");
        assert_eq!(parsed.key(PartType::Ratchet), "3-60");
    }

    #[test]
    fn test_sorted_keys_longest_first() {
        let parser = BuildParser::new(["F", "LF", "GF", "H"]);
        assert_eq!(parser.bit_keys(), &["LF", "GF", "F", "H"]);
    }
}
