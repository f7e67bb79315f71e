//! Element counting arithmetic on molecular formulas such as `C6H12O6`
//!
//! Only flat formulas are supported: an uppercase letter starts an element symbol, which may be
//! followed by lowercase letters and then by an optional count. Brackets, charges and isotope
//! labels are not part of the grammar.
use indexmap::IndexMap;
use thiserror::Error;

/// Element symbol to atom count, in order of first appearance
pub type ElementCounts = IndexMap<String, u32>;

/// Parse a molecular formula into element counts
///
/// # Examples
/// ```rust
/// use incars_core::utils::formula::parse_formula;
/// let counts = parse_formula("C6H12O6").unwrap();
/// assert_eq!(counts["H"], 12);
/// ```
pub fn parse_formula(formula: &str) -> Result<ElementCounts, FormulaError> {
    let mut counts = ElementCounts::new();
    let chars: Vec<char> = formula.chars().collect();
    let mut current = 0;
    while current < chars.len() {
        let start = current;
        if !chars[current].is_ascii_uppercase() {
            return Err(FormulaError::Format(token_at(&chars, start)));
        }
        current += 1;
        while current < chars.len() && chars[current].is_ascii_lowercase() {
            current += 1;
        }
        let element: String = chars[start..current].iter().collect();
        let digits_start = current;
        while current < chars.len() && chars[current].is_ascii_digit() {
            current += 1;
        }
        let count = if digits_start == current {
            1
        } else {
            let digits: String = chars[digits_start..current].iter().collect();
            digits
                .parse::<u32>()
                .map_err(|_| FormulaError::Format(token_at(&chars, start)))?
        };
        *counts.entry(element).or_insert(0) += count;
    }
    Ok(counts)
}

/// Render element counts back into a formula string
///
/// Elements with a zero count are left out and a count of one is written without a numeral.
pub fn render_formula(counts: &ElementCounts) -> String {
    let mut formula = String::new();
    for (element, count) in counts {
        match count {
            0 => continue,
            1 => formula.push_str(element),
            n => formula.push_str(&format!("{}{}", element, n)),
        }
    }
    formula
}

/// Subtract `subtracted` from `formula` element by element
///
/// Every element of `subtracted` has to be present in `formula`, and no count may drop below zero.
pub fn subtract_formula(formula: &str, subtracted: &str) -> Result<String, FormulaError> {
    let mut counts = parse_formula(formula)?;
    let to_remove = parse_formula(subtracted)?;
    if let Some(missing) = to_remove.keys().find(|element| !counts.contains_key(*element)) {
        return Err(FormulaError::Domain(format!(
            "subtracted formula contains elements not in original ({} in {})",
            missing, formula
        )));
    }
    for (element, count) in to_remove {
        let available = counts[&element];
        if count > available {
            return Err(FormulaError::Domain(format!(
                "cannot remove {} {} from {}, only {} present",
                count, element, formula, available
            )));
        }
        counts[&element] = available - count;
    }
    Ok(render_formula(&counts))
}

/// Formula of the atoms in a fragment that do not carry label
///
/// The labelled positions are all treated as carbon, so `labelled_atom_ids` is turned into
/// `C<n>` before it is subtracted from `molecular_formula`. The element at each position is not
/// checked.
pub fn unlabelled_atoms(
    molecular_formula: &str,
    labelled_atom_ids: &[i64],
) -> Result<String, FormulaError> {
    let mut labelled = ElementCounts::new();
    labelled.insert("C".to_string(), labelled_atom_ids.len() as u32);
    subtract_formula(molecular_formula, &render_formula(&labelled))
}

fn token_at(chars: &[char], start: usize) -> String {
    let mut end = start + 1;
    while end < chars.len() && !chars[end].is_ascii_uppercase() {
        end += 1;
    }
    chars[start..end.min(chars.len())].iter().collect()
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Unable to parse formula token '{0}'")]
    Format(String),
    #[error("{0}")]
    Domain(String),
}

#[cfg(test)]
mod formula_tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_with_counts() {
        let counts = parse_formula("C6H12O6").unwrap();
        let expected: Vec<(&str, u32)> = vec![("C", 6), ("H", 12), ("O", 6)];
        let found: Vec<(&str, u32)> = counts.iter().map(|(e, c)| (e.as_str(), *c)).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn parse_without_count() {
        let counts = parse_formula("C6HO6").unwrap();
        assert_eq!(counts["H"], 1);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn parse_two_letter_elements() {
        let counts = parse_formula("C2H6OSi2").unwrap();
        assert_eq!(counts["Si"], 2);
        assert_eq!(counts["O"], 1);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(parse_formula("6CH"), Err(FormulaError::Format(_))));
        assert!(matches!(parse_formula("C6-H"), Err(FormulaError::Format(_))));
    }

    #[test]
    fn render_skips_zero_and_one() {
        let mut counts = ElementCounts::new();
        counts.insert("C".to_string(), 6);
        counts.insert("H".to_string(), 1);
        counts.insert("N".to_string(), 0);
        counts.insert("O".to_string(), 6);
        assert_eq!(render_formula(&counts), "C6HO6");
    }

    #[test]
    fn subtract() {
        assert_eq!(subtract_formula("C6H12O6", "C3H6O3").unwrap(), "C3H6O3");
        assert_eq!(subtract_formula("C6H12O6", "C6").unwrap(), "H12O6");
    }

    #[test]
    fn subtract_element_not_present() {
        let err = subtract_formula("C6H12O6", "C3H6O3Si").unwrap_err();
        assert!(matches!(err, FormulaError::Domain(_)));
        assert!(err.to_string().contains("not in original"));
    }

    #[test]
    fn subtract_more_than_present() {
        assert!(matches!(
            subtract_formula("C2H6O", "C3"),
            Err(FormulaError::Domain(_))
        ));
    }

    #[test]
    fn unlabelled_atoms_counts_labelled_positions_as_carbon() {
        assert_eq!(unlabelled_atoms("C11H26NO2Si2", &[1, 2, 3]).unwrap(), "C8H26NO2Si2");
    }

    proptest! {
        #[test]
        fn render_parse_round_trip(counts in proptest::collection::vec(1u32..40, 1..5)) {
            let symbols = ["C", "H", "N", "O", "Si"];
            let mut original = ElementCounts::new();
            for (symbol, count) in symbols.iter().zip(counts) {
                original.insert(symbol.to_string(), count);
            }
            let rendered = render_formula(&original);
            let parsed = parse_formula(&rendered).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
