//! Writer for the reactions vector `r`
use crate::data::reaction::ReactionRecord;
use crate::data::schema::validate_reactions;
use crate::script::matlab::{class_call, quote, REACTIONS_VAR};
use crate::script::ScriptError;

/// Define the reactions of the model
///
/// # Examples
/// ```rust
/// use incars_core::data::reaction::ReactionRecord;
/// use incars_core::script::reactions::define_reactions;
/// let text = define_reactions(&[ReactionRecord::new("r1", "A (C1:a) -> B (C1:a)")]).unwrap();
/// assert!(text.contains("reaction('A (C1:a) -> B (C1:a)', 'id', 'r1'),...\n"));
/// ```
pub fn define_reactions(reactions: &[ReactionRecord]) -> Result<String, ScriptError> {
    validate_reactions(reactions)?;
    let mut script = format!("% Create reactions\n{} = [...\n", REACTIONS_VAR);
    for reaction in reactions {
        let call = class_call(
            "reaction",
            Some(&quote(&reaction.rxn_eqn)),
            &[("id", quote(&reaction.rxn_id))],
        );
        script.push_str(&call);
        script.push_str(",...\n");
    }
    script.push_str("];\n");
    Ok(script)
}

#[cfg(test)]
mod reactions_tests {
    use super::*;

    #[test]
    fn two_reactions() {
        let reactions = vec![
            ReactionRecord::new("R1", "A (C1:a C2:b) -> B (C1:a C2:b)"),
            ReactionRecord::new("R2", "B <-> C"),
        ];
        let expected = "% Create reactions\nr = [...\n\
reaction('A (C1:a C2:b) -> B (C1:a C2:b)', 'id', 'R1'),...\n\
reaction('B <-> C', 'id', 'R2'),...\n\
];\n";
        assert_eq!(define_reactions(&reactions).unwrap(), expected);
    }

    #[test]
    fn invalid_equation_is_rejected() {
        let reactions = vec![ReactionRecord::new("R1", "A + B")];
        assert!(matches!(
            define_reactions(&reactions),
            Err(ScriptError::Schema(_))
        ));
    }
}
