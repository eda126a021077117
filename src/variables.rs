//! The fixed table of variable names shared by the parser and the solver.

/// The largest number of unknowns a system may have.
pub const MAX_VARIABLES: usize = 10;

/// Variable names, in the order their coefficients appear in an
/// [`Equation`](crate::Equation).
pub const VARIABLES: [&str; MAX_VARIABLES] =
    ["x", "y", "z", "w", "v", "u", "p", "q", "r", "s"];

/// Find the column a variable's coefficient is stored in.
pub fn index_of(name: &str) -> Option<usize> {
    VARIABLES.iter().position(|candidate| *candidate == name)
}

/// The name of the variable stored in a particular column.
pub fn name_of(index: usize) -> Option<&'static str> {
    VARIABLES.get(index).copied()
}

/// The variables used by a system with `num_variables` unknowns.
pub fn in_use(num_variables: usize) -> &'static [&'static str] {
    &VARIABLES[..num_variables.min(MAX_VARIABLES)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_symmetric() {
        for (i, name) in VARIABLES.iter().enumerate() {
            assert_eq!(index_of(name), Some(i));
            assert_eq!(name_of(i), Some(*name));
        }
    }

    #[test]
    fn unknown_names_have_no_column() {
        assert_eq!(index_of("a"), None);
        assert_eq!(index_of("xy"), None);
        assert_eq!(index_of(""), None);
        assert_eq!(name_of(MAX_VARIABLES), None);
    }

    #[test]
    fn only_the_first_few_variables_are_in_use() {
        assert_eq!(in_use(3), &["x", "y", "z"]);
        assert_eq!(in_use(42).len(), MAX_VARIABLES);
    }
}
