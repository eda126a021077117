use crate::{
    config::{ConfigError, SystemConfig},
    parse::{self, ParseError},
    solve::{self, Solution},
    variables::{self, MAX_VARIABLES},
};
use arrayvec::ArrayVec;
use nalgebra::DMatrix;
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A single linear equation, `a·x + b·y + ... = constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub(crate) coefficients: ArrayVec<[f64; MAX_VARIABLES]>,
    pub(crate) constant: f64,
    pub(crate) raw_text: SmolStr,
}

impl Equation {
    /// The placeholder used before the user has typed anything, where every
    /// coefficient and the constant are zero.
    pub fn empty(num_variables: usize) -> Self {
        Equation {
            coefficients: (0..num_variables.min(MAX_VARIABLES))
                .map(|_| 0.0)
                .collect(),
            constant: 0.0,
            raw_text: SmolStr::default(),
        }
    }

    /// Parse an equation for a system with `num_variables` unknowns.
    pub fn parse(text: &str, num_variables: usize) -> Result<Self, ParseError> {
        parse::parse(text, num_variables)
    }

    /// One coefficient per variable, in [`variables::VARIABLES`] order.
    pub fn coefficients(&self) -> &[f64] { &self.coefficients }

    pub fn constant(&self) -> f64 { self.constant }

    /// The text this equation was parsed from (empty for placeholders).
    pub fn raw_text(&self) -> &str { &self.raw_text }

    pub fn num_variables(&self) -> usize { self.coefficients.len() }

    /// Has this equation been filled in by a successful parse?
    pub fn is_entered(&self) -> bool { !self.raw_text.is_empty() }
}

/// Writes the equation in a canonical form (e.g. `2x - y = 7`) which parses
/// back to the same coefficients.
impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut wrote_a_term = false;

        for (i, &coefficient) in self.coefficients.iter().enumerate() {
            if coefficient == 0.0 {
                continue;
            }
            let name = variables::VARIABLES[i];

            let sign = match (wrote_a_term, coefficient < 0.0) {
                (false, false) => "",
                (false, true) => "-",
                (true, false) => " + ",
                (true, true) => " - ",
            };
            write!(f, "{}", sign)?;

            let magnitude = coefficient.abs();
            if magnitude == 1.0 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}{}", magnitude, name)?;
            }

            wrote_a_term = true;
        }

        if !wrote_a_term {
            // the left hand side can't be empty
            write!(f, "0{}", variables::VARIABLES[0])?;
        }

        write!(f, " = {}", self.constant)
    }
}

/// A fixed-size system of linear equations.
///
/// The system always holds exactly `num_equations` equations. They start
/// out [empty](Equation::empty) and get filled in one at a time with
/// [`LinearSystem::set_equation()`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    config: SystemConfig,
    equations: Vec<Equation>,
}

impl LinearSystem {
    pub fn new(config: SystemConfig) -> Self {
        LinearSystem {
            equations: empty_equations(config),
            config,
        }
    }

    /// A shortcut for creating a [`SystemConfig`] and then a [`LinearSystem`].
    pub fn with_size(
        num_variables: usize,
        num_equations: usize,
    ) -> Result<Self, ConfigError> {
        SystemConfig::new(num_variables, num_equations).map(LinearSystem::new)
    }

    /// Create a system with one equation per item in `equations`.
    pub fn from_equations<E, S>(
        num_variables: usize,
        equations: E,
    ) -> Result<Self, EntryError>
    where
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let equations = equations
            .into_iter()
            .map(|src| Equation::parse(src.as_ref(), num_variables))
            .collect::<Result<Vec<_>, _>>()?;

        let config = SystemConfig::new(num_variables, equations.len())?;

        Ok(LinearSystem { config, equations })
    }

    pub fn config(&self) -> SystemConfig { self.config }

    pub fn num_variables(&self) -> usize { self.config.num_variables() }

    pub fn num_equations(&self) -> usize { self.equations.len() }

    pub fn equations(&self) -> &[Equation] { &self.equations }

    pub fn equation(&self, index: usize) -> Option<&Equation> {
        self.equations.get(index)
    }

    /// Parse `text` and use it as the `index`'th equation.
    ///
    /// Nothing is changed if parsing fails.
    pub fn set_equation(
        &mut self,
        index: usize,
        text: &str,
    ) -> Result<&Equation, EntryError> {
        let num_equations = self.num_equations();
        let num_variables = self.num_variables();

        let slot = self.equations.get_mut(index).ok_or(
            EntryError::NoSuchEquation {
                index,
                num_equations,
            },
        )?;
        *slot = Equation::parse(text, num_variables)?;

        Ok(slot)
    }

    /// Change the size of the system, throwing away every equation entered
    /// so far.
    pub fn reconfigure(&mut self, config: SystemConfig) {
        self.config = config;
        self.equations = empty_equations(config);
    }

    /// Reset every equation back to its empty placeholder.
    pub fn clear(&mut self) { self.reconfigure(self.config); }

    /// Has every equation been entered?
    pub fn is_complete(&self) -> bool {
        self.equations.iter().all(Equation::is_entered)
    }

    /// Build a fresh augmented matrix (the coefficients with the constants
    /// appended as an extra column).
    pub fn augmented_matrix(&self) -> DMatrix<f64> {
        solve::augmented_matrix(&self.equations, self.num_variables())
    }

    pub fn solve(&self) -> Solution { solve::solve(self) }
}

fn empty_equations(config: SystemConfig) -> Vec<Equation> {
    (0..config.num_equations())
        .map(|_| Equation::empty(config.num_variables()))
        .collect()
}

impl<'a> IntoIterator for &'a LinearSystem {
    type IntoIter = <&'a [Equation] as IntoIterator>::IntoIter;
    type Item = &'a Equation;

    fn into_iter(self) -> Self::IntoIter { self.equations.iter() }
}

impl IntoIterator for LinearSystem {
    type IntoIter = <Vec<Equation> as IntoIterator>::IntoIter;
    type Item = Equation;

    fn into_iter(self) -> Self::IntoIter { self.equations.into_iter() }
}

/// Errors that may occur while filling in a system's equations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("there is no equation {index}, the system only has {num_equations}")]
    NoSuchEquation { index: usize, num_equations: usize },
    #[error("there is no variable {index}, the system only has {num_variables}")]
    NoSuchVariable { index: usize, num_variables: usize },
    #[error("{digit} isn't a decimal digit")]
    InvalidDigit { digit: u8 },
    #[error("unable to parse the equation")]
    Parse(#[from] ParseError),
    #[error("invalid system size")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_systems_are_full_of_empty_equations() {
        let system = LinearSystem::with_size(3, 4).unwrap();

        assert_eq!(system.num_equations(), 4);
        for equation in &system {
            assert_eq!(equation.coefficients(), &[0.0, 0.0, 0.0]);
            assert_eq!(equation.constant(), 0.0);
            assert!(!equation.is_entered());
        }
        assert!(!system.is_complete());
    }

    #[test]
    fn set_an_equation() {
        let mut system = LinearSystem::with_size(2, 2).unwrap();

        let got = system.set_equation(1, "2x + 3y = 7").unwrap();

        assert_eq!(got.coefficients(), &[2.0, 3.0]);
        assert_eq!(system.equation(1).unwrap().raw_text(), "2x + 3y = 7");
        assert!(!system.equation(0).unwrap().is_entered());
    }

    #[test]
    fn bad_input_leaves_previous_equations_alone() {
        let mut system = LinearSystem::with_size(2, 2).unwrap();
        system.set_equation(0, "x + y = 1").unwrap();
        let before = system.clone();

        let got = system.set_equation(0, "x + a = 1").unwrap_err();

        assert!(matches!(got, EntryError::Parse(_)));
        assert_eq!(system, before);
    }

    #[test]
    fn equation_index_is_checked() {
        let mut system = LinearSystem::with_size(2, 2).unwrap();

        let got = system.set_equation(2, "x = 1").unwrap_err();

        assert_eq!(
            got,
            EntryError::NoSuchEquation {
                index: 2,
                num_equations: 2
            }
        );
    }

    #[test]
    fn reconfiguring_discards_everything() {
        let mut system =
            LinearSystem::from_equations(2, &["x + y = 1", "x - y = 0"])
                .unwrap();
        assert!(system.is_complete());

        system.reconfigure(SystemConfig::square(3).unwrap());

        assert_eq!(system.num_variables(), 3);
        assert_eq!(system.num_equations(), 3);
        assert!(system.equations().iter().all(|eq| !eq.is_entered()));
    }

    #[test]
    fn augmented_matrix_has_the_constants_on_the_end() {
        let system =
            LinearSystem::from_equations(2, &["2x + 3y = 7", "x - y = 0"])
                .unwrap();

        let got = system.augmented_matrix();

        let should_be =
            DMatrix::from_row_slice(2, 3, &[2.0, 3.0, 7.0, 1.0, -1.0, 0.0]);
        assert_eq!(got, should_be);
    }

    #[test]
    fn from_equations_needs_two_equations() {
        let got = LinearSystem::from_equations(2, &["x = 1"]).unwrap_err();

        assert_eq!(
            got,
            EntryError::Config(ConfigError::TooFewEquations { requested: 1 })
        );
    }

    macro_rules! display_test {
        ($name:ident, $src:expr, $num_variables:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let equation = Equation::parse($src, $num_variables).unwrap();

                let got = equation.to_string();

                assert_eq!(got, $should_be);
            }
        };
    }

    display_test!(display_simple, "2x + 3y = 7", 2, "2x + 3y = 7");
    display_test!(display_unit_coefficients, "1x - 1y = 0", 2, "x - y = 0");
    display_test!(display_negative_first_term, "-2x+y=-1", 2, "-2x + y = -1");
    display_test!(display_accumulated, "x + x = 2", 2, "2x = 2");
    display_test!(display_skips_zero_terms, "x + 0y + z = 1", 3, "x + z = 1");
    display_test!(display_all_zero, "x - x = 5", 2, "0x = 5");
    display_test!(display_decimals, "1.5x - 0.5y = 0.25", 2, "1.5x - 0.5y = 0.25");

    #[test]
    fn reconstructed_text_parses_to_the_same_equation() {
        let inputs = [
            ("2x + 3y = 7", 2),
            ("x - y = 0", 2),
            ("1.5x - 0.5y + 2z = 10", 3),
            ("x + x = 2", 2),
            ("-x + 2*y - 3z + x = -4.5", 3),
            ("1e-5x + 2.5e3y = 1e-3", 2),
            ("x + 2y + 3z + 4w + 5v + 6u + 7p + 8q + 9r + 10s = 55", 10),
            ("y - y = 3", 2),
        ];

        for &(src, num_variables) in inputs.iter() {
            let original = Equation::parse(src, num_variables).unwrap();

            let text = original.to_string();
            let round_tripped = Equation::parse(&text, num_variables).unwrap();

            assert_eq!(
                round_tripped.coefficients(),
                original.coefficients(),
                "{} => {}",
                src,
                text
            );
            assert_eq!(round_tripped.constant(), original.constant());
        }
    }
}
