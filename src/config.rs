use crate::variables::MAX_VARIABLES;
use thiserror::Error;

/// The smallest system anyone is allowed to configure.
pub const MIN_VARIABLES: usize = 2;
pub const MIN_EQUATIONS: usize = 2;

/// How big a system of equations is.
///
/// Having fewer equations than variables is allowed here, the solver will
/// reject such a system when it's asked to solve it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    num_variables: usize,
    num_equations: usize,
}

impl SystemConfig {
    pub fn new(
        num_variables: usize,
        num_equations: usize,
    ) -> Result<Self, ConfigError> {
        check_num_variables(num_variables)?;
        if num_equations < MIN_EQUATIONS {
            return Err(ConfigError::TooFewEquations {
                requested: num_equations,
            });
        }

        Ok(SystemConfig {
            num_variables,
            num_equations,
        })
    }

    /// A system with as many equations as unknowns.
    pub fn square(size: usize) -> Result<Self, ConfigError> {
        SystemConfig::new(size, size)
    }

    pub fn num_variables(&self) -> usize { self.num_variables }

    pub fn num_equations(&self) -> usize { self.num_equations }
}

pub(crate) fn check_num_variables(
    num_variables: usize,
) -> Result<(), ConfigError> {
    if (MIN_VARIABLES..=MAX_VARIABLES).contains(&num_variables) {
        Ok(())
    } else {
        Err(ConfigError::VariablesOutOfRange {
            requested: num_variables,
        })
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            num_variables: MIN_VARIABLES,
            num_equations: MIN_EQUATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "a system needs between {} and {} variables, not {requested}",
        MIN_VARIABLES,
        MAX_VARIABLES
    )]
    VariablesOutOfRange { requested: usize },
    #[error("a system needs at least {} equations, not {requested}", MIN_EQUATIONS)]
    TooFewEquations { requested: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_two_by_two() {
        let config = SystemConfig::default();

        assert_eq!(config, SystemConfig::square(2).unwrap());
    }

    #[test]
    fn variable_count_is_bounded() {
        assert_eq!(
            SystemConfig::new(1, 2),
            Err(ConfigError::VariablesOutOfRange { requested: 1 })
        );
        assert_eq!(
            SystemConfig::new(11, 11),
            Err(ConfigError::VariablesOutOfRange { requested: 11 })
        );
        assert!(SystemConfig::square(10).is_ok());
    }

    #[test]
    fn fewer_equations_than_variables_is_still_a_valid_config() {
        let config = SystemConfig::new(3, 2).unwrap();

        assert_eq!(config.num_variables(), 3);
        assert_eq!(config.num_equations(), 2);
    }

    #[test]
    fn need_at_least_two_equations() {
        assert_eq!(
            SystemConfig::new(2, 1),
            Err(ConfigError::TooFewEquations { requested: 1 })
        );
    }
}
