use crate::{
    config::{self, ConfigError},
    equations::{Equation, LinearSystem},
    parse::ParseError,
    variables,
};
use log::{debug, trace};
use nalgebra::DMatrix as Matrix;
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// Anything with a magnitude smaller than this is treated as zero.
pub const EPSILON: f64 = 1e-9;

/// The result of trying to solve a system of equations.
///
/// Only [`Solution::ParseError`] and [`Solution::InternalError`] indicate
/// something went wrong, every other variant is a legitimate answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// Exactly one solution, with a value for each variable.
    Unique(Vec<f64>),
    /// The equations contradict each other.
    NoSolution,
    /// The equations don't pin down every variable.
    InfiniteSolutions,
    /// There are fewer equations than unknowns, so we didn't even try.
    RejectedTooFewEquations {
        num_equations: usize,
        num_variables: usize,
    },
    /// One of the equations couldn't be parsed.
    ParseError { text: SmolStr, error: ParseError },
    /// The number of unknowns is outside what a system may have.
    InvalidSize(ConfigError),
    /// The solver ended up in a state that should be impossible.
    InternalError(String),
}

impl Solution {
    pub fn is_unique(&self) -> bool {
        match self {
            Solution::Unique(_) => true,
            _ => false,
        }
    }

    /// The value of each variable, if there is exactly one solution.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            Solution::Unique(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// Does this represent a failure, as opposed to a classification of the
    /// system?
    pub fn is_error(&self) -> bool {
        match self {
            Solution::ParseError { .. }
            | Solution::InvalidSize(_)
            | Solution::InternalError(_) => true,
            _ => false,
        }
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Unique(values) => {
                for (i, (name, value)) in
                    variables::VARIABLES.iter().zip(values).enumerate()
                {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {:.4}", name, value)?;
                }
                Ok(())
            },
            Solution::NoSolution => {
                write!(f, "No solution, the equations are inconsistent")
            },
            Solution::InfiniteSolutions => {
                write!(f, "Infinitely many solutions")
            },
            Solution::RejectedTooFewEquations {
                num_equations,
                num_variables,
            } => write!(
                f,
                "{} equations aren't enough to solve for {} unknowns",
                num_equations, num_variables
            ),
            Solution::ParseError { text, error } => {
                write!(f, "Unable to parse \"{}\": {}", text, error)
            },
            Solution::InvalidSize(e) => write!(f, "Invalid system: {}", e),
            Solution::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Parse each equation and solve the resulting system.
///
/// `num_variables` must be in the range a [`SystemConfig`] accepts.
///
/// [`SystemConfig`]: crate::SystemConfig
pub fn solve_text<E, S>(equations: E, num_variables: usize) -> Solution
where
    E: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Err(e) = config::check_num_variables(num_variables) {
        return Solution::InvalidSize(e);
    }

    let mut parsed = Vec::new();

    for src in equations {
        let src = src.as_ref();

        match Equation::parse(src, num_variables) {
            Ok(equation) => parsed.push(equation),
            Err(error) => {
                return Solution::ParseError {
                    text: src.into(),
                    error,
                }
            },
        }
    }

    classify(&parsed, num_variables)
}

/// Solve a system of linear equations using Gauss-Jordan elimination with
/// partial pivoting.
///
/// The system is only read from, all the work happens on a copy of its
/// augmented matrix.
pub fn solve(system: &LinearSystem) -> Solution {
    classify(system.equations(), system.num_variables())
}

fn classify(equations: &[Equation], num_variables: usize) -> Solution {
    let num_equations = equations.len();

    if num_equations < num_variables {
        debug!(
            "Rejecting a system with {} equations and {} unknowns",
            num_equations, num_variables
        );
        return Solution::RejectedTooFewEquations {
            num_equations,
            num_variables,
        };
    }

    let wrong_size = equations
        .iter()
        .find(|eq| eq.num_variables() != num_variables);
    if let Some(bad) = wrong_size {
        return Solution::InternalError(format!(
            "\"{}\" has {} coefficients but the system has {} unknowns",
            bad.raw_text(),
            bad.num_variables(),
            num_variables
        ));
    }

    let mut matrix = augmented_matrix(equations, num_variables);
    let solution = gauss_jordan(&mut matrix, num_variables);
    debug!(
        "Solved a {}x{} system: {:?}",
        num_equations, num_variables, solution
    );

    solution
}

pub(crate) fn augmented_matrix(
    equations: &[Equation],
    num_variables: usize,
) -> Matrix<f64> {
    Matrix::from_fn(equations.len(), num_variables + 1, |row, col| {
        let equation = &equations[row];

        if col == num_variables {
            equation.constant()
        } else {
            equation.coefficients()[col]
        }
    })
}

fn is_zero(value: f64) -> bool { value.abs() < EPSILON }

fn gauss_jordan(matrix: &mut Matrix<f64>, num_variables: usize) -> Solution {
    forward_eliminate(matrix, num_variables);
    trace!("After forward elimination: {}", matrix);

    if has_inconsistent_row(matrix, num_variables) {
        return Solution::NoSolution;
    }

    reduce(matrix, num_variables);
    trace!("After reduction: {}", matrix);

    let rank = rank(matrix, num_variables);

    if rank < num_variables {
        Solution::InfiniteSolutions
    } else if rank == num_variables {
        let constants = num_variables;
        Solution::Unique(
            (0..num_variables).map(|row| matrix[(row, constants)]).collect(),
        )
    } else {
        Solution::InternalError(format!(
            "the rank ({}) is larger than the number of unknowns ({})",
            rank, num_variables
        ))
    }
}

/// Get the matrix into row-echelon form.
///
/// Each coefficient column gets the largest remaining candidate swapped into
/// the pivot position before the rows below it are eliminated. A column with
/// no usable pivot is skipped without using up a row, so rows of all-zero
/// coefficients always end up at the bottom.
fn forward_eliminate(matrix: &mut Matrix<f64>, num_variables: usize) {
    let rows = matrix.nrows();
    let columns = matrix.ncols();
    let mut pivot_row = 0;

    for col in 0..num_variables {
        if pivot_row >= rows {
            break;
        }

        // on a tie the earliest row wins
        let max_row = (pivot_row + 1..rows).fold(pivot_row, |best, row| {
            if matrix[(row, col)].abs() > matrix[(best, col)].abs() {
                row
            } else {
                best
            }
        });

        if is_zero(matrix[(max_row, col)]) {
            debug!("Column {} has no usable pivot", col);
            continue;
        }

        matrix.swap_rows(pivot_row, max_row);
        let pivot = matrix[(pivot_row, col)];

        for k in pivot_row + 1..rows {
            let factor = matrix[(k, col)] / pivot;
            if factor == 0.0 {
                continue;
            }

            matrix[(k, col)] = 0.0;
            for j in col + 1..columns {
                matrix[(k, j)] -= factor * matrix[(pivot_row, j)];
            }
        }

        pivot_row += 1;
    }
}

/// Look for a `0 = c` row where `c` isn't zero.
fn has_inconsistent_row(matrix: &Matrix<f64>, num_variables: usize) -> bool {
    matrix.row_iter().any(|row| {
        row.iter().take(num_variables).all(|&value| is_zero(value))
            && !is_zero(row[num_variables])
    })
}

/// The column holding a row's first non-zero coefficient.
fn pivot_column(
    matrix: &Matrix<f64>,
    row: usize,
    num_variables: usize,
) -> Option<usize> {
    (0..num_variables).find(|&col| !is_zero(matrix[(row, col)]))
}

/// Work from the bottom up, normalising each row's pivot to `1` and then
/// clearing that column from every other row.
fn reduce(matrix: &mut Matrix<f64>, num_variables: usize) {
    let rows = matrix.nrows();
    let columns = matrix.ncols();

    for row in (0..rows).rev() {
        let pivot_col = match pivot_column(matrix, row, num_variables) {
            Some(col) => col,
            None => continue,
        };

        let pivot = matrix[(row, pivot_col)];
        for j in 0..columns {
            matrix[(row, j)] /= pivot;
        }
        matrix[(row, pivot_col)] = 1.0;

        for other in (0..rows).filter(|&r| r != row) {
            let factor = matrix[(other, pivot_col)];
            if factor == 0.0 {
                continue;
            }

            for j in 0..columns {
                matrix[(other, j)] -= factor * matrix[(row, j)];
            }
            matrix[(other, pivot_col)] = 0.0;
        }
    }
}

fn rank(matrix: &Matrix<f64>, num_variables: usize) -> usize {
    (0..matrix.nrows())
        .filter(|&row| pivot_column(matrix, row, num_variables).is_some())
        .count()
}
