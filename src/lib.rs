//! Parse hand-typed linear equations (`2x + 3y = 7`) and solve systems of
//! them using Gauss-Jordan elimination.
//!
//! ```rust
//! use linear_equations::{LinearSystem, Solution};
//!
//! let system =
//!     LinearSystem::from_equations(2, &["x + y = 3", "x - y = 1"]).unwrap();
//!
//! assert_eq!(system.solve(), Solution::Unique(vec![2.0, 1.0]));
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod config;
pub mod entry;
mod equations;
mod parse;
mod solve;
pub mod variables;

pub use config::{ConfigError, SystemConfig};
pub use equations::{EntryError, Equation, LinearSystem};
pub use parse::{parse, ParseError, TokenKind};
pub use solve::{solve, solve_text, Solution, EPSILON};
