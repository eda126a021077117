//! Typing equations in one key at a time, the way the calculator's keypad
//! does it.
//!
//! This sits on top of the parser and solver and has no effect on how an
//! equation is interpreted, it just builds up the text.

use crate::{
    config::SystemConfig,
    equations::{EntryError, LinearSystem},
    solve::Solution,
    variables,
};
use log::{debug, warn};

/// Which half of the equation is currently being typed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// The left hand side, where coefficients and variables go.
    Coefficient,
    /// Everything after the `=`.
    Constant,
}

/// A single key on the keypad.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// A digit from `0` to `9`.
    Digit(u8),
    Point,
    /// The variable at this index in [`variables::VARIABLES`].
    Variable(usize),
    Plus,
    Minus,
    Times,
    Equals,
}

/// An in-progress system of equations being entered one key at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySession {
    system: LinearSystem,
    current: usize,
    buffer: String,
    mode: InputMode,
    result: Option<Solution>,
}

impl EntrySession {
    pub fn new(config: SystemConfig) -> Self {
        EntrySession {
            system: LinearSystem::new(config),
            current: 0,
            buffer: String::new(),
            mode: InputMode::Coefficient,
            result: None,
        }
    }

    pub fn system(&self) -> &LinearSystem { &self.system }

    /// The text typed so far for the current equation.
    pub fn buffer(&self) -> &str { &self.buffer }

    pub fn mode(&self) -> InputMode { self.mode }

    /// The index of the equation currently being typed.
    pub fn current_equation(&self) -> usize { self.current }

    /// The result of the last call to [`EntrySession::solve()`].
    pub fn result(&self) -> Option<&Solution> { self.result.as_ref() }

    pub fn press(&mut self, key: Key) -> Result<(), EntryError> {
        match key {
            Key::Digit(digit) => {
                let c = std::char::from_digit(u32::from(digit), 10)
                    .ok_or(EntryError::InvalidDigit { digit })?;
                self.buffer.push(c);
            },
            Key::Point => self.buffer.push('.'),
            Key::Variable(index) => {
                let num_variables = self.system.num_variables();
                let name = variables::name_of(index)
                    .filter(|_| index < num_variables)
                    .ok_or(EntryError::NoSuchVariable {
                        index,
                        num_variables,
                    })?;

                self.buffer.push_str(name);
                self.mode = InputMode::Coefficient;
            },
            Key::Plus => self.buffer.push_str(" + "),
            Key::Minus => self.buffer.push_str(" - "),
            Key::Times => self.buffer.push('*'),
            Key::Equals => {
                self.buffer.push_str(" = ");
                self.mode = InputMode::Constant;
            },
        }

        Ok(())
    }

    /// Type a whole string, as if each character was a key press.
    ///
    /// Characters with no key are copied into the buffer as-is, and so is a
    /// sign straight after an exponent marker (the `-` in `1e-5`).
    pub fn type_str(&mut self, text: &str) -> Result<(), EntryError> {
        for c in text.chars() {
            if (c == '+' || c == '-') && self.ends_with_exponent_marker() {
                self.buffer.push(c);
                continue;
            }

            let key = match c {
                '0'..='9' => Key::Digit(c as u8 - b'0'),
                '.' => Key::Point,
                '+' => Key::Plus,
                '-' => Key::Minus,
                '*' => Key::Times,
                '=' => Key::Equals,
                c if c.is_whitespace() => continue,
                other => {
                    let mut utf8 = [0; 4];
                    match variables::index_of(other.encode_utf8(&mut utf8)) {
                        Some(index) => Key::Variable(index),
                        None => {
                            // let the parser complain about it
                            self.buffer.push(other);
                            continue;
                        },
                    }
                },
            };

            self.press(key)?;
        }

        Ok(())
    }

    /// Does the buffer end in something like `1e` or `2.5E`?
    fn ends_with_exponent_marker(&self) -> bool {
        let mut chars = self.buffer.chars().rev();

        match (chars.next(), chars.next()) {
            (Some('e'), Some(c)) | (Some('E'), Some(c)) => {
                c.is_ascii_digit() || c == '.'
            },
            _ => false,
        }
    }

    /// Accept the current equation and move on to the next one.
    ///
    /// A blank buffer is ignored. If the text can't be parsed it stays in the
    /// buffer so it can be corrected, and the equations entered so far are
    /// left untouched.
    pub fn enter(&mut self) -> Result<(), EntryError> {
        if self.buffer.trim().is_empty() {
            return Ok(());
        }

        match self.system.set_equation(self.current, &self.buffer) {
            Ok(equation) => {
                debug!("Accepted equation {}: {}", self.current, equation);
            },
            Err(e) => {
                warn!("Rejected \"{}\": {}", self.buffer, e);
                return Err(e);
            },
        }

        if self.current + 1 < self.system.num_equations() {
            self.current += 1;
        }
        self.clear();

        Ok(())
    }

    /// Throw away whatever has been typed for the current equation.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.mode = InputMode::Coefficient;
    }

    /// Start again from scratch, keeping the same system size.
    pub fn clear_all(&mut self) { self.reconfigure(self.system.config()); }

    /// Change the size of the system. This throws away every equation.
    pub fn reconfigure(&mut self, config: SystemConfig) {
        self.system.reconfigure(config);
        self.current = 0;
        self.result = None;
        self.clear();
    }

    pub fn solve(&mut self) -> &Solution {
        let solution = self.system.solve();
        debug!("Solution: {}", solution);

        self.result.insert(solution)
    }
}

impl Default for EntrySession {
    fn default() -> Self { EntrySession::new(SystemConfig::default()) }
}
