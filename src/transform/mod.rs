//! Value transforms applied to single leaf values before they are written.
//!
//! Commands are short textual tokens, e.g. `round(2)`, `multiply(10)` or
//! `UCFIRST`. Transforms never fail: any error is logged and the original
//! value is returned.

pub mod expr;

use crate::models::StateValue;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error};

pub use expr::ExprError;

static BRACKET_ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([^)]*?)\s*\)").unwrap());

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid argument in command '{0}'")]
    InvalidArgument(String),
    #[error("Value '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Expr(#[from] ExprError),
}

/// A parsed transform command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Custom(String),
    Multiply(f64),
    Divide(f64),
    Round(i32),
    Add(f64),
    /// Spelling kept as configured by existing installations.
    Substract(f64),
    Uppercase,
    Lowercase,
    UcFirst,
    Passthrough,
}

impl Command {
    /// Parse a command. Keyword prefixes match case-insensitively; anything
    /// unrecognised is a passthrough.
    pub fn parse(command: &str) -> Result<Self, TransformError> {
        let trimmed = command.trim();
        let lower = trimmed.to_lowercase();

        if lower.starts_with("custom:") {
            return Ok(Command::Custom(trimmed["custom:".len()..].to_string()));
        }

        let arithmetic: [(&str, fn(f64) -> Command); 5] = [
            ("multiply(", Command::Multiply),
            ("divide(", Command::Divide),
            ("round(", |n| Command::Round(n as i32)),
            ("add(", Command::Add),
            ("substract(", Command::Substract),
        ];
        for (prefix, build) in arithmetic {
            if lower.starts_with(prefix) {
                return bracket_argument(trimmed).map(build);
            }
        }

        Ok(match trimmed.to_uppercase().as_str() {
            "UPPERCASE" => Command::Uppercase,
            "LOWERCASE" => Command::Lowercase,
            "UCFIRST" => Command::UcFirst,
            _ => Command::Passthrough,
        })
    }

    /// Apply the command. `Ok(None)` leaves the value untouched.
    pub fn apply(&self, value: &StateValue) -> Result<Option<StateValue>, TransformError> {
        let number = || {
            value
                .as_number()
                .ok_or_else(|| TransformError::NotNumeric(value.to_string()))
        };

        let result = match self {
            Command::Custom(source) => StateValue::Number(expr::evaluate(source, number()?)?),
            Command::Multiply(n) => StateValue::Number(number()? * n),
            Command::Divide(n) => {
                if *n == 0.0 {
                    return Err(TransformError::DivisionByZero);
                }
                StateValue::Number(number()? / n)
            }
            Command::Round(digits) => StateValue::Number(round_half_up(number()?, *digits)),
            Command::Add(n) => StateValue::Number(number()? + n),
            Command::Substract(n) => StateValue::Number(number()? - n),
            Command::Uppercase => match value.as_text() {
                Some(s) => StateValue::Text(s.to_uppercase()),
                None => return Ok(None),
            },
            Command::Lowercase => match value.as_text() {
                Some(s) => StateValue::Text(s.to_lowercase()),
                None => return Ok(None),
            },
            Command::UcFirst => match value.as_text() {
                Some(s) => StateValue::Text(uc_first(s)),
                None => return Ok(None),
            },
            Command::Passthrough => return Ok(None),
        };

        Ok(Some(result))
    }
}

/// Round half up (towards positive infinity) to `digits` decimal places.
pub fn round_half_up(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor + 0.5).floor() / factor
}

fn uc_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

fn bracket_argument(command: &str) -> Result<f64, TransformError> {
    BRACKET_ARGUMENT
        .captures(command)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(|| TransformError::InvalidArgument(command.to_string()))
}

/// Apply `command` to `value`, best effort.
pub fn transform(command: &str, value: StateValue) -> StateValue {
    debug!("Transform with command \"{}\" and value \"{}\"", command, value);

    match Command::parse(command).and_then(|cmd| cmd.apply(&value)) {
        Ok(Some(transformed)) => transformed,
        Ok(None) => value,
        Err(e) => {
            error!("[transform] error: {} (command \"{}\")", e, command);
            value
        }
    }
}
