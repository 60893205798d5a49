//! Contract error types

use frame_contract_data::DataError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContractError>;

#[derive(Error, Debug)]
pub enum ContractError {
    /// A checked parameter was neither passed nor defaulted.
    #[error("{function} requires argument '{argument}' for frame_contract")]
    MissingArgument { function: String, argument: String },

    /// Setup failure: a decorator refers to parameters the function lacks.
    /// One line per missing parameter.
    #[error("{}", missing_parameters_message(.function, .decorator, .parameters))]
    MissingParameters {
        function: String,
        decorator: String,
        parameters: Vec<String>,
    },

    #[error("Invalid check configuration: {0}")]
    InvalidCheckConfiguration(String),

    #[error("Argument '{parameter}' cannot be used as a column name: got {kind}")]
    InvalidColumnPlaceholder { parameter: String, kind: &'static str },

    #[error("Invalid mode '{0}': expected one of skip, silent, trace, debug, info, warn, error, critical, raise")]
    InvalidMode(String),

    /// Contract violations under raise mode, one prefixed message per line.
    #[error("{0}")]
    Violation(String),

    #[error("{context}: key {key} not found")]
    KeyNotFound { context: String, key: String },

    #[error("Expected {expected} for '{name}', got {got}")]
    UnexpectedType {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Error returned by the wrapped function body.
    #[error(transparent)]
    Function(#[from] anyhow::Error),
}

impl ContractError {
    pub fn is_violation(&self) -> bool {
        matches!(self, ContractError::Violation(_))
    }

    /// Violation messages, if this is a violation.
    pub fn violations(&self) -> Vec<&str> {
        match self {
            ContractError::Violation(msg) => msg.lines().collect(),
            _ => Vec::new(),
        }
    }
}

fn missing_parameters_message(function: &str, decorator: &str, parameters: &[String]) -> String {
    parameters
        .iter()
        .map(|param| {
            format!(
                "{} {} requires argument '{}' in function signature.",
                function, decorator, param
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_lists_each() {
        let err = ContractError::MissingParameters {
            function: "f".to_string(),
            decorator: "@argument('df')".to_string(),
            parameters: vec!["df".to_string(), "other".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "f @argument('df') requires argument 'df' in function signature.\n\
             f @argument('df') requires argument 'other' in function signature."
        );
    }

    #[test]
    fn test_violation_lines() {
        let err = ContractError::Violation("f: Output: a\nf: Output: b".to_string());
        assert!(err.is_violation());
        assert_eq!(err.violations(), vec!["f: Output: a", "f: Output: b"]);
        assert!(ContractError::InvalidMode("x".into()).violations().is_empty());
    }
}
