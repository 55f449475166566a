//! Error handling for the CLI application

use std::fmt;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// No file matched the given patterns
    NoInputFiles(Vec<String>),
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Separator flag could not be unescaped
    InvalidEscape(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoInputFiles(patterns) => {
                write!(f, "No files found matching: {}", patterns.join(", "))
            }
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::InvalidEscape(sequence) => {
                write!(f, "Invalid escape sequence in separator: {sequence}")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_files_display() {
        let error = CliError::NoInputFiles(vec!["*.log".to_string(), "a.txt".to_string()]);
        assert_eq!(error.to_string(), "No files found matching: *.log, a.txt");
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = CliError::InvalidPattern("[invalid".to_string());
        assert_eq!(error.to_string(), "Invalid file pattern: [invalid");
    }

    #[test]
    fn test_config_error_display() {
        let error = CliError::ConfigError("separator and pattern both set".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: separator and pattern both set"
        );
    }

    #[test]
    fn test_invalid_escape_display() {
        let error = CliError::InvalidEscape("\\q".to_string());
        assert_eq!(error.to_string(), "Invalid escape sequence in separator: \\q");
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let failure: CliResult<()> = Err(CliError::InvalidPattern("**[".to_string()).into());
        let error = failure.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::InvalidPattern(_))
        ));
    }
}
