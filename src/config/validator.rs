//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Each transform step sets exactly one kind
//! - `replace` patterns must compile
//! - `command` steps must not be blank
//! - `max_concurrency` must be at least 1
//! - `logging_level` must be a valid filter directive

use crate::config::schema::CacheConfig;
use crate::error::{CacheError, Result};
use regex::Regex;
use tracing_subscriber::EnvFilter;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Position of the transform step, if error is step-specific
    pub step: Option<usize>,
}

impl ValidationError {
    fn global(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: None,
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &CacheConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_settings(config));
    errors.extend(validate_steps(config));

    errors
}

fn validate_settings(config: &CacheConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.cache.as_os_str().is_empty() {
        errors.push(ValidationError::global(
            "empty-cache-path",
            "'cache' must not be empty".to_string(),
        ));
    }

    if config.max_concurrency == Some(0) {
        errors.push(ValidationError::global(
            "zero-concurrency",
            "'max_concurrency' must be at least 1".to_string(),
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.logging_level) {
        errors.push(ValidationError::global(
            "invalid-logging-level",
            format!("Invalid logging_level '{}': {}", config.logging_level, e),
        ));
    }

    errors
}

/// Validate transform step definitions.
fn validate_steps(config: &CacheConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, step) in config.transforms.iter().enumerate() {
        let position = i + 1;
        let label = step.label(position);
        let kinds = step.kinds();

        match kinds.len() {
            0 => errors.push(ValidationError {
                rule: "missing-kind".to_string(),
                message: format!("Transform step {} has no kind", label),
                step: Some(position),
            }),
            1 => {}
            _ => errors.push(ValidationError {
                rule: "multiple-kinds".to_string(),
                message: format!(
                    "Transform step {} sets more than one kind: {}",
                    label,
                    kinds.join(", ")
                ),
                step: Some(position),
            }),
        }

        if let Some(replace) = &step.replace {
            if let Err(e) = Regex::new(&replace.pattern) {
                errors.push(ValidationError {
                    rule: "invalid-pattern".to_string(),
                    message: format!(
                        "Transform step {} has invalid pattern '{}': {}",
                        label, replace.pattern, e
                    ),
                    step: Some(position),
                });
            }
        }

        if step.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
            errors.push(ValidationError {
                rule: "empty-command".to_string(),
                message: format!("Transform step {} has an empty command", label),
                step: Some(position),
            });
        }
    }

    errors
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &CacheConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(CacheError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ReplaceConfig, StepConfig};

    fn step_with_prefix(text: &str) -> StepConfig {
        StepConfig {
            prefix: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CacheConfig::default()).is_empty());
        assert!(validate(&CacheConfig::default()).is_ok());
    }

    #[test]
    fn step_without_kind_is_rejected() {
        let config = CacheConfig {
            transforms: vec![StepConfig::default()],
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "missing-kind"));
        assert_eq!(errors[0].step, Some(1));
    }

    #[test]
    fn step_with_two_kinds_is_rejected() {
        let mut step = step_with_prefix("a");
        step.extension = Some("txt".to_string());
        step.name = Some("mixed".to_string());
        let config = CacheConfig {
            transforms: vec![step],
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "multiple-kinds");
        assert!(errors[0].message.contains("'mixed'"));
        assert!(errors[0].message.contains("prefix, extension"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let config = CacheConfig {
            transforms: vec![StepConfig {
                replace: Some(ReplaceConfig {
                    pattern: "(unclosed".to_string(),
                    with: String::new(),
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "invalid-pattern"));
    }

    #[test]
    fn blank_command_is_rejected() {
        let config = CacheConfig {
            transforms: vec![StepConfig {
                command: Some("  ".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "empty-command"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = CacheConfig {
            max_concurrency: Some(0),
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "zero-concurrency"));
    }

    #[test]
    fn validate_joins_all_messages() {
        let config = CacheConfig {
            max_concurrency: Some(0),
            transforms: vec![step_with_prefix("ok"), StepConfig::default()],
            ..Default::default()
        };

        let err = validate(&config).unwrap_err();
        match err {
            CacheError::ConfigValidationError { message } => {
                assert!(message.contains("max_concurrency"));
                assert!(message.contains("#2"));
                assert!(message.contains("; "));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
