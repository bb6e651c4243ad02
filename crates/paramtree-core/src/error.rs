use std::path::PathBuf;
use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("Missing or empty {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Value kind '{kind}' is not allowed here")]
    InvalidValueType { kind: String },

    #[error("Circular dependency detected for category '{label}'")]
    CircularDependency { label: String },

    #[error("Category '{label}' cannot share its label with ancestor '{ancestor}'")]
    DuplicateAncestorLabel { label: String, ancestor: String },

    #[error("Item '{label}' already exists in category '{category}'")]
    DuplicateItemLabel { category: String, label: String },

    #[error("Category '{label}' already has a parent")]
    AlreadyAttached { label: String },

    #[error("Category does not exist in this tree")]
    MissingCategory,

    #[error("Invalid layout: {message}")]
    Layout { message: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ParamError>;

impl ParamError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_kind(kind: ValueKind) -> Self {
        Self::InvalidValueType {
            kind: kind.to_string(),
        }
    }

    pub(crate) fn layout(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }

    /// True for errors raised by the hierarchy invariants on edge attachment.
    pub fn is_hierarchy_violation(&self) -> bool {
        matches!(
            self,
            Self::CircularDependency { .. }
                | Self::DuplicateAncestorLabel { .. }
                | Self::AlreadyAttached { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::InvalidValueType { .. } => 3,
            Self::CircularDependency { .. } => 4,
            Self::DuplicateAncestorLabel { .. } => 5,
            Self::DuplicateItemLabel { .. } => 6,
            Self::AlreadyAttached { .. } => 7,
            Self::MissingCategory => 8,
            Self::Layout { .. } => 9,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_violations() {
        let err = ParamError::CircularDependency {
            label: "a".into(),
        };
        assert!(err.is_hierarchy_violation());
        assert!(!ParamError::MissingCategory.is_hierarchy_violation());
        assert!(!ParamError::validation("label", "empty").is_hierarchy_violation());
    }

    #[test]
    fn test_exit_codes_are_distinct_for_domain_errors() {
        let errors = [
            ParamError::validation("label", "empty"),
            ParamError::invalid_kind(ValueKind::Path),
            ParamError::CircularDependency { label: "a".into() },
            ParamError::DuplicateAncestorLabel {
                label: "a".into(),
                ancestor: "a".into(),
            },
            ParamError::DuplicateItemLabel {
                category: "c".into(),
                label: "i".into(),
            },
            ParamError::AlreadyAttached { label: "a".into() },
            ParamError::MissingCategory,
            ParamError::layout("bad"),
        ];
        let mut codes: Vec<i32> = errors.iter().map(ParamError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_messages() {
        let err = ParamError::DuplicateItemLabel {
            category: "Engineering".into(),
            label: "budget".into(),
        };
        assert_eq!(
            err.to_string(),
            "Item 'budget' already exists in category 'Engineering'"
        );
    }
}
