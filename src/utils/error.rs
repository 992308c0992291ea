use thiserror::Error;

/// Which uniqueness constraint an insert ran into.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    #[error("instance id {id} is already registered")]
    DuplicateId { id: String },

    #[error("port {port} is already held")]
    DuplicatePort { port: u16 },
}

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("no free port after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("system refused to hand out a port: {0}")]
    SystemResourceUnavailable(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Instance with id {id} not found")]
    NotFound { id: String },

    #[error("Port allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Validation error on {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Registration failed after {attempts} attempts")]
    RegistrationFailed { attempts: u32 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        RegistryError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::Conflict(_) => "conflict",
            RegistryError::NotFound { .. } => "not_found",
            RegistryError::Allocation(_) => "allocation_failed",
            RegistryError::Validation { .. } => "validation",
            RegistryError::RegistrationFailed { .. } => "registration_failed",
            RegistryError::Config { .. } => "config",
            RegistryError::Io(_) => "io",
        }
    }

    /// Only collisions are worth another attempt; everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let errors = vec![
            RegistryError::Conflict(ConflictKind::DuplicatePort { port: 1 }),
            RegistryError::NotFound { id: "x".to_string() },
            RegistryError::Allocation(AllocationError::ExhaustedRetries { attempts: 3 }),
            RegistryError::validation("name", "empty"),
            RegistryError::RegistrationFailed { attempts: 5 },
            RegistryError::Config {
                message: "bad".to_string(),
            },
            RegistryError::Io(std::io::Error::other("boom")),
        ];

        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_only_conflicts_retry() {
        let duplicate_id = ConflictKind::DuplicateId { id: "a".into() };
        assert!(RegistryError::Conflict(duplicate_id).is_retryable());
        assert!(!RegistryError::NotFound { id: "a".into() }.is_retryable());
        assert!(!RegistryError::Allocation(AllocationError::ExhaustedRetries { attempts: 1 })
            .is_retryable());
        assert!(!RegistryError::validation("name", "empty").is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = RegistryError::Conflict(ConflictKind::DuplicatePort { port: 4242 });
        assert_eq!(err.to_string(), "Registry conflict: port 4242 is already held");

        let err = RegistryError::Conflict(ConflictKind::DuplicateId { id: "abc".into() });
        assert_eq!(
            err.to_string(),
            "Registry conflict: instance id abc is already registered"
        );

        let err = RegistryError::NotFound { id: "abc".into() };
        assert_eq!(err.to_string(), "Instance with id abc not found");
    }
}
