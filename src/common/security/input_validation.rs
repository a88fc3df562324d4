/// Input validation for chat messages and file uploads
/// Rejects oversized, empty and suspicious input before it reaches the message store
use serde::{Deserialize, Serialize};

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: String,
    },
    PathTraversal {
        path: String,
    },
    TooLong {
        field: String,
        max_length: usize,
        actual: usize,
    },
    InvalidFormat {
        field: String,
        expected: String,
        got: String,
    },
    Suspicious {
        field: String,
        reason: String,
    },
}

impl ValidationError {
    /// Name of the offending field, for audit events
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Suspicious { field, .. } => field.as_str(),
            ValidationError::PathTraversal { .. } => "file_name",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty { field } => {
                write!(f, "Field '{}' cannot be empty", field)
            }
            ValidationError::PathTraversal { path } => {
                write!(f, "Path contains traversal attempt: '{}'", path)
            }
            ValidationError::TooLong {
                field,
                max_length,
                actual,
            } => {
                write!(
                    f,
                    "Field '{}' too long: {} (max: {})",
                    field, actual, max_length
                )
            }
            ValidationError::InvalidFormat {
                field,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Field '{}' has invalid format. Expected: {}, got: '{}'",
                    field, expected, got
                )
            }
            ValidationError::Suspicious { field, reason } => {
                write!(f, "Field '{}' rejected: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Default maximum chat message length, in characters
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 1000;

/// Default maximum upload size (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Check that `input` is at most `max_length` characters long.
///
/// Counts Unicode scalar values, not bytes.
pub fn validate_length(input: &str, max_length: usize) -> bool {
    input.chars().count() <= max_length
}

/// Validate a user-typed chat message
///
/// Ensures messages:
/// - Are not blank after trimming
/// - Don't exceed `max_length` characters
/// - Don't contain null bytes
pub fn check_message(text: &str, max_length: usize) -> Result<(), ValidationError> {
    let trimmed = text.trim();

    // Check empty
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: "message".to_string(),
        });
    }

    // Check length
    if !validate_length(trimmed, max_length) {
        return Err(ValidationError::TooLong {
            field: "message".to_string(),
            max_length,
            actual: trimmed.chars().count(),
        });
    }

    // Check for null bytes
    if trimmed.contains('\0') {
        return Err(ValidationError::Suspicious {
            field: "message".to_string(),
            reason: "contains null byte".to_string(),
        });
    }

    Ok(())
}

/// Upload constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileRules {
    /// Maximum size in bytes
    pub max_size: u64,
    /// Accepted MIME types; `type/*` matches any subtype
    pub allowed_types: Vec<String>,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: vec![
                "image/*".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
            ],
        }
    }
}

impl FileRules {
    fn allows_type(&self, mime: &str) -> bool {
        // Drop parameters such as "; charset=utf-8"
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };
        if kind.is_empty() || subtype.is_empty() {
            return false;
        }

        self.allowed_types.iter().any(|allowed| {
            let allowed = allowed.trim().to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(allowed_kind) => allowed_kind == kind,
                None => allowed == essence,
            }
        })
    }
}

/// Validate a file offered for upload
///
/// Checks:
/// - Name is present and free of path components and null bytes
/// - Size is non-zero and within `rules.max_size`
/// - MIME type is on the allow-list
pub fn check_file(
    name: &str,
    size: u64,
    mime: &str,
    rules: &FileRules,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "file_name".to_string(),
        });
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ValidationError::PathTraversal {
            path: name.to_string(),
        });
    }

    if name.contains('\0') {
        return Err(ValidationError::Suspicious {
            field: "file_name".to_string(),
            reason: "contains null byte".to_string(),
        });
    }

    if size == 0 {
        return Err(ValidationError::Empty {
            field: "file".to_string(),
        });
    }

    if size > rules.max_size {
        return Err(ValidationError::TooLong {
            field: "file_size".to_string(),
            max_length: usize::try_from(rules.max_size).unwrap_or(usize::MAX),
            actual: usize::try_from(size).unwrap_or(usize::MAX),
        });
    }

    if !rules.allows_type(mime) {
        return Err(ValidationError::InvalidFormat {
            field: "file_type".to_string(),
            expected: rules.allowed_types.join(", "),
            got: mime.to_string(),
        });
    }

    Ok(())
}

/// Boolean form of [`check_file`]
pub fn validate_file(name: &str, size: u64, mime: &str, rules: &FileRules) -> bool {
    check_file(name, size, mime, rules).is_ok()
}
