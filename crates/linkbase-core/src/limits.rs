//! Input normalization and validation limits

/// Maximum length for a normalized node name (256 bytes)
pub const MAX_NODE_NAME_LEN: usize = 256;

/// Maximum length for a node label (1024 bytes)
pub const MAX_NODE_LABEL_LEN: usize = 1024;

/// Maximum length for a normalized edge label (256 bytes)
pub const MAX_EDGE_LABEL_LEN: usize = 256;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    NameTooLong { len: usize, max: usize },
    NodeLabelTooLong { len: usize, max: usize },
    EdgeLabelTooLong { len: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Entity name cannot be empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "Entity name too long: {} bytes (max {})", len, max)
            }
            Self::NodeLabelTooLong { len, max } => {
                write!(f, "Node label too long: {} bytes (max {})", len, max)
            }
            Self::EdgeLabelTooLong { len, max } => {
                write!(f, "Edge label too long: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Lowercase and trim. The only identity rule for names and edge labels.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalize an entity name, rejecting blank and oversized input
pub fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if normalized.len() > MAX_NODE_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len: normalized.len(),
            max: MAX_NODE_NAME_LEN,
        });
    }
    Ok(normalized)
}

/// Normalize a name used only for lookup. Blank input is rejected; there is
/// no length limit, since an oversized name simply matches no node.
pub fn normalize_lookup_name(name: &str) -> Result<String, ValidationError> {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(normalized)
}

/// Normalize an optional edge label. Blank labels collapse to `None`.
pub fn normalize_edge_label(label: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(label) = label else {
        return Ok(None);
    };
    let normalized = normalize(label);
    if normalized.is_empty() {
        return Ok(None);
    }
    if normalized.len() > MAX_EDGE_LABEL_LEN {
        return Err(ValidationError::EdgeLabelTooLong {
            len: normalized.len(),
            max: MAX_EDGE_LABEL_LEN,
        });
    }
    Ok(Some(normalized))
}

/// Validate a node label. Node labels are stored verbatim.
pub fn validate_node_label(label: &str) -> Result<(), ValidationError> {
    if label.len() > MAX_NODE_LABEL_LEN {
        return Err(ValidationError::NodeLabelTooLong {
            len: label.len(),
            max: MAX_NODE_LABEL_LEN,
        });
    }
    Ok(())
}

/// Whether two node labels are equal under normalization
pub fn labels_match(a: Option<&str>, b: Option<&str>) -> bool {
    a.map(normalize) == b.map(normalize)
}
