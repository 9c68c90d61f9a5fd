use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    UnknownSplitPolicy { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::UnknownSplitPolicy { input } => {
                write!(
                    f,
                    "unknown split policy: {input} (expected send, cut or split)"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
