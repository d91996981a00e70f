use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EllipResult<T> = Result<T, EllipError>;
pub type ModelResult<T> = EllipResult<T>;
pub type ComputeResult<T> = EllipResult<T>;

/// Failure classes; each one owns a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EllipErrorCategory {
    /// Bad arguments, model files, phase names or configuration.
    InputValidationError,
    /// Files that cannot be read or written.
    IoSystemError,
    /// Valid requests with no result, such as a phase that does not arrive.
    ComputationError,
    InternalError,
}

impl EllipErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Error carried across the library boundary: a category, a stable
/// `AREA.REASON` placeholder and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipError {
    category: EllipErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl EllipError {
    pub fn new(
        category: EllipErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EllipErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EllipErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EllipErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EllipErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> EllipErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// `ERROR: [PLACEHOLDER] message`, the first stderr line of a failed run.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    /// `FATAL EXIT CODE: n`, the closing stderr line of a failed run.
    pub fn exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for EllipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.label(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for EllipError {}
