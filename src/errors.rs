use std::fmt;

#[derive(Debug, Clone)]
pub enum BbError {
    Config(String),
    StorageOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    KeyExhausted(String),
}

impl BbError {
    /// Stable error code, surfaced in logs
    pub fn code(&self) -> &'static str {
        match self {
            BbError::Config(_) => "E001",
            BbError::StorageOperation(_) => "E002",
            BbError::FileOperation(_) => "E003",
            BbError::Validation(_) => "E004",
            BbError::NotFound(_) => "E005",
            BbError::Serialization(_) => "E006",
            BbError::DateParse(_) => "E007",
            BbError::KeyExhausted(_) => "E008",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            BbError::Config(_) => "Configuration Error",
            BbError::StorageOperation(_) => "Storage Operation Error",
            BbError::FileOperation(_) => "File Operation Error",
            BbError::Validation(_) => "Validation Error",
            BbError::NotFound(_) => "Resource Not Found",
            BbError::Serialization(_) => "Serialization Error",
            BbError::DateParse(_) => "Date Parse Error",
            BbError::KeyExhausted(_) => "Key Space Exhausted",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BbError::Config(msg) => msg,
            BbError::StorageOperation(msg) => msg,
            BbError::FileOperation(msg) => msg,
            BbError::Validation(msg) => msg,
            BbError::NotFound(msg) => msg,
            BbError::Serialization(msg) => msg,
            BbError::DateParse(msg) => msg,
            BbError::KeyExhausted(msg) => msg,
        }
    }
}

impl fmt::Display for BbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for BbError {}

// Convenience constructors
impl BbError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        BbError::Config(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        BbError::StorageOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        BbError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        BbError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        BbError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        BbError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        BbError::DateParse(msg.into())
    }

    pub fn key_exhausted<T: Into<String>>(msg: T) -> Self {
        BbError::KeyExhausted(msg.into())
    }
}

impl From<std::io::Error> for BbError {
    fn from(err: std::io::Error) -> Self {
        BbError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for BbError {
    fn from(err: serde_json::Error) -> Self {
        BbError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for BbError {
    fn from(err: chrono::ParseError) -> Self {
        BbError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BbError>;
