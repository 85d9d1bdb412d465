use serde::{Deserialize, Serialize};

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Snapshot input errors
/// - E2xxx: Geocoding errors
/// - E3xxx: Feature building errors
/// - E4xxx: Model training/scoring errors
/// - E5xxx: Recommendation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,
    IoError,
    ConfigError,

    // Snapshot (E1xxx)
    SnapshotMissing,
    SnapshotCorrupt,
    DuplicateId,

    // Geocoding (E2xxx)
    MalformedSpot,
    UnknownNeighborhood,
    InvalidJitter,

    // Features (E3xxx)
    UnknownCategoryLevel,
    FeatureSchemaMismatch,
    CandidateMatrixTooLarge,

    // Scoring (E4xxx)
    SingleClassLabels,
    EmptyTrainingSet,
    InvalidModelParams,
    ModelFitFailed,

    // Recommendation (E5xxx)
    UserNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",
            Self::IoError => "E0005",
            Self::ConfigError => "E0006",

            // Snapshot
            Self::SnapshotMissing => "E1001",
            Self::SnapshotCorrupt => "E1002",
            Self::DuplicateId => "E1003",

            // Geocoding
            Self::MalformedSpot => "E2001",
            Self::UnknownNeighborhood => "E2002",
            Self::InvalidJitter => "E2003",

            // Features
            Self::UnknownCategoryLevel => "E3001",
            Self::FeatureSchemaMismatch => "E3002",
            Self::CandidateMatrixTooLarge => "E3003",

            // Scoring
            Self::SingleClassLabels => "E4001",
            Self::EmptyTrainingSet => "E4002",
            Self::InvalidModelParams => "E4003",
            Self::ModelFitFailed => "E4004",

            // Recommendation
            Self::UserNotFound => "E5001",
        }
    }

    /// Process exit status for a batch run that failed with this code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError | Self::IoError => 1,
            Self::ValidationError | Self::BadRequest | Self::ConfigError
            | Self::InvalidJitter | Self::InvalidModelParams => 2,
            Self::SnapshotMissing | Self::SnapshotCorrupt | Self::DuplicateId
            | Self::MalformedSpot | Self::UnknownNeighborhood
            | Self::UnknownCategoryLevel => 3,
            Self::FeatureSchemaMismatch | Self::CandidateMatrixTooLarge
            | Self::SingleClassLabels | Self::EmptyTrainingSet
            | Self::ModelFitFailed => 4,
            Self::NotFound | Self::UserNotFound => 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Json(_) => ErrorCode::SnapshotCorrupt,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }

    pub fn code(&self) -> &'static str {
        self.error_code().code()
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            AppError::Known { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
