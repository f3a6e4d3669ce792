use crate::modules::tracker::adapters::outbound::api_gateway::ApiError;
use crate::modules::tracker::core::aggregation::FilterError;
use crate::modules::tracker::use_cases::upload_images::handler::UploadReport;
use crate::shared::infrastructure::session_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    RequestFailed(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0}")]
    PartialUploadFailure(UploadReport),

    #[error("session storage failed: {0}")]
    Storage(String),
}

impl From<ApiError> for SessionError {
    fn from(error: ApiError) -> Self {
        SessionError::RequestFailed(error.to_string())
    }
}

impl From<FilterError> for SessionError {
    fn from(error: FilterError) -> Self {
        SessionError::PreconditionFailed(error.to_string())
    }
}

impl From<StorageError> for SessionError {
    fn from(error: StorageError) -> Self {
        SessionError::Storage(error.to_string())
    }
}
