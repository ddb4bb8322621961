use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
    // -- Config errors.
    EnvVarError(String),
    InvalidBaseUrl { url: String },

    // -- Transport errors.
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),

    // -- Session errors.
    SessionStore(String),

    // -- Auth errors.
    InvalidPayload { field: String },

    // -- Pagination errors.
    InvalidPageSize,
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

impl Error {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// How a view should surface this error to the user.
    pub fn display_kind(&self) -> (Presentation, DisplayError) {
        match self {
            Self::Transport(_) => (Presentation::Toast, DisplayError::NETWORK),

            Self::Status { status, .. } => match *status {
                400 | 422 => (Presentation::Inline, DisplayError::INVALID_INPUT),
                401 => (Presentation::Toast, DisplayError::UNAUTHORIZED),
                403 => (Presentation::Toast, DisplayError::FORBIDDEN),
                404 => (Presentation::Inline, DisplayError::NOT_FOUND),
                _ => (Presentation::Toast, DisplayError::SERVICE_ERROR),
            },

            Self::InvalidPageSize | Self::InvalidPayload { .. } => {
                (Presentation::Inline, DisplayError::INVALID_INPUT)
            }

            Self::Decode(_)
            | Self::EnvVarError(_)
            | Self::InvalidBaseUrl { .. }
            | Self::SessionStore(_) => (Presentation::Toast, DisplayError::SERVICE_ERROR),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum DisplayError {
    NETWORK,
    UNAUTHORIZED,
    FORBIDDEN,
    NOT_FOUND,
    INVALID_INPUT,
    SERVICE_ERROR,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Presentation {
    Inline,
    Toast,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::EnvVarError(err.to_string())
    }
}
