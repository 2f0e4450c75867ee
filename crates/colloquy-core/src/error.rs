use thiserror::Error;

/// Failure of the remote token-count oracle. Budget enforcement treats every
/// variant as "token count unknown".
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Tokenizer transport error: {0}")]
    Transport(String),

    #[error("Tokenizer rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Tokenizer response carried no token count")]
    MissingCount,
}

pub type OracleResult<T> = std::result::Result<T, OracleError>;
