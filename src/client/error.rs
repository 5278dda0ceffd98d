#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server returned {status}: {}", detail_or_default(.detail))]
    Server { status: u16, detail: Option<String> },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

fn detail_or_default(detail: &Option<String>) -> &str {
    detail.as_deref().unwrap_or("request failed")
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Server { status: 404, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(err) if err.is_timeout())
    }

    /// Text to show the user: the server's detail when it sent one, a
    /// generic notice otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid backend URL: {}", err))
    }
}
