use previews_engine::PreviewError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error(transparent)]
    Engine(#[from] PreviewError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
