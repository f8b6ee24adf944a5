use indicatif::style::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("A variável de ambiente {env_var} não foi encontrada.")]
    CredentialNotFound { env_var: String },
    #[error("Inference config error: {message}")]
    InferenceConfigError { message: String },
    #[error("O arquivo '{path}' não foi encontrado.")]
    ImageNotFound { path: String },
    #[error("Image decoding error: {0}")]
    ImageDecodeError(#[from] image::ImageError),
    #[error("Input/output error: {0}")]
    InputOutputError(#[from] std::io::Error),
    #[error("HTTP client error:\n{0}")]
    HttpClientError(#[from] reqwest::Error),
    #[error("Inference service error: {message}")]
    InferenceServiceError { message: String },
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("System error: {message}")]
    SystemError { message: String },
}

impl AppError {
    pub fn is_image_not_found(&self) -> bool {
        matches!(self, AppError::ImageNotFound { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AppError::CredentialNotFound { .. } | AppError::InferenceConfigError { .. }
        )
    }
}
