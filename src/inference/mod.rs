use crate::common_types::{ApiKey, ExtractionRequest, ModelName};
use crate::reporter::AppReporter;
use crate::AppResult;
use std::fmt::Display;

mod gemini_llm;
pub use gemini_llm::*;

mod open_ai_llm;
pub use open_ai_llm::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceProviderType {
    GeminiLlm,
    OpenAiLlm,
}

impl Display for InferenceProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceProviderType::GeminiLlm => write!(f, "gemini-llm"),
            InferenceProviderType::OpenAiLlm => write!(f, "open-ai-llm"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceOptions {
    pub provider_options: InferenceProviderOptions,
}

#[derive(Debug, Clone)]
pub enum InferenceProviderOptions {
    GeminiLlm(GeminiLlmInferenceOptions),
    OpenAiLlm(OpenAiLlmInferenceOptions),
}

impl InferenceOptions {
    pub fn new(
        provider_type: InferenceProviderType,
        api_key: ApiKey,
        model: Option<ModelName>,
        api_url: Option<url::Url>,
    ) -> Self {
        let provider_options = match provider_type {
            InferenceProviderType::GeminiLlm => {
                InferenceProviderOptions::GeminiLlm(GeminiLlmInferenceOptions {
                    api_key,
                    gemini_model: model,
                    api_url,
                })
            }
            InferenceProviderType::OpenAiLlm => {
                InferenceProviderOptions::OpenAiLlm(OpenAiLlmInferenceOptions {
                    api_key,
                    model,
                    api_url,
                })
            }
        };
        InferenceOptions { provider_options }
    }
}

impl Display for InferenceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider_options {
            InferenceProviderOptions::GeminiLlm(options) => {
                write!(f, "gemini-llm/{}", options.model_name())
            }
            InferenceProviderOptions::OpenAiLlm(options) => {
                write!(f, "open-ai-llm/{}", options.model_name())
            }
        }
    }
}

/// A hosted multimodal model that turns an instruction plus an image into text.
pub trait ImageTextInference {
    async fn infer(&self, request: &ExtractionRequest) -> AppResult<String>;

    fn provider_type(&self) -> InferenceProviderType;
}

#[derive(Clone)]
pub enum InferenceServices<'a> {
    GeminiLlm(GeminiLlmInference<'a>),
    OpenAiLlm(OpenAiLlmInference<'a>),
}

impl<'a> InferenceServices<'a> {
    pub fn new_inference_service(
        options: &InferenceOptions,
        reporter: &'a AppReporter<'a>,
    ) -> AppResult<Self> {
        match options.provider_options {
            InferenceProviderOptions::GeminiLlm(ref options) => Ok(InferenceServices::GeminiLlm(
                GeminiLlmInference::new(options.clone(), reporter)?,
            )),
            InferenceProviderOptions::OpenAiLlm(ref options) => Ok(InferenceServices::OpenAiLlm(
                OpenAiLlmInference::new(options.clone(), reporter)?,
            )),
        }
    }
}

impl<'a> ImageTextInference for InferenceServices<'a> {
    async fn infer(&self, request: &ExtractionRequest) -> AppResult<String> {
        match self {
            InferenceServices::GeminiLlm(service) => service.infer(request).await,
            InferenceServices::OpenAiLlm(service) => service.infer(request).await,
        }
    }

    fn provider_type(&self) -> InferenceProviderType {
        match self {
            InferenceServices::GeminiLlm(service) => service.provider_type(),
            InferenceServices::OpenAiLlm(service) => service.provider_type(),
        }
    }
}

/// Joins a configured base URL with an API path, keeping any path prefix of the base.
pub(crate) fn endpoint_url(
    api_url: Option<&url::Url>,
    default_api_url: &str,
    path: &str,
) -> String {
    let base = api_url
        .map(|url| url.as_str())
        .unwrap_or(default_api_url)
        .trim_end_matches('/');
    format!("{}/{}", base, path.trim_start_matches('/'))
}
