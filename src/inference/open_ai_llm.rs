use base64::Engine;
use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};

use crate::common_types::{ApiKey, ExtractionMode, ExtractionRequest, ModelName};
use crate::errors::AppError;
use crate::inference::{endpoint_url, ImageTextInference, InferenceProviderType};
use crate::reporter::AppReporter;
use crate::AppResult;

#[derive(Debug, Clone)]
pub struct OpenAiLlmInferenceOptions {
    pub api_key: ApiKey,
    pub model: Option<ModelName>,
    pub api_url: Option<url::Url>,
}

impl OpenAiLlmInferenceOptions {
    pub fn model_name(&self) -> String {
        self.model
            .as_ref()
            .map(|v| v.value().clone())
            .unwrap_or_else(|| OpenAiLlmInference::DEFAULT_MODEL.to_string())
    }
}

#[derive(Clone)]
pub struct OpenAiLlmInference<'a> {
    client: reqwest::Client,
    open_ai_llm_options: OpenAiLlmInferenceOptions,
    #[allow(dead_code)]
    reporter: &'a AppReporter<'a>,
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiLlmAnalyzeRequest {
    model: String,
    messages: Vec<OpenAiLlmAnalyzeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiLlmResponseFormat>,
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiLlmAnalyzeMessage {
    role: String,
    content: Vec<OpenAiLlmContentPart>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiLlmContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiLlmImageUrl },
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiLlmImageUrl {
    url: String,
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiLlmResponseFormat {
    r#type: String,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiLlmAnalyzeResponse {
    choices: Vec<OpenAiLlmAnalyzeChoice>,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiLlmAnalyzeChoice {
    message: OpenAiLlmResponseMessage,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiLlmResponseMessage {
    content: Option<String>,
}

impl<'a> OpenAiLlmInference<'a> {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    const DEFAULT_API_URL: &'static str = "https://api.openai.com";

    pub fn new(
        open_ai_llm_options: OpenAiLlmInferenceOptions,
        reporter: &'a AppReporter<'a>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            open_ai_llm_options,
            reporter,
        })
    }

    fn analyze_request(&self, request: &ExtractionRequest) -> OpenAiLlmAnalyzeRequest {
        let image_data_url = format!(
            "data:{};base64,{}",
            request.image.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&request.image.data)
        );
        OpenAiLlmAnalyzeRequest {
            model: self.open_ai_llm_options.model_name(),
            messages: vec![OpenAiLlmAnalyzeMessage {
                role: "user".to_string(),
                content: vec![
                    OpenAiLlmContentPart::Text {
                        text: request.instruction.to_string(),
                    },
                    OpenAiLlmContentPart::ImageUrl {
                        image_url: OpenAiLlmImageUrl {
                            url: image_data_url,
                        },
                    },
                ],
            }],
            response_format: match request.mode {
                ExtractionMode::Text => None,
                ExtractionMode::Workout => Some(OpenAiLlmResponseFormat {
                    r#type: "json_object".to_string(),
                }),
            },
        }
    }
}

impl<'a> ImageTextInference for OpenAiLlmInference<'a> {
    async fn infer(&self, request: &ExtractionRequest) -> AppResult<String> {
        let url = endpoint_url(
            self.open_ai_llm_options.api_url.as_ref(),
            Self::DEFAULT_API_URL,
            "v1/chat/completions",
        );
        tracing::debug!(
            "Sending {} ({}) to {}",
            request.image.path,
            request.image.mime_type,
            url
        );
        let response = self
            .client
            .post(url)
            .header(
                "Authorization",
                format!("Bearer {}", self.open_ai_llm_options.api_key.value()),
            )
            .json(&self.analyze_request(request))
            .send()
            .await?;
        if !response.status().is_success() {
            let response_status = response.status();
            let response_text = response.text().await.unwrap_or_default();
            return Err(AppError::InferenceServiceError {
                message: format!(
                    "Failed to analyze image: {}. HTTP status: {}.",
                    response_text, response_status
                ),
            });
        }
        let mut open_ai_response: OpenAiLlmAnalyzeResponse = response.json().await?;
        match open_ai_response.choices.pop() {
            Some(OpenAiLlmAnalyzeChoice {
                message:
                    OpenAiLlmResponseMessage {
                        content: Some(content),
                    },
            }) if !content.is_empty() => Ok(content),
            Some(_) => Err(AppError::InferenceServiceError {
                message: "No text in the response content".to_string(),
            }),
            None => Err(AppError::InferenceServiceError {
                message: "No content item in the response".to_string(),
            }),
        }
    }

    fn provider_type(&self) -> InferenceProviderType {
        InferenceProviderType::OpenAiLlm
    }
}
