use base64::Engine;
use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};

use crate::common_types::{ApiKey, ExtractionMode, ExtractionRequest, ModelName};
use crate::errors::AppError;
use crate::inference::{endpoint_url, ImageTextInference, InferenceProviderType};
use crate::reporter::AppReporter;
use crate::workout::WorkoutScan;
use crate::AppResult;

#[derive(Debug, Clone)]
pub struct GeminiLlmInferenceOptions {
    pub api_key: ApiKey,
    pub gemini_model: Option<ModelName>,
    pub api_url: Option<url::Url>,
}

impl GeminiLlmInferenceOptions {
    pub fn model_name(&self) -> String {
        self.gemini_model
            .as_ref()
            .map(|model_name| model_name.value().trim_start_matches("models/").to_string())
            .unwrap_or_else(|| GeminiLlmInference::DEFAULT_GEMINI_MODEL.to_string())
    }
}

#[derive(Clone)]
pub struct GeminiLlmInference<'a> {
    client: reqwest::Client,
    gemini_llm_options: GeminiLlmInferenceOptions,
    #[allow(dead_code)]
    reporter: &'a AppReporter<'a>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiBlob>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    candidate_count: u32,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Deserialize, Clone, Debug)]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Clone, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl<'a> GeminiLlmInference<'a> {
    pub const DEFAULT_GEMINI_MODEL: &'static str = "gemini-2.0-flash";
    const DEFAULT_API_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(
        gemini_llm_options: GeminiLlmInferenceOptions,
        reporter: &'a AppReporter<'a>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(GeminiLlmInference {
            client,
            gemini_llm_options,
            reporter,
        })
    }

    fn generate_content_url(&self) -> String {
        endpoint_url(
            self.gemini_llm_options.api_url.as_ref(),
            Self::DEFAULT_API_URL,
            &format!(
                "v1beta/models/{}:generateContent",
                self.gemini_llm_options.model_name()
            ),
        )
    }

    fn generate_content_request(request: &ExtractionRequest) -> GeminiGenerateContentRequest {
        GeminiGenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart {
                        text: Some(request.instruction.to_string()),
                        inline_data: None,
                    },
                    GeminiPart {
                        text: None,
                        inline_data: Some(GeminiBlob {
                            mime_type: request.image.mime_type.to_string(),
                            data: base64::engine::general_purpose::STANDARD
                                .encode(&request.image.data),
                        }),
                    },
                ],
            }],
            generation_config: match request.mode {
                ExtractionMode::Text => None,
                ExtractionMode::Workout => Some(GeminiGenerationConfig {
                    candidate_count: 1,
                    response_mime_type: mime::APPLICATION_JSON.to_string(),
                    response_schema: WorkoutScan::gemini_response_schema(),
                }),
            },
        }
    }
}

impl<'a> ImageTextInference for GeminiLlmInference<'a> {
    async fn infer(&self, request: &ExtractionRequest) -> AppResult<String> {
        let url = self.generate_content_url();
        tracing::debug!(
            "Sending {} ({}) to {}",
            request.image.path,
            request.image.mime_type,
            url
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.gemini_llm_options.api_key.value())
            .json(&Self::generate_content_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let response_status = response.status();
            let response_text = response.text().await.unwrap_or_default();
            return Err(AppError::InferenceServiceError {
                message: format!(
                    "Failed to generate content: {}. HTTP status: {}.",
                    response_text, response_status
                ),
            });
        }

        let gemini_response: GeminiGenerateContentResponse = response.json().await?;
        let content = gemini_response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .ok_or_else(|| AppError::InferenceServiceError {
                message: "No content item in the response".to_string(),
            })?;

        let text = content
            .parts
            .iter()
            .fold("".to_string(), |acc, part| match &part.text {
                Some(text) => acc + text,
                None => acc,
            });
        if text.is_empty() {
            return Err(AppError::InferenceServiceError {
                message: "No text in the response content".to_string(),
            });
        }
        Ok(text)
    }

    fn provider_type(&self) -> InferenceProviderType {
        InferenceProviderType::GeminiLlm
    }
}
