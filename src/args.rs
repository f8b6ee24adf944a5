use crate::common_types::{ApiKey, ExtractionMode, ModelName};
use crate::errors::AppError;
use crate::inference::{InferenceOptions, InferenceProviderType};
use crate::AppResult;
use clap::*;
use rvstruct::ValueStruct;
use std::fmt::Display;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Extract the visible text from a workout screenshot")]
    Scan {
        #[arg(
            default_value = "print.png",
            help = "Path to the screenshot such as print.png or /tmp/workout.jpg"
        )]
        image_path: String,

        #[arg(
            short = 's',
            long,
            help = "Ask for a structured workout (exercises, sets, repetitions) instead of raw text",
            default_value = "false"
        )]
        structured: bool,

        #[command(flatten)]
        extractor_args: ExtractorArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    GeminiLlm,
    OpenAiLlm,
}

impl Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::GeminiLlm => write!(f, "gemini-llm"),
            ProviderType::OpenAiLlm => write!(f, "open-ai-llm"),
        }
    }
}

impl From<ProviderType> for InferenceProviderType {
    fn from(provider: ProviderType) -> Self {
        match provider {
            ProviderType::GeminiLlm => InferenceProviderType::GeminiLlm,
            ProviderType::OpenAiLlm => InferenceProviderType::OpenAiLlm,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractorArgs {
    #[arg(
        short = 'p',
        long,
        value_enum,
        default_value_t = ProviderType::GeminiLlm,
        help = "Inference service used to read the screenshot"
    )]
    pub provider: ProviderType,

    #[arg(
        long,
        help = "Model name, such as gemini-2.0-flash (default for gemini-llm) or gpt-4o-mini (default for open-ai-llm)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        help = "Base URL of the inference API, for OpenAI-compatible gateways or proxies"
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        default_value = "API_KEY",
        help = "Environment variable that holds the API key"
    )]
    pub api_key_env: String,
}

impl ExtractorArgs {
    /// Builds inference options, reading the credential through `lookup_env`
    /// so a missing key is detected before any client is created.
    pub fn resolve_options<F>(&self, lookup_env: F) -> AppResult<InferenceOptions>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup_env(&self.api_key_env)
            .filter(|value| !value.trim().is_empty())
            .map(ApiKey::new)
            .ok_or_else(|| AppError::CredentialNotFound {
                env_var: self.api_key_env.clone(),
            })?;

        let api_url = self
            .api_url
            .as_ref()
            .map(|url| {
                url::Url::parse(url).map_err(|e| AppError::InferenceConfigError {
                    message: format!("Invalid API URL '{}': {}", url, e),
                })
            })
            .transpose()?;

        let model = self
            .model
            .as_ref()
            .filter(|model| !model.trim().is_empty())
            .map(|model| ModelName::new(model.trim().to_string()));

        Ok(InferenceOptions::new(
            self.provider.into(),
            api_key,
            model,
            api_url,
        ))
    }
}

pub fn extraction_mode(structured: bool) -> ExtractionMode {
    if structured {
        ExtractionMode::Workout
    } else {
        ExtractionMode::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceProviderOptions;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).expect("arguments should parse")
    }

    fn extractor_args(cli: CliArgs) -> ExtractorArgs {
        match cli.command {
            CliCommand::Scan { extractor_args, .. } => extractor_args,
        }
    }

    #[test]
    fn scan_defaults_to_print_png_and_gemini() {
        let cli = parse(&["workout-scan", "scan"]);
        match cli.command {
            CliCommand::Scan {
                image_path,
                structured,
                extractor_args,
            } => {
                assert_eq!(image_path, "print.png");
                assert!(!structured);
                assert_eq!(extractor_args.provider, ProviderType::GeminiLlm);
                assert_eq!(extractor_args.api_key_env, "API_KEY");
            }
        }
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let args = extractor_args(parse(&["workout-scan", "scan", "treino.png"]));

        match args.resolve_options(|_| None) {
            Err(AppError::CredentialNotFound { env_var }) => assert_eq!(env_var, "API_KEY"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn blank_credential_is_rejected() {
        let args = extractor_args(parse(&[
            "workout-scan",
            "scan",
            "--api-key-env",
            "GEMINI_KEY",
        ]));

        let result = args.resolve_options(|name| {
            assert_eq!(name, "GEMINI_KEY");
            Some("   ".to_string())
        });

        assert!(matches!(
            result,
            Err(AppError::CredentialNotFound { env_var }) if env_var == "GEMINI_KEY"
        ));
    }

    #[test]
    fn resolves_open_ai_options() {
        let args = extractor_args(parse(&[
            "workout-scan",
            "scan",
            "--provider",
            "open-ai-llm",
            "--model",
            "gpt-4o",
            "--api-url",
            "http://localhost:4000",
        ]));

        let options = args
            .resolve_options(|_| Some("secret".to_string()))
            .unwrap();

        match options.provider_options {
            InferenceProviderOptions::OpenAiLlm(open_ai) => {
                assert_eq!(open_ai.api_key.value(), "secret");
                assert_eq!(open_ai.model_name(), "gpt-4o");
                assert_eq!(
                    open_ai.api_url.map(|url| url.to_string()),
                    Some("http://localhost:4000/".to_string())
                );
            }
            other => panic!("Unexpected provider options: {:?}", other),
        }
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let args = extractor_args(parse(&["workout-scan", "scan", "--api-url", "not a url"]));

        let result = args.resolve_options(|_| Some("secret".to_string()));

        assert!(matches!(
            result,
            Err(AppError::InferenceConfigError { .. })
        ));
    }

    #[test]
    fn structured_flag_selects_workout_mode() {
        match parse(&["workout-scan", "scan", "-s", "print.jpg"]).command {
            CliCommand::Scan {
                image_path,
                structured,
                ..
            } => {
                assert_eq!(image_path, "print.jpg");
                assert_eq!(extraction_mode(structured), ExtractionMode::Workout);
            }
        }
        assert_eq!(extraction_mode(false), ExtractionMode::Text);
    }
}
