use crate::common_types::{ExtractionMode, ExtractionRequest, ExtractionResult};
use crate::errors::AppError;
use crate::image_assets::load_image_asset;
use crate::inference::ImageTextInference;
use crate::reporter::AppReporter;
use crate::workout::WorkoutScan;
use crate::AppResult;

pub const EXTRACTED_TEXT_HEADER: &str = "--- TEXTO EXTRAÍDO ---";
pub const EXTRACTED_TEXT_FOOTER: &str = "----------------------";

/// Sends one screenshot to an inference service and prints what it read.
pub struct ScreenshotTextExtractor<'a, S: ImageTextInference> {
    service: S,
    mode: ExtractionMode,
    reporter: &'a AppReporter<'a>,
}

impl<'a, S: ImageTextInference> ScreenshotTextExtractor<'a, S> {
    pub fn new(service: S, mode: ExtractionMode, reporter: &'a AppReporter<'a>) -> Self {
        Self {
            service,
            mode,
            reporter,
        }
    }

    pub async fn extract_text(&self, image_path: &str) -> AppResult<ExtractionResult> {
        self.reporter
            .report(format!("Lendo o arquivo: {}...", image_path))?;

        let image = load_image_asset(image_path).await?;
        let request = ExtractionRequest::new(self.mode, image);
        tracing::debug!(
            "Requesting {:?} extraction from {}",
            self.mode,
            self.service.provider_type()
        );
        let text = self.service.infer(&request).await?;

        Ok(ExtractionResult { text })
    }

    /// Runs [`Self::extract_text`] and prints either the framed result or a single
    /// diagnostic line. Only failures to write the output itself are returned as errors.
    pub async fn extract_and_report(&self, image_path: &str) -> AppResult<bool> {
        let rendered = match self.extract_text(image_path).await {
            Ok(result) => self.render_result(&result),
            Err(err) => Err(err),
        };

        match rendered {
            Ok(lines) => {
                self.reporter.report(format!("\n{}", EXTRACTED_TEXT_HEADER))?;
                for line in lines {
                    self.reporter.report(line)?;
                }
                self.reporter.report(format!("{}\n", EXTRACTED_TEXT_FOOTER))?;
                Ok(true)
            }
            Err(err) => {
                tracing::debug!("Extraction from {} failed: {:?}", image_path, err);
                self.reporter.report(error_diagnostic(&err))?;
                Ok(false)
            }
        }
    }

    fn render_result(&self, result: &ExtractionResult) -> AppResult<Vec<String>> {
        match self.mode {
            ExtractionMode::Text => Ok(vec![result.text.clone()]),
            ExtractionMode::Workout => Ok(WorkoutScan::parse(&result.text)?.render_lines()),
        }
    }
}

pub fn error_diagnostic(err: &AppError) -> String {
    if err.is_image_not_found() || err.is_configuration_error() {
        format!("Erro: {}", err)
    } else {
        format!("Ocorreu um erro: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceProviderType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubInference {
        response: Result<String, String>,
        calls: AtomicUsize,
    }

    impl StubInference {
        fn replying(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ImageTextInference for &StubInference {
        async fn infer(&self, request: &ExtractionRequest) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!request.image.data.is_empty());
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(AppError::InferenceServiceError {
                    message: message.clone(),
                }),
            }
        }

        fn provider_type(&self) -> InferenceProviderType {
            InferenceProviderType::GeminiLlm
        }
    }

    fn write_test_png(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("print.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .expect("test image should be written");
        path.to_string_lossy().to_string()
    }

    async fn run_extraction(
        stub: &StubInference,
        mode: ExtractionMode,
        image_path: &str,
    ) -> (bool, Vec<String>) {
        let lines = Mutex::new(Vec::new());
        let reporter = AppReporter::from(&lines);
        let extractor = ScreenshotTextExtractor::new(stub, mode, &reporter);
        let succeeded = extractor.extract_and_report(image_path).await.unwrap();
        drop(extractor);
        (succeeded, lines.into_inner().unwrap())
    }

    #[tokio::test]
    async fn prints_service_text_between_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::replying("3x12 Bench Press");

        let (succeeded, lines) = run_extraction(&stub, ExtractionMode::Text, &image_path).await;

        assert!(succeeded);
        assert_eq!(lines[0], format!("Lendo o arquivo: {}...", image_path));
        let header = lines
            .iter()
            .position(|line| line == EXTRACTED_TEXT_HEADER)
            .expect("header line");
        let footer = lines
            .iter()
            .position(|line| line == EXTRACTED_TEXT_FOOTER)
            .expect("footer line");
        assert_eq!(&lines[header + 1..footer], &["3x12 Bench Press".to_string()]);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_file_is_reported_without_calling_service() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("nope.png").to_string_lossy().to_string();
        let stub = StubInference::replying("unused");

        let (succeeded, lines) = run_extraction(&stub, ExtractionMode::Text, &image_path).await;

        assert!(!succeeded);
        assert_eq!(
            lines,
            vec![
                format!("Lendo o arquivo: {}...", image_path),
                format!("Erro: O arquivo '{}' não foi encontrado.", image_path),
            ]
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn service_failure_produces_single_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::failing("quota exceeded");

        let (succeeded, lines) = run_extraction(&stub, ExtractionMode::Text, &image_path).await;

        assert!(!succeeded);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Ocorreu um erro: "));
        assert!(lines[1].contains("quota exceeded"));
        assert!(!lines.iter().any(|line| line == EXTRACTED_TEXT_HEADER));
    }

    #[tokio::test]
    async fn repeated_extraction_prints_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::replying("3x12 Bench Press");

        let (_, first) = run_extraction(&stub, ExtractionMode::Text, &image_path).await;
        let (_, second) = run_extraction(&stub, ExtractionMode::Text, &image_path).await;

        assert_eq!(first, second);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn extract_text_returns_response_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::replying("  Supino 4x10\nRemada 3x12  ");
        let lines = Mutex::new(Vec::new());
        let reporter = AppReporter::from(&lines);
        let extractor = ScreenshotTextExtractor::new(&stub, ExtractionMode::Text, &reporter);

        let result = extractor.extract_text(&image_path).await.unwrap();

        assert_eq!(result.text, "  Supino 4x10\nRemada 3x12  ");
    }

    #[tokio::test]
    async fn workout_mode_renders_parsed_exercises() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::replying(
            r#"{"workoutName":"Treino A","exercises":[{"name":"Bench Press","setsCount":3,"repsSuggested":12}]}"#,
        );

        let (succeeded, lines) = run_extraction(&stub, ExtractionMode::Workout, &image_path).await;

        assert!(succeeded);
        assert!(lines.contains(&"Treino: Treino A".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("Bench Press") && line.ends_with("12")));
    }

    #[tokio::test]
    async fn workout_mode_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_test_png(&dir);
        let stub = StubInference::replying("3x12 Bench Press");

        let (succeeded, lines) = run_extraction(&stub, ExtractionMode::Workout, &image_path).await;

        assert!(!succeeded);
        assert!(lines[1].starts_with("Ocorreu um erro: JSON error"));
    }
}
