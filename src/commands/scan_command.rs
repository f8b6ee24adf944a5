use crate::common_types::ExtractionMode;
use crate::extractor::ScreenshotTextExtractor;
use crate::inference::{InferenceOptions, InferenceServices};
use crate::reporter::AppReporter;
use crate::AppResult;
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub struct ScanCommandResult {
    pub text_extracted: bool,
}

pub async fn command_scan(
    term: &Term,
    image_path: &str,
    mode: ExtractionMode,
    inference_options: InferenceOptions,
) -> AppResult<ScanCommandResult> {
    let bold_style = Style::new().bold();
    term.write_line(
        format!(
            "Scanning {} using {}.",
            bold_style.clone().white().apply_to(image_path),
            bold_style.clone().yellow().apply_to(&inference_options)
        )
        .as_str(),
    )?;

    // A hidden bar swallows println, so plain terminals report directly.
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::term(term.clone(), 20));
    let app_reporter = if term.is_term() {
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg}",
        )?);
        bar.set_message("Waiting for the inference service...");
        bar.enable_steady_tick(Duration::from_millis(100));
        AppReporter::from(&bar)
    } else {
        AppReporter::from(term)
    };

    let service = InferenceServices::new_inference_service(&inference_options, &app_reporter)?;
    let extractor = ScreenshotTextExtractor::new(service, mode, &app_reporter);
    let text_extracted = extractor.extract_and_report(image_path).await;
    bar.finish_and_clear();

    Ok(ScanCommandResult {
        text_extracted: text_extracted?,
    })
}
