use bytes::Bytes;
use mime::Mime;
use rvstruct::ValueStruct;
use std::fmt::{Debug, Formatter};

#[derive(Clone, ValueStruct)]
pub struct ApiKey(String);

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, ValueStruct)]
pub struct ModelName(String);

#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: String,
    pub mime_type: Mime,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Free-form transcription echoed verbatim.
    Text,
    /// JSON workout description parsed into [`crate::workout::WorkoutScan`].
    Workout,
}

impl ExtractionMode {
    const TEXT_INSTRUCTION: &'static str = "Analise este print. Extraia todo o texto visível, especialmente nomes de exercícios, séries e repetições se houver.";
    const WORKOUT_INSTRUCTION: &'static str = "Analise este print de treino. Extraia os nomes dos exercícios, a quantidade de séries e repetições sugeridas. Retorne estritamente um JSON estruturado.";

    pub fn instruction(&self) -> &'static str {
        match self {
            ExtractionMode::Text => Self::TEXT_INSTRUCTION,
            ExtractionMode::Workout => Self::WORKOUT_INSTRUCTION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub instruction: &'static str,
    pub mode: ExtractionMode,
    pub image: ImageAsset,
}

impl ExtractionRequest {
    pub fn new(mode: ExtractionMode, image: ImageAsset) -> Self {
        Self {
            instruction: mode.instruction(),
            mode,
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
}
