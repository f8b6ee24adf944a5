use console::{measure_text_width, pad_str, Alignment};
use serde::Deserialize;

use crate::AppResult;

const NAME_HEADER: &str = "Exercício";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutScan {
    #[serde(default)]
    pub workout_name: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ScannedExercise>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedExercise {
    pub name: String,
    #[serde(default)]
    pub sets_count: Option<f64>,
    #[serde(default)]
    pub reps_suggested: Option<f64>,
}

impl WorkoutScan {
    /// Models sometimes wrap JSON in a markdown code fence even when asked not to.
    pub fn parse(text: &str) -> AppResult<Self> {
        let trimmed = text.trim();
        let json = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.trim_end().strip_suffix("```"))
            .unwrap_or(trimmed);
        Ok(serde_json::from_str(json.trim())?)
    }

    pub fn gemini_response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "workoutName": { "type": "STRING" },
                "exercises": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "setsCount": { "type": "NUMBER" },
                            "repsSuggested": { "type": "NUMBER" }
                        },
                        "required": ["name"]
                    }
                }
            }
        })
    }

    pub fn render_lines(&self) -> Vec<String> {
        let name_width = self
            .exercises
            .iter()
            .map(|exercise| measure_text_width(&exercise.name))
            .max()
            .unwrap_or(0)
            .max(measure_text_width(NAME_HEADER))
            + 2;

        let mut lines = Vec::with_capacity(self.exercises.len() + 2);
        if let Some(workout_name) = self.workout_name.as_ref().filter(|n| !n.trim().is_empty()) {
            lines.push(format!("Treino: {}", workout_name.trim()));
        }
        if self.exercises.is_empty() {
            lines.push("Nenhum exercício encontrado.".to_string());
            return lines;
        }
        lines.push(format!(
            "{}{}{}",
            pad_str(NAME_HEADER, name_width, Alignment::Left, None),
            pad_str("Séries", 8, Alignment::Left, None),
            "Repetições"
        ));
        for exercise in &self.exercises {
            lines.push(
                format!(
                    "{}{}{}",
                    pad_str(&exercise.name, name_width, Alignment::Left, None),
                    pad_str(&format_count(exercise.sets_count), 8, Alignment::Left, None),
                    format_count(exercise.reps_suggested)
                )
                .trim_end()
                .to_string(),
            );
        }
        lines
    }
}

fn format_count(count: Option<f64>) -> String {
    match count {
        Some(value) if value.fract() == 0.0 => format!("{}", value as i64),
        Some(value) => format!("{}", value),
        None => "-".to_string(),
    }
}
