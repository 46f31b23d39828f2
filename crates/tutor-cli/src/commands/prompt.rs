use std::path::Path;

use anyhow::{Context, Result};
use tutor_core::classification::classify;
use tutor_core::prompt::PromptComposer;
use tutor_infrastructure::corpus::load_curriculum_index;

use super::utils::{load_config, parse_grade, parse_subject};

/// Renders the prompt offline. Lesson requests get the lesson description as
/// context when no context file is given.
pub fn run(grade: &str, subject: &str, context_file: Option<&Path>, question: &str) -> Result<()> {
    let grade = parse_grade(grade)?;
    let subject = parse_subject(subject)?;
    let config = load_config()?;
    let curriculum = load_curriculum_index(config.curriculum_index.as_deref())?;

    let context = match context_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => curriculum
            .detect_lesson_request(question, grade, subject)
            .map(|request| request.info.describe()),
    };

    let classification = classify(question, &[]);
    let composer = PromptComposer::new()?;
    let prompt = composer.compose(
        question,
        &classification,
        grade,
        subject,
        context.as_deref(),
        None,
    )?;
    println!("{prompt}");
    Ok(())
}
