use anyhow::{Context, Result};
use tutor_core::config::{SecretConfig, TutorConfig};
use tutor_core::curriculum::{Grade, Subject};
use tutor_core::secret::SecretService;
use tutor_infrastructure::SecretServiceImpl;
use tutor_infrastructure::storage::ConfigStorage;

/// Loads `config.toml` with `TUTOR_*` overrides.
pub fn load_config() -> Result<TutorConfig> {
    let storage = ConfigStorage::new()?;
    storage
        .load_from_env()
        .with_context(|| format!("Failed to load {}", storage.path().display()))
}

/// Loads and validates the secrets file with environment fallback.
pub async fn load_secrets() -> Result<SecretConfig> {
    let service = SecretServiceImpl::new()?;
    service.load_secrets().await.map_err(anyhow::Error::msg)
}

/// Accepts `grade_3` or `3`.
pub fn parse_grade(value: &str) -> Result<Grade> {
    let value = value.trim();
    let key = if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        format!("grade_{value}")
    } else {
        value.to_string()
    };
    Ok(Grade::parse_key(&key)?)
}

pub fn parse_subject(value: &str) -> Result<Subject> {
    Ok(Subject::parse_key(value)?)
}

/// The selections named on the command line; every pair when a side is omitted.
pub fn selections(grade: Option<&str>, subject: Option<&str>) -> Result<Vec<(Grade, Subject)>> {
    let grades = match grade {
        Some(value) => vec![parse_grade(value)?],
        None => Grade::all().collect(),
    };
    let subjects = match subject {
        Some(value) => vec![parse_subject(value)?],
        None => Subject::all().collect(),
    };
    Ok(grades
        .iter()
        .flat_map(|&g| subjects.iter().map(move |&s| (g, s)))
        .collect())
}
