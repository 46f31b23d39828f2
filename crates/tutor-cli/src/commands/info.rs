use anyhow::Result;
use tutor_interaction::{KnowledgeBaseManager, probe_services};

use super::utils::{load_config, load_secrets, parse_grade, parse_subject};

pub async fn run(grade: &str, subject: &str) -> Result<()> {
    let grade = parse_grade(grade)?;
    let subject = parse_subject(subject)?;
    let config = load_config()?;
    let secrets = load_secrets().await?;
    let services = probe_services(&config, &secrets).await?;

    let (Some(store), Some(embedder)) = (services.store.clone(), services.embedder.clone()) else {
        anyhow::bail!("Knowledge base unavailable: {}", services.capabilities.summary());
    };

    let manager = KnowledgeBaseManager::open(grade, subject, store, embedder, &config).await?;
    let info = manager.info().await;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
