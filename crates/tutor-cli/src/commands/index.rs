use anyhow::{Context, Result};
use tutor_interaction::{KnowledgeBaseManager, probe_services};

use super::utils::{load_config, load_secrets, selections};

/// Builds every selected collection that is still empty.
///
/// Non-empty collections are left alone so re-running never duplicates
/// chunks.
pub async fn run(grade: Option<&str>, subject: Option<&str>) -> Result<()> {
    let pairs = selections(grade, subject)?;
    let config = load_config()?;
    let secrets = load_secrets().await?;
    let services = probe_services(&config, &secrets).await?;

    let (store, embedder) = match (services.store.clone(), services.embedder.clone()) {
        (Some(store), Some(embedder)) => (store, embedder),
        _ => anyhow::bail!(
            "Indexing needs a vector store and an embedding model ({})",
            services.capabilities.summary()
        ),
    };

    let mut total = 0;
    for (grade, subject) in pairs {
        let manager =
            KnowledgeBaseManager::open(grade, subject, store.clone(), embedder.clone(), &config)
                .await
                .with_context(|| format!("Failed to open collection for {grade} / {subject}"))?;

        let existing = manager.document_count().await?;
        if existing > 0 {
            println!("⏭️  {grade}/{subject}: {existing} chunks already indexed");
            continue;
        }

        let added = manager.build_from_corpus().await?;
        if added == 0 {
            println!(
                "⚠️  {grade}/{subject}: no documents in {}",
                manager.docs_path().display()
            );
        } else {
            println!("✅ {grade}/{subject}: indexed {added} chunks");
        }
        total += added;
    }

    println!("Done: {total} chunks added.");
    Ok(())
}
