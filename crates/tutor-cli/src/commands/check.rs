use anyhow::Result;
use tutor_interaction::probe_services;

pub async fn run() -> Result<()> {
    let config = super::utils::load_config()?;
    let secrets = super::utils::load_secrets().await?;

    println!("🔍 Probing services...");
    let services = probe_services(&config, &secrets).await?;
    let caps = &services.capabilities;

    let mark = |ok: bool| if ok { "✅" } else { "❌" };
    println!("{} Model client ({})", mark(caps.model_client), config.model_name);
    println!("{} Vector store ({})", mark(caps.retrieval), config.chroma_url);
    println!(
        "{} Embeddings ({})",
        mark(caps.embedding_model.is_some()),
        caps.embedding_model.as_deref().unwrap_or("none of the configured models answered")
    );

    if !caps.model_client {
        anyhow::bail!("Model client unavailable: {}", caps.summary());
    }
    if !caps.retrieval_ready() {
        println!("⚠️  Curriculum search disabled; answers will use general knowledge only.");
    }
    Ok(())
}
