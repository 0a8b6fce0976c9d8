use mindrag_core::config::Config;
use mindrag_embed::load_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = load_embedder(&settings.embedding)?;
    let texts = vec!["Topic: Budget introduced by Alice".to_string(), "Relationship: Alice agrees_with Bob".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("model={} B={} dim={}", embedder.model_id(), embs.len(), embedder.dim());
    Ok(())
}
