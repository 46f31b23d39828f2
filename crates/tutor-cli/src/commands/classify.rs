use anyhow::Result;
use tutor_core::classification::classify;

pub fn run(question: &str) -> Result<()> {
    let classification = classify(question, &[]);
    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}
