//! `botchat answers` and `botchat ask`: work on the answer table directly.

use bc_domain::config::Config;
use bc_domain::Responder;
use std::sync::Arc;

pub fn list(config: &Config) -> anyhow::Result<()> {
    let table = config.chat.answer_table()?;
    let width = table
        .entries()
        .iter()
        .map(|e| e.question.chars().count())
        .max()
        .unwrap_or(0);

    for entry in table.entries() {
        println!("{:<width$}  {}", entry.question, entry.answer);
    }
    eprintln!("{} entries", table.len());
    Ok(())
}

/// Lint the table. Returns `false` when anything was found.
pub fn check(config: &Config) -> anyhow::Result<bool> {
    let table = config.chat.answer_table()?;
    let findings = table.lint();

    if findings.is_empty() {
        println!("Answer table OK ({} entries)", table.len());
        return Ok(true);
    }
    for finding in &findings {
        println!("{finding}");
    }
    println!("\n{} finding(s)", findings.len());
    Ok(false)
}

/// Run the responder once and print the reply text.
pub fn ask(config: &Config, utterance: &str) -> anyhow::Result<()> {
    let table = Arc::new(config.chat.answer_table()?);
    let responder = Responder::new(table).with_fallback(config.chat.fallback.clone());
    println!("{}", responder.respond(utterance).text());
    Ok(())
}
