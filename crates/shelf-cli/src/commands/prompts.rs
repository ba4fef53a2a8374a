//! Prompt template inspection
//!
//! Operators reword the explanation prompt by dropping `<id>.md` into the
//! override directory. These commands show what is active and which template
//! variables an override can use.

use anyhow::{anyhow, Result};
use shelf_core::{AppConfig, Prompt, PromptId};

use super::truncate;

/// One row per prompt: source and the variables it reads
pub fn cmd_prompts_list(config: &AppConfig) -> Result<()> {
    let mut library = config.prompts.library();

    println!("{:<18} {:>3}  {:<9} {:<40}", "PROMPT", "V", "SOURCE", "VARIABLES");
    for &id in PromptId::all() {
        let prompt = library.get(id)?;
        let source = if prompt.is_override { "override" } else { "embedded" };
        println!(
            "{:<18} {:>3}  {:<9} {:<40}",
            id.as_str(),
            prompt.metadata.version,
            source,
            truncate(&prompt.placeholders().join(", "), 40)
        );
    }

    match library.override_dir() {
        Some(dir) => println!("\nOverrides are read from {}", dir.display()),
        None => println!("\nNo override directory available on this system"),
    }
    Ok(())
}

/// Print one prompt's header and template body
pub fn cmd_prompts_show(config: &AppConfig, prompt_id: &str) -> Result<()> {
    println!("{}", describe_prompt(config, prompt_id)?);
    Ok(())
}

/// Header and template body for `prompt_id`
pub fn describe_prompt(config: &AppConfig, prompt_id: &str) -> Result<String> {
    let id: PromptId = prompt_id.parse().map_err(|_| {
        let known: Vec<&str> = PromptId::all().iter().map(|id| id.as_str()).collect();
        anyhow!("Unknown prompt '{}' (known: {})", prompt_id, known.join(", "))
    })?;

    let mut library = config.prompts.library();
    let prompt = library.get(id)?;
    Ok(format_prompt(prompt))
}

fn format_prompt(prompt: &Prompt) -> String {
    let mut out = format!("# {} v{}\n", prompt.metadata.id, prompt.metadata.version);
    if !prompt.metadata.description.is_empty() {
        out.push_str(&format!("# {}\n", prompt.metadata.description));
    }
    match &prompt.override_path {
        Some(path) => out.push_str(&format!("# override: {}\n", path.display())),
        None => out.push_str("# embedded default\n"),
    }
    out.push_str(&format!("# variables: {}\n", prompt.placeholders().join(", ")));
    let flags = prompt.conditions();
    if !flags.is_empty() {
        out.push_str(&format!("# flags: {}\n", flags.join(", ")));
    }
    out.push('\n');
    out.push_str(&prompt.content);
    out
}

/// Print the override directory and the file each prompt would load from it
pub fn cmd_prompts_path(config: &AppConfig) -> Result<()> {
    let library = config.prompts.library();
    let Some(dir) = library.override_dir() else {
        eprintln!("No override directory available; set SHELF_PROMPTS_DIR");
        return Ok(());
    };

    println!("{}", dir.display());
    for &id in PromptId::all() {
        let marker = if library.has_override(id) { "active" } else { "-" };
        println!("  {}.md  {}", id.as_str(), marker);
    }
    Ok(())
}
