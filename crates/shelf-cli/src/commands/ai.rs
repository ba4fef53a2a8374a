//! AI backend test command

use std::time::Instant;

use anyhow::Result;
use shelf_core::{AIBackend, AIClient, AppConfig, ExplainRequest, Explainer, Surface};
use tracing::info;

/// What `ai-test` found
#[derive(Debug, PartialEq)]
pub enum AiTestOutcome {
    /// No backend configured (missing credential, or disabled)
    NotConfigured,
    /// Health check failed or timed out
    Unreachable { host: String },
    /// Reachable, but the generation failed
    Failed(String),
    Responded { text: String, elapsed_ms: u128 },
}

/// Check the configured backend and run one sample generation
pub async fn cmd_ai_test(config: &AppConfig, model: Option<&str>, prompt: Option<&str>) -> Result<()> {
    println!("🔍 Testing AI backend...\n");
    println!("  Backend: {}", config.ai.backend);
    println!("  Timeout: {}s", config.ai.timeout.as_secs());

    match run_ai_test(config, model, prompt).await? {
        AiTestOutcome::NotConfigured => {
            println!("\n⚠️  No AI backend configured");
            println!("\nTo enable explanations:");
            println!("  export GOOGLE_API_KEY=<your key>");
            println!("  or set SHELF_AI_BACKEND=ollama with OLLAMA_HOST");
        }
        AiTestOutcome::Unreachable { host } => {
            println!("\n❌ Could not reach {}", host);
        }
        AiTestOutcome::Failed(reason) => {
            println!("\n❌ {}", reason);
        }
        AiTestOutcome::Responded { text, elapsed_ms } => {
            println!("\n✅ Connected");
            println!("\n📝 Response ({} ms):\n", elapsed_ms);
            println!("{}", text);
        }
    }

    Ok(())
}

/// Run the health check and one generation, without printing
pub async fn run_ai_test(
    config: &AppConfig,
    model: Option<&str>,
    prompt: Option<&str>,
) -> Result<AiTestOutcome> {
    let Some(client) = AIClient::from_config(&config.ai) else {
        return Ok(AiTestOutcome::NotConfigured);
    };
    let client = match model {
        Some(model) => client.with_model(model),
        None => client,
    };
    let host = client.host().to_string();
    info!(host = %host, model = client.model(), "Testing AI backend");

    let explainer = Explainer::new(
        Some(client.clone()),
        &mut config.prompts.library(),
        config.ai.timeout,
    )?;

    if !explainer.backend_healthy().await {
        return Ok(AiTestOutcome::Unreachable { host });
    }

    let started = Instant::now();
    let text = match prompt {
        Some(prompt) => match tokio::time::timeout(config.ai.timeout, client.complete(prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Ok(AiTestOutcome::Failed(format!("Error: {}", e))),
            Err(_) => {
                return Ok(AiTestOutcome::Failed(format!(
                    "Timed out after {}s",
                    config.ai.timeout.as_secs()
                )))
            }
        },
        None => {
            let explanation = explainer.explain(&sample_request()).await;
            if !explanation.is_generated() {
                return Ok(AiTestOutcome::Failed(
                    "Sample explanation failed (see log)".to_string(),
                ));
            }
            explanation.into_text(Surface::Online)
        }
    };

    Ok(AiTestOutcome::Responded {
        text: text.trim().to_string(),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

fn sample_request() -> ExplainRequest {
    ExplainRequest {
        title: Some("왓치맨".into()),
        original_title: Some("Watchmen".into()),
        stock_status: "in stock".into(),
        page_per_cost: 1.28,
    }
}
