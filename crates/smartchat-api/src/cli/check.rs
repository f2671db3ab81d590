//! `smartchat check`: configuration and connectivity self-test.

use anyhow::Result;
use console::style;

use smartchat_core::codehost::CodeHost;
use smartchat_core::inference::{InferenceBackend, select_model};

use crate::state::AppState;

fn pass(label: &str, detail: impl std::fmt::Display) {
    println!("  {} {label}: {detail}", style("✓").green().bold());
}

fn fail(label: &str, detail: impl std::fmt::Display) {
    println!("  {} {label}: {detail}", style("✗").red().bold());
}

/// Run every check and print the results.
///
/// Returns `Ok(true)` when everything required for serving passed. GitHub
/// is optional and only fails the check when a token is configured but
/// does not work.
pub async fn run_check(state: &AppState) -> Result<bool> {
    let mut healthy = true;

    println!();
    println!(
        "  {} Smart Chatbot v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Configuración ──").dim());
    let problems = state.config.validate();
    if problems.is_empty() {
        pass("Configuración", "válida");
    } else {
        healthy = false;
        for problem in &problems {
            fail("Configuración", problem);
        }
    }
    println!();

    println!("  {}", style("── Ollama ──").dim());
    if state.ollama.ping().await {
        pass("Servidor", state.ollama.base_url());
        match state.ollama.list_models().await {
            Ok(models) => {
                let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
                pass("Modelos", names.join(", "));
                if let Ok(model) = select_model(&models, state.config.model_preference()) {
                    pass("Modelo seleccionado", style(&model.name).cyan());
                }
            }
            Err(err) => {
                healthy = false;
                fail("Modelos", err.user_message());
            }
        }
    } else {
        healthy = false;
        fail(
            "Servidor",
            format!("no responde en {}", state.ollama.base_url()),
        );
        println!(
            "    {}",
            style("Inicia Ollama con `ollama serve` y descarga un modelo con `ollama pull phi3`").dim()
        );
    }
    println!();

    println!("  {}", style("── GitHub ──").dim());
    if state.github.is_configured() {
        match state.github.first_owned_repository().await {
            Ok(repo) => pass("Token", format!("repositorio inicial {}", repo.full_name())),
            Err(err) => {
                healthy = false;
                fail("Token", err);
            }
        }
    } else {
        println!(
            "  {} GitHub: {}",
            style("-").dim(),
            style("no configurado (GITHUB_TOKEN)").dim()
        );
    }
    println!();

    if healthy {
        println!("  {}", style("Todo listo.").green().bold());
    } else {
        println!("  {}", style("Hay problemas que resolver.").red().bold());
    }

    Ok(healthy)
}
