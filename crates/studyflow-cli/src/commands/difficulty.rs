//! Difficulty analysis with AI gateway and local heuristic fallback.

use studyflow_core::gateway::{fallback, DifficultyAnalysis, GatewayClient};
use studyflow_core::storage::Config;

pub fn run(title: &str, subject: Option<&str>, ai: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    let analysis: DifficultyAnalysis = if ai && config.gateway.enabled {
        let client = GatewayClient::new(config.gateway_config());
        let runtime = tokio::runtime::Runtime::new()?;
        match runtime.block_on(client.analyze_difficulty(title, subject)) {
            Ok(analysis) => analysis,
            Err(e) => {
                eprintln!("gateway unavailable ({e}); using heuristic estimate");
                fallback::estimate_difficulty(title, subject, 45)
            }
        }
    } else {
        fallback::estimate_difficulty(title, subject, 45)
    };

    println!(
        "{title}: {} ({}/10, ~{} min, confidence {}%)",
        analysis.difficulty_label,
        analysis.difficulty_score,
        analysis.estimated_time_minutes,
        analysis.confidence,
    );
    for line in &analysis.reasoning {
        println!("  - {line}");
    }
    Ok(())
}
