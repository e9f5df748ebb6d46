//! Client for the AI gateway.
//!
//! The gateway is an OpenAI-compatible chat-completions service used as an
//! external collaborator: it rephrases rationale text, produces schedule
//! insights, and analyzes task difficulty. The mechanical planning logic
//! never depends on it -- every caller has a deterministic fallback in
//! [`fallback`].

pub mod fallback;

use chrono::{DateTime, Utc};
use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::plan::WorkItem;
use crate::rebalance::ScheduleChange;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "STUDYFLOW_API_KEY";

/// Gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL up to and including the API version segment.
    pub base_url: String,
    /// Model identifier passed through to the gateway.
    pub model: String,
    /// Bearer key; falls back to `STUDYFLOW_API_KEY` when `None`.
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

/// Kind of insight the gateway may attach to an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Suggestion,
    Warning,
    Improvement,
}

/// A piece of advice attached to a schedule optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

/// A gateway-phrased replacement for a change's template reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RephrasedReason {
    pub item_id: String,
    pub reason: String,
}

/// Gateway output layered on top of the mechanical schedule changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptimization {
    #[serde(default)]
    pub reasons: Vec<RephrasedReason>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    pub overall_summary: String,
}

impl ScheduleOptimization {
    /// Overwrite each change's reason with the gateway phrasing, matched
    /// by item id. Changes without a rephrasing keep their template text.
    pub fn apply_reasons(&self, changes: &mut [ScheduleChange]) {
        for rephrased in &self.reasons {
            if let Some(change) = changes.iter_mut().find(|c| c.item_id == rephrased.item_id) {
                change.reason = rephrased.reason.clone();
            }
        }
    }
}

/// Difficulty analysis for a single task or topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyAnalysis {
    /// 1 (trivial) to 10 (very hard).
    pub difficulty_score: u8,
    pub difficulty_label: String,
    pub reasoning: Vec<String>,
    pub estimated_time_minutes: i64,
    /// 0-100 confidence in the assessment.
    pub confidence: u8,
}

/// Async client for the chat-completions gateway.
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Result<String, GatewayError> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)
    }

    /// Ask the gateway to phrase reasons and produce insights for a set of
    /// mechanical schedule changes.
    pub async fn optimize_schedule(
        &self,
        items: &[WorkItem],
        changes: &[ScheduleChange],
        now: DateTime<Utc>,
    ) -> Result<ScheduleOptimization, GatewayError> {
        let system = indoc! {"
            You are a study schedule assistant. You are given mechanical
            schedule changes that have already been decided. Phrase a short,
            encouraging reason for each change and point out anything the
            student should know about their workload. Never propose
            different dates.
        "};

        let task_list: Vec<Value> = items
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "title": t.title,
                    "subject": t.subject_or_general(),
                    "priority": t.priority.as_str(),
                    "due_or_start": t.due_or_start,
                    "duration_minutes": t.duration_minutes,
                })
            })
            .collect();

        let user = format!(
            "TODAY: {}\n\nPENDING ITEMS:\n{}\n\nDECIDED CHANGES:\n{}",
            now.date_naive(),
            serde_json::to_string_pretty(&task_list).unwrap_or_default(),
            serde_json::to_string_pretty(changes).unwrap_or_default(),
        );

        let tool = json!({
            "type": "function",
            "function": {
                "name": "annotate_schedule",
                "description": "Attach phrasing and insights to decided schedule changes",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "reasons": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "item_id": { "type": "string" },
                                    "reason": { "type": "string" }
                                },
                                "required": ["item_id", "reason"]
                            }
                        },
                        "insights": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "type": { "type": "string", "enum": ["suggestion", "warning", "improvement"] },
                                    "title": { "type": "string" },
                                    "description": { "type": "string" }
                                },
                                "required": ["type", "title", "description"]
                            }
                        },
                        "overall_summary": { "type": "string" }
                    },
                    "required": ["overall_summary"]
                }
            }
        });

        let args = self.call_tool(system, &user, tool, "annotate_schedule").await?;
        serde_json::from_value(args)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }

    /// Ask the gateway for a difficulty analysis of a study task.
    pub async fn analyze_difficulty(
        &self,
        title: &str,
        subject: Option<&str>,
    ) -> Result<DifficultyAnalysis, GatewayError> {
        let system = indoc! {"
            You are an educational difficulty analyzer. Given a study task,
            assess how hard it is for a student and how long it will take.
            Respond only via the suggest_difficulty function.
        "};

        let user = format!(
            "Analyze the difficulty of this study task:\nTitle: {title}\nSubject: {}",
            subject.unwrap_or("General"),
        );

        let tool = json!({
            "type": "function",
            "function": {
                "name": "suggest_difficulty",
                "description": "Return a difficulty analysis for the task",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "difficulty_score": { "type": "integer", "minimum": 1, "maximum": 10 },
                        "difficulty_label": { "type": "string" },
                        "reasoning": { "type": "array", "items": { "type": "string" } },
                        "estimated_time_minutes": { "type": "integer" },
                        "confidence": { "type": "integer", "minimum": 0, "maximum": 100 }
                    },
                    "required": [
                        "difficulty_score",
                        "difficulty_label",
                        "reasoning",
                        "estimated_time_minutes",
                        "confidence"
                    ]
                }
            }
        });

        let args = self.call_tool(system, &user, tool, "suggest_difficulty").await?;
        serde_json::from_value(args)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }

    /// POST a chat completion with a forced tool call and return the parsed
    /// tool-call arguments.
    async fn call_tool(
        &self,
        system: &str,
        user: &str,
        tool: Value,
        tool_name: &str,
    ) -> Result<Value, GatewayError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "tools": [tool],
            "tool_choice": { "type": "function", "function": { "name": tool_name } },
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        match resp.status().as_u16() {
            429 => return Err(GatewayError::RateLimited),
            402 => return Err(GatewayError::CreditsExhausted),
            status if !resp.status().is_success() => return Err(GatewayError::Status(status)),
            _ => {}
        }

        let data: Value = resp.json().await?;
        let args = data["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::MalformedResponse("missing tool call arguments".to_string())
            })?;

        serde_json::from_str(args).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ItemKind;

    fn config_for(server: &mockito::ServerGuard) -> GatewayConfig {
        GatewayConfig {
            base_url: server.url(),
            model: "test-model".to_string(),
            api_key: Some("test-key".to_string()),
        }
    }

    fn tool_call_body(arguments: &Value) -> String {
        json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": {
                            "name": "whatever",
                            "arguments": arguments.to_string(),
                        }
                    }]
                }
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn optimize_schedule_parses_tool_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tool_call_body(&json!({
                "reasons": [{ "item_id": "i1", "reason": "Your Friday is free." }],
                "insights": [{
                    "type": "warning",
                    "title": "Heavy Tuesday",
                    "description": "Tuesday still carries three tasks."
                }],
                "overall_summary": "Moved one task to Friday."
            })))
            .create_async()
            .await;

        let client = GatewayClient::new(config_for(&server));
        let item = WorkItem::new("Essay", ItemKind::Task);
        let result = client
            .optimize_schedule(&[item], &[], Utc::now())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.reasons.len(), 1);
        assert_eq!(result.insights[0].kind, InsightKind::Warning);
        assert_eq!(result.overall_summary, "Moved one task to Friday.");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_dedicated_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .create_async()
            .await;

        let client = GatewayClient::new(config_for(&server));
        let err = client
            .analyze_difficulty("Essay", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited));
    }

    #[tokio::test]
    async fn missing_tool_call_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"plain text"}}]}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(config_for(&server));
        let err = client
            .analyze_difficulty("Essay", Some("History"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn apply_reasons_matches_by_item_id() {
        use crate::rebalance::MoveReason;

        let mut changes = vec![ScheduleChange {
            item_id: "i1".to_string(),
            item_title: "Essay".to_string(),
            subject: None,
            original_date: None,
            new_date: Utc::now(),
            kind: MoveReason::EmptyDay,
            reason: "template text".to_string(),
        }];

        let optimization = ScheduleOptimization {
            reasons: vec![RephrasedReason {
                item_id: "i1".to_string(),
                reason: "phrased text".to_string(),
            }],
            insights: Vec::new(),
            overall_summary: String::new(),
        };

        optimization.apply_reasons(&mut changes);
        assert_eq!(changes[0].reason, "phrased text");
    }
}
