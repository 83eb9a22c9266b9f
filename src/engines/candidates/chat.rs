use crate::{
    config::GeneratorConfig,
    engines::candidates::CandidateGenerator,
    error::{Result, StratevolveError},
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Writes Pine Script strategies through an OpenAI-compatible
/// chat-completions endpoint.
pub struct ChatCompletionGenerator {
    client: Client,
    config: GeneratorConfig,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatCompletionGenerator {
    pub fn new(config: GeneratorConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Reads the API key from the variable named by `config.api_key_env`
    pub fn from_env(config: GeneratorConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StratevolveError::Configuration(format!(
                    "{} environment variable is not set",
                    config.api_key_env
                ))
            })?;
        Self::new(config, api_key)
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.config.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StratevolveError::Generation(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        let reply: ChatResponse = response.json()?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| extract_code(&content))
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| {
                StratevolveError::Generation("Completion contained no strategy text".to_string())
            })?;

        Ok(content)
    }
}

impl CandidateGenerator for ChatCompletionGenerator {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        log::info!("Generating new strategy via {}", self.config.model);
        self.ask(&generate_prompt(prompt))
    }

    fn rewrite(&mut self, existing_source: &str, prompt: &str) -> Result<String> {
        log::info!("Rewriting existing strategy via {}", self.config.model);
        self.ask(&rewrite_prompt(existing_source, prompt))
    }
}

fn generate_prompt(prompt: &str) -> String {
    format!(
        "Please produce a TradingView Pine Script (version 5) strategy that meets the following \
         requirements: {}\nMake sure it includes strategy() declaration and basic entry/exit logic.",
        prompt
    )
}

fn rewrite_prompt(existing_source: &str, prompt: &str) -> String {
    format!(
        "Here is an existing Pine Script strategy. Please modify it to satisfy the following \
         requirements: {}\nExisting code is below:\n```pine\n{}\n```",
        prompt, existing_source
    )
}

/// Body of the first fenced code block, or the whole reply when unfenced
fn extract_code(reply: &str) -> String {
    let Some(start) = reply.find("```") else {
        return reply.trim().to_string();
    };
    let after_fence = &reply[start + 3..];
    // Skip the language tag on the opening fence line
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
    let body = &after_fence[body_start..];
    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim().to_string()
}
