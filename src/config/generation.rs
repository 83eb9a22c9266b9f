use super::traits::ConfigSection;
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};

/// Settings for the chat-completions strategy generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 512,
            system_prompt: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ConfigSection for GeneratorConfig {
    fn section_name() -> &'static str {
        "generation"
    }

    fn validate(&self) -> Result<(), StratevolveError> {
        if self.api_base.trim().is_empty() {
            return Err(StratevolveError::Configuration(
                "generation.api_base must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StratevolveError::Configuration(format!(
                "generation.temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(StratevolveError::Configuration(
                "generation.max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
