use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Estimate, RepaymentTerm};
use crate::error::AdvisoryError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_COMPLETION_TOKENS: u32 = 256;

/// A text-generation backend that turns a numeric summary into a prose
/// suggestion. Best-effort: failures are rendered inline by the caller and
/// never affect the computed analysis.
#[async_trait]
pub trait AdvisoryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Stand-in used when no endpoint is configured, so handlers stay uniform.
#[derive(Debug, Default)]
pub struct DisabledAdvisor;

#[async_trait]
impl AdvisoryGenerator for DisabledAdvisor {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::NotConfigured)
    }
}

/// Free-text summary of a computed analysis, handed to the generator.
pub fn build_prompt(estimate: &Estimate, annual_rate_pct: f64) -> String {
    let timeline = match estimate.term {
        RepaymentTerm::Months(months) => {
            format!("{months} months ({:.2} years)", months as f64 / 12.0)
        }
        RepaymentTerm::Infeasible => "not repayable at the current payment".to_string(),
    };

    let mut prompt = format!(
        "A borrower has a debt-to-income ratio of {:.2}, a loan-to-income ratio of {:.2}, \
         an annual interest rate of {annual_rate_pct:.2}%, and an estimated repayment \
         timeline of {timeline}.",
        estimate.dti_ratio, estimate.loan_to_income_ratio,
    );
    if estimate.recommendations.is_empty() {
        prompt.push_str(" No rule-based advisories fired.");
    } else {
        prompt.push_str(" Advisories already shown to the borrower:");
        for recommendation in &estimate.recommendations {
            prompt.push(' ');
            prompt.push_str(recommendation.message());
        }
    }
    prompt.push_str(" In two or three sentences, suggest one further practical step.");
    prompt
}

/// Generator backed by an OpenAI-style completion endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAdvisor {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl HttpAdvisor {
    pub const ENDPOINT_ENV: &'static str = "LOANPLAN_ADVISORY_URL";
    pub const API_KEY_ENV: &'static str = "LOANPLAN_ADVISORY_API_KEY";
    pub const MODEL_ENV: &'static str = "LOANPLAN_ADVISORY_MODEL";
    const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    /// Reads the endpoint, key, and model from the environment. `None` when no
    /// endpoint is set.
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var(Self::ENDPOINT_ENV).ok()?;
        let api_key = env::var(Self::API_KEY_ENV).ok();
        let model = env::var(Self::MODEL_ENV).unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());
        Some(Self::new(endpoint, api_key, model))
    }
}

#[async_trait]
impl AdvisoryGenerator for HttpAdvisor {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        debug!(endpoint = %self.endpoint, model = %self.model, "requesting advisory text");

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&CompletionRequest {
                model: &self.model,
                prompt,
                max_tokens: MAX_COMPLETION_TOKENS,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AdvisoryError::Status(response.status()));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .map(|choice| choice.text.trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or(AdvisoryError::EmptyResponse)
    }
}
