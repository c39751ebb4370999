//! Language-model oracle backed by the Anthropic Messages API.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ContentOracle, GeneratedContent, OracleLimits};
use crate::error::{FrontfillError, Result};

/// API version header sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const MAX_RESPONSE_TOKENS: u32 = 256;

/// `TITLE:` reply line, case-insensitive, tolerating markdown bold
static TITLE_LINE: OnceLock<Regex> = OnceLock::new();

/// `DESCRIPTION:` reply line
static DESCRIPTION_LINE: OnceLock<Regex> = OnceLock::new();

fn title_line() -> &'static Regex {
    TITLE_LINE.get_or_init(|| compile_field_pattern("TITLE"))
}

fn description_line() -> &'static Regex {
    DESCRIPTION_LINE.get_or_init(|| compile_field_pattern("DESCRIPTION"))
}

fn compile_field_pattern(label: &str) -> Regex {
    let pattern = format!(r"(?mi)^\s*\**{label}:\**\s*(.+)$");
    Regex::new(&pattern).unwrap_or_else(|err| panic!("invalid {label} reply pattern: {err}"))
}

/// Connection settings for [`LlmOracle`]
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    /// API root, e.g. `https://api.anthropic.com`
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Oracle that asks a language model for `TITLE:` and `DESCRIPTION:` lines.
pub struct LlmOracle {
    agent: ureq::Agent,
    settings: LlmSettings,
    limits: OracleLimits,
    user_agent: String,
}

impl LlmOracle {
    pub fn new(settings: LlmSettings, limits: OracleLimits) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .build()
            .into();
        let user_agent = format!(
            "frontfill/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );

        Self {
            agent,
            settings,
            limits,
            user_agent,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: MAX_RESPONSE_TOKENS,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };
        let payload = serde_json::to_string(&request)?;

        let url = self.endpoint();
        let mut response = self
            .agent
            .post(url.as_str())
            .header("content-type", "application/json")
            .header("x-api-key", self.settings.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("user-agent", self.user_agent.as_str())
            .send(payload)
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => {
                    FrontfillError::oracle(format!("model API returned HTTP {code}"))
                }
                other => FrontfillError::oracle(format!("request failed: {other}")),
            })?;

        let raw = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FrontfillError::oracle(format!("failed to read response: {e}")))?;
        let parsed: MessagesResponse = serde_json::from_str(&raw)?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(FrontfillError::oracle("model returned no text"));
        }
        Ok(text)
    }
}

impl ContentOracle for LlmOracle {
    fn name(&self) -> &str {
        "llm"
    }

    #[tracing::instrument(skip(self, body), fields(model = %self.settings.model))]
    fn generate(&self, body: &str, filename_hint: &str) -> Result<GeneratedContent> {
        let prompt = build_prompt(self.limits.clip_body(body), filename_hint, &self.limits);
        let reply = self.complete(&prompt)?;

        let content = parse_reply(&reply).ok_or_else(|| {
            FrontfillError::oracle("reply did not contain TITLE: and DESCRIPTION: lines")
        })?;

        let content = self.limits.apply(content);
        tracing::info!(
            title = %content.title,
            description = %content.description,
            "generated frontmatter"
        );
        Ok(content)
    }
}

/// Prompt asking for exactly one `TITLE:` and one `DESCRIPTION:` line.
pub(crate) fn build_prompt(body: &str, filename: &str, limits: &OracleLimits) -> String {
    format!(
        "Analyze the following markdown content and generate:\n\
         1. A brief title (maximum {title_words} words) that captures the main topic\n\
         2. A concise description (maximum {description_words} words, one sentence) that summarizes what the content covers\n\
         \n\
         Markdown content from file \"{filename}\":\n\
         ---\n\
         {body}\n\
         ---\n\
         \n\
         Requirements:\n\
         - Title: {title_words} words or fewer, descriptive and clear\n\
         - Description: {description_words} words or fewer, informative summary\n\
         - If the content is minimal or unclear, write a generic but relevant title and description\n\
         \n\
         Respond in this exact format:\n\
         TITLE: [your title here]\n\
         DESCRIPTION: [your description here]",
        title_words = limits.max_title_words,
        description_words = limits.max_description_words,
    )
}

/// Pull the title and description out of a model reply.
pub(crate) fn parse_reply(reply: &str) -> Option<GeneratedContent> {
    let title = capture_field(title_line(), reply)?;
    let description = capture_field(description_line(), reply)?;

    let content = GeneratedContent::new(title, description);
    content.is_complete().then_some(content)
}

/// Value of the first line matching `re`
fn capture_field<'a>(re: &Regex, reply: &'a str) -> Option<&'a str> {
    re.captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| clean(m.as_str()))
}

/// Strip wrapping quotes and brackets the model sometimes adds
fn clean(value: &str) -> &str {
    value
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '[' | ']' | '*'))
        .trim()
}
