//! Async HTTP client for the compliance agent service.

use std::time::Duration;

use mandate_core::{
  agent::{Agent, AgentReply},
  rule::Rule,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{normalize, prompt, Error, Result};

/// Connection settings for the agent service.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
  pub base_url: String,
  /// Identifier of the compliance-manager agent to address.
  pub agent_id: String,
  /// Bearer token, if the service requires one.
  #[serde(default)]
  pub api_key:  Option<String>,
  /// Request timeout in seconds. Extraction and validation runs are slow.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 120 }

#[derive(Debug, Deserialize)]
struct UploadResponse {
  success:   bool,
  #[serde(default)]
  asset_ids: Vec<String>,
  #[serde(default)]
  error:     Option<String>,
}

/// HTTP implementation of [`Agent`].
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpAgent {
  client: Client,
  config: AgentConfig,
}

impl HttpAgent {
  pub fn new(config: AgentConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.config.api_key {
      Some(key) => req.bearer_auth(key),
      None => req,
    }
  }

  /// `POST /api/agents/{agent_id}/messages`, normalized.
  async fn send_message(
    &self,
    text: String,
    assets: Option<&[String]>,
  ) -> Result<AgentReply> {
    let mut body = json!({ "message": text });
    if let Some(assets) = assets {
      body["assets"] = json!(assets);
    }

    tracing::debug!(
      agent_id = %self.config.agent_id,
      assets = assets.map_or(0, <[String]>::len),
      "sending agent message"
    );

    let payload: serde_json::Value = self
      .auth(self.client.post(self.url(&format!(
        "/api/agents/{}/messages",
        self.config.agent_id
      ))))
      .json(&body)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    normalize::normalize(payload)
  }
}

impl Agent for HttpAgent {
  type Error = Error;

  /// `POST /api/files` (multipart). Returns the asset references to attach
  /// to the follow-up extraction request.
  async fn upload(
    &self,
    filename: &str,
    contents: Vec<u8>,
  ) -> Result<Vec<String>> {
    let part =
      reqwest::multipart::Part::bytes(contents).file_name(filename.to_owned());
    let form = reqwest::multipart::Form::new().part("files", part);

    let resp: UploadResponse = self
      .auth(self.client.post(self.url("/api/files")))
      .multipart(form)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    if !resp.success {
      return Err(Error::UploadRejected(
        resp
          .error
          .unwrap_or_else(|| "no asset references returned".to_owned()),
      ));
    }
    Ok(resp.asset_ids)
  }

  async fn extract_rules(
    &self,
    filename: &str,
    assets: &[String],
  ) -> Result<AgentReply> {
    self
      .send_message(prompt::extraction_request(filename), Some(assets))
      .await
  }

  async fn validate_rules(&self, rules: &[Rule]) -> Result<AgentReply> {
    self.send_message(prompt::validation_request(rules), None).await
  }

  async fn answer(&self, text: &str) -> Result<AgentReply> {
    self.send_message(text.to_owned(), None).await
  }
}
