use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use super::PhraseTranslator;
use crate::config::TranslationConfig;
use crate::utils::ServiceError;

/// 公开翻译页面单次可接受的最大字符数
const MAX_INPUT_CHARS: usize = 5000;

/// 通过 Google Translate 移动版页面做短句翻译
pub struct WebTranslator {
    client: reqwest::Client,
    service_url: String,
    source_language: String,
    result_selector: Selector,
}

impl WebTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ServiceError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        let result_selector = Selector::parse("div.result-container")
            .map_err(|e| ServiceError::MalformedResponse(format!("bad result selector: {:?}", e)))?;

        Ok(Self {
            client,
            service_url: config.service_url.clone(),
            source_language: config.source_language.clone(),
            result_selector,
        })
    }

    fn parse_result(&self, html: &str) -> Result<String, ServiceError> {
        let document = Html::parse_document(html);
        let element = document
            .select(&self.result_selector)
            .next()
            .ok_or_else(|| ServiceError::MalformedResponse("translation result not found in page".to_string()))?;

        let translated = element.text().collect::<String>().trim().to_string();
        if translated.is_empty() {
            return Err(ServiceError::MalformedResponse("empty translation".to_string()));
        }
        Ok(translated)
    }
}

#[async_trait]
impl PhraseTranslator for WebTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, ServiceError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let len = text.chars().count();
        if len > MAX_INPUT_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "text has {} characters, limit is {}",
                len, MAX_INPUT_CHARS
            )));
        }

        debug!("短句翻译 -> {}: {} 字符", target, len);

        let response = self
            .client
            .get(&self.service_url)
            .query(&[
                ("sl", self.source_language.as_str()),
                ("tl", target),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status, body));
        }

        let html = response.text().await?;
        self.parse_result(&html)
    }
}
