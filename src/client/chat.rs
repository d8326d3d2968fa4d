use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionService};
use crate::config::CompletionConfig;
use crate::utils::ServiceError;

/// Chat Completions 请求体
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat Completions 响应体
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI 兼容的补全客户端，进程内只构建一次，之后只读共享
pub struct ChatClient {
    client: reqwest::Client,
    config: CompletionConfig,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: CompletionConfig, api_key: String) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        if !config.proxy.is_empty() {
            match reqwest::Proxy::all(&config.proxy) {
                Ok(proxy) => {
                    info!("使用代理: {}", config.proxy);
                    builder = builder.proxy(proxy);
                }
                Err(e) => {
                    warn!("代理配置无效 '{}': {}", config.proxy, e);
                }
            }
        }

        let client = builder
            .build()
            .map_err(|e| ServiceError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionService for ChatClient {
    /// 单次调用，不重试
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        debug!(
            "调用补全服务: model={}, temperature={}, prompt {} 字符",
            self.config.model,
            request.temperature,
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("补全服务返回错误 {}", status);
            return Err(ServiceError::from_status(status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ServiceError::MalformedResponse("completion returned no content".to_string()))
    }
}
