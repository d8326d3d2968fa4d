//! 外部服务接口：补全服务与短句翻译服务
//!
//! 各阶段只依赖这里的 trait，测试时替换为 `crate::testing` 中的假实现。

pub mod chat;
pub mod phrase;

pub use chat::ChatClient;
pub use phrase::WebTranslator;

use async_trait::async_trait;

use crate::utils::ServiceError;

/// 一次补全调用：单条 user 消息 + 采样温度
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError>;
}

/// 不带上下文的短文本翻译
#[async_trait]
pub trait PhraseTranslator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, ServiceError>;
}
