pub mod secrets;

use serde::{Deserialize, Serialize};

use crate::utils::ConfigError;

pub use secrets::resolve_api_key;

pub const SETTINGS_PATH: &str = "config/settings.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub completion: CompletionConfig,
    pub summary: SummaryConfig,
    pub eligibility: EligibilityConfig,
    pub translation: TranslationConfig,
    pub extraction: ExtractionConfig,
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_url: String,
    pub model: String,
    /// 留空表示不使用代理
    pub proxy: String,
    /// 未设置时沿用 reqwest 默认超时
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_chars: usize,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 短句翻译服务地址（Google Translate 移动版页面）
    pub service_url: String,
    pub source_language: String,
    pub simplify_temperature: f32,
    pub user_agent: String,
    pub targets: Vec<TargetLanguage>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TargetLanguage {
    pub code: String,
    pub name: String,
    pub heading: String,
    pub eligibility_label: String,
    pub strategy: TranslationStrategy,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStrategy {
    /// 整段交给补全服务改写，失败时按段落走短句翻译
    ContextAware,
    /// 逐句调用短句翻译服务
    Sentence,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub preview_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub path: String,
    pub key: String,
    pub env_var: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            proxy: String::new(),
            timeout_secs: None,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_chars: 10_000,
            temperature: 0.3,
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self { temperature: 0.2 }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            service_url: "https://translate.google.com/m".to_string(),
            source_language: "auto".to_string(),
            simplify_temperature: 0.3,
            user_agent: "Mozilla/5.0 (Linux; Android 10) MyGovTranslator/0.1".to_string(),
            targets: vec![
                TargetLanguage {
                    code: "hi".to_string(),
                    name: "Hindi".to_string(),
                    heading: "🇮🇳 हिंदी अनुवाद".to_string(),
                    eligibility_label: "--- आपकी पात्रता ---".to_string(),
                    strategy: TranslationStrategy::ContextAware,
                },
                TargetLanguage {
                    code: "te".to_string(),
                    name: "Telugu".to_string(),
                    heading: "🇮🇳 తెలుగు అనువాదం".to_string(),
                    eligibility_label: "--- మీ అర్హత ---".to_string(),
                    strategy: TranslationStrategy::Sentence,
                },
            ],
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { preview_chars: 2000 }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            path: "config/secrets.toml".to_string(),
            key: "OPENAI_API_KEY".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl AppConfig {
    /// 默认值 <- config/settings.toml <- MYGOV__SECTION__KEY 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(SETTINGS_PATH)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MYGOV")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
