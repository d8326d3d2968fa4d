use std::sync::Arc;

use tracing::{error, info};

use crate::client::{CompletionRequest, CompletionService};
use crate::config::SummaryConfig;
use crate::utils::ServiceError;

/// 截断点必须落在预算的 80% 之后，否则直接按预算硬截断
const SENTENCE_CUT_RATIO: f64 = 0.8;

pub struct Summarizer {
    client: Arc<dyn CompletionService>,
    max_chars: usize,
    temperature: f32,
}

impl Summarizer {
    pub fn new(client: Arc<dyn CompletionService>, config: &SummaryConfig) -> Self {
        Self {
            client,
            max_chars: config.max_chars,
            temperature: config.temperature,
        }
    }

    /// 失败时返回错误描述字符串，下游照常使用
    pub async fn summarize(&self, text: &str) -> String {
        match self.try_summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Error generating summary: {}", e);
                format!("Error generating summary: {}", e)
            }
        }
    }

    pub async fn try_summarize(&self, text: &str) -> Result<String, ServiceError> {
        let body = truncate_for_prompt(text, self.max_chars);
        if body.len() < text.len() {
            info!(
                "文档过长，截断至 {} / {} 字符",
                body.chars().count(),
                text.chars().count()
            );
        }

        let request = CompletionRequest::new(summary_prompt(body), self.temperature);
        self.client.complete(request).await
    }
}

/// 超过 max_chars 时先按字符数截断，再退回到最后一个句号（需在 80% 之后，含句号）
pub fn truncate_for_prompt(text: &str, max_chars: usize) -> &str {
    let cut = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => byte_idx,
        None => return text,
    };
    let truncated = &text[..cut];

    if let Some(dot) = truncated.rfind('.') {
        let dot_position = truncated[..dot].chars().count();
        if dot_position as f64 > max_chars as f64 * SENTENCE_CUT_RATIO {
            return &truncated[..=dot];
        }
    }

    truncated
}

pub fn summary_prompt(document: &str) -> String {
    format!(
        "You are an expert government policy analyst. Analyze this government scheme document and provide a comprehensive summary in the following format:

**SCHEME NAME:** [Name of the scheme]

**PURPOSE:** [What this scheme aims to achieve]

**KEY BENEFITS:**
• [Benefit 1]
• [Benefit 2]
• [Benefit 3]

**ELIGIBILITY CRITERIA:**
• [Criterion 1]
• [Criterion 2]
• [Criterion 3]

**REQUIRED DOCUMENTS:**
• [Document 1]
• [Document 2]
• [Document 3]

**APPLICATION PROCESS:**
1. [Step 1]
2. [Step 2]
3. [Step 3]

**IMPORTANT DETAILS:**
• Application deadline: [if mentioned]
• Contact information: [if mentioned]
• Subsidy/benefit amount: [if mentioned]

Document content:
{}
",
        document
    )
}
