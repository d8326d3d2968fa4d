mod layout;
pub mod pdf_parser;

pub use pdf_parser::PdfParser;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::utils::ExtractError;

/// 字节流 -> 逐页文本
pub trait PageSource: Send + Sync {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// 单页文本，index 从 1 开始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub index: usize,
    pub text: String,
}

/// 提取结果：只保留有文字的页，full_text 带页标记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_count: usize,
    pub pages: Vec<PageText>,
    pub full_text: String,
}

pub fn page_marker(index: usize) -> String {
    format!("\n--- Page {} ---\n", index)
}

pub struct TextExtractor {
    source: Box<dyn PageSource>,
}

impl TextExtractor {
    pub fn new(source: Box<dyn PageSource>) -> Self {
        Self { source }
    }

    pub fn pdf() -> Self {
        Self::new(Box::new(PdfParser::new()))
    }

    /// 区分“不可读”和“无文字”两种终止情况
    pub fn extract_document(&self, bytes: &[u8]) -> Result<Document, ExtractError> {
        let raw_pages = self.source.page_texts(bytes)?;
        let page_count = raw_pages.len();

        let pages: Vec<PageText> = raw_pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| PageText { index: i + 1, text })
            .collect();

        let mut full_text = String::new();
        for page in &pages {
            full_text.push_str(&page_marker(page.index));
            full_text.push_str(&page.text);
        }

        if full_text.trim().is_empty() {
            warn!("PDF中未提取到文本内容 ({} 页)", page_count);
            return Err(ExtractError::NoExtractableText);
        }

        info!("提取文本: {}/{} 页有内容, {} 字符", pages.len(), page_count, full_text.chars().count());

        Ok(Document {
            page_count,
            pages,
            full_text,
        })
    }

    /// 不向外抛错：任何失败都记录日志并返回空字符串
    pub fn extract(&self, bytes: &[u8]) -> String {
        match self.extract_document(bytes) {
            Ok(doc) => doc.full_text,
            Err(ExtractError::NoExtractableText) => String::new(),
            Err(e) => {
                error!("Error extracting PDF text: {}", e);
                String::new()
            }
        }
    }
}

/// 截取前 max_chars 个字符用于预览
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
