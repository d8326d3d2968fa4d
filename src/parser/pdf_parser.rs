use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{info, warn};

use super::layout::LayoutText;
use super::PageSource;
use crate::utils::ExtractError;

/// lopdf 负责校验与解密，pdf-extract 逐页回放内容流，LayoutText 按阅读顺序排版
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }

    /// 载入文档；只设了所有者密码（用户密码为空）的加密文件直接解密
    fn load(&self, bytes: &[u8]) -> Result<Document, ExtractError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ExtractError::Unreadable("missing %PDF header".to_string()));
        }

        let mut doc = Document::load_mem(bytes).map_err(|e| ExtractError::Unreadable(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| ExtractError::Unreadable(format!("document is password protected: {}", e)))?;
            info!("加密PDF已用空用户密码解密");
        }

        Ok(doc)
    }

    fn page_text(&self, doc: &Document, page_num: u32) -> Result<String, String> {
        let mut layout = LayoutText::new();

        // pdf-extract 遇到部分畸形字体/流会直接 panic
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::output_doc_page(doc, &mut layout, page_num)
        }));

        match result {
            Ok(Ok(())) => Ok(layout.into_text()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("PDF backend aborted while reading text".to_string()),
        }
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for PdfParser {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        let doc = self.load(bytes)?;
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        info!("解析PDF: {} 字节, {} 页", bytes.len(), page_numbers.len());

        let mut texts = Vec::with_capacity(page_numbers.len());
        let mut first_error = None;
        for page_num in &page_numbers {
            match self.page_text(&doc, *page_num) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("第 {} 页提取失败: {}", page_num, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                    texts.push(String::new());
                }
            }
        }

        // 每一页都失败说明文档本身读不了，而不是没有文字
        if let Some(e) = first_error {
            if texts.iter().all(|t| t.is_empty()) {
                return Err(ExtractError::Unreadable(e));
            }
        }

        Ok(texts)
    }
}
