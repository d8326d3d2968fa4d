//! 文档 -> 摘要 -> 资格 -> 翻译 的顺序流水线
//!
//! 由外部事件（上传、提交资料）驱动的显式状态机：
//!
//! `Idle → DocumentUploaded → TextExtracted → ProfileCollected → Analyzed →
//! EligibilityChecked → Translated → Done`
//!
//! 文档不可读或没有文字时直接进入 `Failed`，后续阶段都不会执行。
//! 其余阶段的服务失败只会变成错误字符串继续向下游传递。

pub mod render;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::{CompletionService, PhraseTranslator};
use crate::config::{AppConfig, TargetLanguage};
use crate::eligibility::{EligibilityEvaluator, UserProfile};
use crate::parser::{Document, TextExtractor};
use crate::summarizer::Summarizer;
use crate::translator::Translator;
use crate::utils::{ExtractError, PipelineError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineState {
    Idle,
    DocumentUploaded,
    TextExtracted,
    ProfileCollected,
    Analyzed,
    EligibilityChecked,
    Translated,
    Done,
    Failed(FailureReason),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Failed(reason) => write!(f, "Failed({})", reason),
            other => write!(f, "{:?}", other),
        }
    }
}

/// 终止原因
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FailureReason {
    DocumentUnreadable(String),
    NoExtractableText,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DocumentUnreadable(reason) => write!(f, "document unreadable: {}", reason),
            FailureReason::NoExtractableText => f.write_str("no extractable text"),
        }
    }
}

impl FailureReason {
    /// 展示给用户的提示
    pub fn user_message(&self) -> String {
        match self {
            FailureReason::DocumentUnreadable(reason) => format!("❌ Error reading PDF: {}", reason),
            FailureReason::NoExtractableText => {
                "⚠️ No text found in the PDF. This might be a scanned document that requires OCR.".to_string()
            }
        }
    }
}

impl From<ExtractError> for FailureReason {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Unreadable(reason) => FailureReason::DocumentUnreadable(reason),
            ExtractError::NoExtractableText => FailureReason::NoExtractableText,
        }
    }
}

pub enum PipelineEvent {
    Upload { name: String, bytes: Vec<u8> },
    Submit(UserProfile),
}

impl PipelineEvent {
    fn name(&self) -> &'static str {
        match self {
            PipelineEvent::Upload { .. } => "upload",
            PipelineEvent::Submit(_) => "submit",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedTranslation {
    pub language: String,
    pub heading: String,
    pub text: String,
}

/// 一次运行的全部输出
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub document_name: String,
    pub page_count: usize,
    pub generated_at: DateTime<Local>,
    pub summary: String,
    pub eligibility: String,
    pub translations: Vec<RenderedTranslation>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(AnalysisReport),
    Halted(FailureReason),
}

struct UploadedDocument {
    name: String,
    document: Document,
}

pub struct Pipeline {
    extractor: TextExtractor,
    summarizer: Summarizer,
    evaluator: EligibilityEvaluator,
    translator: Translator,
    targets: Vec<TargetLanguage>,
    state: PipelineState,
    history: Vec<PipelineState>,
    upload: Option<UploadedDocument>,
    report: Option<AnalysisReport>,
}

impl Pipeline {
    /// 同一个补全客户端注入到摘要、资格、翻译三个阶段
    pub fn new(
        extractor: TextExtractor,
        completion: Arc<dyn CompletionService>,
        phrase: Arc<dyn PhraseTranslator>,
        config: &AppConfig,
    ) -> Self {
        Self {
            extractor,
            summarizer: Summarizer::new(completion.clone(), &config.summary),
            evaluator: EligibilityEvaluator::new(completion.clone(), &config.eligibility),
            translator: Translator::new(completion, phrase, config.translation.simplify_temperature),
            targets: config.translation.targets.clone(),
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
            upload: None,
            report: None,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn document(&self) -> Option<&Document> {
        self.upload.as_ref().map(|u| &u.document)
    }

    pub async fn handle(&mut self, event: PipelineEvent) -> Result<&PipelineState, PipelineError> {
        let accepted = matches!(
            (&self.state, &event),
            (
                PipelineState::Idle
                    | PipelineState::TextExtracted
                    | PipelineState::Done
                    | PipelineState::Failed(_),
                PipelineEvent::Upload { .. }
            ) | (PipelineState::TextExtracted, PipelineEvent::Submit(_))
        );
        if !accepted {
            warn!("状态 {} 下不接受事件 {}", self.state, event.name());
            return Err(PipelineError::InvalidTransition {
                state: self.state.to_string(),
                event: event.name(),
            });
        }

        match event {
            PipelineEvent::Upload { name, bytes } => self.on_upload(name, bytes),
            PipelineEvent::Submit(profile) => self.on_submit(profile).await,
        }
        Ok(&self.state)
    }

    /// 上传 + 提交资料，一次跑完
    pub async fn run(&mut self, name: String, bytes: Vec<u8>, profile: UserProfile) -> Result<RunOutcome, PipelineError> {
        self.handle(PipelineEvent::Upload { name, bytes }).await?;
        if let PipelineState::Failed(reason) = &self.state {
            return Ok(RunOutcome::Halted(reason.clone()));
        }

        self.handle(PipelineEvent::Submit(profile)).await?;
        match self.report.clone() {
            Some(report) => Ok(RunOutcome::Completed(report)),
            None => Err(PipelineError::InvalidTransition {
                state: self.state.to_string(),
                event: "submit",
            }),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        info!("流水线状态: {} -> {}", self.state, next);
        self.history.push(next.clone());
        self.state = next;
    }

    fn on_upload(&mut self, name: String, bytes: Vec<u8>) {
        self.state = PipelineState::Idle;
        self.history = vec![PipelineState::Idle];
        self.upload = None;
        self.report = None;

        info!("📎 Uploaded: {} ({} bytes)", name, bytes.len());
        self.transition(PipelineState::DocumentUploaded);

        if !name.to_lowercase().ends_with(".pdf") {
            self.transition(PipelineState::Failed(FailureReason::DocumentUnreadable(
                "unsupported file type, only PDF documents are accepted".to_string(),
            )));
            return;
        }

        match self.extractor.extract_document(&bytes) {
            Ok(document) => {
                self.upload = Some(UploadedDocument { name, document });
                self.transition(PipelineState::TextExtracted);
            }
            Err(e) => {
                warn!("文本提取失败: {}", e);
                self.transition(PipelineState::Failed(e.into()));
            }
        }
    }

    async fn on_submit(&mut self, profile: UserProfile) {
        let Some(upload) = self.upload.as_ref() else {
            return;
        };
        let document_name = upload.name.clone();
        let page_count = upload.document.page_count;
        let text = upload.document.full_text.clone();

        self.transition(PipelineState::ProfileCollected);

        let summary = self.summarizer.summarize(&text).await;
        self.transition(PipelineState::Analyzed);

        let eligibility = self.evaluator.evaluate(&summary, &profile).await;
        self.transition(PipelineState::EligibilityChecked);

        let mut translations = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let combined = format!("{}\n\n{}\n{}", summary, target.eligibility_label, eligibility);
            let text = self.translator.translate(&combined, target).await;
            translations.push(RenderedTranslation {
                language: target.code.clone(),
                heading: target.heading.clone(),
                text,
            });
        }
        self.transition(PipelineState::Translated);

        self.report = Some(AnalysisReport {
            document_name,
            page_count,
            generated_at: Local::now(),
            summary,
            eligibility,
            translations,
        });
        self.transition(PipelineState::Done);
    }
}
