use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::client::{CompletionRequest, CompletionService, PhraseTranslator};
use crate::config::{TargetLanguage, TranslationStrategy};
use crate::utils::ServiceError;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// 去掉首尾空白后短于该长度的句子视为碎片
const MIN_SENTENCE_CHARS: usize = 3;

pub struct Translator {
    completion: Arc<dyn CompletionService>,
    phrase: Arc<dyn PhraseTranslator>,
    simplify_temperature: f32,
}

impl Translator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        phrase: Arc<dyn PhraseTranslator>,
        simplify_temperature: f32,
    ) -> Self {
        Self {
            completion,
            phrase,
            simplify_temperature,
        }
    }

    /// 按目标语言配置的策略翻译，永远返回字符串
    pub async fn translate(&self, text: &str, target: &TargetLanguage) -> String {
        info!("翻译为 {} ({:?})", target.name, target.strategy);
        match target.strategy {
            TranslationStrategy::ContextAware => self.simplify(text, target).await,
            TranslationStrategy::Sentence => self.translate_sentences(text, &target.code).await,
        }
    }

    /// 补全服务整段改写为通俗译文；失败时按段落走短句翻译，两者都失败返回错误描述
    pub async fn simplify(&self, text: &str, target: &TargetLanguage) -> String {
        let primary_error = match self.try_simplify(text, target).await {
            Ok(translated) => return translated,
            Err(e) => e,
        };
        error!("Error translating to {}: {}", target.name, primary_error);

        match self.translate_paragraphs(text, &target.code).await {
            Ok(translated) => {
                info!("已改用逐段翻译");
                translated
            }
            Err(e) => {
                warn!("逐段翻译也失败: {}", e);
                format!("Translation error: {}", primary_error)
            }
        }
    }

    pub async fn try_simplify(&self, text: &str, target: &TargetLanguage) -> Result<String, ServiceError> {
        let request = CompletionRequest::new(simplify_prompt(text, &target.name), self.simplify_temperature);
        self.completion.complete(request).await
    }

    /// 按空行切段逐段翻译，任一段失败即整体失败
    pub async fn translate_paragraphs(&self, text: &str, target: &str) -> Result<String, ServiceError> {
        let mut translated = Vec::new();

        for paragraph in text.split("\n\n") {
            if paragraph.trim().is_empty() {
                continue;
            }
            translated.push(self.phrase.translate(paragraph, target).await?);
        }

        Ok(translated.join("\n\n"))
    }

    /// 逐句翻译；单句失败时保留原句，不丢内容
    pub async fn translate_sentences(&self, text: &str, target: &str) -> String {
        let sentences: Vec<&str> = split_sentences(text)
            .into_iter()
            .map(str::trim)
            .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
            .collect();
        debug!("逐句翻译: {} 句", sentences.len());

        let mut translated = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            match self.phrase.translate(sentence, target).await {
                Ok(t) if !t.trim().is_empty() => translated.push(t),
                Ok(_) => {
                    warn!("译文为空，保留原句");
                    translated.push(sentence.to_string());
                }
                Err(e) => {
                    warn!("单句翻译失败，保留原句: {}", e);
                    translated.push(sentence.to_string());
                }
            }
        }

        translated.join(". ")
    }
}

/// 以 `.` `!` `?`（连续出现算一个）为界切句，分隔符不保留
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END.split(text).collect()
}

pub fn simplify_prompt(text: &str, language: &str) -> String {
    format!(
        "Translate the following government scheme information to very simple {language} that a common person, farmer, or villager can easily understand.
Use simple words and avoid complex technical terms. Make it conversational and easy to understand.

Text to translate:
{text}
",
        language = language,
        text = text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use crate::testing::{FakePhrase, ScriptedCompletion};
    use pretty_assertions::assert_eq;

    fn hindi() -> TargetLanguage {
        TranslationConfig::default().targets[0].clone()
    }

    fn telugu() -> TargetLanguage {
        TranslationConfig::default().targets[1].clone()
    }

    fn translator(completion: ScriptedCompletion, phrase: FakePhrase) -> (Translator, Arc<ScriptedCompletion>, Arc<FakePhrase>) {
        let completion = Arc::new(completion);
        let phrase = Arc::new(phrase);
        let translator = Translator::new(completion.clone(), phrase.clone(), 0.3);
        (translator, completion, phrase)
    }

    #[test]
    fn splitter_consumes_terminators() {
        assert_eq!(split_sentences("Hello. Hi! Ok? Go"), vec!["Hello", " Hi", " Ok", " Go"]);
        assert_eq!(split_sentences("Wait... what?!"), vec!["Wait", " what", ""]);
    }

    #[tokio::test]
    async fn sentence_strategy_drops_fragments_shorter_than_three_chars() {
        let (translator, _, phrase) = translator(ScriptedCompletion::new(vec![]), FakePhrase::new());

        let out = translator.translate_sentences("Hello. Hi! Ok? Go", "te").await;

        assert_eq!(out, "[te] Hello");
        assert_eq!(phrase.calls(), vec![("Hello".to_string(), "te".to_string())]);
    }

    #[tokio::test]
    async fn sentence_strategy_keeps_three_char_sentences() {
        let (translator, _, _) = translator(ScriptedCompletion::new(vec![]), FakePhrase::new());

        let out = translator.translate_sentences("Yes. No", "te").await;

        assert_eq!(out, "[te] Yes");
    }

    #[tokio::test]
    async fn failed_sentence_is_kept_in_place() {
        let (translator, _, _) = translator(ScriptedCompletion::new(vec![]), FakePhrase::failing_on(&["Aadhaar"]));

        let out = translator
            .translate_sentences("Apply online. Bring your Aadhaar card! Deadline is March", "te")
            .await;

        assert_eq!(out, "[te] Apply online. Bring your Aadhaar card. [te] Deadline is March");
    }

    #[tokio::test]
    async fn context_strategy_uses_completion_once() {
        let (translator, completion, phrase) = translator(
            ScriptedCompletion::new(vec![Ok("सरल हिंदी".to_string())]),
            FakePhrase::new(),
        );

        let out = translator.translate("Scheme text.\n\nMore text.", &hindi()).await;

        assert_eq!(out, "सरल हिंदी");
        let requests = completion.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("very simple Hindi"));
        assert!(requests[0].prompt.ends_with("Scheme text.\n\nMore text.\n"));
        assert_eq!(requests[0].temperature, 0.3);
        assert!(phrase.calls().is_empty());
    }

    #[tokio::test]
    async fn context_strategy_falls_back_to_paragraphs() {
        let (translator, _, phrase) = translator(
            ScriptedCompletion::failing(ServiceError::Unavailable("down".to_string())),
            FakePhrase::new(),
        );

        let out = translator.translate("First para.\n\n   \n\nSecond para.", &hindi()).await;

        assert_eq!(out, "[hi] First para.\n\n[hi] Second para.");
        assert_eq!(phrase.calls().len(), 2);
    }

    #[tokio::test]
    async fn both_strategies_failing_yields_error_string() {
        let (translator, _, _) = translator(
            ScriptedCompletion::failing(ServiceError::Unavailable("down".to_string())),
            FakePhrase::failing(),
        );

        let out = translator.translate("First para.\n\nSecond para.", &hindi()).await;

        assert_eq!(out, "Translation error: service unavailable: down");
    }

    #[tokio::test]
    async fn sentence_target_never_calls_completion() {
        let (translator, completion, _) = translator(ScriptedCompletion::new(vec![]), FakePhrase::new());

        let out = translator.translate("Farmers get support. Apply now!", &telugu()).await;

        assert_eq!(out, "[te] Farmers get support. [te] Apply now");
        assert!(completion.requests().is_empty());
    }
}
