//! 测试用的假服务

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{CompletionRequest, CompletionService, PhraseTranslator};
use crate::parser::PageSource;
use crate::utils::{ExtractError, ServiceError};

pub struct FakePages {
    result: Result<Vec<String>, ExtractError>,
}

impl FakePages {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            result: Ok(pages.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn unreadable(reason: &str) -> Self {
        Self {
            result: Err(ExtractError::Unreadable(reason.to_string())),
        }
    }
}

impl PageSource for FakePages {
    fn page_texts(&self, _bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        self.result.clone()
    }
}

/// 按顺序返回预设结果，脚本用完后回显 prompt 长度
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    fallback: Option<ServiceError>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            fallback: None,
        }
    }

    pub fn failing(error: ServiceError) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: Some(error),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let prompt_len = request.prompt.chars().count();
        self.requests.lock().unwrap().push(request);

        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(err) => Err(err.clone()),
            None => Ok(format!("completion for {} chars", prompt_len)),
        }
    }
}

/// 译文为 `[目标语言] 原文`；包含 fail_on 任一片段的输入返回失败
pub struct FakePhrase {
    fail_on: Vec<String>,
    fail_all: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakePhrase {
    pub fn new() -> Self {
        Self {
            fail_on: Vec::new(),
            fail_all: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(fragments: &[&str]) -> Self {
        Self {
            fail_on: fragments.iter().map(|f| f.to_string()).collect(),
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhraseTranslator for FakePhrase {
    async fn translate(&self, text: &str, target: &str) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push((text.to_string(), target.to_string()));

        if self.fail_all || self.fail_on.iter().any(|f| text.contains(f.as_str())) {
            return Err(ServiceError::RateLimited("too many requests".to_string()));
        }
        Ok(format!("[{}] {}", target, text))
    }
}

/// (x, y, 文本)，坐标为 PDF 用户空间，y 轴向上
pub type TextRun<'a> = (f64, f64, &'a str);

/// 用 lopdf 生成 Helvetica 12pt 的多页 PDF，每段文本单独一个 BT/ET 块，按给定顺序写入内容流
pub fn sample_pdf(pages: &[&[TextRun]]) -> Vec<u8> {
    let (mut doc, _) = build_pdf(pages);
    save(&mut doc)
}

/// 用户密码为空、只设所有者密码的 RC4 40 位加密 PDF
pub fn encrypted_pdf(runs: &[TextRun]) -> Vec<u8> {
    use lopdf::encryption::{decrypt_object, get_encryption_key};
    use lopdf::{dictionary, Object, StringFormat};

    let (mut doc, contents) = build_pdf(&[runs]);

    let permissions: i64 = -44;
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x4f; 32], StringFormat::Hexadecimal),
        "P" => permissions,
    });
    let file_id = Object::String(b"mygov-test-file-id".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let key = get_encryption_key(&doc, "", false).unwrap();
    // R2: U = RC4(文件密钥, 填充串)
    let user_hash = rc4(&key, &PASSWORD_PADDING);
    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(encrypt_id) {
        dict.set("U", Object::String(user_hash, StringFormat::Hexadecimal));
    }

    // RC4 对称，用解密函数即可加密内容流
    for id in contents {
        let plain = doc.get_object(id).unwrap().clone();
        let cipher = decrypt_object(&key, id, &plain).unwrap();
        if let Ok(Object::Stream(stream)) = doc.get_object_mut(id) {
            stream.set_content(cipher);
        }
    }

    save(&mut doc)
}

const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j: u8 = 0;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            let k = s[s[i as usize].wrapping_add(s[j as usize]) as usize];
            byte ^ k
        })
        .collect()
}

fn build_pdf(pages: &[&[TextRun]]) -> (lopdf::Document, Vec<lopdf::ObjectId>) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let mut contents = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for &(x, y, text) in runs.iter() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![x.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
        contents.push(content_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    (doc, contents)
}

fn save(doc: &mut lopdf::Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
