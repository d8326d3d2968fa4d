mod client;
mod config;
mod eligibility;
mod parser;
mod pipeline;
mod summarizer;
mod translator;
mod utils;

#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use client::{ChatClient, CompletionService, PhraseTranslator, WebTranslator};
use config::AppConfig;
use eligibility::profile::{Category, Education, Gender, Income, Occupation, State, MAX_AGE};
use eligibility::UserProfile;
use parser::TextExtractor;
use pipeline::render::{render_json, render_markdown};
use pipeline::{Pipeline, RunOutcome};
use utils::logger;

#[derive(Parser)]
#[command(name = "mygov-translator")]
#[command(about = "政府惠民政策文档解读：摘要、资格判断与多语言翻译", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成默认配置文件
    Init,
    /// 只提取PDF文本并预览
    Extract {
        /// PDF 文件路径
        #[arg(short, long)]
        pdf: PathBuf,
    },
    /// 解读政策文档并判断资格
    Analyze {
        /// PDF 文件路径
        #[arg(short, long)]
        pdf: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        /// 以 JSON 输出结果
        #[arg(long)]
        json: bool,
    },
}

/// 资格判断用的个人资料
#[derive(Args)]
struct ProfileArgs {
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u8).range(0..=MAX_AGE as i64))]
    age: u8,
    #[arg(long, value_enum)]
    gender: Option<Gender>,
    #[arg(long, value_enum)]
    income: Option<Income>,
    #[arg(long, value_enum)]
    category: Option<Category>,
    #[arg(long, value_enum)]
    state: Option<State>,
    #[arg(long, value_enum)]
    occupation: Option<Occupation>,
    #[arg(long, value_enum)]
    education: Option<Education>,
    /// 从 TOML 文件读取资料，忽略上面的选项
    #[arg(long = "profile")]
    profile_file: Option<PathBuf>,
}

impl ProfileArgs {
    fn into_profile(self) -> Result<UserProfile> {
        if let Some(path) = self.profile_file {
            return UserProfile::load(&path);
        }

        Ok(UserProfile {
            age: Some(self.age),
            gender: self.gender,
            income: self.income,
            category: self.category,
            state: self.state,
            occupation: self.occupation,
            education: self.education,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init_logger();
    info!("mygov-translator 启动");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_command().await?,
        Commands::Extract { pdf } => extract_command(&pdf).await?,
        Commands::Analyze { pdf, profile, json } => analyze_command(&pdf, profile, json).await?,
    }

    Ok(())
}

async fn init_command() -> Result<()> {
    info!("初始化配置...");
    tokio::fs::create_dir_all("config").await?;

    let app_config = AppConfig::default();
    app_config.save(config::SETTINGS_PATH)?;
    info!("已生成配置文件: {}", config::SETTINGS_PATH);

    let secrets_path = Path::new(&app_config.secrets.path);
    if !secrets_path.exists() {
        let template = format!("{} = \"your-api-key\"\n", app_config.secrets.key);
        tokio::fs::write(secrets_path, template).await?;
        info!("已生成密钥模板: {}", secrets_path.display());
    }

    info!("下一步:");
    info!("  1. 在 {} 中填写 {}，或设置环境变量 {}", app_config.secrets.path, app_config.secrets.key, app_config.secrets.env_var);
    info!("  2. 运行 'mygov-translator analyze --pdf scheme.pdf'");
    Ok(())
}

async fn extract_command(pdf: &Path) -> Result<()> {
    let app_config = AppConfig::load()?;
    let bytes = read_upload(pdf).await?;

    let text = TextExtractor::pdf().extract(&bytes);
    if text.is_empty() {
        println!("❌ Could not extract text from the PDF. Please ensure it's a text-based PDF, not a scanned image.");
        bail!("no extractable text in {}", pdf.display());
    }

    println!("📖 Extracted Text Preview\n");
    println!("{}", parser::preview(&text, app_config.extraction.preview_chars));
    Ok(())
}

async fn analyze_command(pdf: &Path, profile: ProfileArgs, json: bool) -> Result<()> {
    let app_config = AppConfig::load()?;
    // 缺少密钥时在读取文档之前就终止
    let api_key = config::resolve_api_key(&app_config.secrets)?;
    let profile = profile.into_profile()?;

    let chat = ChatClient::new(app_config.completion.clone(), api_key)?;
    info!("补全模型: {}", chat.model());
    let completion: Arc<dyn CompletionService> = Arc::new(chat);
    let phrase: Arc<dyn PhraseTranslator> = Arc::new(WebTranslator::new(&app_config.translation)?);
    let mut pipeline = Pipeline::new(TextExtractor::pdf(), completion, phrase, &app_config);

    let name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf.display().to_string());
    let bytes = read_upload(pdf).await?;

    let outcome = pipeline.run(name, bytes, profile).await?;
    info!("流水线结束: {}", pipeline.state());
    debug!("流水线轨迹: {:?}", pipeline.history());

    if let Some(document) = pipeline.document() {
        info!("{} 页中 {} 页有文字", document.page_count, document.pages.len());
        debug!(
            "📖 Extracted Text Preview:\n{}",
            parser::preview(&document.full_text, app_config.extraction.preview_chars)
        );
    }

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::Halted(reason) => {
            println!("{}", reason.user_message());
            bail!("{}", reason);
        }
    };

    if json {
        println!("{}", render_json(&report)?);
    } else {
        println!("{}", render_markdown(&report));
    }

    Ok(())
}

async fn read_upload(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("读取文件失败: {}", path.display()))?;
    debug!("读取文件: {} ({} 字节)", path.display(), bytes.len());
    Ok(bytes)
}
