pub mod profile;

pub use profile::UserProfile;

use std::sync::Arc;

use tracing::{error, info};

use crate::client::{CompletionRequest, CompletionService};
use crate::config::EligibilityConfig;
use crate::utils::ServiceError;

pub struct EligibilityEvaluator {
    client: Arc<dyn CompletionService>,
    temperature: f32,
}

impl EligibilityEvaluator {
    pub fn new(client: Arc<dyn CompletionService>, config: &EligibilityConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
        }
    }

    /// 失败时返回错误描述字符串
    pub async fn evaluate(&self, summary: &str, profile: &UserProfile) -> String {
        match self.try_evaluate(summary, profile).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!("Error checking eligibility: {}", e);
                format!("Error checking eligibility: {}", e)
            }
        }
    }

    pub async fn try_evaluate(&self, summary: &str, profile: &UserProfile) -> Result<String, ServiceError> {
        info!("检查资格");
        let prompt = eligibility_prompt(summary, &profile.render());
        self.client
            .complete(CompletionRequest::new(prompt, self.temperature))
            .await
    }
}

pub fn eligibility_prompt(summary: &str, profile_block: &str) -> String {
    format!(
        "Based on the government scheme details and user profile below, determine eligibility and provide guidance.

SCHEME DETAILS:
{summary}

USER PROFILE:
{profile_block}

Provide a response in this format:

**ELIGIBILITY STATUS:** [ELIGIBLE/NOT ELIGIBLE/PARTIALLY ELIGIBLE]

**EXPLANATION:**
[Detailed explanation of why they are or aren't eligible]

**IF NOT ELIGIBLE - STEPS TO BECOME ELIGIBLE:**
1. [Step 1 if applicable]
2. [Step 2 if applicable]
3. [Step 3 if applicable]

**NEXT STEPS:**
[What the user should do next to apply or become eligible]

**REQUIRED DOCUMENTATION:**
[List documents they need to gather based on their profile]
",
        summary = summary,
        profile_block = profile_block,
    )
}
