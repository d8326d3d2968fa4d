use std::fmt;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const MAX_AGE: u8 = 120;

/// 表单里的固定选项：命令行 / TOML 用 kebab-case 名称，发给模型的是 label
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
    PreferNotToSay => "Prefer not to say",
});

choice_enum!(
    /// 年收入区间
    Income {
        BelowOneLakh => "Below ₹1 Lakh",
        OneToThreeLakhs => "₹1-3 Lakhs",
        ThreeToFiveLakhs => "₹3-5 Lakhs",
        FiveToTenLakhs => "₹5-10 Lakhs",
        TenToTwentyLakhs => "₹10-20 Lakhs",
        AboveTwentyLakhs => "Above ₹20 Lakhs",
    }
);

choice_enum!(
    /// 社会类别
    Category {
        General => "General",
        Obc => "OBC",
        Sc => "SC",
        St => "ST",
        Ews => "EWS",
    }
);

choice_enum!(State {
    AndhraPradesh => "Andhra Pradesh",
    Telangana => "Telangana",
    TamilNadu => "Tamil Nadu",
    Karnataka => "Karnataka",
    Kerala => "Kerala",
    Maharashtra => "Maharashtra",
    Gujarat => "Gujarat",
    Rajasthan => "Rajasthan",
    UttarPradesh => "Uttar Pradesh",
    Bihar => "Bihar",
    WestBengal => "West Bengal",
    Odisha => "Odisha",
    MadhyaPradesh => "Madhya Pradesh",
    Chhattisgarh => "Chhattisgarh",
    Jharkhand => "Jharkhand",
    Haryana => "Haryana",
    Punjab => "Punjab",
    HimachalPradesh => "Himachal Pradesh",
    Uttarakhand => "Uttarakhand",
    Delhi => "Delhi",
    Other => "Other",
});

choice_enum!(Occupation {
    Farmer => "Farmer",
    Student => "Student",
    GovernmentEmployee => "Government Employee",
    PrivateEmployee => "Private Employee",
    SelfEmployed => "Self-employed",
    BusinessOwner => "Business Owner",
    Unemployed => "Unemployed",
    Retired => "Retired",
    Other => "Other",
});

choice_enum!(Education {
    PrimarySchool => "Primary School",
    HighSchool => "High School",
    Intermediate => "Intermediate",
    Graduate => "Graduate",
    PostGraduate => "Post Graduate",
    ProfessionalDegree => "Professional Degree",
    Others => "Others",
});

/// 用户资料，None 一律视为“未知”而不是“不符合”
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub income: Option<Income>,
    pub category: Option<Category>,
    pub state: Option<State>,
    pub occupation: Option<Occupation>,
    pub education: Option<Education>,
}

impl UserProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取资料文件失败: {}", path.display()))?;
        let profile: UserProfile = toml::from_str(&content)
            .with_context(|| format!("资料文件格式错误: {}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(age) = self.age {
            ensure!(age <= MAX_AGE, "age must be between 0 and {}, got {}", MAX_AGE, age);
        }
        Ok(())
    }

    /// 固定顺序的纯文本资料块
    pub fn render(&self) -> String {
        fn or_unset<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string())
        }

        [
            ("Age", or_unset(&self.age)),
            ("Gender", or_unset(&self.gender)),
            ("Income", or_unset(&self.income)),
            ("Category", or_unset(&self.category)),
            ("State", or_unset(&self.state)),
            ("Occupation", or_unset(&self.occupation)),
            ("Education", or_unset(&self.education)),
        ]
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
    }
}
