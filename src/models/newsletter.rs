//! Newsletter configuration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 发送节奏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cadence_type")]
pub enum CadenceType {
    #[sqlx(rename = "weekly")]
    #[serde(rename = "weekly")]
    Weekly,
    #[sqlx(rename = "bi-weekly")]
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[sqlx(rename = "monthly")]
    #[serde(rename = "monthly")]
    Monthly,
}

/// 审批层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalTier {
    None,
    Tier1,
    Tier2,
    Tier3,
}

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "risk_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Standard,
    High,
    Experimental,
}

/// Newsletter 配置行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsletterConfig {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    pub cadence: CadenceType,
    pub send_day_of_week: Option<i32>,
    pub timezone: String,

    pub max_blocks: i32,
    pub education_ratio_min: f64,
    pub content_freshness_days: i32,

    pub approval_tier: ApprovalTier,
    pub risk_level: RiskLevel,

    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建配置请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNewsletterConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub cadence: CadenceType,
    #[validate(range(min = 0, max = 6))]
    pub send_day_of_week: Option<i32>,
    #[validate(length(min = 1))]
    pub timezone: String,

    #[validate(range(min = 1, max = 10))]
    pub max_blocks: i32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub education_ratio_min: f64,
    #[validate(range(min = 1))]
    pub content_freshness_days: i32,

    pub approval_tier: ApprovalTier,
    pub risk_level: RiskLevel,
}

/// 更新配置请求（未提供的字段保持不变）
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNewsletterConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub cadence: Option<CadenceType>,
    #[validate(range(min = 0, max = 6))]
    pub send_day_of_week: Option<i32>,
    pub timezone: Option<String>,

    #[validate(range(min = 1, max = 10))]
    pub max_blocks: Option<i32>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub education_ratio_min: Option<f64>,
    #[validate(range(min = 1))]
    pub content_freshness_days: Option<i32>,

    pub approval_tier: Option<ApprovalTier>,
    pub risk_level: Option<RiskLevel>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_request() -> CreateNewsletterConfigRequest {
        CreateNewsletterConfigRequest {
            name: "Weekly threat digest".to_string(),
            description: None,
            cadence: CadenceType::Weekly,
            send_day_of_week: Some(1),
            timezone: "UTC".to_string(),
            max_blocks: 5,
            education_ratio_min: 0.3,
            content_freshness_days: 7,
            approval_tier: ApprovalTier::Tier1,
            risk_level: RiskLevel::Standard,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_max_blocks_bounds() {
        let mut req = valid_request();
        req.max_blocks = 0;
        assert!(req.validate().is_err());

        req.max_blocks = 11;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_education_ratio_bounds() {
        let mut req = valid_request();
        req.education_ratio_min = 1.5;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_send_day_of_week_bounds() {
        let mut req = valid_request();
        req.send_day_of_week = Some(7);
        assert!(req.validate().is_err());
    }
}
