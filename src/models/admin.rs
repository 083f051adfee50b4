use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::attempt::ValidationStatus;
use crate::models::test::Segment;

/// 待审队列条目（`GET /api/admin/queue`，按 created_at 升序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub callsign: String,
    pub questions_correct: i32,
    pub copy_chars: i32,
    /// 老数据没有该字段
    #[serde(default)]
    pub consecutive_correct: i32,
    pub created_at: DateTime<Utc>,
}

impl QueueItem {
    /// 是否显示批准/驳回按钮
    ///
    /// 仅控制按钮可见性，权威的 passed 标志由服务端计算
    pub fn is_passing(&self) -> bool {
        self.questions_correct >= 7 || self.consecutive_correct >= 100
    }
}

/// 某呼号的历史记录（`GET /api/admin/queue/{callsign}/history`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptHistory {
    pub id: String,
    pub questions_correct: i32,
    pub copy_chars: i32,
    pub passed: bool,
    #[serde(default)]
    pub validation_status: Option<ValidationStatus>,
    pub created_at: DateTime<Utc>,
}

/// 已批准会员（`GET /api/admin/approved` 条目）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedMember {
    pub id: String,
    pub callsign: String,
    #[serde(default)]
    pub certificate_number: Option<i32>,
    #[serde(default)]
    pub validated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reached_out: bool,
}

/// 已批准列表的分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedPage {
    pub items: Vec<ApprovedMember>,
    pub total: i64,
    pub page: i32,
    pub per_page: i32,
}

impl Default for ApprovedPage {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 25,
        }
    }
}

/// 搜索命中条目（`GET /api/admin/search`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub callsign: String,
    pub questions_correct: i32,
    pub copy_chars: i32,
    pub passed: bool,
    #[serde(default)]
    pub validation_status: Option<ValidationStatus>,
    #[serde(default)]
    pub certificate_number: Option<i32>,
    #[serde(default)]
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 仪表盘统计（`GET /api/admin/stats`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub pending_count: i64,
    pub approved_today: i64,
    pub total_certificates: i64,
    pub rejected_count: i64,
    #[serde(default)]
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    pub callsign: String,
    /// "approved" / "rejected"
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// 管理端考试更新请求（`PUT /api/admin/tests/{id}`）
///
/// 两个字段都可选，只提交需要改动的部分
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}

/// 题目编辑草稿
///
/// `id = None` 表示尚未入库的新题；编辑器的 save-all 按此区分
/// create 和 update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question_number: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: crate::models::test::AnswerOption,
}

impl From<crate::models::test::QuestionRecord> for QuestionDraft {
    fn from(record: crate::models::test::QuestionRecord) -> Self {
        Self {
            id: Some(record.id),
            question_number: record.question_number,
            question_text: record.question_text,
            option_a: record.option_a,
            option_b: record.option_b,
            option_c: record.option_c,
            option_d: record.option_d,
            correct_option: record.correct_option,
        }
    }
}

/// 系统设置（`GET /api/admin/settings`，只含脱敏后的安全值）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: String,
    pub static_dir: String,
    pub log_level: String,
    pub qrz_enabled: bool,
}

/// 系统设置更新（`PUT /api/admin/settings`）
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// 邮件模板（`GET/PUT /api/admin/settings/email-template`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub template: String,
}

/// 生成的外联邮件（`POST /api/admin/email/generate`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEmail {
    #[serde(default)]
    pub recipient_email: Option<String>,
    pub subject: String,
    pub email: String,
}
