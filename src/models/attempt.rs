use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::test::AnswerOption;

/// 提交草稿
///
/// `POST /api/tests/{id}/submit` 的请求体；
/// 呼号在构造时已去空格并转大写
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDraft {
    pub callsign: String,
    /// question_id -> 选项
    pub answers: HashMap<String, AnswerOption>,
    pub copy_text: Option<String>,
    pub audio_progress: Option<f32>,
}

/// 服务端判分结果（权威）
///
/// 客户端只做镜像展示，本地字符数统计仅作提示，绝不参与判定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub passed: bool,
    pub score: i32,
    pub passing_score: i32,
    #[serde(default)]
    pub pass_reason: Option<PassReason>,
    #[serde(default)]
    pub consecutive_correct: i32,
    /// 仅在通过时返回，用于答案回顾
    #[serde(default)]
    pub correct_answers: Option<HashMap<String, AnswerOption>>,
    #[serde(default)]
    pub certificate_id: Option<String>,
}

/// 通过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassReason {
    Questions,
    Copy,
    Both,
}

/// 提交结果
///
/// 400 是业务语义（该呼号已有待审/已批准的记录），不是错误
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// 服务端完成判分
    Completed(TestResult),
    /// 被拦截，携带服务端返回的原文说明
    Blocked(String),
}

/// 成绩上报结果（旧版/放弃路径）
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// 服务端已记录
    Recorded(AttemptReceipt),
    /// 被拦截（当天已考过 / 已有待审记录），携带服务端原文
    Blocked(String),
}

/// 旧版/放弃路径的成绩上报
///
/// `POST /api/attempts` 的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRequest {
    pub callsign: String,
    pub test_speed: i32,
    pub questions_correct: i32,
    pub copy_chars: i32,
    pub passed: bool,
    #[serde(default)]
    pub audio_progress: Option<f32>,
}

impl AttemptRequest {
    /// 构造一条"中途放弃"的失败记录
    pub fn abandoned(callsign: &str, test_speed: i32, audio_progress: f32) -> Self {
        Self {
            callsign: callsign.trim().to_uppercase(),
            test_speed,
            questions_correct: 0,
            copy_chars: 0,
            passed: false,
            audio_progress: Some(audio_progress),
        }
    }
}

/// 成绩上报回执
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReceipt {
    pub id: String,
    pub callsign: String,
    pub test_speed: i32,
    pub questions_correct: i32,
    pub copy_chars: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub certificate_number: Option<String>,
}

/// 审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Approved,
    Rejected,
}
