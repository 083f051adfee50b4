/// 公共端 API 客户端
///
/// 封装所有无需登录的后端调用逻辑
use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    AttemptReceipt, AttemptRequest, LeaderboardEntry, Question, ReportOutcome, RosterEntry,
    StatsSnapshot, SubmissionDraft, SubmitOutcome, Test, TestResult,
};

/// 公共端 API 客户端
#[derive(Clone)]
pub struct ExamClient {
    base_url: String,
    http: reqwest::Client,
}

impl ExamClient {
    /// 创建新的公共端客户端
    pub fn new(config: &Config) -> Self {
        Self::from_base_url(&config.api_base_url)
    }

    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// 可用考试列表
    pub async fn tests(&self) -> Result<Vec<Test>> {
        self.get_json("/api/tests").await
    }

    /// 指定考试的题目（不含正确答案）
    pub async fn questions(&self, test_id: &str) -> Result<Vec<Question>> {
        self.get_json(&format!("/api/tests/{}/questions", test_id))
            .await
    }

    /// 提交答卷
    ///
    /// # 返回
    /// - 400 → `SubmitOutcome::Blocked`，携带服务端返回原文（业务拦截，不是错误）
    /// - 其他非 2xx → 错误
    pub async fn submit(&self, test_id: &str, draft: &SubmissionDraft) -> Result<SubmitOutcome> {
        let url = format!("{}/api/tests/{}/submit", self.base_url, test_id);

        debug!("提交答卷 Payload: {}", serde_json::to_string(draft)?);

        let response = self
            .http
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if status.as_u16() == 400 {
            let message = response.text().await.unwrap_or_default();
            return Ok(SubmitOutcome::Blocked(message));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }

        let result: TestResult = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        debug!("判分结果: passed={} score={}", result.passed, result.score);

        Ok(SubmitOutcome::Completed(result))
    }

    /// 排行榜
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.get_json(&format!("/api/leaderboard?limit={}", limit))
            .await
    }

    /// 公共统计
    pub async fn stats(&self) -> Result<StatsSnapshot> {
        self.get_json("/api/stats").await
    }

    /// 会员名册
    pub async fn roster(&self) -> Result<Vec<RosterEntry>> {
        self.get_json("/api/roster").await
    }

    /// 上报一条成绩记录（旧版/放弃路径）
    ///
    /// 400 同样按业务拦截处理
    pub async fn log_attempt(&self, request: &AttemptRequest) -> Result<ReportOutcome> {
        let url = format!("{}/api/attempts", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if status.as_u16() == 400 {
            let message = response.text().await.unwrap_or_default();
            return Ok(ReportOutcome::Blocked(message));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }

        let receipt: AttemptReceipt = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        Ok(ReportOutcome::Recorded(receipt))
    }

    /// 获取证书 SVG（仅已批准的通过记录可用）
    pub async fn certificate(&self, attempt_id: &str) -> Result<String> {
        let url = format!("{}/api/certificate/{}", self.base_url, attempt_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }

        Ok(response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?)
    }

    /// 通用 GET + JSON 解析
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }

        Ok(response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?)
    }
}
