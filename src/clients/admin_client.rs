/// 管理端 API 客户端
///
/// 所有调用显式接收 `&AdminSession`（依赖注入），不走任何全局状态；
/// 401 一律转换为 SessionExpired，调用方负责丢弃会话并重新登录
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    AdminStats, ApprovedPage, AttemptHistory, EmailTemplate, GeneratedEmail, QuestionDraft,
    QuestionRecord, QueueItem, SearchHit, Settings, SettingsUpdate, Test, TestUpdate,
};

/// 管理端会话凭证
///
/// login 的产物，按引用传给每一个需要鉴权的调用点
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// 本地判断凭证是否已过期（服务端仍是权威，401 照常处理）
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct ApproveResponse {
    #[allow(dead_code)]
    success: bool,
    certificate_number: i32,
}

#[derive(Debug, Deserialize)]
struct MarkReachedOutResponse {
    #[allow(dead_code)]
    success: bool,
    count: u64,
}

#[derive(Debug, Serialize)]
struct RejectForm<'a> {
    note: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BulkIdsForm<'a> {
    ids: &'a [String],
}

#[derive(Debug, Serialize)]
struct GenerateEmailForm<'a> {
    member_id: &'a str,
}

/// 管理端 API 客户端
#[derive(Clone)]
pub struct AdminClient {
    base_url: String,
    http: reqwest::Client,
}

impl AdminClient {
    /// 创建新的管理端客户端
    pub fn new(config: &Config) -> Self {
        Self::from_base_url(&config.api_base_url)
    }

    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// 登录，换取会话凭证
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession> {
        let url = format!("{}/api/admin/login", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        debug!("登录成功，凭证 {} 秒后过期", login.expires_in);

        Ok(AdminSession {
            token: login.token,
            expires_at: Utc::now() + Duration::seconds(login.expires_in),
        })
    }

    // ========== 仪表盘 / 队列 ==========

    /// 仪表盘统计
    pub async fn stats(&self, session: &AdminSession) -> Result<AdminStats> {
        self.get_json(session, "/api/admin/stats").await
    }

    /// 待审队列（created_at 升序）
    pub async fn queue(&self, session: &AdminSession) -> Result<Vec<QueueItem>> {
        self.get_json(session, "/api/admin/queue").await
    }

    /// 某呼号的全部历史记录
    pub async fn callsign_history(
        &self,
        session: &AdminSession,
        callsign: &str,
    ) -> Result<Vec<AttemptHistory>> {
        self.get_json(session, &format!("/api/admin/queue/{}/history", callsign))
            .await
    }

    /// 批准一条待审记录
    ///
    /// # 返回
    /// 服务端分配的证书编号
    pub async fn approve(&self, session: &AdminSession, attempt_id: &str) -> Result<i32> {
        let response: ApproveResponse = self
            .post_json(
                session,
                &format!("/api/admin/queue/{}/approve", attempt_id),
                &serde_json::json!({}),
            )
            .await?;
        Ok(response.certificate_number)
    }

    /// 驳回一条待审记录（终态），note 可选
    pub async fn reject(
        &self,
        session: &AdminSession,
        attempt_id: &str,
        note: Option<&str>,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .post_json(
                session,
                &format!("/api/admin/queue/{}/reject", attempt_id),
                &RejectForm { note },
            )
            .await?;
        Ok(())
    }

    // ========== 已批准 / 外联 ==========

    /// 已批准列表（分页，可按 reached_out 过滤）
    pub async fn approved(
        &self,
        session: &AdminSession,
        page: i32,
        per_page: i32,
        reached_out: Option<bool>,
    ) -> Result<ApprovedPage> {
        let mut path = format!("/api/admin/approved?page={}&per_page={}", page, per_page);
        if let Some(filter) = reached_out {
            path.push_str(&format!("&reached_out={}", filter));
        }
        self.get_json(session, &path).await
    }

    /// 批量标记"已联络"
    ///
    /// # 返回
    /// 实际更新的行数
    pub async fn mark_reached_out(
        &self,
        session: &AdminSession,
        ids: &[String],
    ) -> Result<u64> {
        let response: MarkReachedOutResponse = self
            .post_json(
                session,
                "/api/admin/approved/mark-reached-out",
                &BulkIdsForm { ids },
            )
            .await?;
        Ok(response.count)
    }

    /// 按模板生成外联邮件
    pub async fn generate_email(
        &self,
        session: &AdminSession,
        member_id: &str,
    ) -> Result<GeneratedEmail> {
        self.post_json(
            session,
            "/api/admin/email/generate",
            &GenerateEmailForm { member_id },
        )
        .await
    }

    // ========== 搜索 ==========

    /// 按呼号子串搜索
    pub async fn search(&self, session: &AdminSession, query: &str) -> Result<Vec<SearchHit>> {
        self.get_json(session, &format!("/api/admin/search?q={}", encode_query(query)))
            .await
    }

    // ========== 考试 / 题目编辑 ==========

    /// 管理端考试列表（含未激活的）
    pub async fn tests(&self, session: &AdminSession) -> Result<Vec<Test>> {
        self.get_json(session, "/api/admin/tests").await
    }

    /// 更新考试（激活状态 / 段落表）
    pub async fn update_test(
        &self,
        session: &AdminSession,
        test_id: &str,
        update: &TestUpdate,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .put_json(session, &format!("/api/admin/tests/{}", test_id), update)
            .await?;
        Ok(())
    }

    /// 管理端题目列表（含正确答案）
    pub async fn questions(
        &self,
        session: &AdminSession,
        test_id: &str,
    ) -> Result<Vec<QuestionRecord>> {
        self.get_json(session, &format!("/api/admin/tests/{}/questions", test_id))
            .await
    }

    /// 新建题目
    pub async fn create_question(
        &self,
        session: &AdminSession,
        test_id: &str,
        draft: &QuestionDraft,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .post_json(
                session,
                &format!("/api/admin/tests/{}/questions", test_id),
                draft,
            )
            .await?;
        Ok(())
    }

    /// 更新题目
    pub async fn update_question(
        &self,
        session: &AdminSession,
        question_id: &str,
        draft: &QuestionDraft,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .put_json(session, &format!("/api/admin/questions/{}", question_id), draft)
            .await?;
        Ok(())
    }

    /// 删除题目
    pub async fn delete_question(&self, session: &AdminSession, question_id: &str) -> Result<()> {
        let url = format!("{}/api/admin/questions/{}", self.base_url, question_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        self.check_status(&url, response).await?;
        Ok(())
    }

    // ========== 设置 ==========

    /// 系统设置
    pub async fn settings(&self, session: &AdminSession) -> Result<Settings> {
        self.get_json(session, "/api/admin/settings").await
    }

    /// 更新系统设置
    pub async fn update_settings(
        &self,
        session: &AdminSession,
        update: &SettingsUpdate,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .put_json(session, "/api/admin/settings", update)
            .await?;
        Ok(())
    }

    /// 外联邮件模板
    pub async fn email_template(&self, session: &AdminSession) -> Result<EmailTemplate> {
        self.get_json(session, "/api/admin/settings/email-template")
            .await
    }

    /// 保存外联邮件模板
    pub async fn update_email_template(
        &self,
        session: &AdminSession,
        template: &EmailTemplate,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .put_json(session, "/api/admin/settings/email-template", template)
            .await?;
        Ok(())
    }

    // ========== 请求辅助 ==========

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &AdminSession,
        path: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        let response = self.check_status(&url, response).await?;
        Ok(response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        session: &AdminSession,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        let response = self.check_status(&url, response).await?;
        Ok(response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?)
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        session: &AdminSession,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&session.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        let response = self.check_status(&url, response).await?;
        Ok(response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?)
    }

    /// 401 → SessionExpired，其余非 2xx → BadResponse（body 为服务端原文）
    async fn check_status(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(AppError::session_expired(url).into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::bad_response(url, status.as_u16(), body).into());
        }
        Ok(response)
    }
}

/// 最小化的查询参数转义（呼号只含字母数字和斜杠）
fn encode_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for ch in query.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' => out.push(ch),
            ' ' => out.push_str("%20"),
            other => {
                let mut buf = [0u8; 4];
                for byte in other.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_check() {
        let live = AdminSession {
            token: "t".to_string(),
            expires_at: Utc::now() + Duration::hours(8),
        };
        assert!(!live.is_expired());

        let stale = AdminSession {
            token: "t".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(stale.is_expired());
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("W1AW"), "W1AW");
        assert_eq!(encode_query("W1AW/7"), "W1AW%2F7");
        assert_eq!(encode_query("a b"), "a%20b");
    }
}
