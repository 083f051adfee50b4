//! 考试会话状态机 - 流程层
//!
//! 核心职责：定义一次考试从进站到出成绩的完整流程
//!
//! 视图流转：
//! home → select → test → {results | blocked}，results 通过后可看证书；
//! leaderboard / roster 是 home/select/results 可达的只读侧视图
//!
//! 判分永远以服务端返回为准，本地统计只作界面提示

use std::collections::HashMap;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::ExamClient;
use crate::error::FlowError;
use crate::models::{
    AnswerOption, AttemptRequest, LeaderboardEntry, Question, ReportOutcome, RosterEntry,
    SubmissionDraft, SubmitOutcome, Test, TestResult,
};
use crate::workflow::segment_tracker::PlaybackTracker;

/// 视图状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Select,
    Test,
    Results,
    Blocked,
    Certificate,
    Leaderboard,
    Roster,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Select => "select",
            View::Test => "test",
            View::Results => "results",
            View::Blocked => "blocked",
            View::Certificate => "certificate",
            View::Leaderboard => "leaderboard",
            View::Roster => "roster",
        }
    }
}

/// 待确认操作（确认弹窗的替身）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    /// 开始考试
    StartTest { test_id: String },
    /// 中途放弃
    Abandon,
}

/// 考试会话
///
/// - 持有本次会话的全部瞬态状态
/// - 客户端按引用注入，不走全局
/// - 开始 / 放弃都要求两步确认
pub struct ExamSession<'a> {
    client: &'a ExamClient,
    view: View,
    callsign: String,
    tests: Vec<Test>,
    current_test: Option<Test>,
    questions: Vec<Question>,
    answers: HashMap<String, AnswerOption>,
    copy_text: String,
    playback: PlaybackTracker,
    pending_confirm: Option<PendingConfirm>,
    submitted: bool,
    result: Option<TestResult>,
    blocked_message: Option<String>,
}

impl<'a> ExamSession<'a> {
    /// 创建新的考试会话，落在 home 视图
    pub fn new(client: &'a ExamClient) -> Self {
        Self {
            client,
            view: View::Home,
            callsign: String::new(),
            tests: Vec::new(),
            current_test: None,
            questions: Vec::new(),
            answers: HashMap::new(),
            copy_text: String::new(),
            playback: PlaybackTracker::new(None),
            pending_confirm: None,
            submitted: false,
            result: None,
            blocked_message: None,
        }
    }

    // ========== 只读访问 ==========

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn current_test(&self) -> Option<&Test> {
        self.current_test.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &HashMap<String, AnswerOption> {
        &self.answers
    }

    pub fn playback(&self) -> &PlaybackTracker {
        &self.playback
    }

    /// 服务端判分结果（权威镜像）
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// 被拦截时服务端返回的原文
    pub fn blocked_message(&self) -> Option<&str> {
        self.blocked_message.as_deref()
    }

    pub fn pending_confirm(&self) -> Option<&PendingConfirm> {
        self.pending_confirm.as_ref()
    }

    /// 去掉空白后的抄收字符数（仅界面提示，不参与判定）
    pub fn copy_char_count(&self) -> usize {
        self.copy_text.chars().filter(|c| !c.is_whitespace()).count()
    }

    pub fn set_callsign(&mut self, callsign: impl Into<String>) {
        self.callsign = callsign.into();
    }

    // ========== home → select ==========

    /// "Begin Examination"：进入选择页并拉取可用考试
    pub async fn begin_examination(&mut self) -> Result<&[Test]> {
        self.tests = self.client.tests().await?;
        self.view = View::Select;
        Ok(&self.tests)
    }

    // ========== select → test ==========

    /// 请求开始考试（弹出确认）
    ///
    /// 呼号为空直接拒绝，不进入确认
    pub fn request_start(&mut self, test_id: &str) -> Result<(), FlowError> {
        if self.view != View::Select {
            return Err(FlowError::WrongView {
                action: "request_start",
                view: self.view.name(),
            });
        }
        if self.callsign.trim().is_empty() {
            return Err(FlowError::EmptyCallsign);
        }
        if !self.tests.iter().any(|t| t.id == test_id) {
            return Err(FlowError::TestNotFound {
                test_id: test_id.to_string(),
            });
        }
        self.pending_confirm = Some(PendingConfirm::StartTest {
            test_id: test_id.to_string(),
        });
        Ok(())
    }

    /// 关闭确认弹窗，不做任何操作
    pub fn cancel_confirmation(&mut self) {
        self.pending_confirm = None;
    }

    /// 确认开始：拉取题目、重置会话状态、进入考试视图
    pub async fn confirm_start(&mut self) -> Result<()> {
        let test_id = match self.pending_confirm.take() {
            Some(PendingConfirm::StartTest { test_id }) => test_id,
            _ => return Err(FlowError::ConfirmationMissing.into()),
        };

        let test = self
            .tests
            .iter()
            .find(|t| t.id == test_id)
            .cloned()
            .ok_or(FlowError::TestNotFound {
                test_id: test_id.clone(),
            })?;

        self.questions = self.client.questions(&test_id).await?;

        info!(
            "🎧 开始考试: {} ({} WPM, {} 道题)",
            test.title,
            test.speed_wpm,
            self.questions.len()
        );

        self.playback = PlaybackTracker::new(Some(&test));
        self.current_test = Some(test);
        self.answers.clear();
        self.copy_text.clear();
        self.result = None;
        self.blocked_message = None;
        self.submitted = false;
        self.view = View::Test;
        Ok(())
    }

    // ========== 考试进行中 ==========

    /// 播放进度更新
    pub fn playback_tick(&mut self, current_time: f64, duration: f64) {
        self.playback.tick(current_time, duration);
    }

    /// 音频播放完毕；此后所有区域可见
    pub fn playback_finished(&mut self) {
        self.playback.finish();
    }

    /// 抄收区是否可见
    pub fn show_copy_section(&self) -> bool {
        self.playback.show_copy()
    }

    /// 答题区是否可见
    pub fn show_questions_section(&self) -> bool {
        self.playback.show_questions()
    }

    /// 记录一题答案
    pub fn record_answer(
        &mut self,
        question_id: &str,
        option: AnswerOption,
    ) -> Result<(), FlowError> {
        if self.view != View::Test {
            return Err(FlowError::WrongView {
                action: "record_answer",
                view: self.view.name(),
            });
        }
        if self.submitted {
            return Err(FlowError::AnswersLocked);
        }
        if !self.show_questions_section() {
            return Err(FlowError::QuestionsHidden);
        }
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(FlowError::UnknownQuestion {
                question_id: question_id.to_string(),
            });
        }
        self.answers.insert(question_id.to_string(), option);
        Ok(())
    }

    /// 更新抄收文本
    pub fn set_copy_text(&mut self, text: impl Into<String>) -> Result<(), FlowError> {
        if self.view != View::Test {
            return Err(FlowError::WrongView {
                action: "set_copy_text",
                view: self.view.name(),
            });
        }
        if self.submitted {
            return Err(FlowError::AnswersLocked);
        }
        if !self.show_copy_section() {
            return Err(FlowError::CopyHidden);
        }
        self.copy_text = text.into();
        Ok(())
    }

    /// 提交按钮是否可用：音频播完 且 每道题都有答案
    pub fn can_submit(&self) -> bool {
        self.playback.played() && self.answers.len() == self.questions.len()
    }

    /// 提交答卷
    ///
    /// 400 路由到 blocked 视图（携带服务端原文），其余成功路由到
    /// results；提交后答案锁定
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        if self.view != View::Test {
            return Err(FlowError::WrongView {
                action: "submit",
                view: self.view.name(),
            }
            .into());
        }
        if !self.can_submit() {
            return Err(FlowError::NotReadyToSubmit {
                audio_played: self.playback.played(),
                answered: self.answers.len(),
                total: self.questions.len(),
            }
            .into());
        }

        let test_id = self
            .current_test
            .as_ref()
            .map(|t| t.id.clone())
            .ok_or(FlowError::NoTestSelected)?;

        let draft = SubmissionDraft {
            callsign: self.callsign.trim().to_uppercase(),
            answers: self.answers.clone(),
            copy_text: if self.copy_text.is_empty() {
                None
            } else {
                Some(self.copy_text.clone())
            },
            audio_progress: Some(self.playback.progress()),
        };

        let outcome = self.client.submit(&test_id, &draft).await?;
        self.apply_submit_outcome(outcome.clone());
        Ok(outcome)
    }

    /// 把提交结果落到视图状态上（不含网络，便于单测）
    fn apply_submit_outcome(&mut self, outcome: SubmitOutcome) {
        self.submitted = true;
        match outcome {
            SubmitOutcome::Blocked(message) => {
                warn!("⛔ 提交被拦截: {}", message);
                self.blocked_message = Some(message);
                self.view = View::Blocked;
            }
            SubmitOutcome::Completed(result) => {
                info!(
                    "📋 判分完成: passed={} score={}/{}",
                    result.passed, result.score, result.passing_score
                );
                self.result = Some(result);
                self.view = View::Results;
            }
        }
    }

    // ========== 放弃 ==========

    /// 请求放弃（弹出确认）
    pub fn request_abandon(&mut self) -> Result<(), FlowError> {
        if self.view != View::Test {
            return Err(FlowError::WrongView {
                action: "request_abandon",
                view: self.view.name(),
            });
        }
        self.pending_confirm = Some(PendingConfirm::Abandon);
        Ok(())
    }

    /// 确认放弃：先补交一条失败记录，再回到选择页
    ///
    /// 上报失败只记警告，不阻塞离场
    pub async fn confirm_abandon(&mut self) -> Result<()> {
        match self.pending_confirm.take() {
            Some(PendingConfirm::Abandon) => {}
            _ => return Err(FlowError::ConfirmationMissing.into()),
        }

        if let Some(test) = &self.current_test {
            let request = AttemptRequest::abandoned(
                &self.callsign,
                test.speed_wpm,
                self.playback.progress(),
            );
            match self.client.log_attempt(&request).await {
                Ok(ReportOutcome::Recorded(_)) => {
                    info!("已记录放弃: {}", request.callsign);
                }
                Ok(ReportOutcome::Blocked(message)) => {
                    warn!("放弃记录被拦截: {}", message);
                }
                Err(e) => {
                    warn!("放弃记录上报失败: {}", e);
                }
            }
        }

        self.view = View::Select;
        Ok(())
    }

    // ========== 侧视图 ==========

    /// 进入排行榜（每次进入都重新拉取，不缓存）
    pub async fn view_leaderboard(&mut self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.require_side_view_entry("view_leaderboard")?;
        let entries = self.client.leaderboard(limit).await?;
        self.view = View::Leaderboard;
        Ok(entries)
    }

    /// 进入会员名册（每次进入都重新拉取，不缓存）
    pub async fn view_roster(&mut self) -> Result<Vec<RosterEntry>> {
        self.require_side_view_entry("view_roster")?;
        let entries = self.client.roster().await?;
        self.view = View::Roster;
        Ok(entries)
    }

    fn require_side_view_entry(&self, action: &'static str) -> Result<(), FlowError> {
        match self.view {
            View::Home | View::Select | View::Results => Ok(()),
            _ => Err(FlowError::WrongView {
                action,
                view: self.view.name(),
            }),
        }
    }

    /// 查看证书：仅通过后可达；签发是异步的，可能仍在待审
    pub async fn view_certificate(&mut self) -> Result<String> {
        if self.view != View::Results {
            return Err(FlowError::WrongView {
                action: "view_certificate",
                view: self.view.name(),
            }
            .into());
        }
        let attempt_id = match &self.result {
            Some(result) if result.passed => result
                .certificate_id
                .clone()
                .ok_or(FlowError::CertificateUnavailable)?,
            _ => return Err(FlowError::CertificateUnavailable.into()),
        };

        let svg = self.client.certificate(&attempt_id).await?;
        self.view = View::Certificate;
        Ok(svg)
    }

    /// 回到首页
    pub fn return_home(&mut self) {
        self.view = View::Home;
    }

    /// 从 results / blocked 回到选择页
    pub fn return_to_select(&mut self) -> Result<(), FlowError> {
        match self.view {
            View::Results | View::Blocked | View::Certificate => {
                self.view = View::Select;
                Ok(())
            }
            _ => Err(FlowError::WrongView {
                action: "return_to_select",
                view: self.view.name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PassReason, Question, Segment};

    fn make_test(segments: Vec<Segment>) -> Test {
        let mut test: Test = serde_json::from_value(serde_json::json!({
            "id": "20wpm-extra-1991",
            "title": "Extra Class",
            "speed_wpm": 20,
            "year": "1991",
            "audio_url": "/audio/20wpm/test.mp3",
        }))
        .unwrap();
        test.segments = segments;
        test
    }

    fn make_question(id: &str, number: i32) -> Question {
        Question {
            id: id.to_string(),
            test_id: "20wpm-extra-1991".to_string(),
            question_number: number,
            question_text: format!("Question {}", number),
            option_a: "A".to_string(),
            option_b: "B".to_string(),
            option_c: "C".to_string(),
            option_d: "D".to_string(),
        }
    }

    /// 不经过网络，直接把会话摆到考试视图
    fn session_in_test_view(client: &ExamClient) -> ExamSession<'_> {
        let mut session = ExamSession::new(client);
        let test = make_test(Vec::new());
        session.callsign = "w6jsv".to_string();
        session.questions = vec![make_question("q1", 1), make_question("q2", 2)];
        session.playback = PlaybackTracker::new(Some(&test));
        session.current_test = Some(test);
        session.view = View::Test;
        session
    }

    fn offline_client() -> ExamClient {
        ExamClient::from_base_url("http://localhost:0")
    }

    #[test]
    fn test_request_start_requires_callsign() {
        let client = offline_client();
        let mut session = ExamSession::new(&client);
        session.view = View::Select;
        session.tests = vec![make_test(Vec::new())];

        assert_eq!(
            session.request_start("20wpm-extra-1991"),
            Err(FlowError::EmptyCallsign)
        );

        session.set_callsign("W6JSV");
        assert!(session.request_start("20wpm-extra-1991").is_ok());
        assert!(matches!(
            session.pending_confirm(),
            Some(PendingConfirm::StartTest { .. })
        ));

        session.cancel_confirmation();
        assert!(session.pending_confirm().is_none());
    }

    #[test]
    fn test_request_start_unknown_test() {
        let client = offline_client();
        let mut session = ExamSession::new(&client);
        session.view = View::Select;
        session.set_callsign("W6JSV");
        assert!(matches!(
            session.request_start("5wpm-novice"),
            Err(FlowError::TestNotFound { .. })
        ));
    }

    #[test]
    fn test_submit_gate_requires_audio_and_full_answers() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);

        assert!(!session.can_submit());

        session.playback_finished();
        assert!(!session.can_submit()); // 还没答题

        session.record_answer("q1", AnswerOption::A).unwrap();
        assert!(!session.can_submit()); // 只答了一题

        session.record_answer("q2", AnswerOption::C).unwrap();
        assert!(session.can_submit());
    }

    #[test]
    fn test_answers_gated_by_segment() {
        let client = offline_client();
        let segments = vec![
            Segment {
                name: "Intro".to_string(),
                start_time: 0.0,
                end_time: Some(60.0),
                enables_copy: false,
                enables_questions: false,
            },
            Segment {
                name: "Test".to_string(),
                start_time: 60.0,
                end_time: None,
                enables_copy: false,
                enables_questions: true,
            },
        ];
        let mut session = session_in_test_view(&client);
        session.playback = PlaybackTracker::new(Some(&make_test(segments)));

        // Intro 段落：答题区关闭
        session.playback_tick(10.0, 600.0);
        assert_eq!(
            session.record_answer("q1", AnswerOption::A),
            Err(FlowError::QuestionsHidden)
        );
        assert_eq!(
            session.set_copy_text("CQ"),
            Err(FlowError::CopyHidden)
        );

        // Test 段落：答题开放，抄收仍关闭
        session.playback_tick(90.0, 600.0);
        assert!(session.record_answer("q1", AnswerOption::A).is_ok());
        assert_eq!(session.set_copy_text("CQ"), Err(FlowError::CopyHidden));

        // 播放结束后全部开放
        session.playback_finished();
        assert!(session.set_copy_text("CQ CQ DE W1AW").is_ok());
    }

    #[test]
    fn test_unknown_question_rejected() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);
        session.playback_finished();
        assert!(matches!(
            session.record_answer("nope", AnswerOption::A),
            Err(FlowError::UnknownQuestion { .. })
        ));
    }

    #[test]
    fn test_blocked_outcome_routes_to_blocked_view() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);
        session.playback_finished();

        session.apply_submit_outcome(SubmitOutcome::Blocked(
            "You already have a passed attempt awaiting validation.".to_string(),
        ));

        assert_eq!(session.view(), View::Blocked);
        assert_eq!(
            session.blocked_message(),
            Some("You already have a passed attempt awaiting validation.")
        );
        assert!(session.result().is_none());

        // 拦截后答案锁定
        assert_eq!(
            session.record_answer("q1", AnswerOption::A),
            Err(FlowError::WrongView {
                action: "record_answer",
                view: "blocked"
            })
        );
    }

    #[test]
    fn test_completed_outcome_routes_to_results_and_locks() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);
        session.playback_finished();
        session.record_answer("q1", AnswerOption::A).unwrap();
        session.record_answer("q2", AnswerOption::B).unwrap();

        let result: TestResult = serde_json::from_value(serde_json::json!({
            "passed": true,
            "score": 8,
            "passing_score": 7,
            "pass_reason": "questions",
            "consecutive_correct": 42,
            "certificate_id": "attempt-1",
        }))
        .unwrap();
        session.apply_submit_outcome(SubmitOutcome::Completed(result));

        assert_eq!(session.view(), View::Results);
        let mirrored = session.result().unwrap();
        assert!(mirrored.passed);
        assert_eq!(mirrored.pass_reason, Some(PassReason::Questions));

        // results 视图允许回到选择页
        assert!(session.return_to_select().is_ok());
    }

    #[test]
    fn test_copy_char_count_ignores_whitespace() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);
        session.playback_finished();
        session.set_copy_text("CQ CQ DE W1AW  ").unwrap();
        assert_eq!(session.copy_char_count(), 11);
    }

    #[test]
    fn test_side_views_unreachable_from_test() {
        let client = offline_client();
        let session = session_in_test_view(&client);
        assert!(matches!(
            session.require_side_view_entry("view_leaderboard"),
            Err(FlowError::WrongView { .. })
        ));
    }

    #[test]
    fn test_abandon_requires_confirmation() {
        let client = offline_client();
        let mut session = session_in_test_view(&client);
        assert!(session.request_abandon().is_ok());
        assert_eq!(session.pending_confirm(), Some(&PendingConfirm::Abandon));

        // 没有确认直接调用 confirm_start 应该报错
        let err = tokio_test::block_on(session.confirm_start()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::ConfirmationMissing)
        ));
    }
}
