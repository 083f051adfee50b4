//! 单个考试脚本处理 - 编排层
//!
//! 把一份 TOML 脚本驱动过完整的会话状态机：
//! 选考试 → 确认 → 模拟播放（按段落开放抄收/答题）→ 提交
//!
//! 被拦截（400）是正常业务结果，只上报不重试

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::clients::ExamClient;
use crate::config::Config;
use crate::models::{AnswerOption, ExamScript, SubmitOutcome};
use crate::utils::logging;
use crate::workflow::{ExamSession, SessionCtx};

/// 会话处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 服务端判定通过（进入人工审核队列）
    Passed,
    /// 服务端判定未通过
    Failed,
    /// 提交被拦截（当天已考 / 已有待审记录）
    Blocked,
    /// 脚本要求中途放弃
    Abandoned,
}

/// 处理单个考试脚本
pub async fn process_single_script(
    client: &ExamClient,
    script: ExamScript,
    script_index: usize,
    config: &Config,
) -> Result<SessionOutcome> {
    let mut session = ExamSession::new(client);
    session.set_callsign(&script.callsign);

    // home → select
    let tests = session.begin_examination().await?;
    let test_id = match &script.test_id {
        Some(id) => id.clone(),
        None => tests
            .first()
            .map(|t| t.id.clone())
            .ok_or_else(|| anyhow::anyhow!("服务端没有可用考试"))?,
    };

    let ctx = SessionCtx::new(script.callsign.clone(), test_id.clone(), script_index);
    info!("[会话 {}] 🪧 {} 进场", script_index, ctx);

    // select → test（两步确认）
    session.request_start(&test_id)?;
    session.confirm_start().await?;

    // 模拟播放，按段落时间线填入抄收与答案
    simulate_playback(&mut session, &script, script_index, config)?;

    if !script.listen_through {
        // 中途放弃：先确认，再补交失败记录
        session.request_abandon()?;
        session.confirm_abandon().await?;
        info!("[会话 {}] 🏳 已放弃（按脚本要求）", script_index);
        return Ok(SessionOutcome::Abandoned);
    }

    // 播放完毕，所有区域开放，补齐剩余输入
    session.playback_finished();
    fill_remaining(&mut session, &script, script_index)?;

    // 提交
    info!("[会话 {}] 📤 正在提交答卷...", script_index);
    let outcome = session.submit().await?;

    match outcome {
        SubmitOutcome::Completed(result) if result.passed => {
            info!(
                "[会话 {}] ✅ 通过: {}/{} 题, 连对 {} 字符 (原因: {:?})",
                script_index,
                result.score,
                result.passing_score,
                result.consecutive_correct,
                result.pass_reason
            );
            Ok(SessionOutcome::Passed)
        }
        SubmitOutcome::Completed(result) => {
            info!(
                "[会话 {}] ❎ 未通过: {}/{} 题",
                script_index, result.score, result.passing_score
            );
            Ok(SessionOutcome::Failed)
        }
        SubmitOutcome::Blocked(message) => {
            warn!("[会话 {}] ⛔ 被拦截: {}", script_index, message);
            Ok(SessionOutcome::Blocked)
        }
    }
}

/// 逐段推进播放头，在开放的段落里填入抄收和答案
fn simulate_playback(
    session: &mut ExamSession<'_>,
    script: &ExamScript,
    script_index: usize,
    config: &Config,
) -> Result<()> {
    let windows: Vec<_> = session.playback().segments().to_vec();
    let duration = windows
        .iter()
        .map(|w| w.end.unwrap_or(w.start + 60.0))
        .fold(0.0_f64, f64::max);

    let questions: Vec<(String, i32)> = session
        .questions()
        .iter()
        .map(|q| (q.id.clone(), q.question_number))
        .collect();

    for window in &windows {
        let t = window.start + 0.5;
        session.playback_tick(t, duration);

        if config.verbose_logging {
            debug!(
                "[会话 {}] 段落 {} @ {:.1}s (抄收={} 答题={})",
                script_index, window.name, t, window.enables_copy, window.enables_questions
            );
        }

        // 以跟踪器自身的判定为准（段落可能重叠，首段优先）
        if session.show_copy_section() {
            if let Some(copy) = &script.copy_text {
                session.set_copy_text(copy.clone())?;
                debug!(
                    "[会话 {}] ✍ 抄收: {}",
                    script_index,
                    logging::truncate_text(copy, 60)
                );
            }
        }

        if session.show_questions_section() {
            for (question_id, question_number) in &questions {
                if let Some(option) = script.answer_for(*question_number) {
                    session.record_answer(question_id, option)?;
                }
            }
        }
    }

    Ok(())
}

/// 播放结束后的收尾：补抄收、补齐脚本没覆盖的题目
///
/// 提交按钮要求每道题都有答案；脚本缺的题按 A 兜底并告警
fn fill_remaining(
    session: &mut ExamSession<'_>,
    script: &ExamScript,
    script_index: usize,
) -> Result<()> {
    if let Some(copy) = &script.copy_text {
        session.set_copy_text(copy.clone())?;
    }

    let questions: Vec<(String, i32)> = session
        .questions()
        .iter()
        .map(|q| (q.id.clone(), q.question_number))
        .collect();

    for (question_id, question_number) in &questions {
        if session.answers().contains_key(question_id) {
            continue;
        }
        match script.answer_for(*question_number) {
            Some(option) => session.record_answer(question_id, option)?,
            None => {
                warn!(
                    "[会话 {}] ⚠️ 脚本未提供第 {} 题答案，默认填 A",
                    script_index, question_number
                );
                session.record_answer(question_id, AnswerOption::A)?;
            }
        }
    }

    Ok(())
}
