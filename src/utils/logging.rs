use anyhow::Result;
/// 日志工具模块
///
/// tracing 初始化与批处理横幅/统计的辅助函数
use std::fs;
use tracing::info;

use crate::orchestrator::app::ProcessingStats;

/// 初始化 tracing 日志
///
/// RUST_LOG 优先，缺省 `knowcodeextra=info`；重复调用是无害的
pub fn init() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knowcodeextra=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n考试会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量考试会话模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录脚本加载信息
pub fn log_scripts_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的考试脚本", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批会话: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, completed: usize, errors: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: {} 个会话, {} 个错误",
        batch_num, completed, errors
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &ProcessingStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}/{}", stats.passed, stats.total);
    info!("❎ 未通过: {}", stats.failed);
    info!("⛔ 被拦截: {}", stats.blocked);
    info!("🏳 放弃: {}", stats.abandoned);
    info!("❌ 错误: {}", stats.errors);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("0123456789ABC", 10), "0123456789...");
    }
}
