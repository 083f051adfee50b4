//! 批量考试运行器 - 编排层
//!
//! 管理资源与并发：加载全部脚本，按批并发跑会话，汇总统计

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::ExamClient;
use crate::config::Config;
use crate::models::{load_all_script_files, ExamScript};
use crate::orchestrator::script_runner::{process_single_script, SessionOutcome};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    client: ExamClient,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.max_concurrent_sessions);

        // 连通性检查：拉一次考试列表
        let client = ExamClient::new(&config);
        let tests = client.tests().await?;
        info!(
            "✓ 后端可达: {} ({} 套可用考试)",
            config.api_base_url,
            tests.len()
        );

        Ok(Self { config, client })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的考试脚本
        let all_scripts = load_scripts(&self.config).await?;

        if all_scripts.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML脚本，程序结束");
            return Ok(());
        }

        let total = all_scripts.len();
        logging::log_scripts_loaded(total, self.config.max_concurrent_sessions);

        // 处理所有脚本
        let stats = process_all_scripts(&self.client, all_scripts, &self.config).await?;

        // 输出最终统计
        logging::print_final_stats(&stats, &self.config.output_log_file);

        Ok(())
    }
}

/// 处理统计
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub passed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub abandoned: usize,
    pub errors: usize,
    pub total: usize,
}

/// 加载脚本
async fn load_scripts(config: &Config) -> Result<Vec<ExamScript>> {
    info!("\n📁 正在扫描待处理的考试脚本...");
    load_all_script_files(&config.scripts_folder).await
}

/// 处理所有脚本
async fn process_all_scripts(
    client: &ExamClient,
    all_scripts: Vec<ExamScript>,
    config: &Config,
) -> Result<ProcessingStats> {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_sessions));
    let total = all_scripts.len();
    let mut stats = ProcessingStats {
        total,
        ..Default::default()
    };

    // 分批处理
    let batch_size = config.max_concurrent_sessions;
    for batch_start in (0..total).step_by(batch_size) {
        let batch_end = (batch_start + batch_size).min(total);
        let batch_scripts = &all_scripts[batch_start..batch_end];
        let batch_num = (batch_start / batch_size) + 1;
        let total_batches = (total + batch_size - 1) / batch_size;

        logging::log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

        // 处理本批
        let batch_stats =
            process_batch(client, batch_scripts, batch_start, semaphore.clone(), config).await?;

        stats.passed += batch_stats.passed;
        stats.failed += batch_stats.failed;
        stats.blocked += batch_stats.blocked;
        stats.abandoned += batch_stats.abandoned;
        stats.errors += batch_stats.errors;

        logging::log_batch_complete(batch_num, batch_end - batch_start, batch_stats.errors);
    }

    Ok(stats)
}

/// 处理单个批次
async fn process_batch(
    client: &ExamClient,
    batch_scripts: &[ExamScript],
    batch_start: usize,
    semaphore: Arc<Semaphore>,
    config: &Config,
) -> Result<ProcessingStats> {
    let mut batch_handles = Vec::new();

    // 为本批创建并发任务
    for (idx, script) in batch_scripts.iter().enumerate() {
        let script_index = batch_start + idx + 1;
        let permit = semaphore.clone().acquire_owned().await?;
        let client_clone = client.clone();
        let script_clone = script.clone();
        let config_clone = config.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            match process_single_script(&client_clone, script_clone, script_index, &config_clone)
                .await
            {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    error!("[会话 {}] ❌ 处理过程中发生错误: {}", script_index, e);
                    Err(e)
                }
            }
        });
        batch_handles.push((script_index, handle));
    }

    // 等待本批所有任务完成
    let mut stats = ProcessingStats::default();

    for (script_index, handle) in batch_handles {
        match handle.await {
            Ok(Ok(SessionOutcome::Passed)) => stats.passed += 1,
            Ok(Ok(SessionOutcome::Failed)) => stats.failed += 1,
            Ok(Ok(SessionOutcome::Blocked)) => stats.blocked += 1,
            Ok(Ok(SessionOutcome::Abandoned)) => stats.abandoned += 1,
            Ok(Err(_)) => stats.errors += 1,
            Err(e) => {
                error!("[会话 {}] 任务执行失败: {}", script_index, e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}
