//! # Know Code Extra
//!
//! 模拟历史 FCC 莫尔斯电码考试平台的 Rust 客户端工具集
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Browser / Clients）
//! - `browser/` - 无头浏览器启动（证书 PDF 渲染用）
//! - `clients/` - 公共端与管理端 API 客户端，reqwest 封装
//! - `AdminSession` - 显式会话凭证，按引用注入每个鉴权调用点
//!
//! ### ② 业务能力层（Admin / Certificate）
//! - `admin/` - 人工审核工作流：队列乐观更新、外联名单、搜索聚簇、
//!   段落/题目编辑缓冲
//! - `certificate/` - 证书模板替换与 PDF 渲染
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次考试会话"的完整流程
//! - `SessionCtx` - 上下文封装（呼号 + 考试ID）
//! - `ExamSession` - 状态机编排（home → select → test → results/blocked）
//! - `PlaybackTracker` - 段落推导与抄收/答题区开放判定
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 批量脚本运行器，管理资源和并发
//! - `orchestrator/script_runner` - 单个脚本的会话驱动
//!
//! 判分、限流、证书编号等业务规则全部在后端；客户端只镜像结果
//!
//! ## 模块结构

pub mod admin;
pub mod browser;
pub mod certificate;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_headless_browser;
pub use certificate::{default_certificate_number, CertificateData};
pub use clients::{AdminClient, AdminSession, ExamClient};
pub use config::Config;
pub use error::{AppError, AppResult, FlowError};
pub use models::{ExamScript, SubmitOutcome, Test};
pub use orchestrator::{process_single_script, App, SessionOutcome};
pub use workflow::{ExamSession, PlaybackTracker, SessionCtx, View};
