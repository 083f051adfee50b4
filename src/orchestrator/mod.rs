//! 编排层
//!
//! - `app` - 批量运行器，管理资源和并发
//! - `script_runner` - 单个脚本的会话驱动

pub mod app;
pub mod script_runner;

pub use app::App;
pub use script_runner::{process_single_script, SessionOutcome};
