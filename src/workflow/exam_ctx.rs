//! 考试会话上下文
//!
//! 封装"哪位考生正在考哪套题"这一信息

use std::fmt::Display;

/// 考试会话上下文
///
/// 只用于日志标识，不携带任何状态
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 考生呼号
    pub callsign: String,

    /// 考试ID
    pub test_id: String,

    /// 脚本序号（仅用于日志显示，从1开始）
    pub script_index: usize,
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new(callsign: String, test_id: String, script_index: usize) -> Self {
        Self {
            callsign,
            test_id,
            script_index,
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[呼号 {} 考试#{}]", self.callsign, self.test_id)
    }
}
