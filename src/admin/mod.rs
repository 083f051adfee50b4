//! 管理端流程
//!
//! 登录拿到 AdminSession 后，围绕待审队列、外联名单、搜索和
//! 考试/题目编辑器的人工审核工作流

pub mod editors;
pub mod outreach;
pub mod queue;
pub mod search;

pub use editors::{QuestionEditor, SegmentEditor};
pub use outreach::ApprovedRoster;
pub use queue::QueueTriage;
pub use search::{group_by_callsign, CallsignSearch};
