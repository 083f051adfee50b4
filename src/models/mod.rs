//! 数据模型
//!
//! 与后端交换的全部请求/响应记录，以及批量运行器的脚本格式。
//! 所有实体由后端持久化，这里只是每次会话内的瞬态副本

pub mod admin;
pub mod attempt;
pub mod loaders;
pub mod script;
pub mod stats;
pub mod test;

pub use admin::{
    AdminStats, ApprovedMember, ApprovedPage, AttemptHistory, EmailTemplate, GeneratedEmail,
    QuestionDraft, QueueItem, RecentActivity, SearchHit, Settings, SettingsUpdate, TestUpdate,
};
pub use attempt::{
    AttemptReceipt, AttemptRequest, PassReason, ReportOutcome, SubmissionDraft, SubmitOutcome,
    TestResult, ValidationStatus,
};
pub use loaders::toml_loader::{load_all_script_files, load_script_file};
pub use script::ExamScript;
pub use stats::{LeaderboardEntry, RosterEntry, SpeedStats, StatsSnapshot};
pub use test::{AnswerOption, Question, QuestionRecord, Segment, Test};
