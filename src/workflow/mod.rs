//! 流程层
//!
//! 定义"一次考试会话"的完整流程与播放段落推导

pub mod exam_ctx;
pub mod exam_flow;
pub mod segment_tracker;

pub use exam_ctx::SessionCtx;
pub use exam_flow::{ExamSession, PendingConfirm, View};
pub use segment_tracker::{active_segments, format_time, PlaybackTracker, SegmentWindow};
