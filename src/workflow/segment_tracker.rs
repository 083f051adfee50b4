//! 音频段落跟踪 - 流程层
//!
//! 根据播放进度推导"当前段落"，决定抄收区 / 答题区是否开放。
//! 段落表来自服务端；没有段落的老考试退化为一个覆盖全曲的
//! 合成 "Test" 段落

use crate::models::Test;

/// 段落窗口（运行时形式）
///
/// `end = None` 视为正无穷
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentWindow {
    pub name: String,
    pub start: f64,
    pub end: Option<f64>,
    pub enables_copy: bool,
    pub enables_questions: bool,
}

impl SegmentWindow {
    /// 播放头是否落在本段 [start, end) 内
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start
            && match self.end {
                Some(end) => t < end,
                None => true,
            }
    }
}

/// 当前考试的段落窗口表
///
/// 服务端没给段落时，退化为单个覆盖全曲、全功能开放的段落
pub fn active_segments(test: Option<&Test>) -> Vec<SegmentWindow> {
    if let Some(test) = test {
        if !test.segments.is_empty() {
            return test
                .segments
                .iter()
                .map(|seg| SegmentWindow {
                    name: seg.name.clone(),
                    start: seg.start_time,
                    end: seg.end_time,
                    enables_copy: seg.enables_copy,
                    enables_questions: seg.enables_questions,
                })
                .collect();
        }
    }

    vec![SegmentWindow {
        name: "Test".to_string(),
        start: 0.0,
        end: None,
        enables_copy: true,
        enables_questions: true,
    }]
}

/// 播放进度跟踪器
///
/// 只认原始播放时间，不持有音频资源
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    segments: Vec<SegmentWindow>,
    current_time: f64,
    duration: f64,
    played: bool,
}

impl PlaybackTracker {
    /// 为指定考试创建跟踪器（`active_segments` 保证段落表非空）
    pub fn new(test: Option<&Test>) -> Self {
        Self {
            segments: active_segments(test),
            current_time: 0.0,
            duration: 0.0,
            played: false,
        }
    }

    /// 播放进度更新（timeupdate 事件）
    pub fn tick(&mut self, current_time: f64, duration: f64) {
        self.current_time = current_time;
        self.duration = duration;
    }

    /// 播放结束（ended 事件）；此后两个区域强制全部开放
    pub fn finish(&mut self) {
        self.played = true;
        if self.duration > 0.0 {
            self.current_time = self.duration;
        }
    }

    pub fn played(&self) -> bool {
        self.played
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// 播放进度百分比（0-100）
    pub fn progress(&self) -> f32 {
        if self.played {
            return 100.0;
        }
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return 0.0;
        }
        ((self.current_time / self.duration) * 100.0).clamp(0.0, 100.0) as f32
    }

    /// 当前段落：第一个满足 start ≤ t < end 的段落，否则回退到第一段
    pub fn current_segment(&self) -> &SegmentWindow {
        self.segments
            .iter()
            .find(|seg| seg.contains(self.current_time))
            .unwrap_or(&self.segments[0])
    }

    /// 抄收区是否开放
    pub fn show_copy(&self) -> bool {
        self.played || self.current_segment().enables_copy
    }

    /// 答题区是否开放
    pub fn show_questions(&self) -> bool {
        self.played || self.current_segment().enables_questions
    }

    pub fn segments(&self) -> &[SegmentWindow] {
        &self.segments
    }
}

/// 秒数格式化为 M:SS，非法输入显示 0:00
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn segmented_test() -> Test {
        let json = serde_json::json!({
            "id": "20wpm-extra-1991",
            "title": "Extra Class",
            "speed_wpm": 20,
            "year": "1991",
            "audio_url": "/audio/20wpm/test.mp3",
        });
        let mut test: Test = serde_json::from_value(json).unwrap();
        test.segments = vec![
            Segment {
                name: "Intro".to_string(),
                start_time: 0.0,
                end_time: Some(62.0),
                enables_copy: false,
                enables_questions: false,
            },
            Segment {
                name: "Practice".to_string(),
                start_time: 62.0,
                end_time: Some(126.0),
                enables_copy: true,
                enables_questions: false,
            },
            Segment {
                name: "Test".to_string(),
                start_time: 221.0,
                end_time: Some(531.0),
                enables_copy: false,
                enables_questions: true,
            },
            Segment {
                name: "Outro".to_string(),
                start_time: 531.0,
                end_time: None,
                enables_copy: false,
                enables_questions: false,
            },
        ];
        test
    }

    #[test]
    fn test_first_matching_segment_wins() {
        let test = segmented_test();
        let mut tracker = PlaybackTracker::new(Some(&test));

        tracker.tick(0.0, 600.0);
        assert_eq!(tracker.current_segment().name, "Intro");

        tracker.tick(62.0, 600.0);
        assert_eq!(tracker.current_segment().name, "Practice");
        assert!(tracker.show_copy());
        assert!(!tracker.show_questions());

        tracker.tick(300.0, 600.0);
        assert_eq!(tracker.current_segment().name, "Test");
        assert!(!tracker.show_copy());
        assert!(tracker.show_questions());
    }

    #[test]
    fn test_open_ended_segment_covers_tail() {
        let test = segmented_test();
        let mut tracker = PlaybackTracker::new(Some(&test));
        tracker.tick(10000.0, 600.0);
        assert_eq!(tracker.current_segment().name, "Outro");
    }

    #[test]
    fn test_gap_falls_back_to_first_segment() {
        // 126-221 秒之间没有段落覆盖
        let test = segmented_test();
        let mut tracker = PlaybackTracker::new(Some(&test));
        tracker.tick(150.0, 600.0);
        assert_eq!(tracker.current_segment().name, "Intro");
    }

    #[test]
    fn test_missing_segments_synthesize_full_track() {
        let tracker = PlaybackTracker::new(None);
        let seg = tracker.current_segment();
        assert_eq!(seg.name, "Test");
        assert_eq!(seg.end, None);
        assert!(tracker.show_copy());
        assert!(tracker.show_questions());
    }

    #[test]
    fn test_finish_forces_both_sections_visible() {
        let test = segmented_test();
        let mut tracker = PlaybackTracker::new(Some(&test));
        tracker.tick(10.0, 600.0);
        assert!(!tracker.show_copy());
        assert!(!tracker.show_questions());

        tracker.finish();
        assert!(tracker.played());
        assert!(tracker.show_copy());
        assert!(tracker.show_questions());
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_progress_percentage() {
        let mut tracker = PlaybackTracker::new(None);
        assert_eq!(tracker.progress(), 0.0);
        tracker.tick(150.0, 600.0);
        assert_eq!(tracker.progress(), 25.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(62.9), "1:02");
        assert_eq!(format_time(531.0), "8:51");
    }
}
