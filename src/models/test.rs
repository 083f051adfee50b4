use serde::{Deserialize, Serialize};

/// 考试定义
///
/// 由后端 `GET /api/tests` 返回，公共端只读；
/// 管理端可以通过 `PUT /api/admin/tests/{id}` 修改 active / segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    pub title: String,
    pub speed_wpm: i32,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    pub audio_url: String,
    #[serde(default = "default_passing_score")]
    pub passing_score: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub question_count: i32,
    /// 音频段落列表，按 start_time 升序；可能为空（老数据）
    #[serde(default)]
    pub segments: Vec<Segment>,
}

fn default_passing_score() -> i32 {
    7
}

fn default_active() -> bool {
    true
}

/// 音频段落
///
/// `end_time = None` 表示"直到下一段 / 音频结束"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub start_time: f64,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub enables_copy: bool,
    #[serde(default)]
    pub enables_questions: bool,
}

/// 公共端题目（不含正确答案）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub test_id: String,
    pub question_number: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

/// 管理端题目（含正确答案）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question_number: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: AnswerOption,
}

/// 选择题选项
///
/// 反序列化容忍小写（脚本文件是手写的）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl<'de> Deserialize<'de> for AnswerOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl AnswerOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

impl std::str::FromStr for AnswerOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            other => Err(format!("无法识别的选项: {}", other)),
        }
    }
}

impl std::fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Helper function to deserialize year as either string or integer
fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct YearVisitor;

    impl<'de> Visitor<'de> for YearVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer representing a year")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_year_accepts_string_and_int() {
        let json = r#"{"id":"20wpm-extra-1991","title":"Extra Class","speed_wpm":20,
                       "year":1991,"audio_url":"/audio/20wpm/test.mp3"}"#;
        let test: Test = serde_json::from_str(json).unwrap();
        assert_eq!(test.year, "1991");
        assert_eq!(test.passing_score, 7);
        assert!(test.active);
        assert!(test.segments.is_empty());
    }

    #[test]
    fn test_answer_option_round_trip() {
        let opt: AnswerOption = "c".parse().unwrap();
        assert_eq!(opt, AnswerOption::C);
        assert_eq!(serde_json::to_string(&opt).unwrap(), "\"C\"");
    }

    #[test]
    fn test_segment_open_end_deserializes_to_none() {
        let json = r#"{"name":"Outro","start_time":531.0,"end_time":null,
                       "enables_copy":false,"enables_questions":false}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.end_time, None);
    }
}
