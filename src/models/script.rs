use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::test::AnswerOption;

/// 考试脚本
///
/// 一个 TOML 文件描述一次完整的模拟考试：谁来考、考哪套题、
/// 抄收内容和各题答案。批量运行器按脚本驱动考试会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamScript {
    /// 考生呼号
    pub callsign: String,
    /// 考试ID；缺省时取服务端返回的第一套可用考试
    #[serde(default)]
    pub test_id: Option<String>,
    /// 抄收文本
    #[serde(default)]
    pub copy_text: Option<String>,
    /// 是否完整听完音频（false 时模拟中途放弃）
    #[serde(default = "default_listen_through")]
    pub listen_through: bool,
    /// 题号 -> 选项（TOML 表的键是字符串形式的题号）
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerOption>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_listen_through() -> bool {
    true
}

impl ExamScript {
    /// 按题号取脚本中的答案
    pub fn answer_for(&self, question_number: i32) -> Option<AnswerOption> {
        self.answers.get(&question_number.to_string()).copied()
    }

    /// 脚本里涉及的题目数量
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_toml() {
        let content = r#"
            callsign = "w6jsv"
            test_id = "20wpm-extra-1991"
            copy_text = "CQ CQ DE W1AW"

            [answers]
            1 = "A"
            2 = "b"
        "#;
        let script: ExamScript = toml::from_str(content).unwrap();
        assert_eq!(script.callsign, "w6jsv");
        assert!(script.listen_through);
        assert_eq!(script.answer_for(1), Some(AnswerOption::A));
        assert_eq!(script.answer_for(3), None);
        assert_eq!(script.answer_count(), 2);
    }

    #[test]
    fn test_minimal_script() {
        let script: ExamScript = toml::from_str(r#"callsign = "K3ABC""#).unwrap();
        assert_eq!(script.test_id, None);
        assert_eq!(script.copy_text, None);
        assert_eq!(script.answer_count(), 0);
    }
}
