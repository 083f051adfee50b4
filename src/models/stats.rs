use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 排行榜条目（`GET /api/leaderboard`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub callsign: String,
    pub highest_speed_passed: i32,
    pub total_attempts: i32,
    pub total_passes: i32,
    #[serde(default)]
    pub first_passed_at: Option<DateTime<Utc>>,
}

/// 会员名册条目（`GET /api/roster`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub callsign: String,
    pub certificate_number: i32,
    #[serde(default)]
    pub validated_at: Option<DateTime<Utc>>,
}

/// 公共统计（`GET /api/stats`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_attempts: i64,
    pub total_passes: i64,
    pub unique_callsigns: i64,
    #[serde(default)]
    pub attempts_by_speed: Vec<SpeedStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedStats {
    pub test_speed: i32,
    pub attempts: i64,
    pub passes: i64,
}
