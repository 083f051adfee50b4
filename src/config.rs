/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 基础地址
    pub api_base_url: String,
    /// 考试脚本（TOML）存放目录
    pub scripts_folder: String,
    /// 同时运行的考试会话数量
    pub max_concurrent_sessions: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// Chromium/Chrome 可执行文件路径（证书 PDF 渲染用，空则自动探测）
    pub chrome_executable: Option<String>,
    // --- 管理端配置 ---
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            scripts_folder: "exam_scripts".to_string(),
            max_concurrent_sessions: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            chrome_executable: None,
            admin_username: "admin".to_string(),
            admin_password: "changeme".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("KNOWCODE_API_BASE_URL").unwrap_or(default.api_base_url),
            scripts_folder: std::env::var("EXAM_SCRIPTS_FOLDER").unwrap_or(default.scripts_folder),
            max_concurrent_sessions: std::env::var("MAX_CONCURRENT_SESSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_sessions),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            admin_username: std::env::var("KNOWCODE_ADMIN_USERNAME").unwrap_or(default.admin_username),
            admin_password: std::env::var("KNOWCODE_ADMIN_PASSWORD").unwrap_or(default.admin_password),
        }
    }
}
