use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 命令执行器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExecutorKind {
    /// 进程内内置命令，不接触宿主系统
    #[default]
    Builtin,
    /// 白名单程序，经 tokio::process 执行
    Process,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接与重试
/// - logging: 日志配置
/// - auth: JWT 签发
/// - ids: 短 ID 长度与冲突重试预算
/// - limits: paste 大小、过期时间上限
/// - terminal: 命令执行器
/// - routes: 路由前缀
/// - cors / maintenance
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ids: IdConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：TB，分隔符：__
    /// 示例：TB__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TB")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("terminal.allowed_programs")
                    .with_list_parse_key("cors.allowed_origins"),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default)]
    pub enable_rotation: bool,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 为空时启动期随机生成（重启后旧 token 失效）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
}

/// 短 ID 生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default = "default_short_id_length")]
    pub short_id_length: usize,
    #[serde(default = "default_session_id_length")]
    pub session_id_length: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_paste_bytes")]
    pub max_paste_bytes: usize,
    /// 0 表示不限制
    #[serde(default = "default_max_ttl_secs")]
    pub max_ttl_secs: u64,
}

/// 终端会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub executor: ExecutorKind,
    #[serde(default)]
    pub allowed_programs: Vec<String>,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    #[serde(default = "default_max_command_length")]
    pub max_command_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_redirect_prefix")]
    pub redirect_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 后台维护任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// 过期记录清理间隔（秒），0 表示关闭
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://toolbelt.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_access_token_minutes() -> u64 {
    60
}

fn default_short_id_length() -> usize {
    8
}

fn default_session_id_length() -> usize {
    16
}

fn default_max_attempts() -> u32 {
    5
}

fn default_max_paste_bytes() -> usize {
    1024 * 1024
}

fn default_max_ttl_secs() -> u64 {
    60 * 60 * 24 * 365
}

fn default_command_timeout_ms() -> u64 {
    5000
}

fn default_max_output_bytes() -> usize {
    64 * 1024
}

fn default_max_command_length() -> usize {
    4096
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_redirect_prefix() -> String {
    "/s".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_purge_interval_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: default_access_token_minutes(),
        }
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            short_id_length: default_short_id_length(),
            session_id_length: default_session_id_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_paste_bytes: default_max_paste_bytes(),
            max_ttl_secs: default_max_ttl_secs(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorKind::default(),
            allowed_programs: Vec::new(),
            command_timeout_ms: default_command_timeout_ms(),
            max_output_bytes: default_max_output_bytes(),
            max_command_length: default_max_command_length(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            api_prefix: default_api_prefix(),
            redirect_prefix: default_redirect_prefix(),
            health_prefix: default_health_prefix(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}
