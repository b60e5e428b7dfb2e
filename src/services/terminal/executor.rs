//! 命令执行器
//!
//! 终端会话服务通过 [`CommandExecutor`] 运行命令。执行失败是结果的一种，
//! 不会变成服务错误。

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::config::{ExecutorKind, TerminalConfig};
use crate::storage::CommandResult;

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &str) -> CommandResult;
}

/// 按配置构建执行器
pub fn build_executor(config: &TerminalConfig) -> Arc<dyn CommandExecutor> {
    match config.executor {
        ExecutorKind::Builtin => Arc::new(BuiltinExecutor),
        ExecutorKind::Process => Arc::new(ProcessExecutor::from_config(config)),
    }
}

const BUILTIN_COMMANDS: &[(&str, &str)] = &[
    ("echo", "print arguments"),
    ("help", "list available commands"),
    ("date", "current UTC time (RFC 3339)"),
    ("version", "server version"),
    ("uname", "server operating system"),
];

/// 进程内沙箱，不接触宿主系统
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinExecutor;

#[async_trait]
impl CommandExecutor for BuiltinExecutor {
    async fn run(&self, command: &str) -> CommandResult {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return CommandResult::error("empty command");
        };
        let args: Vec<&str> = parts.collect();

        match program {
            "echo" => CommandResult::output(format!("{}\n", args.join(" "))),
            "help" => {
                let mut out = String::from("Available commands:\n");
                for (name, desc) in BUILTIN_COMMANDS {
                    out.push_str(&format!("  {:<8} {}\n", name, desc));
                }
                CommandResult::output(out)
            }
            "date" => CommandResult::output(format!("{}\n", Utc::now().to_rfc3339())),
            "version" => CommandResult::output(format!(
                "{} {}\n",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
            "uname" => CommandResult::output(format!(
                "{} {}\n",
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            other => CommandResult::error(format!("command not found: {}", other)),
        }
    }
}

/// 白名单程序执行器
///
/// 直接 exec，不经过 shell；参数按空白切分，不支持引号与管道。
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    allowed: HashSet<String>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessExecutor {
    pub fn new(
        allowed: impl IntoIterator<Item = String>,
        timeout: Duration,
        max_output_bytes: usize,
    ) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            timeout,
            max_output_bytes,
        }
    }

    pub fn from_config(config: &TerminalConfig) -> Self {
        Self::new(
            config.allowed_programs.iter().cloned(),
            Duration::from_millis(config.command_timeout_ms),
            config.max_output_bytes,
        )
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, command: &str) -> CommandResult {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return CommandResult::error("empty command");
        };

        if !self.allowed.contains(program) {
            debug!("ProcessExecutor: '{}' is not allow-listed", program);
            return CommandResult::error(format!("command not allowed: {}", program));
        }

        let child = tokio::process::Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => CommandResult::Exit {
                status: output.status.code().unwrap_or(-1),
                stdout: truncate_output(&output.stdout, self.max_output_bytes),
                stderr: truncate_output(&output.stderr, self.max_output_bytes),
            },
            Ok(Err(e)) => {
                warn!("ProcessExecutor: failed to spawn '{}': {}", program, e);
                CommandResult::error(format!("failed to run {}: {}", program, e))
            }
            Err(_) => CommandResult::error(format!(
                "{} timed out after {} ms",
                program,
                self.timeout.as_millis()
            )),
        }
    }
}

/// 按字节上限截断输出，保证落在 UTF-8 字符边界上
fn truncate_output(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= max {
        return text.into_owned();
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
