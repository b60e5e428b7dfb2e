//! toolbelt - short links, pastes and owner-scoped terminal sessions
//!
//! # Architecture
//! - `storage`: SeaORM 存储后端与数据访问抽象
//! - `services`: 业务逻辑（paste、短链、终端会话、用户）
//! - `api`: HTTP 处理器、JWT 与中间件
//! - `config`: 配置加载
//! - `runtime`: 启动、运行模式与关闭
//! - `system`: 日志
//! - `ids`: 短 ID 生成与冲突重试

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ids;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
