//! # MathPro Client
//!
//! 数学解题助手的 Rust 客户端：提交题目，识别知识点与语义情境，
//! 调用解题模型，并管理解题记录与收藏。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 接入层（API）
//! - `api/` - 后端 HTTP 接口，统一解析 `{errCode, errMsg, data, total}` 信封
//! - `ApiClient` - 持有 HTTP 连接与会话，自动附带鉴权头
//! - `SolveBackend` - 解题流程依赖的最小接口
//!
//! ### ② 领域层（Models / Session）
//! - `models/` - 请求响应结构、展示结构与两者之间的映射
//! - `session/` - 可注入的登录态，启动时从文件恢复
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整处理流程
//! - `SubmissionCtx` - 单次提交的上下文与消息 id
//! - `SolveFlow` - 流程编排（analyze → solve → save）
//!
//! ### ④ 展示层（Views / App）
//! - `views` - 把对话与列表渲染为终端文本
//! - `app` / `cli` - 命令行入口
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod utils;
pub mod views;
pub mod workflow;

// 重新导出常用类型
pub use api::{ApiClient, ApiEnvelope, SolveBackend};
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::SessionStore;
pub use workflow::{SolveFlow, SubmitOutcome};
