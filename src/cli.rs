//! 命令行参数定义

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mathpro", version, about = "MathPro 数学解题助手")]
pub struct Cli {
    /// 配置文件（默认读取当前目录下的 mathpro.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 登录
    Login {
        username: String,
        password: String,
    },
    /// 注册并自动登录
    Register {
        username: String,
        password: String,
    },
    /// 退出登录
    Logout,
    /// 显示当前登录用户
    Whoami,
    /// 个人资料
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// 列出可用的解题模型
    Models,
    /// 解题；不带题目时进入交互模式
    Solve {
        /// 指定解题模型 ID
        #[arg(long)]
        model: Option<String>,
        /// 题目内容
        question: Option<String>,
    },
    /// 解题记录
    #[command(subcommand)]
    Records(RecordsCommand),
    /// 收藏
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// 管理后台
    Admin(AdminArgs),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// 显示资料与学习统计
    Show,
    /// 修改昵称或头像地址
    Update {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// 上传头像图片
    Avatar { file: PathBuf },
}

/// 列表分页参数
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    #[arg(long, default_value = "1")]
    pub page: u32,
    /// 每页条数（默认取配置）
    #[arg(long)]
    pub size: Option<u32>,
    /// 关键词
    #[arg(long)]
    pub keyword: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    /// 分页列出
    List {
        #[command(flatten)]
        page: PageArgs,
        /// 分类
        #[arg(long)]
        category: Option<String>,
    },
    /// 查看详情
    Show {
        id: String,
        /// 输出可复制的纯文本
        #[arg(long)]
        copy: bool,
    },
    /// 删除
    Remove { id: String },
    /// 学习统计
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// 收藏解题记录
    Add { record_id: String },
    /// 取消收藏
    Remove { record_id: String },
    /// 查看是否已收藏
    Check { record_id: String },
}

#[derive(Args, Debug)]
pub struct AdminArgs {
    /// 管理员口令（默认取 MATHPRO_ADMIN_TOKEN）
    #[arg(long)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// 用户管理
    #[command(subcommand)]
    Users(AdminUsersCommand),
    /// 解题模型管理
    #[command(subcommand)]
    Models(AdminModelsCommand),
    /// 模型接口配置
    #[command(subcommand)]
    Config(AdminConfigCommand),
    /// 全站解题记录
    #[command(subcommand)]
    Records(AdminRecordsCommand),
    /// 全站收藏
    #[command(subcommand)]
    Favorites(AdminFavoritesCommand),
    /// 测试三个模型端点的连通性
    Test {
        /// 指定解题模型 ID
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminUsersCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Get { id: String },
    Create { username: String, password: String },
    Update {
        id: String,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// 重置密码
    Password { id: String, password: String },
    Delete { id: String },
    /// 上传头像
    Avatar { id: String, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum AdminModelsCommand {
    List,
    Create {
        model_id: String,
        display_name: String,
        #[arg(long)]
        sort_order: Option<i32>,
        #[arg(long)]
        disabled: bool,
    },
    Update {
        id: i64,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        sort_order: Option<i32>,
        #[arg(long)]
        enabled: Option<bool>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum AdminConfigCommand {
    Show,
    Update {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        base_url_knowledge: Option<String>,
        #[arg(long)]
        token_knowledge: Option<String>,
        #[arg(long)]
        model_knowledge: Option<String>,
        #[arg(long)]
        base_url_semantic: Option<String>,
        #[arg(long)]
        token_semantic: Option<String>,
        #[arg(long)]
        model_semantic: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminRecordsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// 只看某个用户
        #[arg(long)]
        user_id: Option<String>,
    },
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AdminFavoritesCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        user_id: Option<String>,
    },
    Delete { id: String },
}

impl PageArgs {
    pub fn to_query(&self) -> crate::models::record::ListQuery {
        crate::models::record::ListQuery {
            page: Some(self.page),
            page_size: self.size,
            keyword: self.keyword.clone(),
            ..Default::default()
        }
    }
}
