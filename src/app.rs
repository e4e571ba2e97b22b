//! 命令处理
//!
//! 把命令行参数翻译成客户端调用，并把结果交给展示层输出。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::admin::page_to_json;
use crate::api::ApiClient;
use crate::cli::{
    AdminArgs, AdminCommand, AdminConfigCommand, AdminFavoritesCommand, AdminModelsCommand,
    AdminRecordsCommand, AdminUsersCommand, Command, FavoritesCommand, ProfileCommand,
    RecordsCommand,
};
use crate::config::Config;
use crate::error::BusinessError;
use crate::models::admin::{
    AdminSolveModelCreate, AdminSolveModelUpdate, AdminUniapiConfigUpdate, AdminUserCreate,
    AdminUserUpdate,
};
use crate::models::auth::ProfileUpdate;
use crate::models::markdown::build_copy_text;
use crate::models::record::ListQuery;
use crate::models::{map_detail_to_problem_detail, map_favorite_to_history, map_record_to_history};
use crate::session::{FileStorage, SessionStore};
use crate::views;
use crate::workflow::{notice_channel, NoticeReceiver, SolveFlow, StageMessage, SubmitOutcome};

/// 交互模式下刷新对话的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(150);

/// 应用主结构
pub struct App {
    config: Config,
    api: ApiClient,
}

impl App {
    /// 初始化应用：恢复会话并创建客户端
    pub fn initialize(config: Config) -> Result<Self> {
        let session = SessionStore::new(Arc::new(FileStorage::new(config.session_file.clone())));
        session.init(config.admin_token.clone());
        Self::with_session(config, session)
    }

    /// 使用外部提供的会话创建应用
    pub fn with_session(config: Config, session: SessionStore) -> Result<Self> {
        let api = ApiClient::new(&config, session).context("创建 HTTP 客户端失败")?;
        Ok(Self { config, api })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login { username, password } => {
                let data = self.api.login(&username, &password).await.context("登录失败")?;
                println!("✅ 欢迎回来，{}", data.user.display_name());
            }
            Command::Register { username, password } => {
                let data = self.api.register(&username, &password).await.context("注册失败")?;
                println!("✅ 注册成功，{}", data.user.display_name());
            }
            Command::Logout => {
                self.api.logout().context("清除登录态失败")?;
                println!("已退出登录");
            }
            Command::Whoami => match self.api.session().current_user() {
                Some(user) => println!("{}", views::render_profile(&user, "", None)),
                None => println!("未登录"),
            },
            Command::Profile(cmd) => self.run_profile(cmd).await?,
            Command::Models => {
                let flow = self.solve_flow().0;
                flow.refresh_models().await;
                println!(
                    "{}",
                    views::render_model_list(&flow.model_options(), flow.selected_model().as_deref())
                );
            }
            Command::Solve { model, question } => self.run_solve(model, question).await?,
            Command::Records(cmd) => self.run_records(cmd).await?,
            Command::Favorites(cmd) => self.run_favorites(cmd).await?,
            Command::Admin(args) => self.run_admin(args).await?,
        }
        Ok(())
    }

    // ========== 个人资料 ==========

    async fn run_profile(&self, cmd: ProfileCommand) -> Result<()> {
        match cmd {
            ProfileCommand::Show => {
                let (user, stats) = tokio::join!(self.api.get_profile(), self.api.records_stats());
                let user = user.context("获取资料失败")?;
                let stats = match stats.and_then(|env| env.into_data("/records/stats", "获取统计失败")) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        warn!("⚠️ 学习统计获取失败: {}", e);
                        None
                    }
                };
                let avatar = self.api.asset_url(user.avatar_url.as_deref());
                println!("{}", views::render_profile(&user, &avatar, stats.as_ref()));
            }
            ProfileCommand::Update {
                nickname,
                avatar_url,
            } => {
                if nickname.is_none() && avatar_url.is_none() {
                    bail!("请至少指定 --nickname 或 --avatar-url");
                }
                let user = self
                    .api
                    .update_profile(&ProfileUpdate {
                        nickname,
                        avatar_url,
                    })
                    .await
                    .context("更新资料失败")?;
                println!("✅ 资料已更新：{}", user.display_name());
            }
            ProfileCommand::Avatar { file } => {
                let url = self.api.upload_avatar(&file).await.context("上传头像失败")?;
                self.api
                    .update_profile(&ProfileUpdate {
                        nickname: None,
                        avatar_url: Some(url.clone()),
                    })
                    .await
                    .context("更新资料失败")?;
                println!("✅ 头像已更新：{}", self.api.asset_url(Some(&url)));
            }
        }
        Ok(())
    }

    // ========== 解题 ==========

    fn solve_flow(&self) -> (SolveFlow, NoticeReceiver) {
        let (tx, rx) = notice_channel();
        (SolveFlow::new(Arc::new(self.api.clone()), tx), rx)
    }

    async fn run_solve(&self, model: Option<String>, question: Option<String>) -> Result<()> {
        let (flow, mut notices) = self.solve_flow();
        flow.refresh_models().await;
        if let Some(id) = model {
            flow.select_model(id);
        }

        let mut printer = TranscriptPrinter::default();
        match question {
            Some(q) => {
                let outcome = printer.drive(&flow, &mut notices, flow.submit(&q)).await;
                if let SubmitOutcome::Failed { stage, failure } = outcome {
                    bail!("{}: {}", stage.label(), failure);
                }
                Ok(())
            }
            None => self.interactive(&flow, &mut notices, &mut printer).await,
        }
    }

    /// 交互模式：逐行读取题目
    async fn interactive(
        &self,
        flow: &SolveFlow,
        notices: &mut NoticeReceiver,
        printer: &mut TranscriptPrinter,
    ) -> Result<()> {
        println!("当前模型：{}", flow.selected_model_name());
        println!("输入题目后回车解题；:retry 重试，:view N 查看完整解析，:model ID 切换模型，:models 模型列表，:quit 退出");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("读取输入失败")? {
            let line = line.trim();
            match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
                (":quit" | ":q", _) => break,
                (":models", _) => {
                    flow.refresh_models().await;
                    println!(
                        "{}",
                        views::render_model_list(&flow.model_options(), flow.selected_model().as_deref())
                    );
                }
                (":model", id) => {
                    flow.select_model(id);
                    println!("当前模型：{}", flow.selected_model_name());
                }
                (":retry", _) => {
                    let question = flow.transcript().last_failed_question().map(str::to_string);
                    match question {
                        Some(q) => {
                            printer.drive(flow, notices, flow.retry(&q)).await;
                        }
                        None => println!("没有可重试的题目"),
                    }
                }
                (":view", n) => self.view_solution(flow, notices, n).await,
                _ => {
                    printer.drive(flow, notices, flow.submit(line)).await;
                }
            }
        }
        Ok(())
    }

    /// 查看第 n 个解答的完整解析；未保存的先补存
    async fn view_solution(&self, flow: &SolveFlow, notices: &mut NoticeReceiver, n: &str) {
        let entry = n
            .parse::<usize>()
            .ok()
            .and_then(|n| flow.transcript().nth_solution(n).map(|e| e.id));
        let Some(entry) = entry else {
            println!("找不到第 {} 个解答", n);
            return;
        };

        let result = flow.view_full_result(entry).await;
        print_notices(notices);
        match result {
            Ok(record_id) => {
                if let Err(e) = self.show_record(&record_id, false).await {
                    println!("❌ {:#}", e);
                }
            }
            Err(e) => println!("❌ {}", e.reason()),
        }
    }

    // ========== 解题记录 ==========

    async fn run_records(&self, cmd: RecordsCommand) -> Result<()> {
        match cmd {
            RecordsCommand::List { page, category } => {
                let query = ListQuery {
                    category,
                    ..page.to_query()
                };
                let page = self
                    .api
                    .records_list(&query)
                    .await?
                    .into_page("/records/list", "获取记录失败")?;
                let items: Vec<_> = page.items.iter().map(map_record_to_history).collect();
                println!("{}", views::render_history_list(&items, Some(page.total)));
            }
            RecordsCommand::Show { id, copy } => self.show_record(&id, copy).await?,
            RecordsCommand::Remove { id } => {
                self.api
                    .record_remove(&id)
                    .await?
                    .into_unit("/records/remove", "删除失败")?;
                println!("已删除记录 {}", id);
            }
            RecordsCommand::Stats => {
                let stats = self
                    .api
                    .records_stats()
                    .await?
                    .into_data("/records/stats", "获取统计失败")?;
                println!("解题总数：{}\n学习天数：{}", stats.total, stats.days_of_learning);
            }
        }
        Ok(())
    }

    async fn show_record(&self, id: &str, copy: bool) -> Result<()> {
        let item = self
            .api
            .record_detail(id)
            .await?
            .into_data("/records/detail", "获取详情失败")
            .with_context(|| format!("获取记录 {} 失败", id))?;
        let detail = map_detail_to_problem_detail(&item);
        if copy {
            println!("{}", build_copy_text(&detail));
        } else {
            println!("{}", views::render_problem_detail(&detail));
        }
        Ok(())
    }

    // ========== 收藏 ==========

    async fn run_favorites(&self, cmd: FavoritesCommand) -> Result<()> {
        match cmd {
            FavoritesCommand::List { page } => {
                let page = self
                    .api
                    .favorites_list(&page.to_query())
                    .await?
                    .into_page("/favorites/list", "获取收藏失败")?;
                let items: Vec<_> = page.items.iter().map(map_favorite_to_history).collect();
                println!("{}", views::render_history_list(&items, Some(page.total)));
            }
            FavoritesCommand::Add { record_id } => {
                self.api
                    .favorite_add(&record_id)
                    .await?
                    .into_data("/favorites/add", "收藏失败")?;
                println!("⭐ 已收藏");
            }
            FavoritesCommand::Remove { record_id } => {
                self.api
                    .favorite_remove(&record_id)
                    .await?
                    .into_unit("/favorites/remove", "取消收藏失败")?;
                println!("已取消收藏");
            }
            FavoritesCommand::Check { record_id } => {
                let check = self
                    .api
                    .favorite_check(&record_id)
                    .await?
                    .into_data("/favorites/check", "查询失败")?;
                println!("{}", if check.is_favorited { "已收藏" } else { "未收藏" });
            }
        }
        Ok(())
    }

    // ========== 管理后台 ==========

    async fn run_admin(&self, args: AdminArgs) -> Result<()> {
        if let Some(token) = args.token {
            self.api.session().set_admin_token(token);
        }
        let api = &self.api;
        let page_size = self.config.default_page_size;

        match args.command {
            AdminCommand::Users(cmd) => match cmd {
                AdminUsersCommand::List { page } => {
                    let page = api
                        .admin_users_list(&page.to_query())
                        .await?
                        .into_page("/admin/users", "获取用户失败")?;
                    print_json(&page_to_json(&page))?;
                }
                AdminUsersCommand::Get { id } => {
                    print_json(&api.admin_user_get(&id).await?.into_data("/admin/users", "获取用户失败")?)?;
                }
                AdminUsersCommand::Create { username, password } => {
                    let created = api
                        .admin_user_create(&AdminUserCreate { username, password })
                        .await?
                        .into_data("/admin/users", "创建用户失败")?;
                    print_json(&created)?;
                }
                AdminUsersCommand::Update {
                    id,
                    nickname,
                    avatar_url,
                } => {
                    api.admin_user_update(&id, &AdminUserUpdate { nickname, avatar_url })
                        .await?
                        .into_unit("/admin/users", "更新用户失败")?;
                    println!("已更新用户 {}", id);
                }
                AdminUsersCommand::Password { id, password } => {
                    api.admin_user_update_password(&id, &password)
                        .await?
                        .into_unit("/admin/users/password", "重置密码失败")?;
                    println!("已重置用户 {} 的密码", id);
                }
                AdminUsersCommand::Delete { id } => {
                    api.admin_user_delete(&id)
                        .await?
                        .into_unit("/admin/users", "删除用户失败")?;
                    println!("已删除用户 {}", id);
                }
                AdminUsersCommand::Avatar { id, file } => {
                    let url = api.admin_user_upload_avatar(&id, &file).await?;
                    println!("{}", api.asset_url(Some(&url)));
                }
            },
            AdminCommand::Models(cmd) => match cmd {
                AdminModelsCommand::List => {
                    let page = api
                        .admin_solve_models_list()
                        .await?
                        .into_page("/admin/solve-models", "获取模型失败")?;
                    print_json(&page_to_json(&page))?;
                }
                AdminModelsCommand::Create {
                    model_id,
                    display_name,
                    sort_order,
                    disabled,
                } => {
                    let item = api
                        .admin_solve_model_create(&AdminSolveModelCreate {
                            model_id,
                            display_name,
                            sort_order,
                            enabled: Some(!disabled),
                        })
                        .await?
                        .into_data("/admin/solve-models", "创建模型失败")?;
                    print_json(&item)?;
                }
                AdminModelsCommand::Update {
                    id,
                    display_name,
                    sort_order,
                    enabled,
                } => {
                    let item = api
                        .admin_solve_model_update(
                            id,
                            &AdminSolveModelUpdate {
                                display_name,
                                sort_order,
                                enabled,
                            },
                        )
                        .await?
                        .into_data("/admin/solve-models", "更新模型失败")?;
                    print_json(&item)?;
                }
                AdminModelsCommand::Delete { id } => {
                    api.admin_solve_model_delete(id)
                        .await?
                        .into_unit("/admin/solve-models", "删除模型失败")?;
                    println!("已删除模型 {}", id);
                }
            },
            AdminCommand::Config(cmd) => match cmd {
                AdminConfigCommand::Show => {
                    print_json(
                        &api.admin_uniapi_config_get()
                            .await?
                            .into_data("/admin/uniapi-config", "获取配置失败")?,
                    )?;
                }
                AdminConfigCommand::Update {
                    base_url,
                    token,
                    model,
                    base_url_knowledge,
                    token_knowledge,
                    model_knowledge,
                    base_url_semantic,
                    token_semantic,
                    model_semantic,
                } => {
                    api.admin_uniapi_config_update(&AdminUniapiConfigUpdate {
                        base_url,
                        token,
                        model,
                        base_url_knowledge,
                        token_knowledge,
                        model_knowledge,
                        base_url_semantic,
                        token_semantic,
                        model_semantic,
                    })
                    .await?
                    .into_unit("/admin/uniapi-config", "保存配置失败")?;
                    println!("配置已保存");
                }
            },
            AdminCommand::Records(cmd) => match cmd {
                AdminRecordsCommand::List { page, user_id } => {
                    let query = ListQuery {
                        user_id,
                        page_size: page.size.or(Some(page_size)),
                        ..page.to_query()
                    };
                    let page = api
                        .admin_records_list(&query)
                        .await?
                        .into_page("/admin/records", "获取记录失败")?;
                    print_json(&page_to_json(&page))?;
                }
                AdminRecordsCommand::Show { id } => {
                    print_json(
                        &api.admin_record_detail(&id)
                            .await?
                            .into_data("/admin/records", "获取详情失败")?,
                    )?;
                }
                AdminRecordsCommand::Delete { id } => {
                    api.admin_record_delete(&id)
                        .await?
                        .into_unit("/admin/records", "删除记录失败")?;
                    println!("已删除记录 {}", id);
                }
            },
            AdminCommand::Favorites(cmd) => match cmd {
                AdminFavoritesCommand::List { page, user_id } => {
                    let query = ListQuery {
                        user_id,
                        ..page.to_query()
                    };
                    let page = api
                        .admin_favorites_list(&query)
                        .await?
                        .into_page("/admin/favorites", "获取收藏失败")?;
                    print_json(&page_to_json(&page))?;
                }
                AdminFavoritesCommand::Delete { id } => {
                    api.admin_favorite_delete(&id)
                        .await?
                        .into_unit("/admin/favorites", "删除收藏失败")?;
                    println!("已删除收藏 {}", id);
                }
            },
            AdminCommand::Test { model } => {
                info!("🔌 正在测试模型连通性...");
                let report = api.run_connection_tests(model.as_deref()).await;
                print_json(&report)?;
            }
        }
        Ok(())
    }
}

/// 增量打印对话：新消息或被替换的消息才输出
#[derive(Default)]
struct TranscriptPrinter {
    shown: HashMap<Uuid, StageMessage>,
}

impl TranscriptPrinter {
    /// 执行一次提交，期间定时刷新对话与提示
    async fn drive<F>(&mut self, flow: &SolveFlow, notices: &mut NoticeReceiver, fut: F) -> SubmitOutcome
    where
        F: std::future::Future<Output = SubmitOutcome>,
    {
        tokio::pin!(fut);
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        let outcome = loop {
            tokio::select! {
                outcome = &mut fut => break outcome,
                _ = ticker.tick() => self.flush(flow),
            }
        };
        self.flush(flow);
        print_notices(notices);
        if outcome == SubmitOutcome::Busy {
            println!("{}", BusinessError::SubmissionInProgress);
        }
        outcome
    }

    fn flush(&mut self, flow: &SolveFlow) {
        let transcript = flow.transcript();
        let model_name = flow.selected_model_name();
        let mut solution_no = 0;
        for entry in transcript.entries() {
            let no = match entry.message {
                StageMessage::SolutionResolved { .. } => {
                    solution_no += 1;
                    Some(solution_no)
                }
                _ => None,
            };
            if self.shown.get(&entry.id) == Some(&entry.message) {
                continue;
            }
            println!("{}\n", views::render_entry(entry, &model_name, no));
            self.shown.insert(entry.id, entry.message.clone());
        }
    }
}

fn print_notices(notices: &mut NoticeReceiver) {
    while let Ok(notice) = notices.try_recv() {
        println!("{}", views::render_notice(&notice));
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("序列化输出失败")?);
    Ok(())
}
