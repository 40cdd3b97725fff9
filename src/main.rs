use std::env;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{LevelFilter, debug, info, warn};
use serde::Serialize;
use tokio::net::TcpListener;

use gtuverse::api::{self, AppState};
use gtuverse::auth::{
    AuthContext, FileStorage, LogNavigator, RegisterOutcome, SESSION_STORAGE_KEY, SessionUser,
};
use gtuverse::chat::ChatTimeline;
use gtuverse::client::{
    ApiClient, Credentials, NewRoom, ProfileUpdate, Registration, Room, Stream, UserProfile,
};
use gtuverse::config::{APP_NAME, AppConfig};

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn async_main(ctx: RuntimeContext, command: Command) -> Result<()> {
    match command {
        Command::Serve(cmd) => handle_serve(&ctx, cmd).await,
        Command::Login(cmd) => handle_login(&ctx, cmd).await,
        Command::Register(cmd) => handle_register(&ctx, cmd).await,
        Command::Rooms { command } => handle_rooms(&ctx, command).await,
        Command::Chat { command } => handle_chat(&ctx, command).await,
        Command::Streams { command } => handle_streams(&ctx, command).await,
        Command::Profile { command } => handle_profile(&ctx, command).await,
        _ => Err(anyhow!("command does not need the async runtime")),
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging()?;
    debug!("resolved paths: {}", ctx.paths);

    match cli.command {
        Command::Logout => handle_logout(&ctx),
        Command::Whoami => handle_whoami(&ctx),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => handle_completions(shell),
        command => async_main(ctx, command),
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "GTUVERSE - virtual room client and API proxy.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,
    /// Output machine readable JSON
    #[arg(long, global = true)]
    json: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    /// Override the proxy URL used by client commands
    #[arg(long = "proxy-url", value_name = "URL", global = true)]
    proxy_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the API proxy
    Serve(ServeCommand),
    /// Sign in and remember the session
    Login(LoginCommand),
    /// Create an account
    Register(RegisterCommand),
    /// Forget the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// View or edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Browse and manage rooms
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// Read and post room chat
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },
    /// Browse live streams
    Streams {
        #[command(subcommand)]
        command: StreamsCommand,
    },
    /// Create config directories and default files
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct ServeCommand {
    /// Address to bind to
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
    /// Room backend to forward requests to
    #[arg(long = "backend-url", value_name = "URL")]
    backend_url: Option<String>,
}

#[derive(Debug, Args)]
struct LoginCommand {
    username: String,
    /// Password (prompted on stdin when omitted)
    #[arg(long, env = "GTUVERSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Args)]
struct RegisterCommand {
    username: String,
    email: String,
    /// Password (prompted on stdin when omitted)
    #[arg(long, env = "GTUVERSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum RoomsCommand {
    /// List rooms
    List {
        /// Use the web projection with occupancy and thumbnails
        #[arg(long)]
        web: bool,
    },
    /// Show one room
    Show { id: String },
    /// Find rooms by type
    Search { room_type: String },
    /// Rooms the signed-in user belongs to
    Mine,
    /// Create a room hosted by the signed-in user
    Create(RoomArgs),
    /// Replace a room's settings
    Update {
        id: String,
        #[command(flatten)]
        room: RoomArgs,
    },
    /// Delete a room
    Delete { id: String },
    /// List the users in a room
    Users { id: String },
    /// Join a room as the signed-in user
    Join { id: String },
    /// Leave a room as the signed-in user
    Leave { id: String },
}

#[derive(Debug, Args)]
struct RoomArgs {
    name: String,
    #[arg(long = "type")]
    room_type: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long, default_value = "8")]
    capacity: u32,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ChatCommand {
    /// Print a room's messages
    History { room: String },
    /// Post a message to a room
    Send { room: String, message: String },
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    /// Fetch the profile from the backend
    Show,
    /// Change profile fields; omitted fields are left alone
    Update(ProfileArgs),
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Avatar image URL
    #[arg(long)]
    avatar: Option<String>,
}

#[derive(Debug, Subcommand)]
enum StreamsCommand {
    /// List live streams
    List,
    /// Show one stream
    Show { id: String },
}

#[derive(Debug, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
    /// Regenerate the default configuration file
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone())?;
        let mut config = load_or_init_config(&paths)?;
        if let Some(ref url) = common.proxy_url {
            config.client.proxy_url = url.clone();
        }
        let paths = paths.apply_overrides(&config)?;
        let ctx = Self {
            common,
            paths,
            config,
        };
        ctx.ensure_directories()?;
        Ok(ctx)
    }

    fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let level = match self.effective_log_level() {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        };

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{APP_NAME}={level},tower_http={level}"))
        });

        if self.common.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .ok();
        } else {
            let force_color = matches!(self.common.color, ColorOption::Always)
                || env::var_os("FORCE_COLOR").is_some();
            let disable_color = self.common.no_color
                || matches!(self.common.color, ColorOption::Never)
                || env::var_os("NO_COLOR").is_some()
                || (!force_color && !io::stderr().is_terminal());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(!disable_color)
                        .with_target(false),
                )
                .try_init()
                .ok();
        }

        // Also init env_logger for compatibility with log crate users
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        builder.filter_level(self.effective_log_level());
        builder.try_init().ok();

        Ok(())
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => self
                    .config
                    .logging
                    .level
                    .parse()
                    .unwrap_or(LevelFilter::Info),
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.paths.data_dir).with_context(|| {
            format!("creating data directory {}", self.paths.data_dir.display())
        })
    }

    fn storage(&self) -> Arc<FileStorage> {
        Arc::new(FileStorage::new(self.paths.data_dir.clone()))
    }

    fn api_client(&self) -> ApiClient {
        ApiClient::new(self.config.client.proxy_url.as_str())
    }

    /// Session store backed by the data directory.
    fn auth_context(&self) -> AuthContext {
        AuthContext::init(
            Arc::new(self.api_client()),
            self.storage(),
            Arc::new(LogNavigator),
            self.config.client.locale,
        )
    }

    /// Client carrying the stored session's bearer token, if any.
    fn session_client(&self) -> (ApiClient, Option<SessionUser>) {
        let auth = self.auth_context();
        let client = self.api_client();
        match auth.user() {
            Some(user) => (client.with_bearer(user.token.as_str()), Some(user.clone())),
            None => (client, None),
        }
    }

    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> Result<()> {
        if self.common.json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).context("serializing output to JSON")?
            );
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct AppPaths {
    config_file: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    fn discover(override_path: Option<PathBuf>) -> Result<Self> {
        let config_file = match override_path {
            Some(path) => {
                let expanded = expand_path(path)?;
                if expanded.is_dir() {
                    expanded.join("config.toml")
                } else {
                    expanded
                }
            }
            None => default_config_dir()?.join("config.toml"),
        };

        if config_file.parent().is_none() {
            return Err(anyhow!("invalid config file path: {config_file:?}"));
        }

        Ok(Self {
            config_file,
            data_dir: default_data_dir()?,
        })
    }

    fn apply_overrides(mut self, cfg: &AppConfig) -> Result<Self> {
        if let Some(ref data_override) = cfg.paths.data_dir {
            self.data_dir = expand_str_path(data_override)?;
        }
        Ok(self)
    }
}

impl fmt::Display for AppPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config: {}, data: {}",
            self.config_file.display(),
            self.data_dir.display()
        )
    }
}

async fn handle_serve(ctx: &RuntimeContext, cmd: ServeCommand) -> Result<()> {
    let mut proxy = ctx.config.proxy.clone();
    if let Some(host) = cmd.host {
        proxy.host = host;
    }
    if let Some(port) = cmd.port {
        proxy.port = port;
    }
    if let Some(backend_url) = cmd.backend_url {
        proxy.backend_url = backend_url;
    }

    let state = AppState::new(&proxy);
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", proxy.host, proxy.port)
        .parse()
        .context("invalid address")?;

    info!("Forwarding {} to {}", api::PROXY_PREFIX, proxy.backend_url);
    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .context("binding to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn handle_login(ctx: &RuntimeContext, cmd: LoginCommand) -> Result<()> {
    let password = match cmd.password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let credentials = Credentials {
        username: cmd.username,
        password,
    };

    let mut auth = ctx.auth_context();
    match auth.login(&credentials).await {
        Ok(user) => ctx.emit(&user, || format!("Logged in as {} (id {})", user.username, user.id)),
        Err(e) => {
            debug!("login error: {e:?}");
            bail!("{}", auth.error().unwrap_or("Login failed"))
        }
    }
}

async fn handle_register(ctx: &RuntimeContext, cmd: RegisterCommand) -> Result<()> {
    let password = match cmd.password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let registration = Registration {
        username: cmd.username,
        email: cmd.email,
        password,
    };

    let mut auth = ctx.auth_context();
    match auth.register(&registration).await {
        Ok(RegisterOutcome::SignedIn(user)) => ctx.emit(&user, || {
            format!("Registered and logged in as {}", user.username)
        }),
        Ok(RegisterOutcome::LoginRequired) => ctx.emit(&serde_json::json!({ "registered": true }), || {
            format!(
                "Registered {}. Run `{APP_NAME} login {}` to sign in.",
                registration.username, registration.username
            )
        }),
        Err(e) => {
            debug!("registration error: {e:?}");
            bail!("{}", auth.error().unwrap_or("Registration failed"))
        }
    }
}

fn handle_logout(ctx: &RuntimeContext) -> Result<()> {
    let mut auth = ctx.auth_context();
    if !auth.is_authenticated() {
        info!("No active session");
        return Ok(());
    }
    auth.logout();
    info!("Session cleared");
    Ok(())
}

fn handle_whoami(ctx: &RuntimeContext) -> Result<()> {
    let auth = ctx.auth_context();
    let Some(user) = auth.user() else {
        bail!("not logged in (run `{APP_NAME} login <username>`)");
    };
    ctx.emit(user, || {
        let mut line = format!("{} (id {})", user.username, user.id);
        if let Some(ref email) = user.email {
            line.push_str(&format!(" <{email}>"));
        }
        if !user.has_token() {
            line.push_str(" [no token]");
        }
        line
    })
}

fn require_user(user: Option<SessionUser>) -> Result<SessionUser> {
    user.ok_or_else(|| anyhow!("not logged in (run `{APP_NAME} login <username>`)"))
}

async fn handle_rooms(ctx: &RuntimeContext, command: RoomsCommand) -> Result<()> {
    let (client, user) = ctx.session_client();
    let rooms = client.rooms();

    match command {
        RoomsCommand::List { web } => {
            let list = if web {
                rooms.get_all().await?
            } else {
                rooms.list().await?
            };
            ctx.emit(&list, || format_rooms(&list))
        }
        RoomsCommand::Show { id } => {
            let room = rooms.get_by_id(&id).await?;
            ctx.emit(&room, || format_room(&room))
        }
        RoomsCommand::Search { room_type } => {
            let list = rooms.search_by_type(&room_type).await?;
            ctx.emit(&list, || format_rooms(&list))
        }
        RoomsCommand::Mine => {
            let user = require_user(user)?;
            let list = client.users().get_rooms(&user.id).await?;
            ctx.emit(&list, || format_rooms(&list))
        }
        RoomsCommand::Create(args) => {
            let user = require_user(user)?;
            let mut body = new_room(args);
            body.host_id = Some(user.id.into());
            let room = rooms.create(&body).await?;
            ctx.emit(&room, || format!("Created {}", format_room(&room)))
        }
        RoomsCommand::Update { id, room } => {
            let updated = rooms.update(&id, &new_room(room)).await?;
            ctx.emit(&updated, || format!("Updated room {id}"))
        }
        RoomsCommand::Delete { id } => {
            let deleted = rooms.delete(&id).await?;
            ctx.emit(&deleted, || format!("Deleted room {id}"))
        }
        RoomsCommand::Users { id } => {
            let users = rooms.get_users(&id).await?;
            ctx.emit(&users, || {
                users
                    .iter()
                    .map(|u| format!("{}\t{}", u.id, u.username))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RoomsCommand::Join { id } => {
            let user = require_user(user)?;
            let joined = rooms.join(&id, &user.id).await?;
            ctx.emit(&joined, || format!("Joined room {id}"))
        }
        RoomsCommand::Leave { id } => {
            let user = require_user(user)?;
            let left = rooms.leave(&id, &user.id).await?;
            ctx.emit(&left, || format!("Left room {id}"))
        }
    }
}

fn new_room(args: RoomArgs) -> NewRoom {
    NewRoom {
        name: args.name,
        room_type: args.room_type,
        genre: args.genre,
        capacity: args.capacity,
        description: args.description,
        host_id: None,
    }
}

fn format_room(room: &Room) -> String {
    let mut line = format!(
        "{}\t{}\t{}/{}",
        room.id, room.name, room.occupancy, room.capacity
    );
    if let Some(kind) = room.kind() {
        line.push('\t');
        line.push_str(kind);
    }
    if room.is_full() {
        line.push_str("\t[full]");
    }
    line
}

fn format_rooms(rooms: &[Room]) -> String {
    if rooms.is_empty() {
        return "No rooms found".to_string();
    }
    rooms.iter().map(format_room).collect::<Vec<_>>().join("\n")
}

async fn handle_chat(ctx: &RuntimeContext, command: ChatCommand) -> Result<()> {
    let (client, user) = ctx.session_client();

    match command {
        ChatCommand::History { room } => {
            let mut timeline = ChatTimeline::new(room);
            timeline.load(&client).await?;
            let messages: Vec<_> = timeline.entries().iter().map(|e| &e.message).collect();
            ctx.emit(&messages, || {
                messages
                    .iter()
                    .map(|m| {
                        format!(
                            "[{}] {}: {}",
                            m.timestamp.as_deref().unwrap_or("-"),
                            m.username,
                            m.content
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ChatCommand::Send { room, message } => {
            let user = require_user(user)?;
            let mut timeline = ChatTimeline::new(room);
            timeline.set_draft(message);
            match timeline.send(&client, &user).await? {
                Some(sent) => ctx.emit(&sent, || format!("Sent message {}", sent.id)),
                None => bail!("message is empty"),
            }
        }
    }
}

async fn handle_streams(ctx: &RuntimeContext, command: StreamsCommand) -> Result<()> {
    let (client, _) = ctx.session_client();
    let streams = client.streams();

    match command {
        StreamsCommand::List => {
            let list = streams.get_all().await?;
            ctx.emit(&list, || {
                if list.is_empty() {
                    return "No live streams".to_string();
                }
                list.iter().map(format_stream).collect::<Vec<_>>().join("\n")
            })
        }
        StreamsCommand::Show { id } => {
            let stream = streams.get_by_id(&id).await?;
            ctx.emit(&stream, || format_stream(&stream))
        }
    }
}

async fn handle_profile(ctx: &RuntimeContext, command: ProfileCommand) -> Result<()> {
    let (client, user) = ctx.session_client();
    let user = require_user(user)?;
    let users = client.users();

    match command {
        ProfileCommand::Show => {
            let profile = users.get_profile(&user.id).await?;
            ctx.emit(&profile, || format_profile(&profile))
        }
        ProfileCommand::Update(args) => {
            let update = profile_update(args)?;
            let updated = users.update_profile(&user.id, &update).await?;
            ctx.emit(&updated, || format!("Updated profile of {}", user.username))
        }
    }
}

fn profile_update(args: ProfileArgs) -> Result<ProfileUpdate> {
    let update = ProfileUpdate {
        username: args.username,
        email: args.email,
        avatar: args.avatar,
    };
    if update == ProfileUpdate::default() {
        bail!("nothing to update (pass --username, --email or --avatar)");
    }
    Ok(update)
}

fn format_profile(profile: &UserProfile) -> String {
    let mut line = format!("{}\t{}", profile.id, profile.username);
    if let Some(email) = &profile.email {
        line.push('\t');
        line.push_str(email);
    }
    line
}

fn format_stream(stream: &Stream) -> String {
    format!(
        "{}\t{}\t{} viewer(s)",
        stream.id, stream.title, stream.viewers
    )
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.paths.config_file.exists() && !cmd.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.config_file.display()
        ));
    }
    write_default_config(&ctx.paths.config_file)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ctx.config)
                        .context("serializing config to JSON")?
                );
            } else {
                println!(
                    "{}",
                    toml::to_string_pretty(&ctx.config).context("serializing config to TOML")?
                );
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            println!(
                "{}",
                ctx.paths
                    .data_dir
                    .join(format!("{SESSION_STORAGE_KEY}.json"))
                    .display()
            );
            Ok(())
        }
        ConfigCommand::Reset => write_default_config(&ctx.paths.config_file),
    }
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}

fn load_or_init_config(paths: &AppPaths) -> Result<AppConfig> {
    if !paths.config_file.exists() {
        write_default_config(&paths.config_file)?;
    }
    AppConfig::load(&paths.config_file)
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let body = AppConfig::default_toml(path)?;
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

fn expand_path(path: PathBuf) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        expand_str_path(text)
    } else {
        Ok(path)
    }
}

fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::data_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine data directory"))
}
