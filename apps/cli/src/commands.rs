//! CLI command definitions, routing, and tracing setup.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use filebot_core::{AnswerProxy, Conversation, ExplorerEngine};
use filebot_shared::{
    AppConfig, FileMode, Session, Turn, init_config, load_config, load_session,
    require_credential, validate_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::render::render_turn;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// FileBot: browse and search a remote file store by chatting with it.
#[derive(Parser)]
#[command(
    name = "filebot",
    version,
    about = "Chat with a remote file store: open folders, search files, ask questions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Browse the file store interactively.
    Explore {
        /// File service base URL (overrides service.base_url).
        #[arg(long)]
        base_url: Option<String>,

        /// Preview selected files inline instead of printing a download link.
        #[arg(long)]
        preview: bool,

        /// Leave search snippets unmarked.
        #[arg(long)]
        no_highlight: bool,
    },

    /// Resolve a single query and print the resulting turns.
    Ask {
        /// The query text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Chat with the answer service.
    Chat {
        /// Chat backend base URL (overrides chat.base_url).
        #[arg(long)]
        base_url: Option<String>,

        /// Remote user id (overrides session.user_id).
        #[arg(long)]
        user: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "filebot=info",
        1 => "filebot=debug",
        _ => "filebot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Explore {
            base_url,
            preview,
            no_highlight,
        } => cmd_explore(base_url, preview, no_highlight).await,
        Command::Ask { text } => cmd_ask(&text.join(" ")).await,
        Command::Chat { base_url, user } => cmd_chat(base_url, user).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

async fn cmd_explore(base_url: Option<String>, preview: bool, no_highlight: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(url) = base_url {
        config.service.base_url = url;
    }
    if preview {
        config.explorer.file_mode = FileMode::Preview;
    }
    if no_highlight {
        config.explorer.highlight = false;
    }
    validate_config(&config)?;

    let session = load_session(&config);
    let engine = ExplorerEngine::from_config(&config)?;
    let mut conversation = Conversation::new();

    info!(conversation = %conversation.id(), "starting explorer");
    println!("Type a folder path or search terms. `:open N` opens item N, `:quit` exits.");

    with_spinner("Loading files...", engine.seed(&session, &mut conversation)).await;
    print_turns(conversation.log().turns());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":quit" {
            break;
        }

        let before = conversation.log().len();
        if let Some(arg) = input.strip_prefix(":open") {
            let selection = match pick(&conversation, arg) {
                Ok(selection) => selection,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };
            with_spinner(
                "Opening...",
                engine.select(&session, &mut conversation, &selection),
            )
            .await;
        } else {
            with_spinner(
                "Looking...",
                engine.submit(&session, &mut conversation, input),
            )
            .await?;
        }
        print_turns(conversation.log().since(before));
    }

    debug!(turns = conversation.log().len(), "explorer finished");
    Ok(())
}

/// Resolve `:open N` against the newest result list (1-based).
fn pick(conversation: &Conversation, arg: &str) -> Result<filebot_shared::Selection> {
    let index: usize = arg
        .trim()
        .parse()
        .map_err(|_| eyre!("usage: :open N (N is the number shown next to an item)"))?;
    let list = conversation
        .log()
        .last_results()
        .ok_or_else(|| eyre!("nothing to open yet"))?;
    index
        .checked_sub(1)
        .and_then(|i| list.get(i))
        .map(|item| item.selection())
        .ok_or_else(|| eyre!("no item {index}; the last list has {} items", list.len()))
}

async fn cmd_ask(text: &str) -> Result<()> {
    let config = load_config()?;
    let session = load_session(&config);
    let engine = ExplorerEngine::from_config(&config)?;

    let turns = with_spinner("Looking...", engine.respond(&session, text)).await?;
    print_turns(&turns);
    Ok(())
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

async fn cmd_chat(base_url: Option<String>, user: Option<String>) -> Result<()> {
    let mut config: AppConfig = load_config()?;
    if let Some(url) = base_url {
        config.chat.base_url = url;
    }
    if let Some(user) = user {
        config.session.user_id = user;
    }
    validate_config(&config)?;

    let session: Session = load_session(&config);
    require_credential(&config, &session)?;

    let proxy = AnswerProxy::from_config(&config)?;
    let mut conversation = Conversation::new();

    let loaded = with_spinner(
        "Loading history...",
        proxy.load_history(&session, &mut conversation),
    )
    .await;
    info!(conversation = %conversation.id(), history = loaded, "starting chat");
    print_turns(conversation.log().turns());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":quit" {
            break;
        }

        let before = conversation.log().len();
        with_spinner(
            "Thinking...",
            proxy.submit(&session, &mut conversation, input),
        )
        .await?;
        // The user's own line is already on screen.
        print_turns(conversation.log().since(before + 1));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

fn print_turns(turns: &[Turn]) {
    for turn in turns {
        println!("{}", render_turn(turn));
    }
}

/// Show a spinner on stderr while `work` runs.
async fn with_spinner<T>(message: &str, work: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let out = work.await;
    spinner.finish_and_clear();
    out
}
