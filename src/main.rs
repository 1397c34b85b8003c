//! emojidex command line
//!
//! Without a subcommand the interactive terminal UI starts. The other
//! subcommands work on the same catalog and persisted state and print to
//! stdout.

use std::{fs, io, path::PathBuf, sync::Arc, sync::Mutex};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use emojidex::{
    ai::{run_worker, Combination, Sentiment, Suggestion},
    catalog::SKIN_TONES,
    config::StartView,
    filter::filter,
    session::AiLink,
    ui, AiReply, App, Catalog, Category, Config, EmojidexError, EmojidexResult, Emoji, FileStore,
    HttpCompletionClient, KvStore, MemoryStore, Mode, Session, SessionState, SuggestionAdapter,
    ThemeColorize, UserStore, View,
};

/// Log filter variable; defaults to `warn`
const LOG_ENV: &str = "EMOJIDEX_LOG";

#[derive(Parser)]
#[command(name = "emojidex")]
#[command(about = "Browse, collect and get AI suggestions for emoji in the terminal")]
#[command(version)]
struct Cli {
    /// Directory holding favorites, recents and collections
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/emojidex/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep all state in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive UI (default)
    Tui,

    /// Search the catalog by name or keyword
    Search {
        /// Text to match; omit to list everything
        query: Option<String>,

        /// Restrict to a category; repeat for several
        #[arg(short, long = "category")]
        categories: Vec<Category>,
    },

    /// Show one emoji and record it as recent
    Show {
        /// Codepoint such as U+1F600
        codepoint: String,
    },

    /// List favorites
    Favorites {
        /// Add or remove a codepoint first
        #[arg(long)]
        toggle: Option<String>,
    },

    /// Ask the AI model for emoji that fit some text
    Suggest {
        text: String,

        #[arg(short, long, default_value = "suggest")]
        mode: Mode,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(config, cli.ephemeral),
        command => {
            init_logging(io::stderr);
            run_command(command, &config, cli.ephemeral)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging<W>(writer: W)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(writer))
        .with(env_filter())
        .init();
}

/// The UI owns the terminal, so interactive runs log to a file.
fn init_file_logging(config: &Config, ephemeral: bool) -> EmojidexResult<()> {
    if ephemeral {
        init_logging(io::sink);
        return Ok(());
    }

    let path = config.log_path();
    fs::create_dir_all(&config.data_dir)
        .map_err(|e| EmojidexError::io(&config.data_dir, e.to_string()))?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| EmojidexError::io(&path, e.to_string()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .init();
    Ok(())
}

fn open_store(config: &Config, ephemeral: bool) -> UserStore<Box<dyn KvStore>> {
    let kv: Box<dyn KvStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(&config.data_dir))
    };
    UserStore::open(kv)
}

fn adapter(config: &Config) -> EmojidexResult<Option<SuggestionAdapter<HttpCompletionClient>>> {
    let Some(key) = config.api_key() else {
        return Ok(None);
    };
    let client = HttpCompletionClient::new(&config.ai, key)?;
    Ok(Some(SuggestionAdapter::new(client, Catalog::builtin())))
}

fn run_tui(config: Config, ephemeral: bool) -> EmojidexResult<()> {
    init_file_logging(&config, ephemeral)?;

    let adapter = adapter(&config)?.map(Arc::new);
    let (jobs_tx, jobs_rx) = async_channel::unbounded();
    let link = match adapter {
        Some(_) => AiLink::Ready(jobs_tx),
        None => AiLink::Disabled(format!(
            "Set {} to enable AI suggestions",
            config.ai.api_key_env
        )),
    };

    let start = match config.start_view {
        StartView::Landing => View::Landing,
        StartView::Home => View::Home,
    };
    let session =
        Session::new(Catalog::builtin(), open_store(&config, ephemeral), start).with_ai(link);
    info!(
        data_dir = %config.data_dir.display(),
        ai = adapter.is_some(),
        "starting interactive session"
    );

    smol::block_on(async {
        let mut app = App::new(SessionState::new(session), config.tick_rate())?;
        if let Some(adapter) = adapter {
            let events = app.events();
            app.spawn(run_worker(adapter, jobs_rx, events))?;
        }
        app.run(ui::render).await
    })
}

fn run_command(command: Commands, config: &Config, ephemeral: bool) -> EmojidexResult<()> {
    let catalog = Catalog::builtin();

    match command {
        Commands::Tui => unreachable!("handled by run_tui"),

        Commands::Search { query, categories } => {
            let found = filter(&catalog, query.as_deref().unwrap_or(""), &categories);
            if found.is_empty() {
                println!("{}", "No emoji match your search".warning());
                return Ok(());
            }
            for emoji in &found {
                print_row(emoji);
            }
            println!("{}", format!("{} of {} emoji", found.len(), catalog.len()).secondary());
        }

        Commands::Show { codepoint } => {
            let emoji = find(&catalog, &codepoint)?;
            let mut store = open_store(config, ephemeral);
            print_detail(emoji, &store);
            store.record_recent(emoji.codepoint)?;
        }

        Commands::Favorites { toggle } => {
            let mut store = open_store(config, ephemeral);
            if let Some(codepoint) = toggle {
                let emoji = find(&catalog, &codepoint)?;
                if store.toggle_favorite(emoji.codepoint)? {
                    println!("{}", format!("Added {} {}", emoji.glyph, emoji.name).success());
                } else {
                    println!("{}", format!("Removed {} {}", emoji.glyph, emoji.name).secondary());
                }
            }

            let favorites = catalog.resolve(store.favorites());
            if favorites.is_empty() {
                println!("{}", "No favorites yet".secondary());
            }
            for emoji in favorites {
                print_row(emoji);
            }
        }

        Commands::Suggest { text, mode } => {
            let adapter = adapter(config)?.ok_or_else(|| {
                EmojidexError::invalid_input(
                    config.ai.api_key_env.as_str(),
                    "set this environment variable to use AI suggestions",
                )
            })?;
            match adapter.run(mode, &text)? {
                AiReply::Suggestions(items) => print_suggestions(&items),
                AiReply::Sentiment(analysis) => print_sentiment(&analysis),
                AiReply::Combinations(items) => print_combinations(&items),
            }
        }
    }

    Ok(())
}

/// Accepts `U+1F600`, `u+1f600` or a bare `1F600`.
fn find(catalog: &Catalog, codepoint: &str) -> EmojidexResult<&'static Emoji> {
    let upper = codepoint.trim().to_uppercase();
    let normalized = if upper.starts_with("U+") {
        upper
    } else {
        format!("U+{upper}")
    };
    catalog
        .find(&normalized)
        .ok_or_else(|| EmojidexError::invalid_input(codepoint, "not in the catalog").into())
}

fn print_row(emoji: &Emoji) {
    println!(
        "{}  {} {} {}",
        emoji.glyph,
        format!("{:<32}", emoji.name).primary(),
        format!("{:<9}", emoji.codepoint).secondary(),
        emoji.category.label().secondary()
    );
}

fn print_detail<K: KvStore>(emoji: &Emoji, store: &UserStore<K>) {
    println!("{}  {}", emoji.glyph, emoji.name.accent());
    println!("{} {}", format!("{:<12}", "Codepoint").secondary(), emoji.codepoint);
    println!("{} {}", format!("{:<12}", "Category").secondary(), emoji.category);
    println!("{} {}", format!("{:<12}", "Keywords").secondary(), emoji.keywords.join(", "));
    if emoji.has_skin_tone {
        let tones: Vec<_> = SKIN_TONES.iter().map(|t| emoji.glyph_with_tone(t)).collect();
        println!("{} {}", format!("{:<12}", "Skin tones").secondary(), tones.join(" "));
    }
    if let Some(meaning) = emoji.meaning {
        println!("{} {}", format!("{:<12}", "Meaning").secondary(), meaning);
    }
    if store.is_favorite(emoji.codepoint) {
        println!("{}", "♥ favorite".error());
    }
    for collection in store
        .collections()
        .iter()
        .filter(|c| c.contains(emoji.codepoint))
    {
        println!(
            "{} {} {}",
            format!("{:<12}", "Collection").secondary(),
            collection.emoji,
            collection.name
        );
    }
}

fn print_suggestions(items: &[Suggestion]) {
    for s in items {
        println!(
            "{}  {} {:>2}/10  {}",
            s.emoji.glyph,
            format!("{:<28}", s.emoji.name).primary(),
            s.relevance,
            s.reason.as_str().secondary()
        );
    }
}

fn print_sentiment(analysis: &Sentiment) {
    println!(
        "{} {} ({}% confident)",
        "Overall".secondary(),
        analysis.overall.as_str().accent(),
        analysis.confidence
    );
    println!("{} {}", "Tone".secondary(), analysis.tone);
    for emotion in &analysis.emotions {
        println!("  {:<14} {:>3}%", emotion.name, emotion.intensity);
    }
    let glyphs: Vec<_> = analysis.emojis.iter().map(|e| e.glyph).collect();
    println!("{} {}", "Emoji".secondary(), glyphs.join(" "));
}

fn print_combinations(items: &[Combination]) {
    for c in items {
        println!(
            "{}  {} {}",
            c.glyphs(),
            c.meaning.as_str().primary(),
            format!("{}/10", c.popularity).secondary()
        );
        println!("    {}", c.usage.as_str().secondary());
    }
}
