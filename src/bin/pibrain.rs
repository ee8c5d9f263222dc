//! pibrain command-line interface.
//!
//! Every subcommand runs behind the consent prompt.
//!
//! ```bash
//! pibrain chat
//! pibrain ask "What is the speed of light?"
//! pibrain persona einstein "What is time?"
//! pibrain sentiment --backend lexicon "This is not good"
//! pibrain db query "SELECT Name FROM Artist LIMIT 5"
//! pibrain run plan.json
//! pibrain dedupe requirements.txt
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pibrain::bot::{Activity, ActivityType, Bot};
use pibrain::consent::{self, Consented, TerminalConsent};
use pibrain::inference::chat_from_settings;
use pibrain::maintenance::remove_duplicate_lines;
use pibrain::persona::{self, Persona};
use pibrain::registry::{load_plans, FunctionRegistry};
use pibrain::sentiment::{self, Backend};
use pibrain::services::InfoServices;
use pibrain::store::SqliteStore;
use pibrain::Settings;

#[derive(Subcommand, Debug, Clone)]
enum DbCommand {
    /// List table names.
    Tables,
    /// List every table with its columns.
    Info,
    /// Run an SQL query and print the rows as JSON.
    Query { sql: String },
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Talk to the bot on stdin; a line containing "end" or "stop" finishes.
    Chat {
        #[arg(long, default_value = "local-user")]
        user: String,
    },
    /// Ask a one-off question with no conversation context.
    Ask { question: String },
    /// Answer as a persona; `all` runs every persona in turn.
    Persona { name: String, question: String },
    /// Refute an argument with a canned fallacy.
    Fallacy { argument: String },
    /// Score text with a sentiment backend.
    Sentiment {
        #[arg(long, default_value = "intensity")]
        backend: Backend,
        text: String,
    },
    /// Inspect or query the sample database.
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    /// Validate and execute a JSON function plan.
    Run { plan: PathBuf },
    /// Remove duplicate lines from a file in place.
    Dedupe { file: PathBuf },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pibrain", version)]
#[command(about = "Conversational bot with persona responders and a sample database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::load();

    let Some(consent) = consent::obtain(&mut TerminalConsent::stdio())? else {
        return Ok(());
    };

    match cli.command {
        Commands::Chat { user } => chat(consent, &settings, &user).await,
        Commands::Ask { question } => {
            let answer = bot(consent, &settings).get_internet_answer(&question).await?;
            println!("{}", answer);
            Ok(())
        }
        Commands::Persona { name, question } => {
            if name.eq_ignore_ascii_case("all") || name.eq_ignore_ascii_case("universal") {
                println!("{}", persona::universal_reasoning(&question));
                return Ok(());
            }
            let Some(p) = Persona::from_name(&name) else {
                bail!("Unknown persona '{}'", name);
            };
            println!("{} Response: {}", p, p.respond(&question));
            Ok(())
        }
        Commands::Fallacy { argument } => {
            println!("{}", persona::identify_and_refute_fallacies(&argument));
            Ok(())
        }
        Commands::Sentiment { backend, text } => {
            let result = sentiment::analyzer(backend).analyze(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if sentiment::detect_sarcasm(&text) {
                println!("(sarcasm detected)");
            }
            Ok(())
        }
        Commands::Db { command } => db(consent, &settings, command).await,
        Commands::Run { plan } => run_plan(consent, &settings, &plan).await,
        Commands::Dedupe { file } => {
            let dropped = remove_duplicate_lines(&file)
                .with_context(|| format!("Failed to rewrite {}", file.display()))?;
            println!("Duplicates removed from {} ({} line(s))", file.display(), dropped);
            Ok(())
        }
    }
}

fn bot(consent: Consented, settings: &Settings) -> Bot {
    Bot::new(
        consent,
        chat_from_settings(settings),
        Arc::from(sentiment::analyzer(Backend::Intensity)),
    )
}

async fn chat(consent: Consented, settings: &Settings, user: &str) -> Result<()> {
    let bot = bot(consent, settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            continue;
        }

        let replies = bot
            .on_message_activity(&Activity::message_from(user, text))
            .await;
        let mut ended = false;
        for reply in replies {
            match reply.kind {
                ActivityType::Message => println!("{}", reply.text.unwrap_or_default()),
                ActivityType::EndOfConversation => ended = true,
                ActivityType::Other => {}
            }
        }
        if ended {
            break;
        }
    }
    Ok(())
}

async fn db(consent: Consented, settings: &Settings, command: DbCommand) -> Result<()> {
    let store = SqliteStore::open_or_download(&settings.db_path, &settings.db_url)
        .await
        .with_context(|| format!("Database {} unavailable", settings.db_path.display()))?;
    let bot = bot(consent, settings).with_store(Arc::new(store));

    match command {
        DbCommand::Tables => {
            for table in bot.database_info() {
                println!("{}", table.table_name);
            }
        }
        DbCommand::Info => {
            println!("{}", serde_json::to_string_pretty(&bot.database_info())?);
        }
        DbCommand::Query { sql } => {
            for row in bot.ask_database(&sql) {
                println!("{}", serde_json::Value::Array(row));
            }
        }
    }
    Ok(())
}

async fn run_plan(consent: Consented, settings: &Settings, path: &Path) -> Result<()> {
    let plans = load_plans(path)?;
    let registry = FunctionRegistry::new(consent)
        .with_chat(chat_from_settings(settings))
        .with_services(InfoServices::from_settings(settings)?);

    for plan in &plans {
        if let Some(question) = &plan.question {
            println!("Question: {}", question);
        }
        for (step, (name, output)) in plan.steps.iter().zip(registry.execute(plan).await) {
            println!("Function: {}", name);
            if let Some(description) = &step.description {
                println!("Description: {}", description);
            }
            println!("Response: {}", output);
        }
    }
    Ok(())
}
