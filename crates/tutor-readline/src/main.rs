use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use tutor_application::TutorUseCase;
use tutor_core::secret::SecretService;
use tutor_core::session::{ChatMessage, ChatSession, SearchStatus};
use tutor_infrastructure::corpus::load_curriculum_index;
use tutor_infrastructure::storage::ConfigStorage;
use tutor_infrastructure::{SecretServiceImpl, TutorPaths, save_svg};
use tutor_interaction::probe_services;

mod commands;

use commands::{COMMANDS, ReplCommand, help_text, parse_line};

/// Rustyline helper: slash-command completion, highlighting and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints a configuration problem and exits non-zero.
fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", format!("Configuration error: {message}").red().bold());
    process::exit(2);
}

fn print_welcome(session: &mut ChatSession, ready: bool) {
    println!();
    for line in session.welcome_message(ready).lines() {
        println!("{}", line.bright_blue());
    }
    println!();
    session.mark_started();
}

fn print_answer(message: &ChatMessage) {
    for line in message.display_text().lines() {
        println!("{}", line.bright_blue());
    }
    if message.extras.svg_markup.is_some() {
        println!("{}", "[رسم توضيحي متاح: استخدم /save لحفظه]".bright_magenta());
    }
    for issue in &message.extras.quality_issues {
        println!("{}", format!("  ! {issue}").yellow());
    }
    if let Some(status) = message.extras.search_status {
        let label = match status {
            SearchStatus::Found => "تم العثور على معلومات من المنهج",
            SearchStatus::NotFound => "لم يتم العثور على معلومات في المنهج",
            SearchStatus::Unavailable => "البحث في المنهج غير متاح",
            SearchStatus::Skipped => "",
        };
        if !label.is_empty() {
            println!("{}", format!("({label})").bright_black());
        }
    }
    println!();
}

fn save_last_drawing(session: &ChatSession, target: Option<PathBuf>) -> Result<PathBuf> {
    let (id, svg) = session
        .history()
        .iter()
        .rev()
        .find_map(|m| m.extras.svg_markup.as_deref().map(|svg| (m.id, svg)))
        .ok_or_else(|| anyhow::anyhow!("No drawing in this conversation yet"))?;

    let path = match target {
        Some(path) => path,
        None => TutorPaths::drawings_dir()?.join(format!("{}-{}.svg", session.id, id)),
    };
    Ok(save_svg(svg, &path)?)
}

/// Entry point for the tutor REPL.
///
/// Loads configuration and secrets (fatal when invalid), probes the external
/// services once, then reads questions and slash commands until `/quit`.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Configuration =====
    let config = match ConfigStorage::new().and_then(|storage| storage.load_from_env()) {
        Ok(config) => config,
        Err(e) => fatal(e),
    };

    let secret_service = SecretServiceImpl::new().unwrap_or_else(|e| fatal(e));
    if !secret_service.secret_file_exists().await {
        match TutorPaths::ensure_secret_file() {
            Ok(path) => tracing::info!("Created secrets template at {}", path.display()),
            Err(e) => tracing::warn!("Could not create secrets template: {}", e),
        }
    }
    let secrets = secret_service
        .load_secrets()
        .await
        .unwrap_or_else(|e| fatal(e));

    let curriculum =
        load_curriculum_index(config.curriculum_index.as_deref()).unwrap_or_else(|e| fatal(e));

    // ===== Backend Initialization =====
    let services = probe_services(&config, &secrets)
        .await
        .unwrap_or_else(|e| fatal(e));
    tracing::info!("Capabilities: {}", services.capabilities.summary());

    let tutor = TutorUseCase::new(
        config,
        services.capabilities.clone(),
        services.model.clone(),
        services.retriever_factory(),
    )?
    .with_curriculum(curriculum);

    let mut session = ChatSession::default();

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== المعلم الذكي ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a question, /help for commands, or /quit to exit.".bright_black()
    );
    print_welcome(&mut session, tutor.is_ready());

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!("[{} | {}] >> ", session.grade.number(), session.subject);
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Interrupted".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}", format!("Error: {e:?}").red());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.yellow());
                continue;
            }
        };

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{}", help_text().bright_black()),
            ReplCommand::Status => {
                println!(
                    "{}",
                    format!(
                        "{} | {} | {} turns\n{}",
                        session.grade.display_name(),
                        session.subject.title(),
                        session.len(),
                        tutor.capabilities().summary()
                    )
                    .bright_black()
                );
            }
            ReplCommand::Grade(grade) => {
                if session.select(grade, session.subject) {
                    session.clear();
                    print_welcome(&mut session, tutor.is_ready());
                }
            }
            ReplCommand::Subject(subject) => {
                if session.select(session.grade, subject) {
                    session.clear();
                    print_welcome(&mut session, tutor.is_ready());
                }
            }
            ReplCommand::New => {
                session.clear();
                print_welcome(&mut session, tutor.is_ready());
            }
            ReplCommand::Save(target) => match save_last_drawing(&session, target) {
                Ok(path) => println!("{}", format!("Saved {}", path.display()).green()),
                Err(e) => println!("{}", e.to_string().yellow()),
            },
            ReplCommand::Ask(question) => {
                println!("{}", "جاري التفكير...".bright_black());
                // Awaited to completion; the user turn is already in the log.
                match tutor.ask(&mut session, &question).await {
                    Ok(answer) => print_answer(&answer),
                    Err(e) => eprintln!("{}", format!("Error: {e}").red()),
                }
            }
        }
    }

    println!("{}", "مع السلامة!".bright_green());
    Ok(())
}
