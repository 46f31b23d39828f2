//! Slash commands understood by the REPL.

use std::path::PathBuf;

use tutor_core::curriculum::{Grade, Subject};

pub const COMMANDS: &[&str] = &["/grade", "/subject", "/new", "/save", "/status", "/help", "/quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// A question for the tutor.
    Ask(String),
    Grade(Grade),
    Subject(Subject),
    /// Clears the conversation and shows the welcome message again.
    New,
    /// Saves the last drawing, optionally to an explicit path.
    Save(Option<PathBuf>),
    Status,
    Help,
    Quit,
}

/// Parses one input line. Errors are messages for the user.
pub fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if matches!(line, "quit" | "exit") {
        return Ok(ReplCommand::Quit);
    }
    if !line.starts_with('/') {
        return Ok(ReplCommand::Ask(line.to_string()));
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/grade" => parse_grade(argument).map(ReplCommand::Grade),
        "/subject" => Subject::parse_key(argument)
            .map(ReplCommand::Subject)
            .map_err(|_| format!("Unknown subject '{argument}'. Try one of: {}", subject_keys())),
        "/new" | "/clear" => Ok(ReplCommand::New),
        "/save" if argument.is_empty() => Ok(ReplCommand::Save(None)),
        "/save" => Ok(ReplCommand::Save(Some(PathBuf::from(argument)))),
        "/status" => Ok(ReplCommand::Status),
        "/help" => Ok(ReplCommand::Help),
        "/quit" | "/exit" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command '{other}'. Type /help for the list.")),
    }
}

/// Accepts `grade_3` or just `3`.
fn parse_grade(argument: &str) -> Result<Grade, String> {
    let key = if argument.chars().all(|c| c.is_ascii_digit()) && !argument.is_empty() {
        format!("grade_{argument}")
    } else {
        argument.to_string()
    };
    Grade::parse_key(&key).map_err(|_| format!("Unknown grade '{argument}'. Use 1-6 or grade_1..grade_6."))
}

fn subject_keys() -> String {
    Subject::all()
        .map(|subject| subject.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn help_text() -> String {
    format!(
        "Commands:\n  \
         /grade <1-6>        switch grade\n  \
         /subject <key>      switch subject ({})\n  \
         /new                start a new conversation\n  \
         /save [path]        save the last drawing as SVG\n  \
         /status             show grade, subject and service status\n  \
         /help               show this help\n  \
         /quit               exit\n\
         Anything else is sent to the tutor as a question.",
        subject_keys()
    )
}
