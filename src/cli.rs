//! Interactive chat front end: command parsing and fixed texts.

use std::path::Path;

use crate::llm::LlmConfig;

/// ANSI sequence that clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub const PROMPT: &str = "Me: ";

pub const ANSWER_PREFIX: &str = "AI:";

pub const SEPARATOR: &str = "──────────────────────────────────────────────────";

pub const WELCOME: &str = "\
Vehicle Mapping RAG Chat
=====================================

Ask about the VDAT to Cox vehicle mappings in the loaded CSV:
  • Cox trim counts and details for specific vehicle models
  • Mapping requirements (body style, fuel type, multiple models or trims)
  • Model, series and trim codes

Commands:
  /help, /h     Show help
  /clear, /cls  Clear the screen
  /quit, /exit  Exit (or press Ctrl+C)
  q             Quick exit

Answers cite vehicle model ids such as [audi_a3-sportback-e-tron].
=====================================";

pub const HELP: &str = "\
Help & Commands
==================

  /help, /h     Show this help message
  /clear, /cls  Clear the screen
  /quit, /exit  Exit the chat session
  q             Quick exit

Example questions:
  • How many Cox trims are mapped to Audi A3 Sportback e-tron?
  • What Cox trims are available for BMW M5 Touring?
  • Which models need body style mapping?
  • Show me all electric vehicles in the database
  • Compare the Audi A3 trims against [\"Premium\", \"Premium Plus\", \"Prestige\"]

Tips:
  - Sources like [audi_a3-sportback-e-tron] are vehicle model ids
  - You can search by make and model name or by model id
==================";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Clear,
    Empty,
    Ask(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "/quit" | "/exit" | "q" => Command::Quit,
            "/help" | "/h" => Command::Help,
            "/clear" | "/cls" => Command::Clear,
            _ => Command::Ask(trimmed.to_string()),
        }
    }
}

/// Hint printed when the session cannot be initialized.
pub fn startup_hint(llm: &LlmConfig, csv_path: &Path) -> String {
    format!(
        "   Make sure the model service at {} is running with models: {}, {}\n   Also ensure {} exists",
        llm.base_url,
        llm.embedding_model,
        llm.generation_model,
        csv_path.display()
    )
}

/// Render an answer for the terminal.
pub fn format_answer(answer: &str) -> String {
    format!("{} {}\n\n{}", ANSWER_PREFIX, answer, SEPARATOR)
}
