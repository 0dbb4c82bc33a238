//! Parsing of interactive input lines into session commands.

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text: a question for the backend.
    Ask(String),
    Help,
    /// Clear the transcript back to the welcome message.
    Clear,
    ClearContext,
    /// Show (`None`) or replace the context string.
    Context(Option<String>),
    /// Show (`None`) or change the model.
    Model(Option<String>),
    Temperature(f64),
    Models,
    Health,
    Params,
    Quit,
    /// A slash command that could not be understood, with the reason.
    Invalid(String),
}

/// Help text listing every slash command.
pub const HELP: &str = "\
Commands:
  /help                 show this help
  /clear                clear the conversation
  /clear-context        empty the context sent with each question
  /context [text]       show or set the context
  /model [name]         show or set the model
  /temperature <n>      set the temperature (0.0 to 2.0)
  /models               list models offered by the backend
  /health               check the backend
  /params               show current parameters
  /quit                 leave
Anything else is sent as a question; start it with // to ask
something that begins with a slash.";

impl Command {
    /// Parse a raw input line.
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Command::Ask(line.to_string());
        }
        if let Some(question) = trimmed.strip_prefix('/').filter(|q| q.starts_with('/')) {
            return Command::Ask(question.to_string());
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let arg = if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        };

        match name {
            "/help" | "/?" => Command::Help,
            "/clear" => Command::Clear,
            "/clear-context" => Command::ClearContext,
            "/context" => Command::Context(arg),
            "/model" => Command::Model(arg),
            "/temperature" | "/temp" => match arg.as_deref().map(str::parse::<f64>) {
                Some(Ok(value)) => Command::Temperature(value),
                Some(Err(_)) => Command::Invalid(format!("'{}' is not a number", rest)),
                None => Command::Invalid("usage: /temperature <n>".to_string()),
            },
            "/models" => Command::Models,
            "/health" => Command::Health,
            "/params" => Command::Params,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command {} (try /help)", other)),
        }
    }
}
