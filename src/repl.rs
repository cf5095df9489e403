use crate::agent::{ ChatSession, Exchange };
use crate::history::format_transcript;
use crate::models::output::ReplEvent;
use crate::nlp::Personality;

use log::{ error, info, warn };
use std::error::Error;
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

const MAX_LINE_CHARS: usize = 4000;

#[derive(Debug, Clone, Default)]
pub struct ReplOptions {
    pub json: bool,
    /// Dialogue config checked for changes before every message.
    pub config_path: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Say(&'a str),
    Suggest,
    Use(&'a str),
    Persona(Option<&'a str>),
    Personality(Option<&'a str>),
    Multilingual(Option<&'a str>),
    Adaptive(Option<&'a str>),
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Say(line);
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        match name.to_lowercase().as_str() {
            "suggest" | "suggestions" => Command::Suggest,
            "use" => Command::Use(arg.unwrap_or("")),
            "persona" => Command::Persona(arg),
            "personality" => Command::Personality(arg),
            "multilingual" => Command::Multilingual(arg),
            "adaptive" => Command::Adaptive(arg),
            "history" => Command::History,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(name),
        }
    }
}

const HELP: &str =
    "Commands: /suggest, /use N, /persona [name], /personality [helpful|conversational|concise], /multilingual [on|off], /adaptive [on|off], /history, /quit";

/// Flips `current` or sets it from an explicit on/off argument.
fn toggle(current: bool, arg: Option<&str>) -> Result<bool, String> {
    match arg.map(|a| a.to_lowercase()) {
        None => Ok(!current),
        Some(a) if matches!(a.as_str(), "on" | "true" | "yes" | "1") => Ok(true),
        Some(a) if matches!(a.as_str(), "off" | "false" | "no" | "0") => Ok(false),
        Some(a) => Err(format!("Expected on or off, got '{}'", a)),
    }
}

struct Printer<W> {
    out: W,
    json: bool,
}

impl<W: AsyncWrite + Unpin> Printer<W> {
    async fn emit(&mut self, event: &ReplEvent) -> io::Result<()> {
        let text = if self.json {
            serde_json::to_string(event).map_err(io::Error::other)?
        } else {
            render_text(event)
        };
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    async fn error(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(&(ReplEvent::Error { message: message.into() })).await
    }

    async fn notice(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(&(ReplEvent::Notice { message: message.into() })).await
    }
}

fn render_text(event: &ReplEvent) -> String {
    match event {
        ReplEvent::Notice { message } => message.clone(),
        ReplEvent::Thinking { persona, .. } => format!("{} is thinking...", persona),
        ReplEvent::Response { content, persona, .. } => format!("{}: {}", persona, content),
        ReplEvent::Suggestions { items } => {
            let mut text = String::from("Suggestions:");
            for (i, item) in items.iter().enumerate() {
                text.push_str(&format!("\n  {}. {}", i + 1, item.text));
            }
            text
        }
        ReplEvent::Personas { active, items } => {
            let mut text = String::from("Personas:");
            for persona in items {
                let marker = if &persona.id == active { '*' } else { ' ' };
                text.push_str(
                    &format!("\n {} {} - {} ({})", marker, persona.id, persona.name, persona.role)
                );
            }
            text
        }
        ReplEvent::Transcript { conversation } => format_transcript(conversation).trim_end().to_string(),
        ReplEvent::Error { message } => format!("! {}", message),
    }
}

/// Drives `session` from line-oriented input until `/quit` or end of input.
pub async fn run_repl<R, W>(
    session: &ChatSession,
    input: R,
    output: W,
    options: &ReplOptions
) -> Result<(), Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut lines = input.lines();
    let mut printer = Printer { out: output, json: options.json };

    if let Some(welcome) = session.conversation().await.and_then(|c| c.entries.into_iter().next()) {
        let persona = session.active_persona().await;
        printer.emit(
            &(ReplEvent::Response {
                content: welcome.content,
                persona: persona.name,
                intent: "welcome".to_string(),
                sentiment: "neutral".to_string(),
                timestamp: welcome.timestamp.timestamp(),
            })
        ).await?;
    }
    printer.emit(&(ReplEvent::Suggestions { items: session.suggestions().await })).await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.chars().count() > MAX_LINE_CHARS {
            warn!("Input line exceeds {} characters, ignoring", MAX_LINE_CHARS);
            printer.error("Message too large").await?;
            continue;
        }

        match Command::parse(line) {
            Command::Quit => {
                break;
            }
            Command::Say(text) => {
                reload_config(session, options).await;
                let (persona, delay) = session.preview(text).await;
                printer.emit(
                    &(ReplEvent::Thinking {
                        persona: persona.name,
                        delay_ms: delay.as_millis() as u64,
                    })
                ).await?;
                let exchange = await_reply(session.send(text)).await;
                emit_exchange(session, &mut printer, exchange).await?;
            }
            Command::Use(arg) => {
                let suggestions = session.suggestions().await;
                let index = match arg.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= suggestions.len() => n - 1,
                    _ => {
                        printer.error(
                            format!("Pick a suggestion between 1 and {}", suggestions.len())
                        ).await?;
                        continue;
                    }
                };
                reload_config(session, options).await;
                let Some((persona, delay)) = session.preview_suggestion(index).await else {
                    printer.error("Suggestions changed, try again").await?;
                    continue;
                };
                printer.emit(&(ReplEvent::Notice { message: format!("> {}", suggestions[index].text) })).await?;
                printer.emit(
                    &(ReplEvent::Thinking {
                        persona: persona.name,
                        delay_ms: delay.as_millis() as u64,
                    })
                ).await?;
                let exchange = await_reply(session.send_suggestion(index)).await;
                emit_exchange(session, &mut printer, exchange).await?;
            }
            Command::Suggest => {
                printer.emit(&(ReplEvent::Suggestions { items: session.suggestions().await })).await?;
            }
            Command::Persona(None) => {
                let active = session.active_persona().await.id;
                let items = session.personas().await;
                printer.emit(&(ReplEvent::Personas { active, items })).await?;
            }
            Command::Persona(Some(query)) => {
                match session.select_persona(query).await {
                    Some(persona) =>
                        printer.notice(format!("Now talking to {} ({})", persona.name, persona.role)).await?,
                    None => printer.error(format!("No persona matches '{}'", query)).await?,
                }
            }
            Command::Personality(None) => {
                let current = session.settings().await.personality;
                printer.notice(format!("Personality: {}", current)).await?;
            }
            Command::Personality(Some(name)) => {
                match name.parse::<Personality>() {
                    Ok(personality) => {
                        session.set_personality(personality).await;
                        printer.notice(format!("Personality set to {}", personality)).await?;
                    }
                    Err(e) => printer.error(e.to_string()).await?,
                }
            }
            Command::Multilingual(arg) => {
                match toggle(session.settings().await.multilingual, arg) {
                    Ok(enabled) => {
                        session.set_multilingual(enabled).await;
                        printer.notice(format!("Multilingual responses {}", on_off(enabled))).await?;
                    }
                    Err(e) => printer.error(e).await?,
                }
            }
            Command::Adaptive(arg) => {
                match toggle(session.settings().await.adaptive_learning, arg) {
                    Ok(enabled) => {
                        session.set_adaptive_learning(enabled).await;
                        printer.notice(format!("Adaptive learning {}", on_off(enabled))).await?;
                    }
                    Err(e) => printer.error(e).await?,
                }
            }
            Command::History => {
                match session.conversation().await {
                    Some(conversation) => printer.emit(&(ReplEvent::Transcript { conversation })).await?,
                    None => printer.error("History unavailable").await?,
                }
            }
            Command::Help => printer.notice(HELP).await?,
            Command::Unknown(name) => {
                printer.error(format!("Unknown command '/{}'. {}", name, HELP)).await?;
            }
        }
    }

    info!("Conversation {} ended", session.conversation_id());
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

async fn reload_config(session: &ChatSession, options: &ReplOptions) {
    if let Some(path) = &options.config_path {
        if let Err(e) = session.reload_config_if_changed(path).await {
            error!("Failed to reload dialogue config: {}", e);
        }
    }
}

enum Reply {
    Delivered(Exchange),
    Declined,
    Interrupted,
}

/// Waits for the pending reply. Ctrl-C abandons it and keeps the session.
async fn await_reply<F>(reply: F) -> Reply where F: std::future::Future<Output = Option<Exchange>> {
    tokio::select! {
        exchange = reply => match exchange {
            Some(exchange) => Reply::Delivered(exchange),
            None => Reply::Declined,
        },
        _ = tokio::signal::ctrl_c() => Reply::Interrupted,
    }
}

async fn emit_exchange<W: AsyncWrite + Unpin>(
    session: &ChatSession,
    printer: &mut Printer<W>,
    reply: Reply
) -> io::Result<()> {
    match reply {
        Reply::Delivered(exchange) => {
            printer.emit(
                &(ReplEvent::Response {
                    content: exchange.reply.content,
                    persona: exchange.persona.name,
                    intent: exchange.classification.intent,
                    sentiment: exchange.classification.sentiment.to_string(),
                    timestamp: exchange.reply.timestamp.timestamp(),
                })
            ).await?;
            printer.emit(&(ReplEvent::Suggestions { items: session.suggestions().await })).await
        }
        Reply::Declined => printer.error("Still thinking about the previous message").await,
        Reply::Interrupted => {
            info!("Reply abandoned by user");
            printer.error("Reply abandoned").await
        }
    }
}
