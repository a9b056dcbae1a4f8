//! Line-oriented prompt for command-line use

use std::fmt::Write as _;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::session::presenter::{Presenter, PromptRequest, UserAction};

/// Prompts on a text stream and reads the answer line by line.
///
/// End of input counts as [`UserAction::Dismissed`]; unrecognised or
/// withheld choices are asked again.
pub struct TerminalPresenter<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> TerminalPresenter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

impl TerminalPresenter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

/// Render the prompt text shown before the choice line
pub fn render_prompt(request: &PromptRequest) -> String {
    let decision = &request.decision;
    let mut text = String::new();

    let _ = writeln!(text, "A new version of this application is available.");
    let installed = decision
        .installed_version
        .as_ref()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    match &decision.latest_version {
        Some(latest) => {
            let _ = writeln!(text, "Installed: {}  Latest: {}", installed, latest);
        }
        None => {
            let _ = writeln!(text, "Installed: {}", installed);
        }
    }

    if decision.blocked {
        let _ = writeln!(text, "This update is required to keep using the application.");
    }

    if let Some(notes) = &request.release_notes {
        let _ = writeln!(text, "\nRelease notes:");
        for line in notes.lines() {
            let _ = writeln!(text, "  {}", line);
        }
    }

    if let Some(url) = &request.listing_url {
        let _ = writeln!(text, "\nGet it at: {}", url);
    }

    text
}

fn choice_line(request: &PromptRequest) -> String {
    let mut choices = vec!["[u]pdate"];
    if request.allows(UserAction::Later) {
        choices.push("[l]ater");
    }
    if request.allows(UserAction::Ignore) {
        choices.push("[i]gnore");
    }
    format!("{}: ", choices.join(", "))
}

fn parse_choice(input: &str) -> Option<UserAction> {
    match input.trim().to_ascii_lowercase().as_str() {
        "u" | "update" => Some(UserAction::Update),
        "l" | "later" => Some(UserAction::Later),
        "i" | "ignore" => Some(UserAction::Ignore),
        _ => None,
    }
}

#[async_trait::async_trait]
impl<R, W> Presenter for TerminalPresenter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn present(&self, request: &PromptRequest) -> UserAction {
        let mut io = self.io.lock().await;
        let (reader, writer) = &mut *io;

        let prompt = choice_line(request);
        let mut output = render_prompt(request);
        output.push_str(&prompt);

        loop {
            if let Err(e) = write_flush(writer, &output).await {
                warn!("Failed to write prompt: {}", e);
                return UserAction::Dismissed;
            }

            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => return UserAction::Dismissed,
                Ok(_) => {}
                Err(e) => {
                    warn!("Failed to read prompt answer: {}", e);
                    return UserAction::Dismissed;
                }
            }

            match parse_choice(&line) {
                Some(action) if request.allows(action) => return action,
                _ => output = prompt.clone(),
            }
        }
    }
}

async fn write_flush<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}
