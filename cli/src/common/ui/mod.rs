//! # srdeploy UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! The commands talk to the person at the keyboard through the `Prompt`
//! trait, which has exactly two operations:
//!
//! - `choose_one`: show a list of options and wait for one to be picked.
//!   `Ok(None)` means the choice was cancelled.
//! - `notify`: report a status message.
//!
//! `TerminalPrompt` implements it with a numbered menu. Tests substitute a
//! scripted implementation, so the deploy and logs flows never touch stdin.
//!
//! ## Usage
//!
//! ```rust
//! let mut prompt = TerminalPrompt::stdio();
//! let options = vec![Choice::new("Deploy to /media/STICK", "No past deployment")];
//! if let Some(index) = prompt.choose_one(&options)? {
//!     prompt.notify(&format!("Picked {}", options[index].title));
//! }
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, BufRead, Write};
use tracing::info;

/// One entry in a selection menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub title: String,
    pub detail: String,
}

impl Choice {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Choice {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// The user-facing side of a command.
pub trait Prompt {
    /// Asks the user to pick one of `options`; `Ok(None)` if they decline.
    /// A returned index is always less than `options.len()`.
    fn choose_one(&mut self, options: &[Choice]) -> Result<Option<usize>>;

    /// Shows a status message.
    fn notify(&mut self, message: &str);
}

/// A `Prompt` on a terminal: menu and questions on one stream, status
/// messages on another, answers read line by line from `input`.
pub struct TerminalPrompt<R, M, W> {
    input: R,
    menu: M,
    messages: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr, io::Stdout> {
    /// Reads stdin, draws menus on stderr, and prints messages on stdout, so
    /// `srdeploy logs > out.txt` still shows the menu.
    pub fn stdio() -> Self {
        TerminalPrompt::new(io::stdin().lock(), io::stderr(), io::stdout())
    }
}

impl<R: BufRead, M: Write, W: Write> TerminalPrompt<R, M, W> {
    pub fn new(input: R, menu: M, messages: W) -> Self {
        TerminalPrompt {
            input,
            menu,
            messages,
        }
    }

    fn draw(&mut self, options: &[Choice]) -> io::Result<()> {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.menu, "  [{}] {}", i + 1, option.title)?;
            if !option.detail.is_empty() {
                writeln!(self.menu, "      {}", option.detail)?;
            }
        }
        self.menu.flush()
    }
}

impl<R: BufRead, M: Write, W: Write> Prompt for TerminalPrompt<R, M, W> {
    fn choose_one(&mut self, options: &[Choice]) -> Result<Option<usize>> {
        if options.is_empty() {
            return Ok(None);
        }
        self.draw(options).context("Failed to display menu")?;
        loop {
            write!(
                self.menu,
                "Select [1-{}], or press Enter to cancel: ",
                options.len()
            )
            .and_then(|_| self.menu.flush())
            .context("Failed to display prompt")?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read selection")?;
            let answer = line.trim();
            if read == 0 || answer.is_empty() || answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => {
                    writeln!(self.menu, "'{}' is not one of the options.", answer)
                        .context("Failed to display prompt")?;
                }
            }
        }
    }

    fn notify(&mut self, message: &str) {
        info!("{}", message);
        // A closed stdout should not turn a finished deployment into an error.
        let _ = writeln!(self.messages, "{}", message);
    }
}
