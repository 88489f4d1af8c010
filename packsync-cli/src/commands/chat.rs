//! `packsync chat` — console that runs each line through the word filter.

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result};
use clap::Args;

use packsync_filter::WordFilter;

use super::Context;

/// Arguments for `packsync chat`.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Name reported as the author of every line.
    #[arg(long, default_value = "User123")]
    pub author: String,
}

impl ChatArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let filter = WordFilter::load(&ctx.settings.censor_words_path_at(&ctx.root));
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line.context("failed to read from stdin")?;
            let message = line.trim_end();
            if message.eq_ignore_ascii_case("exit") {
                break;
            }
            let result = filter.check_message(message, &self.author);
            let written = if result == message {
                writeln!(stdout, "[Chat] {}: {result}", self.author)
            } else {
                writeln!(stdout, "{result}")
            };
            written.context("failed to write to stdout")?;
        }
        Ok(())
    }
}
