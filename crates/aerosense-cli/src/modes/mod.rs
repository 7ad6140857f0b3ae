//! Ways of running a conversation in the terminal.

pub mod exec;
mod interactive;

use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

pub use interactive::run_interactive_chat;

/// Streams reply fragments to a writer as they arrive.
///
/// The first write error (a closed pipe, usually) cancels the turn and is
/// kept for the caller; later fragments are not written.
struct ReplyPrinter<W> {
    out: W,
    printed_any: bool,
    error: Option<io::Error>,
}

impl<W: Write> ReplyPrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printed_any: false,
            error: None,
        }
    }

    fn print(&mut self, fragment: &str, cancel: &CancellationToken) {
        if self.error.is_some() {
            return;
        }
        let written = self
            .out
            .write_all(fragment.as_bytes())
            .and_then(|()| self.out.flush());
        match written {
            Ok(()) => self.printed_any = true,
            Err(err) => {
                self.error = Some(err);
                cancel.cancel();
            }
        }
    }

    /// Ends the reply line, or returns the write error that stopped the turn.
    fn finish(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.printed_any {
            writeln!(self.out)?;
            self.out.flush()?;
        }
        Ok(())
    }
}
