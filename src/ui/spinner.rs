//! Spinner shown while a blocking backend call is in flight.
//!
//! Two explicit tasks: a cancellable ticker that animates the glyph, and the
//! result-producing future. [`with_spinner`] cancels and joins the ticker
//! after the future resolves, whatever it resolved to, so the line is always
//! cleaned up — including on error paths.

use crossterm::{
    cursor, execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::future::Future;
use std::io::{stdout, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(80);

/// Run `future` while animating a spinner labeled `label`.
///
/// Generic over the output type, so `Result`-returning futures tear the
/// ticker down on their error path exactly like on success.
pub async fn with_spinner<T, F>(label: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let token = CancellationToken::new();
    let ticker = tokio::spawn(run_ticker(label.to_string(), token.clone()));

    let output = future.await;

    token.cancel();
    // Join so the completion mark is printed before the caller's output.
    let _ = ticker.await;

    output
}

async fn run_ticker(label: String, token: CancellationToken) {
    let mut frame = 0usize;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(TICK) => {
                let glyph = FRAMES[frame % FRAMES.len()];
                frame += 1;
                let mut out = stdout();
                let _ = execute!(
                    out,
                    cursor::MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    Print(format!("{glyph} {label}"))
                );
                let _ = out.flush();
            }
        }
    }

    let mut out = stdout();
    let _ = execute!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!("✔ {label}\n"))
    );
    let _ = out.flush();
}
