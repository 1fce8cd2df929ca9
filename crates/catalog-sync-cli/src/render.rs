use std::future::Future;
use std::io::{IsTerminal, Write};

use catalog_sync::{LogEntry, Surface, SurfaceEvent};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Mirrors one panel's surface onto the terminal.
///
/// Log lines go to stdout. On a terminal, the status line and bar are
/// redrawn in place on stderr; otherwise they are left out.
///
/// Log events only signal that new lines exist. The lines themselves are
/// read from the surface's log, so a reader that falls behind the event
/// channel still prints every line in order.
struct Renderer<'a> {
    surface: &'a Surface,
    live: bool,
    status: String,
    progress: u8,
    log_cursor: usize,
}

impl<'a> Renderer<'a> {
    fn new(surface: &'a Surface, live: bool) -> Self {
        Self {
            surface,
            live,
            status: String::new(),
            progress: 0,
            log_cursor: surface.log_cursor(),
        }
    }

    fn handle(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Status(text) => {
                self.status = text;
                self.redraw();
            }
            SurfaceEvent::Progress(percent) => {
                self.progress = percent;
                self.redraw();
            }
            SurfaceEvent::Log(_) => self.print_new_lines(),
            SurfaceEvent::Diagnostic(text) => {
                tracing::debug!(%text, "diagnostic");
            }
        }
    }

    /// Recover after `skipped` events were dropped from the channel.
    fn resync(&mut self, skipped: u64) {
        tracing::warn!(skipped, "output fell behind; catching up from the panel log");
        self.status = self.surface.status();
        self.progress = self.surface.progress();
        self.print_new_lines();
    }

    fn print_new_lines(&mut self) {
        let (entries, cursor) = self.surface.log_since(self.log_cursor);
        self.log_cursor = cursor;
        if entries.is_empty() {
            return;
        }
        self.clear();
        let mut stdout = std::io::stdout().lock();
        for entry in &entries {
            let _ = writeln!(stdout, "{}", log_line(entry));
        }
        let _ = stdout.flush();
        drop(stdout);
        self.redraw();
    }

    fn redraw(&self) {
        if !self.live {
            return;
        }
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r\x1b[2K{}", status_line(&self.status, self.progress));
        let _ = stderr.flush();
    }

    fn clear(&self) {
        if self.live {
            eprint!("\r\x1b[2K");
        }
    }
}

pub fn status_line(status: &str, progress: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(progress.min(100)) * WIDTH / 100;
    format!(
        "[{}{}] {progress:>3}% {status}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled)
    )
}

pub fn log_line(entry: &LogEntry) -> String {
    entry.to_string()
}

/// Run `flow` while rendering every event its surface publishes.
pub async fn drive<F: Future>(surface: &Surface, flow: F) -> F::Output {
    let mut events = surface.subscribe();
    let mut renderer = Renderer::new(surface, std::io::stderr().is_terminal());
    let mut open = true;
    tokio::pin!(flow);

    let output = loop {
        tokio::select! {
            output = &mut flow => break output,
            event = events.recv(), if open => match event {
                Ok(event) => renderer.handle(event),
                Err(RecvError::Lagged(skipped)) => renderer.resync(skipped),
                Err(RecvError::Closed) => open = false,
            },
        }
    };

    loop {
        match events.try_recv() {
            Ok(event) => renderer.handle(event),
            Err(TryRecvError::Lagged(skipped)) => renderer.resync(skipped),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    renderer.print_new_lines();
    renderer.clear();
    output
}
