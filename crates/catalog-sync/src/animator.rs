use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::surface::Surface;

/// Default period between ellipsis frames.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

const MAX_DOTS: usize = 3;

struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Animates a trailing ellipsis after a base label on one surface.
///
/// At most one ticker is alive per animator, and the surface's generation
/// counter keeps tickers from other animators (or from before a final
/// status write) from overwriting newer text.
pub struct StatusAnimator {
    surface: Surface,
    interval: Duration,
    ticker: Option<Ticker>,
}

impl StatusAnimator {
    pub fn new(surface: Surface, interval: Duration) -> Self {
        Self {
            surface,
            interval: interval.max(Duration::from_millis(1)),
            ticker: None,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Show `base` and start cycling dots after it, cancelling any running animation.
    pub fn start(&mut self, base: impl Into<String>) {
        self.stop();

        let base = base.into();
        let generation = self.surface.claim_animation();
        self.surface.write_animated(generation, base.clone());

        let surface = self.surface.clone();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut dots = 0;
            loop {
                ticker.tick().await;
                dots = (dots + 1) % (MAX_DOTS + 1);
                if !surface.write_animated(generation, frame(&base, dots)) {
                    break;
                }
            }
        });

        self.ticker = Some(Ticker { generation, handle });
    }

    /// Cancel the running animation, leaving the current text in place.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.handle.abort();
            self.surface.release_animation(ticker.generation);
        }
    }

    /// Stop animating, then write terminal text.
    pub fn finish(&mut self, text: impl Into<String>) {
        self.stop();
        self.surface.set_status(text);
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.handle.is_finished())
    }
}

impl Drop for StatusAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn frame(base: &str, dots: usize) -> String {
    format!("{base}{}", ".".repeat(dots))
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;
    use crate::surface::SurfaceEvent;

    fn statuses(rx: &mut tokio::sync::broadcast::Receiver<SurfaceEvent>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SurfaceEvent::Status(text) = event {
                out.push(text);
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn ellipsis_cycles_on_each_tick() {
        let surface = Surface::new();
        let mut animator = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);

        animator.start("Syncing");
        assert_eq!(surface.status(), "Syncing");
        assert!(animator.is_running());

        let expected = ["Syncing.", "Syncing..", "Syncing...", "Syncing", "Syncing."];
        sleep(Duration::from_millis(10)).await;
        for text in expected {
            sleep(DEFAULT_INTERVAL).await;
            assert_eq!(surface.status(), text);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_cancels_first() {
        let surface = Surface::new();
        let mut rx = surface.subscribe();
        let mut animator = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);

        animator.start("Categories");
        sleep(Duration::from_millis(510)).await;
        animator.start("Products");
        sleep(Duration::from_millis(2_000)).await;

        let seen = statuses(&mut rx);
        let switch = seen.iter().position(|s| s == "Products").unwrap();
        assert!(seen[..switch].iter().all(|s| s.starts_with("Categories")));
        assert!(seen[switch..].iter().all(|s| s.starts_with("Products")));
        assert!(seen.len() > switch + 1, "second animation keeps ticking");
    }

    #[tokio::test(start_paused = true)]
    async fn competing_animators_on_one_surface_do_not_stack() {
        let surface = Surface::new();
        let mut first = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);
        let mut second = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);

        first.start("Old");
        second.start("New");
        let mut rx = surface.subscribe();
        sleep(Duration::from_millis(1_600)).await;

        let seen = statuses(&mut rx);
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|s| s.starts_with("New")));
        assert!(!first.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn finish_leaves_terminal_text_untouched() {
        let surface = Surface::new();
        let mut animator = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);

        animator.start("Importing");
        sleep(Duration::from_millis(510)).await;
        animator.finish("Import complete");
        let mut rx = surface.subscribe();

        sleep(Duration::from_millis(3_000)).await;
        assert_eq!(surface.status(), "Import complete");
        assert!(statuses(&mut rx).is_empty());
        assert!(!animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_write_from_elsewhere_silences_ticker() {
        let surface = Surface::new();
        let mut animator = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);

        animator.start("Working");
        surface.set_status("Error: quota exceeded");
        sleep(Duration::from_millis(2_000)).await;

        assert_eq!(surface.status(), "Error: quota exceeded");
        assert!(!animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_ticker() {
        let surface = Surface::new();
        {
            let mut animator = StatusAnimator::new(surface.clone(), DEFAULT_INTERVAL);
            animator.start("Loading");
        }
        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(surface.status(), "Loading");
    }
}
