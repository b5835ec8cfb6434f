use crate::domain::ports::{Navigator, Notifier};
use std::sync::Mutex;

/// Prints notices to stderr, the terminal stand-in for a toast.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("Notice: {}", message);
        eprintln!("❌ {}", message);
    }
}

/// Records the last requested route; the CLI reports it once the flow is done.
#[derive(Debug, Default)]
pub struct RouteRecorder {
    last: Mutex<Option<String>>,
}

impl RouteRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_route(&self) -> Option<String> {
        self.last.lock().ok().and_then(|route| route.clone())
    }
}

impl Navigator for RouteRecorder {
    fn navigate(&self, route: &str) {
        tracing::info!("Navigating to {}", route);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(route.to_string());
        }
    }
}
