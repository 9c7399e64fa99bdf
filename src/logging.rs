//! Process logger handle.
//!
//! `env_logger` is installed once by [`Logger::init`] at the composition root. Every
//! component then receives a [`Logger`] scoped to its own target instead of reaching for
//! the `log` macros with an implicit target, which keeps the per-component filtering
//! (`RUST_LOG=tasklane::middleware=debug`) consistent across the crate.

use log::{Level, LevelFilter};

const ROOT_TARGET: &str = "tasklane";

/// A cheap, cloneable handle that writes to the process-wide `log` backend under a fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    target: &'static str,
}

impl Logger {
    /// Installs the `env_logger` backend for the given application environment and
    /// returns the root handle.
    ///
    /// - `test`: logging disabled.
    /// - `local` / `dev`: `debug` by default.
    /// - anything else: `info` by default.
    ///
    /// `RUST_LOG` overrides the default filter outside of `test`. Calling this more than
    /// once is harmless; only the first call installs a backend.
    pub fn init(app_env: &str) -> Self {
        let mut builder = match app_env {
            "test" => {
                let mut builder = env_logger::Builder::new();
                builder.filter_level(LevelFilter::Off);
                builder
            }
            "local" | "dev" => env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("debug"),
            ),
            _ => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
        };
        // A backend may already be installed (tests, embedding binaries).
        let _ = builder.try_init();

        Self::root()
    }

    /// Returns the root handle without touching the backend.
    pub fn root() -> Self {
        Self {
            target: ROOT_TARGET,
        }
    }

    /// Returns a handle writing under `target`.
    pub fn scoped(&self, target: &'static str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    fn emit(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{}", message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::root()
    }
}
