pub mod domain;
pub mod engine;
pub mod error;

pub use error::PlanError;

pub mod config {
    use crate::engine::templates::TemplateSet;
    use anyhow::Context;

    pub const DEFAULT_PORT: u16 = 3001;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
        pub allocation_templates_path: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match std::env::var("PORT").ok() {
                Some(v) => Some(
                    v.trim()
                        .parse::<u16>()
                        .with_context(|| format!("PORT must be a valid port number (got {v})"))?,
                ),
                None => None,
            };

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                port,
                allocation_templates_path: std::env::var("ALLOCATION_TEMPLATES_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
            })
        }

        pub fn port(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }

        /// Override file when configured, built-in tables otherwise. Both are verified.
        pub fn load_templates(&self) -> anyhow::Result<TemplateSet> {
            match self.allocation_templates_path.as_deref() {
                Some(path) => TemplateSet::from_path(path),
                None => TemplateSet::builtin().context("built-in allocation templates are invalid"),
            }
        }
    }

}
