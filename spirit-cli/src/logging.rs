//! Subscriber set-up for CLI runs.
//!
//! Library crates log through the `log` facade. The fmt subscriber installs
//! the `tracing-log` bridge, so those records reach stderr alongside any
//! tracing events. `SPIRIT_LOG` overrides the level chosen by the flags.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "SPIRIT_LOG";
const CRATES: [&str; 4] = ["spirit_cli", "spirit_core", "spirit_topics", "spirit_data"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub(crate) const fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    const fn level(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }

    /// Filter directives: dependencies stay at `warn`, Spirit crates follow the flags.
    pub(crate) fn directives(self) -> String {
        let level = self.level();
        let crates = CRATES.iter().map(|krate| format!("{krate}={level}"));
        std::iter::once(String::from("warn"))
            .chain(crates)
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub(crate) fn init_logging(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
    {
        log::debug!("logging already initialised: {err}");
    }
}
