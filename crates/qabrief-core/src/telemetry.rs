//! Tracing initialisation shared by qabrief binaries.
//!
//! Log lines always go to stderr: the CLI prints briefings, steps and
//! documents on stdout, and those must stay pipeable.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// HTTP stack crates that are noisy below `warn`.
const QUIET_TARGETS: [&str; 4] = ["hyper", "hyper_util", "reqwest", "rustls"];

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to qabrief and the
/// HTTP stack is held at `warn`. Later calls are ignored.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output = if json {
        output.json().boxed()
    } else {
        output.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .try_init()
        .ok();
}

fn default_directives(level: Level) -> String {
    let mut directives = level.as_str().to_lowercase();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }
    directives
}

fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(default_directives(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_http_stack() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn"
        );
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false, Level::DEBUG);
        init_tracing(true, Level::INFO);
        tracing::debug!("still alive");
    }
}
