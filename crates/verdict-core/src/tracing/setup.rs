//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Levels used when `VERDICT_LOG` is unset or unparsable.
///
/// `verdict_analysis` carries the board lifecycle, one event per comparator
/// parse and compare, and per-field debug events. `verdict_core` only warns
/// about unreadable config layers.
pub const DEFAULT_LOG_FILTER: &str = "verdict_core=info,verdict_analysis=info";

/// Install the global subscriber once per process.
///
/// `VERDICT_LOG` takes an `EnvFilter` directive, e.g.
/// `VERDICT_LOG=verdict_analysis::fields=debug` to follow single field
/// comparisons. Thread ids are printed so the file pairs compared on the
/// rayon pool in `parallel` mode can be told apart.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("VERDICT_LOG")
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
