use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber used by host applications.
///
/// Honours `RUST_LOG`, defaulting to `info`. Safe to call more than once: a
/// second call leaves the already installed subscriber in place.
pub fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();

    if result.is_ok() {
        tracing::info!("chat widget core logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
