use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, fmt::MakeWriter, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber; `RUST_LOG` can only narrow what `verbose` allows.
///
/// Logs go to stderr so stdout only carries command output.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    subscriber(verbose, env_filter, std::io::stderr).init();
}

fn subscriber<W>(verbose: bool, env_filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let app_filter = Targets::new()
        .with_target("dzrate", level_filter)
        .with_default(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(writer))
        .with(app_filter)
        .with(env_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::{debug, info};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture(verbose: bool) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = subscriber(verbose, EnvFilter::new("debug"), move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            info!("rate stored");
            debug!("cache miss");
        });
        buffer.contents()
    }

    #[test]
    fn test_logs_go_to_configured_writer() {
        let output = capture(false);
        assert!(output.contains("rate stored"));
        assert!(!output.contains("cache miss"));
    }

    #[test]
    fn test_verbose_enables_debug() {
        let output = capture(true);
        assert!(output.contains("rate stored"));
        assert!(output.contains("cache miss"));
    }
}
