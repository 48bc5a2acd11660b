use anyhow::{anyhow, Result};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logs go to stderr, or to a daily rotated file when `log_file` is given.
/// 0 = info, 1 = debug with hyper's connection chatter muted, 2+ = trace.
/// `RUST_LOG` overrides the level unless `quiet` is set.
pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "info",
            1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,html5ever=info,selectors=info",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let layer = match log_file {
        Some(path) => file_layer(&path, json)?,
        None => stderr_layer(json),
    };

    Registry::default().with(layer.with_filter(filter)).init();
    Ok(())
}

fn stderr_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// `genrecall.log` rotates into `genrecall.YYYY-MM-DD`
fn file_layer(path: &Path, json: bool) -> Result<BoxedLayer> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename"))?;
    let prefix = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let layer = fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_writer(appender);
    Ok(if json { layer.json().boxed() } else { layer.boxed() })
}
