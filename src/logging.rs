use std::path::Path;

use anyhow::Context;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::json::JsonEncoder;
use log4rs::encode::pattern::PatternEncoder;

/// Build and install the logging config. When `log_filepath` is given,
/// logs go to that file as JSON lines in addition to a terse stderr
/// line; otherwise only stderr is configured. `verbosity` follows the
/// usual `-v`/`-vv` repeat-count convention: 0 = warn, 1 = info, 2 = debug,
/// >=3 = trace.
pub fn init_logging(
    log_filepath: Option<&Path>,
    verbosity: u8,
) -> anyhow::Result<log4rs::Handle> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%dT%H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .target(log4rs::append::console::Target::Stderr)
        .build();

    let mut builder = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)));

    let root = if let Some(fp) = log_filepath {
        let file = FileAppender::builder()
            .encoder(Box::new(JsonEncoder::new()))
            .build(fp)
            .with_context(|| format!("failed to open log file {fp:?}"))?;
        builder = builder
            .appender(Appender::builder().build("file", Box::new(file)))
            .logger(Logger::builder().build("gg_sim", level));
        Root::builder().appenders(["console", "file"]).build(level)
    } else {
        Root::builder().appenders(["console"]).build(level)
    };

    let config = builder.build(root).context("failed to build log config")?;
    let handle = log4rs::init_config(config).context("failed to install logging config")?;
    Ok(handle)
}
