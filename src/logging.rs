use std::path::Path;

use log4rs::{
    append::{console::{ConsoleAppender, Target}, file::FileAppender},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {M} - {m}{n}";

/// Send log messages at `level` and above to stderr and, if given, to `log_file` as well.
///
/// The file copy keeps every message of a conversion so that problems with
/// a batch of input files can be looked at afterwards.
pub fn init_logging(level: log::LevelFilter, log_file: Option<&Path>) -> Result<(), String> {
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(&format!("{{h({PATTERN})}}"))))
        .target(Target::Stderr)
        .build();

    let mut builder = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = log_file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(path)
            .map_err(|e| format!("Could not open log file {}: {e}", path.display()))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder.build(root.build(level))
        .map_err(|e| format!("Failed to configure logger: {e}"))?;
    log4rs::init_config(config)
        .map_err(|e| format!("Failed to initialize logger: {e}"))?;
    Ok(())
}
