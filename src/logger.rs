use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, SetLoggerError};

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        // hyper is chatty below info
        .level_for("hyper", LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()
}
