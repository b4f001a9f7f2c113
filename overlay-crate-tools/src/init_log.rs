use std::io::Write;

use anstyle::{AnsiColor, Color, RgbColor, Style};
use env_logger::fmt::Formatter;

/// 初始化全局 logger，默认输出 Info 及以上级别
///
/// 可以通过 `RUST_LOG` 环境变量覆盖过滤级别
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

/// 指定默认过滤级别；已经初始化过时什么也不做
pub fn init_log_with_level(level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .format(format_record)
        .filter(None, level)
        .parse_default_env()
        .try_init();
    if result.is_err() {
        log::debug!("logger already initialized");
    }
}

fn level_style(buf: &Formatter, level: log::Level) -> Style {
    let color = match level {
        log::Level::Error => AnsiColor::Red,
        log::Level::Warn => AnsiColor::Yellow,
        log::Level::Info => AnsiColor::Green,
        log::Level::Debug | log::Level::Trace => return buf.default_level_style(level),
    };
    buf.default_level_style(level).fg_color(Some(Color::Ansi(color)))
}

/// 只保留路径中的文件名，兼容 `/` 和 `\`
fn short_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn format_record(buf: &mut Formatter, record: &log::Record) -> std::io::Result<()> {
    let style = level_style(buf, record.level());
    let location_style = Style::new().fg_color(Some(Color::Rgb(RgbColor(110, 110, 110))));

    let time = chrono::Local::now().format("%H:%M:%S%.3f");
    let file = short_file_name(record.file().unwrap_or(""));
    let line = record.line().unwrap_or(0);

    writeln!(
        buf,
        "{style}[{time}] {:<5}{style:#} {location_style}[{file}:{line}]{location_style:#} {}",
        record.level(),
        record.args()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_file_name() {
        assert_eq!(short_file_name("engine/crates/overlay-gui/src/lib.rs"), "lib.rs");
        assert_eq!(short_file_name(r"C:\work\overlay\src\timer.rs"), "timer.rs");
        assert_eq!(short_file_name("main.rs"), "main.rs");
        assert_eq!(short_file_name(""), "");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_log_with_level(log::LevelFilter::Warn);
        init_log();
        log::warn!("logger still works");
    }
}
