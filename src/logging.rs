use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Where log records go.
///
/// The board owns the terminal, so it logs to a file; the plain commands log
/// to stderr.
pub enum LogSink<'a> {
	Stderr,
	File(&'a Path),
}

/// `RUST_LOG` wins over the configured level; both accept env_logger filter
/// syntax (`debug`, `equinox_events=trace`) on top of a `warn` default.
///
/// If the log file can't be opened the logger still goes up on stderr and the
/// open error is returned.
pub fn init_logging(configured_level: Option<&str>, sink: LogSink<'_>) -> Result<(), std::io::Error> {
	let env_filters = std::env::var("RUST_LOG").ok();
	let mut builder = Builder::new();
	apply_filters(&mut builder, filter_spec(env_filters.as_deref(), configured_level));
	builder.format(|buf, record| {
		writeln!(
			buf,
			"{} [{}] {}: {}",
			buf.timestamp(),
			record.level(),
			record.target(),
			record.args()
		)
	});

	let opened = match sink {
		LogSink::Stderr => Ok(Target::Stderr),
		LogSink::File(path) => open_log_file(path).map(|file| Target::Pipe(Box::new(file))),
	};
	let result = match opened {
		Ok(target) => {
			builder.target(target);
			Ok(())
		}
		Err(err) => {
			builder.target(Target::Stderr);
			Err(err)
		}
	};

	// Keep whichever logger was installed first.
	let _ = builder.try_init();
	result
}

fn open_log_file(path: &Path) -> Result<File, std::io::Error> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	OpenOptions::new().create(true).append(true).open(path)
}

fn filter_spec<'a>(env_filters: Option<&'a str>, configured: Option<&'a str>) -> Option<&'a str> {
	env_filters
		.filter(|raw| !raw.trim().is_empty())
		.or(configured)
		.map(str::trim)
		.filter(|raw| !raw.is_empty())
}

fn apply_filters(builder: &mut Builder, spec: Option<&str>) {
	builder.filter_level(LevelFilter::Warn);
	if let Some(spec) = spec {
		builder.parse_filters(spec);
	}
}
