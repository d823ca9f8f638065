/// Global logging configuration
use env_logger::Env;

/// Initialise the `env_logger` backend.
///
/// `RUST_LOG` wins when set; otherwise the filter is `info`, or `warn` in
/// quiet mode. Calling it twice is harmless.
pub fn init_log(quiet: bool) {
  let default_filter = if quiet { "warn" } else { "info" };
  let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
    .format_timestamp(None)
    .format_target(false)
    .try_init();
}
