/// Reports an unrecoverable system error and terminates the process with status 1.
///
/// Goes through `log` when a logger accepts errors, straight to stderr otherwise.
#[cold]
pub fn fatal(message: &str) -> ! {
    if log::log_enabled!(log::Level::Error) {
        log::error!("system error: {message}");
    } else {
        eprintln!("system error: {message}");
    }
    std::process::exit(1)
}
