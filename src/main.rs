//! tributary binary entry point.

use tributary::core::config::ConfigError;
use tributary::ui::output;

/// Exit code for command-line usage errors (EX_USAGE).
const EXIT_USAGE: i32 = 64;

fn main() {
    if let Err(err) = tributary::cli::run() {
        output::error(format!("{:#}", err));
        let code = if err.is::<ConfigError>() { EXIT_USAGE } else { 1 };
        std::process::exit(code);
    }
}
