use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Route `log` output to a file so it never draws over the terminal UI.
///
/// Level comes from `RUST_LOG`, defaulting to `warn`.
pub fn init(log_path: &Path) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    // A second init (tests, embedding) keeps the first logger
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}
