use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

mod progress;
pub use progress::ProgressPrinter;

/// Run an extraction pipeline and map its outcome to a process exit code.
///
/// On failure the full error report is printed to stderr and the process
/// exits 1; on success a timing summary is printed, since reconstructing a
/// large binary can take a while.
pub fn run<T, E: std::fmt::Debug, F: FnOnce() -> Result<T, E>>(f: F) -> ExitCode {
    let start_time = Instant::now();
    match f() {
        Ok(_) => {
            println!(
                "Finished in {:.02} seconds",
                start_time.elapsed().as_secs_f32()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\nError: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Create the missing parent directories of an output file path. A bare
/// filename has an empty parent, which needs no directories.
pub fn ensure_parent_exists(path: impl AsRef<Path>) -> std::io::Result<()> {
    let Some(parent) = path.as_ref().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
}
