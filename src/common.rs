//! Process entry helpers shared by the binaries

use tracing::error;
use tracing_subscriber::EnvFilter;

/// Exit code used for every setup or runtime failure
pub const FAILURE_EXIT_CODE: i32 = -1;

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn exit_code(result: &anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => FAILURE_EXIT_CODE,
    }
}

/// Run `main` on the platform's main-thread setup and return its value
///
/// On macOS the video sinks need a running NSApplication, which
/// `gst::macos_main` provides while `main` runs on another thread.
#[cfg(target_os = "macos")]
pub fn on_main_thread<T, F>(main: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    #[allow(unused_unsafe)]
    unsafe {
        gstreamer::macos_main(main)
    }
}

#[cfg(not(target_os = "macos"))]
pub fn on_main_thread<T, F>(main: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    main()
}

/// Run `main` with logging set up and exit with its status
pub fn run<F>(main: F) -> !
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    init_logging();

    let code = on_main_thread(move || {
        let result = main();
        if let Err(err) = &result {
            error!("{:#}", err);
        }
        exit_code(&result)
    });
    std::process::exit(code)
}
