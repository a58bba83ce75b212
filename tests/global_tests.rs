use fmtlog::{global, ColorMode, InstallError, Logger, LoggerConfig, MemoryHandler};

// The global slot and the `log` facade are process-wide, so the whole
// lifecycle is checked in one test.
#[test]
fn test_install_once_and_route_log_facade() {
    assert!(global::get().is_none());

    let lines = MemoryHandler::new();
    let installed = global::install(Logger::with_handler(
        LoggerConfig::default().with_color(ColorMode::Never),
        lines.clone(),
    ))
    .unwrap();

    let fetched = global::get().unwrap();
    assert!(std::ptr::eq(installed, fetched));

    let second = global::install(Logger::with_handler(LoggerConfig::default(), MemoryHandler::new()));
    assert_eq!(second.unwrap_err(), InstallError::AlreadyInstalled);

    log::info!("x");
    log::trace!("%d is not a template here");

    let out = lines.lines();
    assert_eq!(out.len(), 2);
    assert!(out[0].starts_with("[INFO ") && out[0].ends_with("]\tx"));
    assert!(out[1].starts_with("[DBG  ") && out[1].ends_with("]\t%d is not a template here"));
}
