//! Runs in its own process: it claims the `tracing` global default before
//! the logger gets a chance to.

use mantis_log::{
    LogError, LogOptions, Logger, SinkMode,
    global::{global, init_global},
};

#[test]
fn failed_install_leaves_no_global_logger() {
    tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default()).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let options = LogOptions::default()
        .with_log_path(tmp.path())
        .with_project_name("late")
        .with_sink(SinkMode::Direct);

    let err = init_global(Logger::new(&options).unwrap()).unwrap_err();
    assert!(matches!(err, LogError::Global(_)), "{err}");
    assert!(global().is_none());

    // A retry reports the hook again, not a phantom installation.
    let retry = init_global(Logger::new(&options).unwrap()).unwrap_err();
    assert!(matches!(retry, LogError::Global(_)), "{retry}");
}
