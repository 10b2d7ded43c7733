use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard};

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

#[cfg(feature = "gui")]
#[allow(deprecated)]
pub fn glib_channel<T: Send + 'static>() -> (glib::Sender<T>, glib::Receiver<T>) {
    glib::MainContext::channel(glib::Priority::default())
}

#[cfg(feature = "gui")]
#[allow(deprecated)]
pub fn run_async_to_main<T, E, Fut>(fut: Fut) -> glib::Receiver<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    Fut: std::future::Future<Output = Result<T, E>> + Send + 'static,
{
    let (tx, rx) = glib_channel::<Result<T, E>>();
    spawn_async(async move {
        let res = fut.await;
        let _ = tx.send(res);
    });
    rx
}

/// Locks a view state, shrugging off poisoning: the state is plain data and
/// stays usable even if a holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// `HH:MM` out of an ISO-8601 timestamp such as `2025-11-02T10:20:30`.
/// Anything that does not look like one is returned as is.
pub fn time_label(timestamp: &str) -> &str {
    match timestamp.split_once('T') {
        Some((_, time)) if time.len() >= 5 && time.is_char_boundary(5) => &time[..5],
        _ => timestamp,
    }
}
