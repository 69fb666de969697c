use once_cell::sync::Lazy;
use std::time::{SystemTime, UNIX_EPOCH};

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
    tokio::spawn(fut);
}

/// Prefixes `scheme://` when the input carries no scheme of its own.
pub fn normalize_url(input: &str, scheme: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{}://{}", scheme, trimmed)
    }
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url(" wss://host/ws ", "ws"), "wss://host/ws");
        assert_eq!(normalize_url("host:8081/ws", "ws"), "ws://host:8081/ws");
        assert_eq!(normalize_url("localhost:8080", "http"), "http://localhost:8080");
    }
}
