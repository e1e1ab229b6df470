use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// 全局共享 HTTP 客户端
///
/// 不设置整体超时：各调用方按自己的预算在请求上设置 `.timeout()`。
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .user_agent(concat!("cherry-pick-pro/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// 获取共享的 HTTP 客户端引用
pub fn shared_client() -> &'static Client {
    &HTTP_CLIENT
}
