use url::Url;

/// Performs the top-level redirect to the provider
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url);
}

/// Navigator for headless use: records the destination in the logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, url: &Url) {
        tracing::info!(%url, "Navigating to World ID");
    }
}
