use sentinel_config::{IngressMode, SentinelConfig};
use sentinel_core::Backoff;
use sentinel_core::ingress::{
    EventIngress, SseIngress, SyntheticConfig, SyntheticIngress, WebSocketIngress,
};

/// Ingress selected by the configuration.
pub fn build(config: &SentinelConfig) -> Box<dyn EventIngress> {
    let backoff = Backoff::new(config.player.backoff_cap);
    match &config.ingress.mode {
        IngressMode::Synthetic => Box::new(SyntheticIngress::new(
            &config.cameras,
            SyntheticConfig {
                interval: config.ingress.synthetic_interval,
                ..SyntheticConfig::default()
            },
        )),
        IngressMode::ServerSentEvents(url) => {
            Box::new(SseIngress::new(url.clone(), backoff))
        }
        IngressMode::WebSocket(url) => {
            Box::new(WebSocketIngress::new(url.clone(), backoff))
        }
    }
}
