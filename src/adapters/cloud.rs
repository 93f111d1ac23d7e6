//! Cloud telemetry adapter (HTTPS POST of JSON records).
//!
//! Implements [`TelemetryPort`].  Each record becomes one request:
//!
//! ```text
//! POST https://{host}/devices/{deviceId}/messages/events?api-version=2020-03-13
//! Authorization: {sas_token}
//! Content-Type: application/json
//! ```
//!
//! Delivery is best-effort.  Records are dropped while the link is down or
//! while the failure cool-down ([`Backoff`]) is holding, and a failed POST
//! is logged and never retried.

use log::{debug, info, warn};

use crate::app::ports::TelemetryPort;
use crate::config::TelemetryConfig;
use crate::error::CommsError;
use crate::telemetry::{Backoff, TelemetryRecord};

use super::time::Esp32TimeAdapter;

pub const API_VERSION: &str = "2020-03-13";

/// Collector URL for `device_id` on `host`.
pub fn endpoint_url(host: &str, device_id: &str) -> String {
    format!("https://{host}/devices/{device_id}/messages/events?api-version={API_VERSION}")
}

/// Delivery counters, for the periodic status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub sent: u32,
    pub failed: u32,
    /// Dropped before reaching the network (link down or cooling down).
    pub dropped: u32,
}

pub struct CloudTelemetry {
    url: String,
    sas_token: heapless::String<256>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    request_timeout_ms: u32,
    link_up: bool,
    backoff: Backoff,
    stats: DeliveryStats,
    clock: Esp32TimeAdapter,
    /// Simulation: every (url, body) that would have been POSTed.
    #[cfg(not(target_os = "espidf"))]
    sim_posts: Vec<(String, Vec<u8>)>,
    #[cfg(not(target_os = "espidf"))]
    sim_fail: Option<CommsError>,
}

impl CloudTelemetry {
    pub fn new(
        config: &TelemetryConfig,
        device_id: &str,
        link_up: bool,
        clock: Esp32TimeAdapter,
    ) -> Self {
        let url = endpoint_url(&config.host, device_id);
        info!("Cloud: endpoint {} (link {})", url, if link_up { "up" } else { "down" });
        Self {
            url,
            sas_token: config.sas_token.clone(),
            request_timeout_ms: config.request_timeout_ms,
            link_up,
            backoff: Backoff::new(config.max_backoff_secs),
            stats: DeliveryStats::default(),
            clock,
            #[cfg(not(target_os = "espidf"))]
            sim_posts: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_fail: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    /// Ship `record` as of `now_ms`.
    pub fn send_at(&mut self, now_ms: u64, record: &TelemetryRecord) -> Result<(), CommsError> {
        if !self.link_up {
            self.stats.dropped += 1;
            debug!("Cloud: link down, {} dropped", record.event.as_str());
            return Err(CommsError::LinkDown);
        }
        if !self.backoff.ready(now_ms) {
            self.stats.dropped += 1;
            debug!("Cloud: cooling down, {} dropped", record.event.as_str());
            return Err(CommsError::CoolingDown);
        }

        let body = record.to_json()?;
        match self.platform_post(&body) {
            Ok(()) => {
                self.backoff.on_success();
                self.stats.sent += 1;
                debug!("Cloud: {} delivered", record.event.as_str());
                Ok(())
            }
            Err(e) => {
                let hold_ms = self.backoff.current_ms();
                self.backoff.on_failure(now_ms);
                self.stats.failed += 1;
                warn!(
                    "Cloud: {} not delivered: {} (holding {} ms)",
                    record.event.as_str(),
                    e,
                    hold_ms
                );
                Err(e)
            }
        }
    }

    /// Simulation: every POST attempted so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_posts(&self) -> &[(String, Vec<u8>)] {
        &self.sim_posts
    }

    /// Simulation: fail subsequent POSTs with `err`, or succeed with `None`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_failure(&mut self, err: Option<CommsError>) {
        self.sim_fail = err;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_post(&mut self, body: &[u8]) -> Result<(), CommsError> {
        use core::time::Duration;

        use embedded_svc::http::client::Client as HttpClient;
        use embedded_svc::io::Write;
        use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

        let http_conf = HttpClientConfiguration {
            timeout: Some(Duration::from_millis(u64::from(self.request_timeout_ms))),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&http_conf).map_err(|e| {
            warn!("Cloud: connection setup failed: {}", e);
            CommsError::HttpConnectFailed
        })?;
        let mut client = HttpClient::wrap(connection);

        let content_length = body.len().to_string();
        let headers = [
            ("Authorization", self.sas_token.as_str()),
            ("Content-Type", "application/json"),
            ("Content-Length", content_length.as_str()),
        ];
        let mut request = client
            .post(&self.url, &headers)
            .map_err(|_| CommsError::HttpConnectFailed)?;
        request
            .write_all(body)
            .map_err(|_| CommsError::HttpRequestFailed)?;
        request.flush().map_err(|_| CommsError::HttpRequestFailed)?;
        let response = request.submit().map_err(|_| CommsError::HttpRequestFailed)?;

        let status = response.status();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(CommsError::HttpStatus(status))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(&mut self, body: &[u8]) -> Result<(), CommsError> {
        self.sim_posts.push((self.url.clone(), body.to_vec()));
        match self.sim_fail {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TelemetryPort for CloudTelemetry {
    fn send(&mut self, record: &TelemetryRecord) {
        let now = self.clock.uptime_ms();
        let _ = self.send_at(now, record);
    }
}
