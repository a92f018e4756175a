use oauth2_core::OAuth2ErrorKind;
use prometheus::{IntCounterVec, Opts, Registry};

/// How a request on a flow endpoint ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Validated and handed to an injected handler.
    Dispatched,
    /// Answered with a protocol error.
    Rejected,
    /// Validated, but no handler was configured for it.
    Unconfigured,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Dispatched => "dispatched",
            DispatchOutcome::Rejected => "rejected",
            DispatchOutcome::Unconfigured => "unconfigured",
        }
    }
}

/// Grant dispatch counters, registered in their own registry.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    pub grant_requests_total: IntCounterVec,
    pub grant_rejections_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let grant_requests_total = IntCounterVec::new(
            Opts::new(
                "oauth2_grant_requests_total",
                "Requests received on OAuth2 flow endpoints by grant and outcome",
            ),
            &["grant", "outcome"],
        )?;
        let grant_rejections_total = IntCounterVec::new(
            Opts::new(
                "oauth2_grant_rejections_total",
                "OAuth2 flow requests rejected by grant and error code",
            ),
            &["grant", "error"],
        )?;

        registry.register(Box::new(grant_requests_total.clone()))?;
        registry.register(Box::new(grant_rejections_total.clone()))?;

        Ok(Self {
            registry,
            grant_requests_total,
            grant_rejections_total,
        })
    }

    pub fn record(&self, grant: &str, outcome: DispatchOutcome) {
        self.grant_requests_total
            .with_label_values(&[grant, outcome.as_str()])
            .inc();
    }

    pub fn record_dispatched(&self, grant: &str) {
        self.record(grant, DispatchOutcome::Dispatched);
    }

    pub fn record_unconfigured(&self, grant: &str) {
        self.record(grant, DispatchOutcome::Unconfigured);
    }

    pub fn record_rejected(&self, grant: &str, error: OAuth2ErrorKind) {
        self.record(grant, DispatchOutcome::Rejected);
        self.grant_rejections_total
            .with_label_values(&[grant, error.as_str()])
            .inc();
    }

    pub fn requests(&self, grant: &str, outcome: DispatchOutcome) -> u64 {
        self.grant_requests_total
            .with_label_values(&[grant, outcome.as_str()])
            .get()
    }

    pub fn rejections(&self, grant: &str, error: OAuth2ErrorKind) -> u64 {
        self.grant_rejections_total
            .with_label_values(&[grant, error.as_str()])
            .get()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_counted_per_grant() {
        let metrics = Metrics::new().unwrap();
        metrics.record_dispatched("password");
        metrics.record_dispatched("password");
        metrics.record_rejected("password", OAuth2ErrorKind::InvalidRequest);
        metrics.record_unconfigured("refresh_token");

        assert_eq!(metrics.requests("password", DispatchOutcome::Dispatched), 2);
        assert_eq!(metrics.requests("password", DispatchOutcome::Rejected), 1);
        assert_eq!(
            metrics.rejections("password", OAuth2ErrorKind::InvalidRequest),
            1
        );
        assert_eq!(
            metrics.requests("refresh_token", DispatchOutcome::Unconfigured),
            1
        );
        assert_eq!(
            metrics.requests("client_credentials", DispatchOutcome::Dispatched),
            0
        );
    }

    #[test]
    fn registry_encodes_to_text() {
        let metrics = Metrics::new().unwrap();
        metrics.record_rejected("client_credentials", OAuth2ErrorKind::UnsupportedGrantType);
        let text =
            String::from_utf8(crate::encode_prometheus_text(&metrics.registry).unwrap()).unwrap();
        assert!(text.contains("oauth2_grant_requests_total"));
        assert!(text.contains("error=\"unsupported_grant_type\""));
    }
}
