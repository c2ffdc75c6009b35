use crate::dto::HealthRes;

/// Health service shared by every HTTP surface of the triage service.
#[derive(Clone, Debug, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Triage service is alive".into(),
        }
    }
}
