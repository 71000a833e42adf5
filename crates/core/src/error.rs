/// Failures raised by the provider gateways.
///
/// The two variants map onto distinct operator actions: a missing credential
/// is fixed by configuration, while a provider error carries whatever the
/// upstream service reported.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{provider} API key not configured. Please set {env_var} environment variable.")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },
    #[error("{0}")]
    Provider(String),
}

impl GatewayError {
    /// Returns `true` if the failure happened before any provider was contacted.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::MissingCredential { .. })
    }
}
