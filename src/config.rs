// Import necessary crates and modules
use serde::{Deserialize, Serialize};

/// Structure holding the configuration of the gradebook service endpoints.
///
/// The service root is the absolute URL prefix under which the host dispatcher mounts
/// this service; every `@id` and sub-resource URL placed on the wire is built from it.
///
/// Fields:
/// - `service_root`: Base URL of the service, without a trailing slash.
///
/// Example usage:
/// ```
/// use lti_gradebook_services::ServiceConfig;
///
/// let config = ServiceConfig::new("https://lms.example.edu/lti/services");
/// assert_eq!(config.service_root, "https://lms.example.edu/lti/services");
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ServiceConfig {
    pub service_root: String,
}

impl ServiceConfig {
    /// Creates a configuration from an explicit service root.
    ///
    /// A trailing slash is stripped so endpoint concatenation stays predictable.
    pub fn new(service_root: impl Into<String>) -> ServiceConfig {
        let mut service_root = service_root.into();
        while service_root.ends_with('/') {
            service_root.pop();
        }
        ServiceConfig { service_root }
    }

    /// Loads the configuration from the environment.
    ///
    /// The service root is read from `GRADEBOOK_SERVICE_ROOT`. Returns an error
    /// message when the variable is not set, so callers can fall back to an explicit
    /// value.
    pub fn load_from_env() -> Result<ServiceConfig, String> {
        match std::env::var("GRADEBOOK_SERVICE_ROOT") {
            Ok(root) => {
                log::debug!("Service root loaded from environment: {}", root);
                Ok(ServiceConfig::new(root))
            }
            Err(_) => Err("Error retrieving service root from environment".to_string()),
        }
    }
}
