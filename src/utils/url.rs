//! Endpoint resolution for the Dust API
//!
//! Every request the client makes is scoped to a workspace and shaped as
//! `<base>/api/v1/w/<workspace>/<endpoint>`. The base is picked from an
//! explicit [`Environment`] value rather than ambient process state.

/// Origin used when running against a local development server.
pub const DEVELOPMENT_ORIGIN: &str = "http://localhost:3000";

/// Origin of the hosted service.
pub const PRODUCTION_ORIGIN: &str = "https://dust.tt";

/// Version segment placed between the origin and the workspace path.
pub const API_VERSION_PATH: &str = "api/v1/w";

/// Environment variable whose presence switches the CLI to development mode.
pub const DEV_ENV_VAR: &str = "DUST_CLI_DEV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn origin(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_ORIGIN,
            Environment::Production => PRODUCTION_ORIGIN,
        }
    }
}

/// Builds workspace-scoped API URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    base_url: String,
}

impl EndpointResolver {
    pub fn new(environment: Environment) -> Self {
        Self::with_origin(environment.origin())
    }

    /// Resolver rooted at an arbitrary origin, e.g. a mock server in tests.
    pub fn with_origin(origin: &str) -> Self {
        Self {
            base_url: construct_api_url(origin, API_VERSION_PATH),
        }
    }

    /// The base URL including the API version segment, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workspace_url(&self, workspace_id: &str, endpoint: &str) -> String {
        let workspace_base = construct_api_url(&self.base_url, workspace_id);
        construct_api_url(&workspace_base, endpoint.trim_matches('/'))
    }
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use dust_cli::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://dust.tt/"), "https://dust.tt");
/// assert_eq!(normalize_base_url("https://dust.tt///"), "https://dust.tt");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete URL from a base URL and a path segment
///
/// # Examples
///
/// ```
/// use dust_cli::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://dust.tt/", "/api/v1/w"),
///     "https://dust.tt/api/v1/w"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
