use std::time::Duration;

use url::Url;

use crate::errors::{BuildError, Error, Result};
use crate::identifier::Token;

pub(crate) mod transport;

const DEFAULT_USER_AGENT: &str = concat!("bookalope-rust", "@", env!("CARGO_PKG_VERSION"),);

/// Production Bookalope endpoint.
pub const DEFAULT_HOST: &str = "https://bookflow.bookalope.net";
/// Beta Bookalope endpoint.
pub const BETA_HOST: &str = "https://beta.bookalope.net";
/// API version recorded on the client unless overridden.
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug, Clone, Default)]
#[must_use]
/// Configures a [`BookalopeClient`] before construction.
///
/// # Defaults
/// - Host: [`DEFAULT_HOST`], or [`BETA_HOST`] with [`Self::beta`]
/// - API version: [`DEFAULT_API_VERSION`]
/// - HTTP request timeout: reqwest default (no global timeout) unless set via
///   [`Self::request_timeout`]
/// - User-agent: `bookalope-rust@<crate-version>` plus any [`Self::user_agent_extra`]
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// # use bookalope::BookalopeClient;
/// let client = BookalopeClient::builder()
///     .token("79beff75edcb443b902043cc534476db")
///     .beta(true)
///     .request_timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok::<_, bookalope::BuildError>(())
/// ```
pub struct BookalopeClientBuilder {
    token: Option<String>,
    beta: bool,
    host: Option<String>,
    api_version: Option<String>,
    http_request_timeout: Option<Duration>,

    /// Optional user-agent segment appended to the default UA.
    user_agent_extra: Option<String>,
}

impl BookalopeClientBuilder {
    /// Token to authenticate with. Validated in [`Self::build`].
    pub fn token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    /// Select the beta endpoint instead of production.
    pub fn beta(&mut self, beta: bool) -> &mut Self {
        self.beta = beta;
        self
    }

    /// Point the client at an explicit base URL (a local test server, a proxy).
    /// Takes precedence over [`Self::beta`].
    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    /// Override the recorded API version.
    pub fn api_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set HTTP requests timeout.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.http_request_timeout = Some(timeout);
        self
    }

    /// Append an extra user-agent segment after the default `bookalope-rust@<version>`.
    /// Example: `.user_agent_extra("myapp/1.2.3")`
    pub fn user_agent_extra<S: Into<String>>(&mut self, extra: S) -> &mut Self {
        self.user_agent_extra = Some(extra.into());
        self
    }

    /// Build [BookalopeClient]
    pub fn build(&self) -> std::result::Result<BookalopeClient, BuildError> {
        let token = match &self.token {
            Some(raw) => Some(Token::parse(raw).map_err(|err| BuildError::Token(Box::new(err)))?),
            None => None,
        };

        let host = match &self.host {
            Some(host) => host.as_str(),
            None if self.beta => BETA_HOST,
            None => DEFAULT_HOST,
        };
        let host = Url::parse(host)?;

        // Compose user agent with optional extra part.
        let user_agent = match &self.user_agent_extra {
            Some(extra) if !extra.trim().is_empty() => {
                format!("{DEFAULT_USER_AGENT} {}", extra.trim())
            }
            _ => DEFAULT_USER_AGENT.to_string(),
        };

        let mut http_builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = self.http_request_timeout {
            http_builder = http_builder.timeout(timeout);
        }

        Ok(BookalopeClient {
            http: http_builder.build()?,
            host,
            api_version: self
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            token,
        })
    }
}

/// Handle to the Bookalope service: the transport every resource is built on.
///
/// It owns a pooled reqwest client, the base URL, the API version and the
/// authentication token. Every resource constructor takes `&BookalopeClient`
/// and keeps its own clone; clones are cheap and share the connection pool.
/// Replacing the token with [`Self::set_token`] affects this handle and
/// resources constructed from it afterwards, not earlier clones.
///
/// ### Construction
/// Use [`BookalopeClient::builder()`] to pick the host, token and timeouts,
/// or [`BookalopeClient::new()`] for production defaults.
///
/// ### Examples
/// ```no_run
/// # use bookalope::{BookalopeClient, Result};
/// # async fn run() -> Result<()> {
/// let mut client = BookalopeClient::new()?;
/// client.set_token("79beff75edcb443b902043cc534476db")?;
/// let profile = client.get_profile().await?;
/// println!("{} {}", profile.firstname, profile.lastname);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct BookalopeClient {
    pub(crate) http: reqwest::Client,
    pub(crate) host: Url,
    pub(crate) api_version: String,
    pub(crate) token: Option<Token>,
}

impl BookalopeClient {
    /// Creates a client for the production endpoint, without a token.
    pub fn new() -> std::result::Result<BookalopeClient, BuildError> {
        Self::builder().build()
    }

    /// Returns a builder to edit settings before creating [`BookalopeClient`].
    pub fn builder() -> BookalopeClientBuilder {
        BookalopeClientBuilder::default()
    }

    /// Replace the authentication token.
    ///
    /// The token is validated first; a malformed one leaves the current token
    /// untouched and fails with [`Error::InvalidToken`].
    pub fn set_token(&mut self, token: impl AsRef<str>) -> Result<()> {
        self.token = Some(Token::parse(token)?);
        Ok(())
    }

    // === Getters ===

    /// The current token, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// The base URL requests are sent to.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// The API version this client was configured with.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub(crate) fn require_token(&self) -> Result<&Token> {
        self.token.as_ref().ok_or(Error::MissingToken)
    }
}
