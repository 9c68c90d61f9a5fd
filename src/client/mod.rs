//! Client layer: one gateway session, orchestrating framing, transport and parsing.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::domain::{
    OutboundMessage, Outbox, Password, ReplyRecord, ServerStatus, SplitPolicy, Username,
    ValidationError,
};
use crate::transport::{
    BodyExtractor, CodecError, Command, ExtractedBody, HtmlBodyExtractor, decode_response,
    encode_request, parse_credits_response, parse_reply_listing,
};

/// Primary M4U server. Only this host is contacted; there is no failover.
pub const DEFAULT_HOST: &str = "smsmaster.m4u.com.au";

/// `<title>` every genuine gateway response carries.
const SERVER_TITLE: &str = "M4U SMSMASTER";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_text<'a>(
        &'a self,
        url: &'a Url,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_text<'a>(
        &'a self,
        url: &'a Url,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.post(url.as_str()).body(body).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Account credentials sent in the header of every request.
pub struct Credentials {
    username: Username,
    password: Password,
    use_message_id: bool,
}

impl Credentials {
    /// Validate both parts; message-id mode starts disabled.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            use_message_id: false,
        })
    }

    /// Enable or disable message-id mode.
    ///
    /// In this mode the gateway echoes each message's id back in replies.
    pub fn with_message_id(mut self, enabled: bool) -> Self {
        self.use_message_id = enabled;
        self
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn use_message_id(&self) -> bool {
        self.use_message_id
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`M4uClient`].
///
/// Every gateway operation reports failure through this type; none of them
/// panic or fall back to sentinel values.
pub enum M4uError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The server answered with something other than HTTP 200.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The response did not come from an M4U gateway.
    #[error("unexpected server identity: {title:?}")]
    UnexpectedServerIdentity { title: String },

    /// The response body did not follow the M4U line grammar.
    #[error("unparseable response: {0}")]
    UnparseableResponse(#[source] CodecError),

    /// The gateway answered with a status code the operation treats as failure.
    #[error("gateway returned status {}: {}", .status.code, .status.message)]
    Api { status: ServerStatus },

    /// The client configuration cannot produce a usable endpoint.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Clone, Deserialize)]
/// Deserializable gateway settings, for callers that load configuration from files or the environment.
///
/// Convert with [`M4uClient::from_config`].
pub struct GatewayConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub use_message_id: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_secure")]
    pub secure: bool,
    /// Overrides the scheme's default port (443 or 80).
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub split_policy: SplitPolicy,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("username", &self.username)
            .field("use_message_id", &self.use_message_id)
            .field("host", &self.host)
            .field("secure", &self.secure)
            .field("port", &self.port)
            .field("split_policy", &self.split_policy)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_secure() -> bool {
    true
}

#[derive(Debug, Clone)]
/// Builder for [`M4uClient`].
///
/// Defaults: [`DEFAULT_HOST`] over HTTPS, [`SplitPolicy::Split`], no timeout.
pub struct M4uClientBuilder {
    credentials: Credentials,
    host: String,
    secure: bool,
    port: Option<u16>,
    split_policy: SplitPolicy,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl M4uClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            host: DEFAULT_HOST.to_owned(),
            secure: true,
            port: None,
            split_policy: SplitPolicy::default(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the gateway host name.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Use HTTPS on port 443 (`true`, the default) or plain HTTP on port 80.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Override the port implied by [`M4uClientBuilder::secure`].
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Policy applied by outboxes created with [`M4uClient::outbox`].
    pub fn split_policy(mut self, policy: SplitPolicy) -> Self {
        self.split_policy = policy;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`M4uClient`].
    pub fn build(self) -> Result<M4uClient, M4uError> {
        let endpoint = gateway_url(&self.host, self.secure, self.port)?;

        // No idle connections survive an exchange.
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| M4uError::Transport(Box::new(err)))?;

        Ok(M4uClient {
            credentials: self.credentials,
            endpoint,
            split_policy: self.split_policy,
            http: Arc::new(ReqwestTransport { client }),
            extractor: Arc::new(HtmlBodyExtractor),
            last_status: None,
        })
    }
}

fn gateway_url(host: &str, secure: bool, port: Option<u16>) -> Result<Url, M4uError> {
    let scheme = if secure { "https" } else { "http" };
    let invalid = |reason: String| M4uError::Configuration(format!("gateway host {host:?}: {reason}"));

    let mut url = Url::parse(&format!("{scheme}://{}/", host.trim()))
        .map_err(|err| invalid(err.to_string()))?;
    if let Some(port) = port {
        url.set_port(Some(port))
            .map_err(|()| invalid("cannot carry a port".to_owned()))?;
    }
    Ok(url)
}

#[derive(Debug, Clone)]
struct Exchange {
    status: ServerStatus,
    body: String,
}

#[derive(Clone)]
/// Session with an M4U SMSMASTER gateway.
///
/// Every operation performs one HTTP POST of a framed text payload to `/` on
/// the configured host, scrapes the HTML answer and decodes its status line.
/// The most recent decoded status stays available through
/// [`M4uClient::last_status`].
pub struct M4uClient {
    credentials: Credentials,
    endpoint: Url,
    split_policy: SplitPolicy,
    http: Arc<dyn HttpTransport>,
    extractor: Arc<dyn BodyExtractor>,
    last_status: Option<ServerStatus>,
}

impl fmt::Debug for M4uClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("M4uClient")
            .field("username", self.credentials.username())
            .field("use_message_id", &self.credentials.use_message_id())
            .field("endpoint", &self.endpoint.as_str())
            .field("split_policy", &self.split_policy)
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}

impl M4uClient {
    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> M4uClientBuilder {
        M4uClientBuilder::new(credentials)
    }

    /// Build a client from deserialized settings.
    pub fn from_config(config: GatewayConfig) -> Result<Self, M4uError> {
        let credentials = Credentials::new(config.username, config.password)?
            .with_message_id(config.use_message_id);

        let mut builder = Self::builder(credentials)
            .host(config.host)
            .secure(config.secure)
            .split_policy(config.split_policy);
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }

    /// An empty outbox that segments with this session's split policy.
    pub fn outbox(&self) -> Outbox {
        Outbox::new(self.split_policy)
    }

    /// Status decoded from the most recent successfully parsed response.
    ///
    /// Failed exchanges leave it untouched.
    pub fn last_status(&self) -> Option<&ServerStatus> {
        self.last_status.as_ref()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit a `MESSAGES2.0` batch.
    ///
    /// An empty batch is still posted; the gateway decides what it means.
    ///
    /// Errors: [`M4uError::Api`] when the gateway answers with anything but 100.
    pub async fn send_messages(
        &mut self,
        messages: &[OutboundMessage],
    ) -> Result<ServerStatus, M4uError> {
        let exchange = self.exchange(Command::SendMessages(messages)).await?;
        if !exchange.status.code.is_ok() {
            return Err(M4uError::Api {
                status: exchange.status,
            });
        }
        Ok(exchange.status)
    }

    /// Submit every message in `outbox`, even when it holds none. The outbox is left as is.
    pub async fn send_outbox(&mut self, outbox: &Outbox) -> Result<ServerStatus, M4uError> {
        self.send_messages(outbox.messages()).await
    }

    /// Fetch pending replies.
    ///
    /// Any status other than 150 means there is nothing to read and yields an
    /// empty list. With `auto_confirm`, a non-empty listing is followed by
    /// [`M4uClient::confirm_replies_received`]; a failed confirmation is logged
    /// and does not affect the returned replies.
    pub async fn check_replies(&mut self, auto_confirm: bool) -> Result<Vec<ReplyRecord>, M4uError> {
        let exchange = self.exchange(Command::CheckReplies).await?;
        if !exchange.status.code.has_replies() {
            debug!(code = %exchange.status.code, "no replies pending");
            return Ok(Vec::new());
        }

        let replies = parse_reply_listing(&exchange.body, self.credentials.use_message_id())
            .map_err(M4uError::UnparseableResponse)?;
        debug!(count = replies.len(), "replies received");

        if auto_confirm && !replies.is_empty() {
            if let Err(err) = self.confirm_replies_received().await {
                warn!(error = %err, "failed to confirm received replies");
            }
        }

        Ok(replies)
    }

    /// Tell the gateway the last reply listing has been received.
    ///
    /// The decoded status is returned whatever its code.
    pub async fn confirm_replies_received(&mut self) -> Result<ServerStatus, M4uError> {
        let exchange = self.exchange(Command::ConfirmReceived).await?;
        Ok(exchange.status)
    }

    /// Remaining prepaid credits.
    ///
    /// Errors:
    /// - [`M4uError::Api`] when the gateway answers with anything but 100,
    /// - [`M4uError::UnparseableResponse`] when the status line carries no credit count.
    pub async fn credits_remaining(&mut self) -> Result<u64, M4uError> {
        let exchange = self.exchange(Command::CreditsRemaining).await?;
        if !exchange.status.code.is_ok() {
            return Err(M4uError::Api {
                status: exchange.status,
            });
        }

        parse_credits_response(&exchange.status).ok_or_else(|| {
            M4uError::UnparseableResponse(CodecError::MalformedCredits {
                line: format!("{} {}", exchange.status.code, exchange.status.message),
            })
        })
    }

    #[instrument(skip_all, fields(command = command.keyword()))]
    async fn exchange(&mut self, command: Command<'_>) -> Result<Exchange, M4uError> {
        let payload = encode_request(&self.credentials, &command);
        debug!(endpoint = %self.endpoint, bytes = payload.len(), "posting request");

        let response = self
            .http
            .post_text(&self.endpoint, payload)
            .await
            .map_err(M4uError::Transport)?;

        if response.status != 200 {
            warn!(status = response.status, "gateway answered with unexpected HTTP status");
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(M4uError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let ExtractedBody { title, body } = self.extractor.extract(&response.body);
        if title != SERVER_TITLE {
            warn!(%title, "response is not from an M4U gateway");
            return Err(M4uError::UnexpectedServerIdentity { title });
        }

        let status = decode_response(&body).map_err(|err| {
            warn!(error = %err, "cannot decode gateway response");
            M4uError::UnparseableResponse(err)
        })?;
        debug!(code = %status.code, message = %status.message, "gateway status");

        self.last_status = Some(status.clone());
        Ok(Exchange {
            status,
            body,
        })
    }
}
