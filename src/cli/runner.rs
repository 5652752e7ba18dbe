//! CLI runner - executes commands

use crate::api::EventDeskApi;
use crate::auth::TokenClaims;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{ApiClient, RequestConfig};
use crate::session::{FileStore, LogNavigator, SessionContext};
use crate::types::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let api = self.build_api()?;

        match &self.cli.command {
            Commands::Login { username, password } => {
                let login = api.login(username, password).await?;
                self.output(&json!({
                    "status": "logged_in",
                    "user": login.user
                }))
            }
            Commands::Logout => {
                api.logout().await;
                self.output(&json!({ "status": "logged_out" }))
            }
            Commands::Status => self.status(api.session()).await,
            Commands::Whoami => self.output(&api.me().await?),
            Commands::Events => self.output(&api.list_events().await?),
            Commands::Book { id } => self.output(&api.book_event(*id).await?),
            Commands::Bookings => self.output(&api.my_bookings().await?),
            Commands::Cancel { id } => {
                api.cancel_booking(*id).await?;
                self.output(&json!({ "status": "cancelled", "booking": id }))
            }
            Commands::Dashboard => self.output(&api.admin_dashboard().await?),
            Commands::Request {
                method,
                path,
                body,
                headers,
            } => {
                self.raw_request(api.client(), method, path, body.as_deref(), headers)
                    .await
            }
        }
    }

    /// Resolve configuration: defaults, then YAML file, then env, then flags
    fn load_config(&self) -> Result<ClientConfig> {
        dotenvy::dotenv().ok();

        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        let mut config = config.with_env_overrides(|key| std::env::var(key).ok())?;

        if let Some(url) = &self.cli.base_url {
            config.base_url.clone_from(url);
            config.validate()?;
        }
        Ok(config)
    }

    /// Build the API over the persisted session file
    fn build_api(&self) -> Result<EventDeskApi> {
        let config = self.load_config()?;
        let path = match &self.cli.session_file {
            Some(path) => path.clone(),
            None => ClientConfig::default_session_path()?,
        };
        debug!(session = %path.display(), base_url = %config.base_url, "Opening session");

        let store = FileStore::open(&path)?;
        let session = SessionContext::new(Arc::new(store)).with_navigator(Arc::new(LogNavigator));
        let client = ApiClient::new(config, session)?;
        Ok(EventDeskApi::new(client))
    }

    /// Describe the stored session without touching the network
    async fn status(&self, session: &SessionContext) -> Result<()> {
        let access = session.access_token().await?;
        let has_refresh = session.refresh_token().await?.is_some();
        let user = session.user().await?;
        self.output(&session_summary(access.as_deref(), has_refresh, user))
    }

    async fn raw_request(
        &self,
        client: &ApiClient,
        method: &str,
        path: &str,
        body: Option<&str>,
        headers: &[String],
    ) -> Result<()> {
        let method: Method = method.parse()?;
        let config = request_config(headers, body)?;

        let response = client.request(method, path, config).await?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(Error::Http)?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        self.output(&json!({ "status": status, "body": body }))
    }

    /// Output a value as JSON on stdout
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

/// Build a request from `-H` and `--body` arguments
fn request_config(headers: &[String], body: Option<&str>) -> Result<RequestConfig> {
    let mut config = RequestConfig::new();
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        config = config.header(name, value);
    }
    if let Some(body) = body {
        let value = serde_json::from_str::<Value>(body).context("Invalid --body JSON")?;
        config = config.json(value);
    }
    Ok(config)
}

/// Split a `Name: value` header argument
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once(':').ok_or_else(|| Error::InvalidHeader {
        name: raw.to_string(),
        message: "expected 'Name: value'".to_string(),
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeader {
            name: raw.to_string(),
            message: "header name is empty".to_string(),
        });
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Offline view of a stored session; token values are never echoed
fn session_summary(access: Option<&str>, has_refresh: bool, user: Option<Value>) -> Value {
    let claims = access.and_then(|token| TokenClaims::decode_unverified(token).ok());

    json!({
        "authenticated": access.is_some(),
        "has_refresh_token": has_refresh,
        "user": user,
        "user_id": claims.as_ref().and_then(|c| c.user_id.clone()),
        "access_expires_at": claims
            .as_ref()
            .and_then(TokenClaims::expires_at)
            .map(|at| at.to_rfc3339()),
        "access_expired": claims.as_ref().map(TokenClaims::is_expired),
    })
}
