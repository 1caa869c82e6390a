//! Built-in delivery engine checks.
//!
//! Mirrors the checks the engine runs when it builds notifiers from a
//! configuration. Used as the applier when no live engine is attached, and
//! by `alertcfg check`.

use tracing::debug;
use url::Url;

use super::Applier;
use crate::core::constants;
use crate::core::domain::{IntegrationView, ResolvedConfig, ResolvedIntegration};
use crate::error::ApplyError;

/// Semantic validation of every integration in a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifierCheck;

impl Applier for NotifierCheck {
    fn apply(&self, tenant: &str, config: &ResolvedConfig) -> Result<(), ApplyError> {
        for (receiver, integration) in config.integrations() {
            debug!(tenant, receiver = %receiver, integration = %integration.meta().name, "checking notifier");
            check(integration).map_err(ApplyError::Rejected)?;
        }
        Ok(())
    }
}

fn setting<'a>(integration: &'a ResolvedIntegration, key: &str) -> &'a str {
    integration
        .meta
        .settings
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("")
}

fn secret<'a>(integration: &'a ResolvedIntegration, key: &str) -> &'a str {
    integration.secret(key).map(str::trim).unwrap_or("")
}

/// Parse an absolute http(s) URL with a host.
///
/// The URL parser silently drops tabs and newlines, so any whitespace is
/// rejected before parsing.
fn http_url(value: &str) -> Option<Url> {
    if value.chars().any(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(value).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}

fn require_url(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("could not find url property in settings of {} receiver", kind));
    }
    if http_url(value).is_none() {
        return Err(format!("invalid URL {:?} for {} receiver", value, kind));
    }
    Ok(())
}

fn check(integration: &ResolvedIntegration) -> Result<(), String> {
    match integration.meta.kind.as_str() {
        "slack" => {
            let url = secret(integration, "url");
            let url = if url.is_empty() {
                constants::SLACK_API_ENDPOINT
            } else {
                url
            };
            // The URL is a credential; never quote it back
            if http_url(url).is_none() {
                return Err("invalid URL for slack receiver".to_string());
            }
            if url == constants::SLACK_API_ENDPOINT && secret(integration, "token").is_empty() {
                return Err("token must be specified when using the Slack chat API".to_string());
            }
            Ok(())
        }
        "email" => {
            let addresses = setting(integration, "addresses");
            let list: Vec<&str> = addresses
                .split([';', ',', '\n'])
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            if list.is_empty() {
                return Err("could not find addresses in settings".to_string());
            }
            if let Some(bad) = list.iter().find(|a| !a.contains('@')) {
                return Err(format!("invalid email address {:?}", bad));
            }
            Ok(())
        }
        "webhook" => require_url("webhook", setting(integration, "url")),
        "teams" => require_url("teams", setting(integration, "url")),
        "discord" => {
            let url = secret(integration, "url");
            if url.is_empty() {
                return Err("could not find webhook url property in settings".to_string());
            }
            if http_url(url).is_none() {
                return Err("invalid URL for discord receiver".to_string());
            }
            Ok(())
        }
        "pagerduty" => {
            if secret(integration, "integrationKey").is_empty() {
                return Err("could not find integration key property in settings".to_string());
            }
            Ok(())
        }
        "telegram" => {
            if secret(integration, "bottoken").is_empty() {
                return Err("could not find Bot Token in settings".to_string());
            }
            if setting(integration, "chatid").is_empty() {
                return Err("could not find Chat Id in settings".to_string());
            }
            Ok(())
        }
        "opsgenie" => {
            if secret(integration, "apiKey").is_empty() {
                return Err("could not find api key property in settings".to_string());
            }
            Ok(())
        }
        other => Err(format!("notifier {} is not supported", other)),
    }
}
