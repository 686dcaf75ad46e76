//! Contact form forwarding
//!
//! The site does not store submissions. A validated request is posted as
//! JSON to an external endpoint, and that endpoint's answer is relayed.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ContactConfig;

/// Message shown when the endpoint rejects a submission without saying why
const GENERIC_FAILURE: &str = "Error al enviar el mensaje. Inténtalo más tarde.";

/// A contact form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "acceptedPrivacy", alias = "accepted_privacy")]
    pub accepted_privacy: bool,
}

/// Body sent to the endpoint; the privacy flag stays local
#[derive(Debug, Serialize)]
struct Payload<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpstreamReply {
    error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("The privacy policy must be accepted before sending the form")]
    PrivacyNotAccepted,

    #[error("Contact endpoint is not configured")]
    NotConfigured,

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to reach contact endpoint: {0}")]
    Http(#[from] reqwest::Error),
}

impl ContactError {
    /// Whether the submission itself was at fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ContactError::MissingField(_) | ContactError::InvalidEmail | ContactError::PrivacyNotAccepted
        )
    }
}

impl ContactRequest {
    /// Check the submission before it leaves the site
    pub fn validate(&self, require_privacy: bool) -> Result<(), ContactError> {
        if require_privacy && !self.accepted_privacy {
            return Err(ContactError::PrivacyNotAccepted);
        }
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ContactError::MissingField(field));
            }
        }
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ContactError::InvalidEmail),
        }
    }
}

/// Posts contact submissions to the configured endpoint
#[derive(Clone)]
pub struct ContactClient {
    endpoint: Option<String>,
    require_privacy: bool,
    client: reqwest::Client,
}

impl ContactClient {
    pub fn new(config: &ContactConfig) -> Result<Self, ContactError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            require_privacy: config.require_privacy,
            client,
        })
    }

    /// Validate and forward a submission
    pub async fn submit(&self, request: &ContactRequest) -> Result<(), ContactError> {
        request.validate(self.require_privacy)?;

        let endpoint = self.endpoint.as_deref().ok_or(ContactError::NotConfigured)?;
        let payload = Payload {
            name: request.name.trim(),
            email: request.email.trim(),
            message: request.message.trim(),
        };

        let response = self.client.post(endpoint).json(&payload).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!("Contact submission forwarded ({})", status);
            return Ok(());
        }

        let reason = response
            .json::<UpstreamReply>()
            .await
            .ok()
            .and_then(|reply| reply.error)
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        tracing::warn!("Contact endpoint rejected submission ({}): {}", status, reason);
        Err(ContactError::Rejected(reason))
    }
}
