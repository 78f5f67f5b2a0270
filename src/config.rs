use log::{info, warn};
use std::env;

use crate::error::MealbotError;
use crate::utils::mask_api_key;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_MEALBOT_ADDRESS: &str = "noms@mealbot.json.bz";
pub const DEFAULT_FULL_CONTACT_URL: &str = "https://api.fullcontact.com";
pub const DEFAULT_YELP_URL: &str = "https://api.yelp.com";
pub const DEFAULT_SENDGRID_URL: &str = "https://sendgrid.com";

/// Process-wide settings, read once at startup and shared read-only.
///
/// Provider credentials are optional: a missing one is reported when the
/// configuration is loaded and again as [`MealbotError::MissingCredential`]
/// when a client needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub mealbot_address: String,
    pub couch_url: Option<String>,
    pub sendgrid: SendgridCredentials,
    pub full_contact_key: Option<String>,
    pub yelp: YelpCredentials,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Default)]
pub struct SendgridCredentials {
    pub api_user: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct YelpCredentials {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub token: Option<String>,
    pub token_secret: Option<String>,
}

/// Base URLs of the external providers.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub full_contact: String,
    pub yelp: String,
    pub sendgrid: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            full_contact: DEFAULT_FULL_CONTACT_URL.to_string(),
            yelp: DEFAULT_YELP_URL.to_string(),
            sendgrid: DEFAULT_SENDGRID_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| {
            let value = lookup(name);
            if value.is_none() {
                warn!("missing environment variable {}", name);
            }
            value
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Self {
            bind_address: or_default("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            mealbot_address: or_default("MEALBOT_ADDRESS", DEFAULT_MEALBOT_ADDRESS),
            couch_url: required("COUCH_URL"),
            sendgrid: SendgridCredentials {
                api_user: required("SENDGRID_API_USER"),
                api_key: required("SENDGRID_API_KEY"),
            },
            full_contact_key: required("FULL_CONTACT_KEY"),
            yelp: YelpCredentials {
                consumer_key: required("YELP_CONSUMER_KEY"),
                consumer_secret: required("YELP_CONSUMER_SECRET"),
                token: required("YELP_TOKEN"),
                token_secret: required("YELP_TOKEN_SECRET"),
            },
            endpoints: Endpoints {
                full_contact: or_default("FULL_CONTACT_URL", DEFAULT_FULL_CONTACT_URL),
                yelp: or_default("YELP_URL", DEFAULT_YELP_URL),
                sendgrid: or_default("SENDGRID_URL", DEFAULT_SENDGRID_URL),
            },
        }
    }

    /// Domain of the reserved sending address; recipients on it are never replied to.
    pub fn reserved_domain(&self) -> &str {
        match self.mealbot_address.rsplit_once('@') {
            Some((_, domain)) => domain,
            None => &self.mealbot_address,
        }
    }

    pub fn log_summary(&self) {
        let masked = |value: &Option<String>| match value {
            Some(v) => mask_api_key(v),
            None => "<unset>".to_string(),
        };
        info!("Bind address: {}", self.bind_address);
        info!("Sending as: {} (reserved domain {})", self.mealbot_address, self.reserved_domain());
        info!("Audit log: {}", self.couch_url.as_deref().unwrap_or("<unset>"));
        info!(
            "Endpoints: fullcontact={} yelp={} sendgrid={}",
            self.endpoints.full_contact, self.endpoints.yelp, self.endpoints.sendgrid
        );
        info!(
            "Credentials: sendgrid_user={} sendgrid_key={} full_contact_key={} yelp_consumer_key={} yelp_token={}",
            masked(&self.sendgrid.api_user),
            masked(&self.sendgrid.api_key),
            masked(&self.full_contact_key),
            masked(&self.yelp.consumer_key),
            masked(&self.yelp.token),
        );
    }
}

/// Unwraps a credential or reports which one is missing.
pub fn credential<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, MealbotError> {
    value.as_deref().ok_or(MealbotError::MissingCredential(name))
}
