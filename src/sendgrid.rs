use log::{debug, error, info};
use reqwest::{Client, StatusCode};

use crate::config::{credential, Config, SendgridCredentials};
use crate::error::MealbotError;
use crate::recipients::RecipientSet;

const SEND_PATH: &str = "/api/mail.send.json";

/// Sends the HTML reply through SendGrid's web API.
#[derive(Debug, Clone)]
pub struct SendgridClient {
    http: Client,
    base_url: String,
    credentials: SendgridCredentials,
    from: String,
}

impl SendgridClient {
    pub fn new(http: &Client, config: &Config) -> Self {
        Self {
            http: http.clone(),
            base_url: config.endpoints.sendgrid.trim_end_matches('/').to_string(),
            credentials: config.sendgrid.clone(),
            from: config.mealbot_address.clone(),
        }
    }

    fn form<'a>(
        &'a self,
        api_user: &'a str,
        api_key: &'a str,
        subject: &'a str,
        recipients: &'a RecipientSet,
        html: &'a str,
    ) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![("api_user", api_user), ("api_key", api_key)];
        form.extend(recipients.emails.iter().map(|email| ("to[]", email.as_str())));
        form.extend(recipients.names.iter().map(|name| ("toname[]", name.as_str())));
        form.push(("subject", subject));
        form.push(("html", html));
        form.push(("from", self.from.as_str()));
        form
    }

    /// Replies to `original_subject` with `html`, addressed to `recipients`.
    pub async fn reply(
        &self,
        original_subject: &str,
        recipients: &RecipientSet,
        html: &str,
    ) -> Result<(), MealbotError> {
        let api_user = credential(&self.credentials.api_user, "SENDGRID_API_USER")?;
        let api_key = credential(&self.credentials.api_key, "SENDGRID_API_KEY")?;
        let subject = format!("Re: {}", original_subject);
        info!("Replying to {:?} with subject {:?}", recipients.emails, subject);

        let form = self.form(api_user, api_key, &subject, recipients, html);
        let url = format!("{}{}", self.base_url, SEND_PATH);
        let response = self.http.post(&url).form(&form).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("sendgrid error code {}: {}", status, body);
            return Err(MealbotError::Send);
        }

        debug!("SendGrid accepted reply to {} recipients", recipients.len());
        Ok(())
    }
}
