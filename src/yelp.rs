use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{credential, Config, YelpCredentials};
use crate::error::MealbotError;
use crate::oauth::{self, OAuthCredentials};
use crate::search::BusinessSearch;

const SEARCH_PATH: &str = "/v2/search";

/// A Yelp listing. The fields the reply shows are typed; everything else the
/// API returns is kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Business {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<BusinessLocation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BusinessLocation {
    #[serde(default)]
    pub display_address: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub businesses: Option<Vec<Business>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct YelpClient {
    http: Client,
    base_url: String,
    credentials: YelpCredentials,
}

impl YelpClient {
    pub fn new(http: &Client, config: &Config) -> Self {
        Self {
            http: http.clone(),
            base_url: config.endpoints.yelp.trim_end_matches('/').to_string(),
            credentials: config.yelp.clone(),
        }
    }

    fn oauth_credentials(&self) -> Result<OAuthCredentials<'_>, MealbotError> {
        Ok(OAuthCredentials {
            consumer_key: credential(&self.credentials.consumer_key, "YELP_CONSUMER_KEY")?,
            consumer_secret: credential(&self.credentials.consumer_secret, "YELP_CONSUMER_SECRET")?,
            token: credential(&self.credentials.token, "YELP_TOKEN")?,
            token_secret: credential(&self.credentials.token_secret, "YELP_TOKEN_SECRET")?,
        })
    }

    /// Searches for "<food> food" around "<city>, <state>".
    pub async fn search_places(&self, city: &str, state: &str, food: &str) -> Result<SearchResponse, MealbotError> {
        let credentials = self.oauth_credentials()?;
        let term = format!("{} food", food);
        let location = format!("{}, {}", city, state);
        info!("Searching Yelp for {:?} in {:?}", term, location);

        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let params = [("term", term.as_str()), ("location", location.as_str())];
        let authorization = oauth::authorization_header(&credentials, "GET", &url, &params);

        debug!("Sending request to Yelp API with params: {:?}", params);

        let response = self
            .http
            .get(&url)
            .query(&params)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

        if !status.is_success() || body.get("error").is_some() {
            let message = body["error"]["text"]
                .as_str()
                .or_else(|| body["error"]["description"].as_str())
                .map(String::from)
                .unwrap_or(text);
            warn!("got an error from yelp ({}): {}", status, message);
            return Err(MealbotError::Search { status: status.as_u16(), message });
        }

        let response: SearchResponse = serde_json::from_value(body).map_err(|e| MealbotError::Search {
            status: status.as_u16(),
            message: format!("unexpected response shape: {}", e),
        })?;
        debug!(
            "Yelp returned {} businesses",
            response.businesses.as_ref().map_or(0, Vec::len)
        );
        Ok(response)
    }
}

#[async_trait]
impl BusinessSearch for YelpClient {
    async fn search(&self, city: &str, state: &str, food: &str) -> Result<SearchResponse, MealbotError> {
        self.search_places(city, state, food).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use std::collections::HashMap;

    async fn search(req: HttpRequest) -> HttpResponse {
        let authorized = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map_or(false, |h| h.starts_with("OAuth ") && h.contains("oauth_token=\"tk\""));
        if !authorized {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": {"id": "INVALID_SIGNATURE", "text": "Signature was invalid"}
            }));
        }
        let query: HashMap<String, String> =
            url::form_urlencoded::parse(req.query_string().as_bytes()).into_owned().collect();
        match (query.get("term").map(String::as_str), query.get("location").map(String::as_str)) {
            (Some("sushi food"), Some("Boulder, Colorado")) => HttpResponse::Ok().json(serde_json::json!({
                "total": 1,
                "businesses": [{
                    "name": "Sushi Zanmai",
                    "url": "http://www.yelp.com/biz/sushi-zanmai-boulder",
                    "rating": 4.0,
                    "review_count": 380,
                    "is_closed": false,
                    "location": {"display_address": ["1221 Spruce St", "Boulder, CO 80302"], "city": "Boulder"}
                }]
            })),
            _ => HttpResponse::Ok().json(serde_json::json!({"total": 0, "businesses": []})),
        }
    }

    fn start_stub() -> String {
        let server = HttpServer::new(|| App::new().route(SEARCH_PATH, web::get().to(search)))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    fn client(base_url: String, token: &str) -> YelpClient {
        let mut config = Config::from_lookup(|_| None);
        config.endpoints.yelp = base_url;
        config.yelp = YelpCredentials {
            consumer_key: Some("ck".into()),
            consumer_secret: Some("cs".into()),
            token: Some(token.into()),
            token_secret: Some("ts".into()),
        };
        YelpClient::new(&Client::new(), &config)
    }

    #[actix_web::test]
    async fn returns_businesses_untouched() {
        let client = client(start_stub(), "tk");
        let response = client.search_places("Boulder", "Colorado", "sushi").await.unwrap();
        let businesses = response.businesses.unwrap();
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].name, "Sushi Zanmai");
        assert_eq!(businesses[0].review_count, Some(380));
        assert_eq!(businesses[0].extra.get("is_closed"), Some(&Value::Bool(false)));
        let location = businesses[0].location.as_ref().unwrap();
        assert_eq!(location.display_address[1], "Boulder, CO 80302");
        assert_eq!(location.extra.get("city"), Some(&Value::from("Boulder")));
    }

    #[actix_web::test]
    async fn no_matches_is_not_an_error() {
        let client = client(start_stub(), "tk");
        let response = client.search_places("Nowhere", "Nevada", "haggis").await.unwrap();
        assert_eq!(response.businesses.map(|b| b.len()), Some(0));
    }

    #[actix_web::test]
    async fn provider_error_is_propagated() {
        let client = client(start_stub(), "bad-token");
        let err = client.search_places("Boulder", "Colorado", "sushi").await.unwrap_err();
        match err {
            MealbotError::Search { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Signature was invalid");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[actix_web::test]
    async fn missing_credentials_are_reported() {
        let mut config = Config::from_lookup(|_| None);
        config.endpoints.yelp = "http://127.0.0.1:9".to_string();
        let client = YelpClient::new(&Client::new(), &config);
        let err = client.search_places("Boulder", "Colorado", "sushi").await.unwrap_err();
        assert!(matches!(err, MealbotError::MissingCredential("YELP_CONSUMER_KEY")));
    }
}
