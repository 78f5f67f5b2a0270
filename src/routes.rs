use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info, warn};
use reqwest::Client;

use crate::config::Config;
use crate::couch::AuditLogger;
use crate::error::MealbotError;
use crate::fullcontact::FullContactClient;
use crate::inbound::{self, InboundMessage};
use crate::intent::parse_intent;
use crate::recipients::extract_recipients;
use crate::render;
use crate::search::SearchOrchestrator;
use crate::sendgrid::SendgridClient;
use crate::utils;
use crate::yelp::YelpClient;

const MAP_LOCATION: &str = "Denver, Colorado";
const MAP_FOOD: &str = "chinese";
// inbound-parse posts carry whole message bodies
const MAX_PAYLOAD: usize = 10 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_PAYLOAD))
        .route("/", web::get().to(home))
        .route("/health", web::get().to(health_check))
        .route("/map", web::get().to(map))
        .route("/email", web::post().to(email_webhook));
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "message": "Server is running"
    }))
}

async fn home() -> impl Responder {
    html(render::index("Welcome to Mealbot!"))
}

async fn map(
    config: web::Data<Config>,
    client: web::Data<Client>,
) -> Result<HttpResponse, MealbotError> {
    let enricher = FullContactClient::new(&client, &config);
    let yelp = YelpClient::new(&client, &config);
    let places = SearchOrchestrator::new(&enricher, &yelp)
        .search_places_in(MAP_LOCATION, MAP_FOOD)
        .await
        .into_places()?;
    Ok(html(render::map("Mealbot Suggestions", places.as_deref())))
}

/// Inbound-parse webhook: answers one email with restaurant suggestions.
async fn email_webhook(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<Config>,
    client: web::Data<Client>,
) -> Result<HttpResponse, MealbotError> {
    let request_id = utils::request_id();
    info!("Request {}: inbound email received", request_id);

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let payload = inbound::parse_payload(content_type, body)
        .await
        .inspect_err(|e| error!("Request {}: {}", request_id, e))?;

    // never awaited; a failed audit write must not hold up the reply
    AuditLogger::new(&client, &config).spawn(payload.clone());

    let message = InboundMessage::from_payload(&payload)
        .inspect_err(|e| error!("Request {}: {}", request_id, e))?;

    let recipients = extract_recipients(
        message.from.as_deref(),
        message.to.as_deref(),
        message.cc.as_deref(),
        config.reserved_domain(),
    );
    let params = parse_intent(&message.text);
    info!("Request {}: params {:?}", request_id, params);
    debug!("Request {}: recipients {:?}", request_id, recipients);

    let enricher = FullContactClient::new(&client, &config);
    let yelp = YelpClient::new(&client, &config);
    let places = SearchOrchestrator::new(&enricher, &yelp)
        .search_places(&params)
        .await
        .into_places()
        .inspect_err(|e| error!("Request {}: search failed: {}", request_id, e))?;

    let page = render::email(places.as_deref(), params.default_query);

    if recipients.is_empty() {
        warn!("Request {}: nobody to reply to, skipping send", request_id);
        return Ok(html(page));
    }

    SendgridClient::new(&client, &config)
        .reply(&message.subject, &recipients, &page)
        .await
        .inspect_err(|e| error!("Request {}: reply failed: {}", request_id, e))?;

    info!("Request {}: replied to {} recipients", request_id, recipients.len());
    Ok(html(page))
}
