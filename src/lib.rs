pub mod config;
pub mod couch;
pub mod error;
pub mod fullcontact;
pub mod inbound;
pub mod intent;
pub mod logging;
pub mod oauth;
pub mod recipients;
pub mod render;
pub mod routes;
pub mod search;
pub mod sendgrid;
pub mod utils;
pub mod yelp;
