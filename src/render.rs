use crate::utils::escape_html;
use crate::yelp::Business;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;color:#333;max-width:640px;margin:0 auto;padding:16px}\
.place{border-bottom:1px solid #eee;padding:12px 0;overflow:hidden}\
.place img{float:left;width:90px;height:90px;margin-right:12px;border-radius:4px}\
.place h2{font-size:18px;margin:0 0 4px}.meta{color:#777;font-size:13px}.note{color:#a60}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn place_html(place: &Business) -> String {
    let mut html = String::from("<div class=\"place\">\n");
    if let Some(image) = &place.image_url {
        html.push_str(&format!("<img src=\"{}\" alt=\"\">\n", escape_html(image)));
    }
    let name = escape_html(&place.name);
    match &place.url {
        Some(url) => html.push_str(&format!("<h2><a href=\"{}\">{}</a></h2>\n", escape_html(url), name)),
        None => html.push_str(&format!("<h2>{}</h2>\n", name)),
    }

    let mut meta = Vec::new();
    if let Some(rating) = place.rating {
        meta.push(format!("{:.1} stars", rating));
    }
    if let Some(reviews) = place.review_count {
        meta.push(format!("{} reviews", reviews));
    }
    if let Some(phone) = &place.display_phone {
        meta.push(escape_html(phone));
    }
    if !meta.is_empty() {
        html.push_str(&format!("<div class=\"meta\">{}</div>\n", meta.join(" &middot; ")));
    }
    if let Some(location) = &place.location {
        if !location.display_address.is_empty() {
            let lines: Vec<String> = location.display_address.iter().map(|l| escape_html(l)).collect();
            html.push_str(&format!("<div class=\"address\">{}</div>\n", lines.join("<br>")));
        }
    }
    if let Some(snippet) = &place.snippet_text {
        html.push_str(&format!("<p>{}</p>\n", escape_html(snippet)));
    }
    html.push_str("</div>\n");
    html
}

fn places_html(places: &[Business]) -> String {
    places.iter().map(place_html).collect()
}

/// The reply sent back to whoever emailed us.
pub fn email(places: Option<&[Business]>, default_query: bool) -> String {
    let mut body = String::from("<h1>Mealbot</h1>\n");
    if default_query {
        body.push_str(
            "<p class=\"note\">We couldn't tell what you were hungry for, so here is pizza in Denver. \
             Next time try something like <em>sushi in Boulder</em>.</p>\n",
        );
    }
    match places {
        Some(places) if !places.is_empty() => body.push_str(&places_html(places)),
        _ => body.push_str("<p class=\"empty\">Sorry, we couldn't find any places matching your request.</p>\n"),
    }
    page("Mealbot", &body)
}

pub fn index(title: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>Email us something like <em>sushi in Boulder</em> and we'll reply with places to eat.</p>\n",
        escape_html(title)
    );
    page(title, &body)
}

pub fn map(title: &str, places: Option<&[Business]>) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape_html(title));
    match places {
        Some(places) if !places.is_empty() => body.push_str(&places_html(places)),
        _ => body.push_str("<p class=\"empty\">No places found.</p>\n"),
    }
    page(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yelp::BusinessLocation;

    fn sample() -> Business {
        Business {
            name: "Pete's <Pizza>".to_string(),
            url: Some("http://www.yelp.com/biz/petes".to_string()),
            rating: Some(4.5),
            review_count: Some(12),
            location: Some(BusinessLocation {
                display_address: vec!["1 Main St".to_string(), "Denver, CO".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn email_lists_places() {
        let places = vec![sample()];
        let html = email(Some(places.as_slice()), false);
        assert!(html.contains("Pete&#39;s &lt;Pizza&gt;"));
        assert!(html.contains("href=\"http://www.yelp.com/biz/petes\""));
        assert!(html.contains("4.5 stars"));
        assert!(html.contains("1 Main St<br>Denver, CO"));
        assert!(!html.contains("class=\"note\""));
        assert!(!html.contains("class=\"empty\""));
    }

    #[test]
    fn email_empty_state() {
        let html = email(None, false);
        assert!(html.contains("class=\"empty\""));
        assert_eq!(email(Some(Vec::new().as_slice()), false), html);
    }

    #[test]
    fn email_mentions_default_query() {
        let places = vec![sample()];
        let html = email(Some(places.as_slice()), true);
        assert!(html.contains("class=\"note\""));
    }

    #[test]
    fn index_has_title() {
        let html = index("Welcome to Mealbot!");
        assert!(html.contains("<title>Welcome to Mealbot!</title>"));
    }
}
