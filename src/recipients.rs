use log::debug;
use mail_parser::{Addr, Address, MessageParser};

/// Who a reply goes to. `names[i]` is the display name for `emails[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet {
    pub emails: Vec<String>,
    pub names: Vec<String>,
}

impl RecipientSet {
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    fn push(&mut self, email: &str, name: Option<&str>) {
        let already_present = self.emails.iter().any(|e| e.eq_ignore_ascii_case(email));
        if already_present {
            return;
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(email);
        self.emails.push(email.to_string());
        self.names.push(name.to_string());
    }
}

/// Collects reply recipients from the From, To and Cc header values, in that
/// order, skipping any address on `reserved_domain`.
///
/// Unparseable fields contribute nothing.
pub fn extract_recipients(
    from: Option<&str>,
    to: Option<&str>,
    cc: Option<&str>,
    reserved_domain: &str,
) -> RecipientSet {
    let mut recipients = RecipientSet::default();

    let mut headers = String::new();
    for (header, value) in [("From", from), ("To", to), ("Cc", cc)] {
        if let Some(value) = value {
            // a folded value would let a sender inject extra headers
            let value = value.replace(['\r', '\n'], " ");
            headers.push_str(&format!("{}: {}\r\n", header, value));
        }
    }
    if headers.is_empty() {
        return recipients;
    }
    headers.push_str("\r\n");

    let Some(message) = MessageParser::default().parse(headers.as_bytes()) else {
        debug!("Address headers could not be parsed: {:?}", headers);
        return recipients;
    };

    let reserved = reserved_domain.to_lowercase();
    for field in [message.from(), message.to(), message.cc()] {
        for addr in addresses(field) {
            let Some(email) = addr.address().filter(|email| is_mailbox(email)) else {
                debug!("Skipping malformed address {:?}", addr.address());
                continue;
            };
            if email.to_lowercase().contains(&reserved) {
                debug!("Skipping reserved address {}", email);
                continue;
            }
            recipients.push(email, addr.name());
        }
    }

    recipients
}

/// `local@domain` with something on both sides and no stray header syntax.
fn is_mailbox(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let clean = |part: &str| {
        !part.is_empty()
            && !part.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | ',' | ';'))
    };
    clean(local) && clean(domain)
}

fn addresses<'a>(field: Option<&'a Address<'a>>) -> Vec<&'a Addr<'a>> {
    match field {
        None => Vec::new(),
        Some(Address::List(addrs)) => addrs.iter().collect(),
        Some(Address::Group(groups)) => groups
            .iter()
            .flat_map(|g| g.addresses.iter())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: &str = "mealbot.json.bz";

    #[test]
    fn named_sender_and_bot_recipient() {
        let set = extract_recipients(
            Some("Jane Doe <jane@x.com>"),
            Some("bot@mealbot.json.bz"),
            None,
            RESERVED,
        );
        assert_eq!(set.emails, vec!["jane@x.com"]);
        assert_eq!(set.names, vec!["Jane Doe"]);
    }

    #[test]
    fn bare_address_uses_itself_as_name() {
        let set = extract_recipients(Some("jane@x.com"), None, None, RESERVED);
        assert_eq!(set.emails, vec!["jane@x.com"]);
        assert_eq!(set.names, vec!["jane@x.com"]);
    }

    #[test]
    fn keeps_from_to_cc_order() {
        let set = extract_recipients(
            Some("Ann <ann@a.com>"),
            Some("Bob <bob@b.com>, noms@MEALBOT.json.bz, carl@c.com"),
            Some("Dee <dee@d.com>"),
            RESERVED,
        );
        assert_eq!(set.emails, vec!["ann@a.com", "bob@b.com", "carl@c.com", "dee@d.com"]);
        assert_eq!(set.names, vec!["Ann", "Bob", "carl@c.com", "Dee"]);
        assert_eq!(set.emails.len(), set.names.len());
    }

    #[test]
    fn reserved_domain_is_case_insensitive() {
        let set = extract_recipients(None, Some("Mealbot <Noms@MealBot.JSON.bz>"), None, RESERVED);
        assert!(set.is_empty());
    }

    #[test]
    fn repeated_addresses_are_collapsed() {
        let set = extract_recipients(
            Some("Ann <ann@a.com>"),
            Some("ANN@a.com"),
            Some("Ann Again <ann@a.com>"),
            RESERVED,
        );
        assert_eq!(set.emails, vec!["ann@a.com"]);
        assert_eq!(set.names, vec!["Ann"]);
    }

    #[test]
    fn malformed_field_yields_nothing() {
        let set = extract_recipients(
            Some("\"Doe, Jane\" <jane@x.com>"),
            Some("a@b.com, C <c@d.com>"),
            Some("garbage <<<"),
            RESERVED,
        );
        assert_eq!(set.emails, vec!["jane@x.com", "a@b.com", "c@d.com"]);
        assert_eq!(set.names, vec!["Doe, Jane", "a@b.com", "C"]);
    }

    #[test]
    fn mailbox_shape() {
        assert!(is_mailbox("jane@x.com"));
        assert!(!is_mailbox("<<"));
        assert!(!is_mailbox("@x.com"));
        assert!(!is_mailbox("jane@"));
        assert!(!is_mailbox("jane doe@x.com"));
    }

    #[test]
    fn absent_fields_yield_nothing() {
        assert!(extract_recipients(None, None, None, RESERVED).is_empty());
    }
}
