//! Typed QR content and its wire formats.
//!
//! Each content kind formats to the exact payload string QR readers expect
//! (`WIFI:`, `mailto:`, `tel:`, `sms:`, vCard 3.0). Formatting is pure and
//! never fails: when a kind's mandatory field is empty the payload is `""`
//! and callers treat that as "nothing to encode".
//!
//! The inverse direction, [`analyze`], classifies a decoded payload back
//! into a kind with parsed details. It backs `scan --analyze`.

use serde::Serialize;
use serde_json::{Map, Value};

/// URL schemes that suppress the `https://` prefix.
const KNOWN_SCHEMES: [&str; 4] = ["http://", "https://", "ftp://", "ftps://"];

/// WiFi authentication type as encoded in the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    Open,
}

impl WifiSecurity {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "",
        }
    }

    /// Case-insensitive parse; anything unrecognized means an open network.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "WPA" | "WPA2" | "WPA/WPA2" => WifiSecurity::Wpa,
            "WEP" => WifiSecurity::Wep,
            _ => WifiSecurity::Open,
        }
    }
}

/// A structured piece of content to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text {
        text: String,
    },
    Url {
        url: String,
    },
    Wifi {
        ssid: String,
        password: String,
        security: WifiSecurity,
        hidden: bool,
    },
    VCard {
        name: String,
        org: String,
        phone: String,
        email: String,
        url: String,
    },
    Email {
        to: String,
        subject: String,
        body: String,
    },
    Phone {
        number: String,
    },
    Sms {
        number: String,
        body: String,
    },
}

/// Prepend `https://` when the URL carries none of the known schemes.
/// Idempotent: already-schemed URLs pass through unchanged.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if KNOWN_SCHEMES.iter().any(|s| url.starts_with(s)) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

impl Content {
    /// Format to the payload string. Returns `""` when the kind's mandatory
    /// field is empty after trimming.
    pub fn payload(&self) -> String {
        match self {
            Content::Text { text } => text.trim().to_string(),
            Content::Url { url } => normalize_url(url),
            Content::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => {
                let ssid = ssid.trim();
                if ssid.is_empty() {
                    return String::new();
                }
                let hidden = if *hidden { "true" } else { "false" };
                format!(
                    "WIFI:T:{};S:{};P:{};H:{};",
                    security.as_str(),
                    ssid,
                    password.trim(),
                    hidden
                )
            }
            Content::VCard {
                name,
                org,
                phone,
                email,
                url,
            } => {
                let name = name.trim();
                if name.is_empty() {
                    return String::new();
                }
                let mut card = format!("BEGIN:VCARD\nVERSION:3.0\nFN:{name}\n");
                // Optional lines keep a fixed order for reader compatibility.
                for (tag, value) in [
                    ("ORG", org.trim()),
                    ("TEL", phone.trim()),
                    ("EMAIL", email.trim()),
                    ("URL", url.trim()),
                ] {
                    if !value.is_empty() {
                        card.push_str(&format!("{tag}:{value}\n"));
                    }
                }
                card.push_str("END:VCARD");
                card
            }
            Content::Email { to, subject, body } => {
                let to = to.trim();
                if to.is_empty() {
                    return String::new();
                }
                let mut out = format!("mailto:{to}");
                let mut params = Vec::new();
                if !subject.trim().is_empty() {
                    params.push(format!("subject={}", urlencoding::encode(subject.trim())));
                }
                if !body.trim().is_empty() {
                    params.push(format!("body={}", urlencoding::encode(body.trim())));
                }
                if !params.is_empty() {
                    out.push('?');
                    out.push_str(&params.join("&"));
                }
                out
            }
            Content::Phone { number } => {
                let number = number.trim();
                if number.is_empty() {
                    String::new()
                } else {
                    format!("tel:{number}")
                }
            }
            Content::Sms { number, body } => {
                let number = number.trim();
                if number.is_empty() {
                    return String::new();
                }
                let mut out = format!("sms:{number}");
                if !body.trim().is_empty() {
                    out.push_str(&format!("?body={}", urlencoding::encode(body.trim())));
                }
                out
            }
        }
    }
}

/// Classification of a decoded payload.
#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalysis {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Value,
}

/// Classify a decoded payload by its leading marker and pull out the fields
/// a reader would care about. Anything unrecognized is plain text.
pub fn analyze(content: &str) -> ContentAnalysis {
    let mut details = Map::new();
    let kind;

    if content.starts_with("http://") || content.starts_with("https://") {
        kind = "url";
        details.insert("secure".into(), Value::Bool(content.starts_with("https://")));
        if let Some(rest) = content.splitn(2, "://").nth(1) {
            let (host, path) = match rest.find('/') {
                Some(i) => (&rest[..i], &rest[i..]),
                None => (rest, ""),
            };
            details.insert("domain".into(), Value::String(host.to_string()));
            details.insert("path".into(), Value::String(path.to_string()));
        }
    } else if let Some(rest) = content.strip_prefix("mailto:") {
        kind = "email";
        let email = rest.split('?').next().unwrap_or("");
        details.insert("email".into(), Value::String(email.to_string()));
    } else if let Some(rest) = content.strip_prefix("WIFI:") {
        kind = "wifi";
        for part in rest.split(';') {
            if let Some((key, value)) = part.split_once(':') {
                match key {
                    "S" => {
                        details.insert("ssid".into(), Value::String(value.to_string()));
                    }
                    "T" => {
                        details.insert("security".into(), Value::String(value.to_string()));
                    }
                    "P" => {
                        details.insert("password".into(), Value::String(value.to_string()));
                    }
                    "H" => {
                        details.insert("hidden".into(), Value::Bool(value.eq_ignore_ascii_case("true")));
                    }
                    _ => {}
                }
            }
        }
    } else if content.starts_with("BEGIN:VCARD") {
        kind = "vcard";
        for line in content.lines() {
            for (tag, field) in [
                ("FN:", "name"),
                ("ORG:", "organization"),
                ("TEL:", "phone"),
                ("EMAIL:", "email"),
            ] {
                if let Some(value) = line.strip_prefix(tag) {
                    details.insert(field.into(), Value::String(value.to_string()));
                }
            }
        }
    } else if let Some(rest) = content.strip_prefix("tel:") {
        kind = "phone";
        details.insert("number".into(), Value::String(rest.to_string()));
    } else if let Some(rest) = content.strip_prefix("sms:") {
        kind = "sms";
        let mut parts = rest.splitn(2, '?');
        let number = parts.next().unwrap_or("");
        details.insert("number".into(), Value::String(number.to_string()));
        if let Some(query) = parts.next() {
            if let Some(body) = query.strip_prefix("body=") {
                let decoded = urlencoding::decode(body)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| body.to_string());
                details.insert("message".into(), Value::String(decoded));
            }
        }
    } else {
        kind = "text";
    }

    ContentAnalysis {
        content: content.to_string(),
        kind: kind.to_string(),
        details: Value::Object(details),
    }
}
