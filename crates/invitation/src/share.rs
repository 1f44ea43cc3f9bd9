//! WhatsApp deep links for guest greetings.
//!
//! After a guest signs the guestbook, the page opens WhatsApp with the
//! greeting prefilled, addressed to the couple's number.

use thiserror::Error;
use url::{form_urlencoded, Url};

const WHATSAPP_BASE: &str = "https://wa.me/";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("phone number {0:?} contains no digits")]
    EmptyPhone(String),

    #[error("invalid share link: {0}")]
    Url(#[from] url::ParseError),
}

/// The greeting text a guest sends to the couple.
pub fn compose_greeting(groom: &str, bride: &str, name: &str, message: &str) -> String {
    format!(
        "Halo {groom} & {bride}! Saya {name}.\n\n\"{message}\"\n\nSelamat menempuh perjalanan baru! 🏔️✨"
    )
}

/// `https://wa.me/<digits>?text=<percent-encoded text>`.
///
/// Separators and a leading `+` in `phone` are dropped. Spaces are encoded
/// as `%20`, not `+`, so the text survives clients that skip form decoding.
pub fn whatsapp_link(phone: &str, text: &str) -> Result<Url, ShareError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ShareError::EmptyPhone(phone.to_string()));
    }

    let mut url = Url::parse(WHATSAPP_BASE)?.join(&digits)?;

    // byte_serialize writes a literal '+' as %2B, so every '+' left is a space
    let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
    url.set_query(Some(&format!("text={}", encoded.replace('+', "%20"))));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_greeting() {
        let text = compose_greeting("Yamin", "Anisa", "Budi", "Selamat ya!");
        assert!(text.starts_with("Halo Yamin & Anisa! Saya Budi.\n\n\"Selamat ya!\""));
        assert!(text.contains("Selamat menempuh perjalanan baru!"));
    }

    #[test]
    fn test_link_encoding() {
        let url = whatsapp_link("6285156684814", "Halo A & B!\n1+1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://wa.me/6285156684814?text=Halo%20A%20%26%20B%21%0A1%2B1"
        );
    }

    #[test]
    fn test_link_decodes_back() {
        let text = compose_greeting("Yamin", "Anisa", "Sari", "Barakallah 🤲");
        let url = whatsapp_link("6285156684814", &text).unwrap();

        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "text");
        assert_eq!(value, text);
    }

    #[test]
    fn test_phone_normalized() {
        let url = whatsapp_link("+62 851-5668-4814", "hi").unwrap();
        assert_eq!(url.path(), "/6285156684814");
    }

    #[test]
    fn test_phone_without_digits() {
        assert!(matches!(
            whatsapp_link("call me", "hi"),
            Err(ShareError::EmptyPhone(_))
        ));
    }
}
