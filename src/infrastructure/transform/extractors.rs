//! Value extraction functions

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::{Match, Regex};

use crate::domain::{AnchorParams, DomainError, OrderedBullets};

static DATETIMETZ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{3},\s\d{1,2}\s[A-Za-z]{3}\s\d{4}\s\d{2}:\d{2}:\d{2}\s[+-]\d{4}").unwrap()
});
static EMAIL_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9.\-+_]+@[a-z0-9.\-+_]+\.[a-z]+").unwrap());
static IP_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\b|[a-z0-9]{4}::[a-z0-9]{4}:[a-z0-9]{4}:[a-z0-9]{4}:[a-z0-9]{4}%?[0-9]*",
    )
    .unwrap()
});
static IP_ADDRESS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9-]*\.[a-zA-Z]*\.[a-zA-Z]*").unwrap());
static MAPI_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]*\.[0-9]*\.[0-9]*\.[0-9]*;").unwrap());
static US_PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?(\d{1,3}))?[-. (]*(\d{3})?[-. )]*(\d{3})[-. ]*(\d{4})(?: *x(\d+))?\s*$")
        .unwrap()
});

const DATETIMETZ_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Extract the first mail-header style timestamp, e.g.
/// `Mon, 3 Jul 2023 10:15:00 -0400`
pub fn extract_datetimetz(text: &str) -> Result<Option<DateTime<FixedOffset>>, DomainError> {
    let Some(found) = DATETIMETZ.find(text) else {
        return Ok(None);
    };

    DateTime::parse_from_str(found.as_str(), DATETIMETZ_FORMAT)
        .map(Some)
        .map_err(|e| {
            DomainError::validation(format!("Invalid timestamp '{}': {}", found.as_str(), e))
        })
}

/// Extract every email address (lowercased)
pub fn extract_email_address(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    EMAIL_ADDRESS
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract every IPv4 and IPv6 address
pub fn extract_ip_address(text: &str) -> Vec<String> {
    IP_ADDRESS
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract host names written next to IP addresses (`mx.example.com`)
pub fn extract_ip_address_name(text: &str) -> Vec<String> {
    IP_ADDRESS_NAME
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|name| name.chars().any(char::is_alphabetic))
        .map(str::to_string)
        .collect()
}

/// Extract MAPI identifiers (`32.88.5467.123;`), without the trailing `;`
pub fn extract_mapi_id(text: &str) -> Vec<String> {
    MAPI_ID
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(';'))
        .filter(|id| id.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Split a leading ordered bullet (`1.2.a`) into its section markers
pub fn extract_ordered_bullets(text: &str) -> OrderedBullets {
    let Some(first) = text.split_whitespace().next() else {
        return OrderedBullets::default();
    };

    if !first.contains('.') || first.contains("..") {
        return OrderedBullets::default();
    }

    let mut parts = first
        .split('.')
        .map(|part| Some(part.to_string()).filter(|part| !part.is_empty()));

    let section = parts.next().flatten();
    if section.is_none() {
        return OrderedBullets::default();
    }

    OrderedBullets {
        section,
        sub_section: parts.next().flatten(),
        sub_sub_section: parts.next().flatten(),
    }
}

fn indexed_match<'t>(text: &'t str, params: &AnchorParams) -> Result<Match<'t>, DomainError> {
    let regex = Regex::new(&params.pattern).map_err(|e| {
        DomainError::validation(format!("Invalid pattern '{}': {}", params.pattern, e))
    })?;

    let matches: Vec<Match<'t>> = regex.find_iter(text).collect();

    matches.get(params.index).copied().ok_or_else(|| {
        DomainError::validation(match matches.len() {
            0 => format!("Pattern '{}' was not found in the text", params.pattern),
            n => format!(
                "Result with index {} was not found. The largest index was {}",
                params.index,
                n - 1
            ),
        })
    })
}

/// Text following the `index`-th match of the pattern
pub fn extract_text_after(text: &str, params: &AnchorParams) -> Result<String, DomainError> {
    let anchor = indexed_match(text, params)?;
    let after = &text[anchor.end()..];

    Ok(if params.strip {
        after.trim_start().to_string()
    } else {
        after.to_string()
    })
}

/// Text preceding the `index`-th match of the pattern
pub fn extract_text_before(text: &str, params: &AnchorParams) -> Result<String, DomainError> {
    let anchor = indexed_match(text, params)?;
    let before = &text[..anchor.start()];

    Ok(if params.strip {
        before.trim_end().to_string()
    } else {
        before.to_string()
    })
}

/// A US phone number at the end of the text, or an empty string
pub fn extract_us_phone_number(text: &str) -> String {
    US_PHONE_NUMBER
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_extract_datetimetz() {
        let text = "from ABC.DEF.local ([ba23::58b5:2236:45g2:88h2]) by \n ABC.DEF.local2 \
                    with id 12.4.0.5; Fri, 26 Mar 2021 11:04:09 +1200";

        let datetime = extract_datetimetz(text).unwrap().unwrap();

        assert_eq!(datetime.year(), 2021);
        assert_eq!(datetime.day(), 26);
        assert_eq!(datetime.hour(), 11);
        assert_eq!(datetime.offset().local_minus_utc(), 12 * 3600);
        assert!(extract_datetimetz("no date here").unwrap().is_none());
    }

    #[test]
    fn test_extract_email_address() {
        let text = "Contact Jane.Doe@Example.com or ops+alerts@mail.example.org today";
        assert_eq!(
            extract_email_address(text),
            vec!["jane.doe@example.com", "ops+alerts@mail.example.org"]
        );
    }

    #[test]
    fn test_extract_ip_address() {
        let text = "from 10.0.2.15 by mx (fe80::5a14:8c23:17b3:9df0%11) and 192.168.1.1";
        assert_eq!(
            extract_ip_address(text),
            vec!["10.0.2.15", "fe80::5a14:8c23:17b3:9df0%11", "192.168.1.1"]
        );
    }

    #[test]
    fn test_extract_ip_address_name() {
        let text = "from ABC.DEF.local ([10.0.2.15]) by mx.example.com";
        assert_eq!(
            extract_ip_address_name(text),
            vec!["ABC.DEF.local", "mx.example.com"]
        );
    }

    #[test]
    fn test_extract_mapi_id() {
        assert_eq!(extract_mapi_id("with mapi id 32.88.5467.123; Fri"), vec!["32.88.5467.123"]);
        assert!(extract_mapi_id("nothing;").is_empty());
    }

    #[test]
    fn test_extract_ordered_bullets() {
        assert_eq!(
            extract_ordered_bullets("1.2.a Some text"),
            OrderedBullets {
                section: Some("1".to_string()),
                sub_section: Some("2".to_string()),
                sub_sub_section: Some("a".to_string()),
            }
        );
        assert_eq!(
            extract_ordered_bullets("5. Point"),
            OrderedBullets {
                section: Some("5".to_string()),
                sub_section: None,
                sub_sub_section: None,
            }
        );
        assert_eq!(extract_ordered_bullets("No bullet"), OrderedBullets::default());
        assert_eq!(extract_ordered_bullets("1..2 text"), OrderedBullets::default());
    }

    #[test]
    fn test_extract_text_after_and_before() {
        let text = "SPEAKER 1: Look at me, I'm flying! SPEAKER 2: Nice.";

        let after = extract_text_after(text, &AnchorParams::new(r"SPEAKER \d{1}:")).unwrap();
        assert_eq!(after, "Look at me, I'm flying! SPEAKER 2: Nice.");

        let anchor = AnchorParams::new(r"SPEAKER \d{1}:").with_index(1);
        let second = extract_text_after(text, &anchor).unwrap();
        assert_eq!(second, "Nice.");

        let before = extract_text_before(text, &AnchorParams::new("SPEAKER 2")).unwrap();
        assert_eq!(before, "SPEAKER 1: Look at me, I'm flying!");
    }

    #[test]
    fn test_extract_text_after_index_out_of_range() {
        let err = extract_text_after("a: b", &AnchorParams::new(":").with_index(3)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(err.to_string().contains("largest index was 0"));
    }

    #[test]
    fn test_extract_us_phone_number() {
        assert_eq!(extract_us_phone_number("Call me at 1-555-123-4567"), "1-555-123-4567");
        assert_eq!(extract_us_phone_number("Office: (555) 123-4567 x89"), "(555) 123-4567 x89");
        assert_eq!(extract_us_phone_number("no phone"), "");
    }
}
