use http::header::AUTHORIZATION;
use http::header::COOKIE;
use http::HeaderMap;

/// Cookie holding a current-format token.
pub const PRIMARY_COOKIE: &str = "session";

/// Cookie holding a token in the legacy envelope format.
pub const LEGACY_COOKIE: &str = "legacy_session";

/// Where a credential travels on a request, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Carrier {
    Bearer,
    PrimaryCookie,
    LegacyCookie,
}

impl Carrier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Bearer => "bearer",
            Carrier::PrimaryCookie => "primary_cookie",
            Carrier::LegacyCookie => "legacy_cookie",
        }
    }
}

/// The highest-priority carrier found on a request and its raw value.
///
/// `value` is untrusted and may be empty when the carrier is present but
/// unreadable; that still counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presented<'a> {
    pub carrier: Carrier,
    pub value: &'a str,
}

/// Find the first carrier present on the request.
///
/// Only absence moves the search to the next carrier.
pub fn find(headers: &HeaderMap) -> Option<Presented<'_>> {
    if let Some(value) = bearer_value(headers) {
        return Some(Presented {
            carrier: Carrier::Bearer,
            value,
        });
    }

    if let Some(value) = cookie_value(headers, PRIMARY_COOKIE) {
        return Some(Presented {
            carrier: Carrier::PrimaryCookie,
            value,
        });
    }

    cookie_value(headers, LEGACY_COOKIE).map(|value| Presented {
        carrier: Carrier::LegacyCookie,
        value,
    })
}

/// Bearer credential from the `Authorization` header.
///
/// Headers using another scheme are not a bearer carrier. A `Bearer` header
/// that is not valid text or has no token is present but empty.
fn bearer_value(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?;
    let Ok(value) = header.to_str() else {
        let raw = header.as_bytes();
        return (raw.len() >= 7 && raw[..7].eq_ignore_ascii_case(b"bearer ")).then_some("");
    };

    let trimmed = value.trim();
    let (scheme, token) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

/// Value of the named cookie across every `Cookie` header.
///
/// Headers are split bytewise so an unrelated non-UTF-8 cookie cannot hide
/// the one asked for. A matching cookie whose value is not UTF-8 is present
/// but empty.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|header| header.as_bytes().split(|b| *b == b';'))
        .find_map(|pair| {
            let eq = pair.iter().position(|b| *b == b'=')?;
            let (key, value) = (&pair[..eq], &pair[eq + 1..]);
            (trim_bytes(key) == name.as_bytes())
                .then(|| std::str::from_utf8(trim_bytes(value)).unwrap_or(""))
        })
}

fn trim_bytes(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
