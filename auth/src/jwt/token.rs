/// Presented session token, classified by shape before any decoding.
///
/// Current-format tokens are compact JWTs (three dot-separated segments);
/// legacy tokens are a single base64url blob with no dot. Anything else is
/// rejected without being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionToken<'a> {
    Modern(&'a str),
    Legacy(&'a str),
}

impl<'a> SessionToken<'a> {
    pub fn classify(raw: &'a str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        match raw.bytes().filter(|b| *b == b'.').count() {
            2 => Some(SessionToken::Modern(raw)),
            0 => Some(SessionToken::Legacy(raw)),
            _ => None,
        }
    }
}
