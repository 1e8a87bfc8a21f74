use url::Url;
use validator::{Validate, ValidateEmail};

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn parse_web_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("malformed URL {:?}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(format!("URL {:?} must be an absolute http(s) link", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_github_and_https_links() {
        assert!(parse_web_url("https://github.com/alice/task").is_ok());
        assert!(parse_web_url("http://demo.example.com").is_ok());
    }

    #[test]
    fn rejects_relative_and_non_web_links() {
        assert!(parse_web_url("github.com/alice").is_err());
        assert!(parse_web_url("ftp://files.example.com/x").is_err());
        assert!(parse_web_url("mailto:alice@example.com").is_err());
        assert!(parse_web_url("").is_err());
    }

    #[test]
    fn email_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("not-an-email"));
    }
}
