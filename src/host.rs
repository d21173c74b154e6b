/// Recognizing the host messaging site and reading thread IDs off its URLs
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static THREAD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/t/(\d+)").expect("thread path pattern is valid"));

/// Whether a tab URL points at a Messenger conversation page.
///
/// Matches:
/// - messenger.com and www.messenger.com, any path
/// - facebook.com and www.facebook.com under `/messages`
///
/// Anything that does not parse as a URL never matches.
pub fn is_messenger_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    match host {
        "messenger.com" | "www.messenger.com" => true,
        "facebook.com" | "www.facebook.com" => parsed.path().starts_with("/messages"),
        _ => false,
    }
}

/// Extract the numeric thread ID from a URL path such as `/t/123456/`
pub fn thread_id_from_path(path: &str) -> Option<String> {
    THREAD_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messenger_hosts() {
        assert!(is_messenger_url("https://www.messenger.com/t/123"));
        assert!(is_messenger_url("https://messenger.com/"));
        assert!(is_messenger_url("https://www.messenger.com"));
    }

    #[test]
    fn test_facebook_requires_messages_path() {
        assert!(is_messenger_url("https://www.facebook.com/messages/t/123"));
        assert!(is_messenger_url("https://facebook.com/messages"));
        assert!(!is_messenger_url("https://www.facebook.com/"));
        assert!(!is_messenger_url("https://www.facebook.com/groups/messages"));
    }

    #[test]
    fn test_other_hosts_rejected() {
        assert!(!is_messenger_url("https://messenger.com.evil.example/t/1"));
        assert!(!is_messenger_url("https://m.facebook.com/messages"));
        assert!(!is_messenger_url("https://google.com/messages"));
    }

    #[test]
    fn test_unparseable_urls_rejected() {
        assert!(!is_messenger_url(""));
        assert!(!is_messenger_url("messenger.com"));
        assert!(!is_messenger_url("chrome://extensions"));
    }

    #[test]
    fn test_thread_id_from_path() {
        assert_eq!(thread_id_from_path("/t/100012345678/"), Some("100012345678".to_string()));
        assert_eq!(thread_id_from_path("/messages/t/42"), Some("42".to_string()));
    }

    #[test]
    fn test_thread_id_missing() {
        assert_eq!(thread_id_from_path("/"), None);
        assert_eq!(thread_id_from_path("/t/"), None);
        assert_eq!(thread_id_from_path("/t/abc"), None);
    }
}
