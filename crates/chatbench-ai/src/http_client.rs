use reqwest::{Client, Response};

use crate::error::AiError;

const DISABLE_SYSTEM_PROXY_ENV: &str = "CHATBENCH_DISABLE_SYSTEM_PROXY";

/// Truncate error bodies so large or sensitive responses aren't echoed back.
pub const MAX_ERROR_BODY: usize = 512;

pub fn build_http_client() -> Client {
    if should_disable_system_proxy() {
        Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new())
    } else {
        Client::new()
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}

/// Cut `body` down to at most `MAX_ERROR_BODY` bytes on a char boundary.
pub fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &body[..end])
}

pub async fn response_to_error(response: Response, provider: &str) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    AiError::LlmHttp {
        provider: provider.to_string(),
        status,
        message: truncate_body(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(truncate_body("oops".to_string()), "oops");
    }

    #[test]
    fn test_long_body_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let truncated = truncate_body(body);
        assert!(truncated.ends_with("... [truncated]"));
        assert!(truncated.len() <= MAX_ERROR_BODY + "... [truncated]".len());
    }
}
