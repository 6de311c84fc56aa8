//api_version_v2

use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::{
    error::{Error, ProviderError, Result},
    transport::HttpRequest,
};

mod translate;
mod usage;

pub use translate::{TranslateResult, Translation};
pub use usage::AccountStatus;

pub(crate) const TRANSLATE_PATH: [&str; 2] = ["v2", "translate"];
pub(crate) const USAGE_PATH: [&str; 2] = ["v2", "usage"];

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    pub message: String,
}

/// Check that `raw` can serve as a base for the endpoint paths
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("Failed to parse URL: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::config(format!(
            "Unsupported URL scheme {}",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{raw} cannot be used as a base URL")));
    }

    Ok(url)
}

/// Builds `<base path>/<segments>?<params>`, keeping whatever query the base url had.
///
/// `params` are appended in the order given.
pub(crate) fn build_request(
    base: &Url,
    segments: &[&str],
    params: &[(&str, &str)],
    user_agent: &str,
) -> Result<HttpRequest> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| Error::config(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(HttpRequest {
        url,
        headers: vec![("User-Agent".to_string(), user_agent.to_string())],
    })
}

fn decode_body<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| Error::Decode { context, source })
}

/// Turn a status and body into the expected type or the matching error
pub(crate) fn classify_response<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
    context: &'static str,
) -> Result<T> {
    //error body first, so a garbled one is reported instead of the status
    let mut message = String::new();
    if status != 200 && !body.is_empty() {
        let err: ErrorResponse = decode_body(body, "error response")?;
        message = err.message;
    }

    match status {
        200 => decode_body(body, context),
        s => Err(ProviderError::from_status(s, message).into()),
    }
}

#[test]
fn test_parse_base_url() {
    assert!(parse_base_url("https://api-free.deepl.com").is_ok());
    assert!(parse_base_url("http://127.0.0.1:8080/proxy/").is_ok());

    for bad in ["not a url", "", "mailto:someone@example.com", "ftp://example.com"] {
        assert!(
            matches!(parse_base_url(bad), Err(Error::Config(_))),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_build_request_sets_path_query_and_agent() {
    let base = parse_base_url("https://api-free.deepl.com").unwrap();
    let req = build_request(
        &base,
        &TRANSLATE_PATH,
        &[
            ("auth_key", "k"),
            ("source_lang", "EN"),
            ("target_lang", "JA"),
            ("text", "hello world"),
        ],
        "agent/1",
    )
    .unwrap();

    assert_eq!(req.url.path(), "/v2/translate");
    assert_eq!(
        req.url.query(),
        Some("auth_key=k&source_lang=EN&target_lang=JA&text=hello+world")
    );
    assert_eq!(
        req.headers,
        vec![("User-Agent".to_string(), "agent/1".to_string())]
    );
}

#[test]
fn test_build_request_keeps_base_path() {
    for raw in ["http://localhost/proxy", "http://localhost/proxy/"] {
        let base = parse_base_url(raw).unwrap();
        let req = build_request(&base, &USAGE_PATH, &[("auth_key", "k")], "a").unwrap();
        assert_eq!(req.url.path(), "/proxy/v2/usage");
    }
}

#[test]
fn test_build_request_does_not_touch_base() {
    let base = parse_base_url("http://localhost/").unwrap();
    build_request(&base, &USAGE_PATH, &[("auth_key", "k")], "a").unwrap();
    assert_eq!(base.as_str(), "http://localhost/");
}

#[test]
fn test_classify_status_table() {
    let body = br#"{"message":"boom"}"#;
    let cases = [
        (400, ProviderError::BadRequest { message: "boom".into() }),
        (403, ProviderError::AuthorizationFailed),
        (404, ProviderError::NotFound),
        (413, ProviderError::RequestTooLarge),
        (429, ProviderError::TooManyRequests),
        (456, ProviderError::QuotaExceeded),
        (503, ProviderError::Unavailable),
        (500, ProviderError::Internal { status: 500 }),
        (504, ProviderError::Internal { status: 504 }),
        (418, ProviderError::Unexpected { status: 418 }),
        (201, ProviderError::Unexpected { status: 201 }),
    ];

    for (status, expected) in cases {
        match classify_response::<AccountStatus>(status, body, "usage") {
            Err(Error::Provider(err)) => assert_eq!(err, expected, "status {status}"),
            other => panic!("status {status}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_classify_empty_error_body() {
    match classify_response::<AccountStatus>(400, b"", "usage") {
        Err(Error::Provider(ProviderError::BadRequest { message })) => assert!(message.is_empty()),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_classify_garbled_error_body_is_decode_error() {
    let res = classify_response::<AccountStatus>(403, b"<html>Forbidden</html>", "usage");
    assert!(matches!(
        res,
        Err(Error::Decode {
            context: "error response",
            ..
        })
    ));
}

#[test]
fn test_classify_garbled_success_body_is_decode_error() {
    let res = classify_response::<AccountStatus>(200, b"{\"character_count\":", "usage");
    assert!(matches!(res, Err(Error::Decode { context: "usage", .. })));

    let res = classify_response::<AccountStatus>(200, b"", "usage");
    assert!(matches!(res, Err(Error::Decode { .. })));
}
