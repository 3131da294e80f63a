use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Parsed submission body plus the response flavour the caller expects.
///
/// Deliberately not `Debug`: the raw password passes through here.
pub struct SubmitRequest {
    pub username: String,
    pub password: String,
    pub respond_json: bool,
}

#[derive(Deserialize)]
struct SubmitBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl SubmitRequest {
    /// Decode an urlencoded form post or a JSON body, keyed off the request
    /// content type. Missing fields decode to empty strings and are left for
    /// the pipeline's validation gate.
    pub fn from_body(headers: &HeaderMap, body: &str) -> Result<Self, String> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let respond_json = content_type.starts_with("application/json");
        let parsed: SubmitBody = if respond_json {
            serde_json::from_str(body).map_err(|err| format!("invalid json body: {err}"))?
        } else {
            serde_urlencoded::from_str(body).map_err(|err| format!("invalid form body: {err}"))?
        };
        Ok(Self {
            username: parsed.username,
            password: parsed.password,
            respond_json,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResponse {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).unwrap(),
        );
        map
    }

    #[test]
    fn decodes_urlencoded_forms() {
        let request = SubmitRequest::from_body(
            &headers("application/x-www-form-urlencoded"),
            "username=alice&password=p%40ss",
        )
        .expect("form");
        assert_eq!(request.username, "alice");
        assert_eq!(request.password, "p@ss");
        assert!(!request.respond_json);
    }

    #[test]
    fn decodes_json_bodies() {
        let request = SubmitRequest::from_body(
            &headers("application/json"),
            r#"{"username":"alice","password":"p@ss"}"#,
        )
        .expect("json");
        assert_eq!(request.username, "alice");
        assert_eq!(request.password, "p@ss");
        assert!(request.respond_json);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let request =
            SubmitRequest::from_body(&headers("application/json"), r#"{"username":"alice"}"#)
                .expect("json");
        assert_eq!(request.password, "");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SubmitRequest::from_body(&headers("application/json"), "{nope").is_err());
    }
}
