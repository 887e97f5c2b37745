//! wiremock helpers shaped like Vault responses.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultdeck::auth::LdapAuthenticator;
use vaultdeck::types::SecretString;

pub const USERNAME: &str = "jdoe";
pub const PASSWORD: &str = "hunter2";

pub fn login_path() -> String {
    format!("/v1/auth/ldap/login/{}", USERNAME)
}

/// Full Vault response envelope around `data`.
pub fn envelope(data: Value) -> Value {
    json!({
        "request_id": "8f3b2c1e-0000-0000-0000-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": data,
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

pub fn login_body(token: &str, lease_duration: u64) -> Value {
    json!({
        "request_id": "1d2e3f40-0000-0000-0000-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": null,
        "wrap_info": null,
        "warnings": null,
        "auth": {
            "client_token": token,
            "accessor": "accessor",
            "policies": ["default"],
            "token_policies": ["default"],
            "metadata": { "username": USERNAME },
            "lease_duration": lease_duration,
            "renewable": true
        }
    })
}

/// Accept the login and answer with `token`.
pub async fn mount_login(server: &MockServer, token: &str, lease_duration: u64) {
    Mock::given(method("POST"))
        .and(path(login_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(token, lease_duration)))
        .mount(server)
        .await;
}

pub fn authenticator(server: &MockServer) -> LdapAuthenticator {
    LdapAuthenticator::new(server.uri(), "ldap", USERNAME, SecretString::new(PASSWORD)).unwrap()
}
