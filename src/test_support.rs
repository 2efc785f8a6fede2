// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test fixtures: a local JWKS endpoint and signed test tokens.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{JwksManager, TokenVerifier};
use crate::state::AppState;
use crate::storage::Store;

pub const TEST_KID: &str = "test-key-1";
pub const TEST_ISSUER: &str = "https://tenant.test/";
pub const TEST_AUDIENCE: &str = "https://invitations.test";

const SIGNING_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/fixtures/jwt_test_signing_key.pem"
));

/// Public half of the fixture key, as JWK components.
const MODULUS: &str = "sG2h81MtY6TRC0tI5zRH7XP2_UGaecG53_O_Qe9UCUIlv416BOlqVpjghFw7YSvSUUbDMNce99KVIYZU8Tvz5v0qaiz-k2eExFvXwtIQRm5A-52_iRyLobrdPny8uXEgS-u9CoC4xBoCN_wte9EzUT5NOsjRMeUsb7bVf6MsRqygsxuFjq3GtPwq1hrPmlJu-ykGLx6pf1K0GI9bxHCJeaD-lYYaxV7OPPe9L2mga5ZzSN_eJDOnX-WgKrDpG5_u6N8DIEgvqu0tLt__f8hn3CRMywjgpsh0AgVSstxdRCSmRiHI7XT0apHodo81lWFb732cIVy_-ke3gnSd6vBEKQ";
const EXPONENT: &str = "AQAB";

fn jwk(kid: &str) -> Value {
    json!({
        "kty": "RSA",
        "use": "sig",
        "alg": "RS256",
        "kid": kid,
        "n": MODULUS,
        "e": EXPONENT,
    })
}

#[derive(Clone, Default)]
struct JwksState {
    kids: Arc<Mutex<Vec<String>>>,
    hits: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

async fn serve_jwks(State(state): State<JwksState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response();
    }
    let keys: Vec<Value> = state.kids.lock().unwrap().iter().map(|k| jwk(k)).collect();
    Json(json!({ "keys": keys })).into_response()
}

/// JWKS endpoint on `127.0.0.1`, publishing the fixture key under
/// swappable key ids.
pub struct JwksServer {
    url: String,
    state: JwksState,
}

impl JwksServer {
    pub async fn start(kids: &[&str]) -> Self {
        let state = JwksState::default();
        let app = Router::new()
            .route("/.well-known/jwks.json", get(serve_jwks))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let server = Self {
            url: format!("http://{addr}/.well-known/jwks.json"),
            state,
        };
        server.set_kids(kids);
        server
    }

    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Number of JWKS requests served so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn set_kids(&self, kids: &[&str]) {
        *self.state.kids.lock().unwrap() = kids.iter().map(|k| k.to_string()).collect();
    }

    /// Answer every request with 500 while set.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }
}

/// App state over a fresh database and a running JWKS endpoint.
///
/// The `TempDir` must outlive the state.
pub async fn test_state() -> (AppState, JwksServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&dir.path().join("invitations.redb")).unwrap();
    let server = JwksServer::start(&[TEST_KID]).await;
    let jwks = JwksManager::new(server.url()).unwrap();
    let verifier = TokenVerifier::new(Arc::new(jwks), TEST_ISSUER, TEST_AUDIENCE);
    (AppState::new(store, verifier), server, dir)
}

/// Builder for RS256 tokens signed with the fixture key.
pub struct TestToken {
    sub: Option<String>,
    permissions: Option<Vec<String>>,
    iss: String,
    aud: String,
    exp: i64,
    kid: Option<String>,
}

impl TestToken {
    /// Valid for an hour, no scopes, issued for the test tenant.
    pub fn new(sub: &str) -> Self {
        Self {
            sub: Some(sub.to_string()),
            permissions: Some(Vec::new()),
            iss: TEST_ISSUER.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
            kid: Some(TEST_KID.to_string()),
        }
    }

    pub fn scopes(mut self, scopes: &[&str]) -> Self {
        self.permissions = Some(scopes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn without_permissions(mut self) -> Self {
        self.permissions = None;
        self
    }

    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    pub fn issuer(mut self, iss: &str) -> Self {
        self.iss = iss.to_string();
        self
    }

    pub fn audience(mut self, aud: &str) -> Self {
        self.aud = aud.to_string();
        self
    }

    pub fn expires_at(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    pub fn sign(&self) -> String {
        let mut claims = json!({
            "iss": self.iss,
            "aud": self.aud,
            "exp": self.exp,
            "iat": chrono::Utc::now().timestamp(),
        });
        if let Some(sub) = &self.sub {
            claims["sub"] = json!(sub);
        }
        if let Some(permissions) = &self.permissions {
            claims["permissions"] = json!(permissions);
        }

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid.clone();
        let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }
}
