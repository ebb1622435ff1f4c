//! Demo tokens shown in the token panel.
//!
//! Every token is a JWT-shaped string (`header.payload.signature`, base64url
//! without padding) built from fixed claims and a sequence number, so the same
//! deck always produces the same tokens. The signature segment is a fixed
//! placeholder; nothing here is signed or verified.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `typ` header of an Identity Assertion JWT Authorization Grant.
pub const ID_JAG_TYP: &str = "oauth-id-jag+jwt";

const EPOCH: u64 = 1_760_000_000;
const SIGNATURE: &[u8] = b"demo-signature-not-verified";

pub const IDP_ISSUER: &str = "https://idp.example.com";
pub const AS_ISSUER: &str = "https://as.example.com";
pub const RESOURCE: &str = "https://api.example.com";
pub const CLIENT_ID: &str = "wiki-app";
pub const SUBJECT: &str = "alice@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    AuthorizationCode,
    AccessToken,
    RefreshToken,
    IdToken,
    IdJag,
}

impl TokenKind {
    pub fn label(self) -> &'static str {
        match self {
            TokenKind::AuthorizationCode => "Authorization Code",
            TokenKind::AccessToken => "Access Token",
            TokenKind::RefreshToken => "Refresh Token",
            TokenKind::IdToken => "ID Token",
            TokenKind::IdJag => "ID-JAG",
        }
    }

    fn typ(self) -> &'static str {
        match self {
            TokenKind::IdJag => ID_JAG_TYP,
            TokenKind::AccessToken => "at+jwt",
            _ => "JWT",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoToken {
    pub kind: TokenKind,
    pub value: String,
}

impl DemoToken {
    /// Build the `seq`-th token of `kind`.
    pub fn issue(kind: TokenKind, seq: u32) -> Self {
        let header = json!({ "alg": "RS256", "typ": kind.typ(), "kid": "demo-1" });
        let value = format!(
            "{}.{}.{}",
            encode_json(&header),
            encode_json(&claims_for(kind, seq)),
            URL_SAFE_NO_PAD.encode(SIGNATURE)
        );
        Self { kind, value }
    }

    /// First and last few characters, for tight spaces.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.value.chars().collect();
        if chars.len() <= 24 {
            return self.value.clone();
        }
        let head: String = chars[..12].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{head}\u{2026}{tail}")
    }
}

fn encode_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

fn claims_for(kind: TokenKind, seq: u32) -> Value {
    let iat = EPOCH + u64::from(seq) * 60;
    let jti = format!("{}-{seq:04}", kind_slug(kind));
    match kind {
        TokenKind::AuthorizationCode => json!({
            "iss": AS_ISSUER,
            "client_id": CLIENT_ID,
            "sub": SUBJECT,
            "code_challenge_method": "S256",
            "iat": iat,
            "exp": iat + 60,
            "jti": jti,
        }),
        TokenKind::AccessToken => json!({
            "iss": AS_ISSUER,
            "sub": SUBJECT,
            "aud": RESOURCE,
            "client_id": CLIENT_ID,
            "scope": "openid profile todos.read",
            "iat": iat,
            "exp": iat + 3600,
            "jti": jti,
        }),
        TokenKind::RefreshToken => json!({
            "iss": AS_ISSUER,
            "sub": SUBJECT,
            "client_id": CLIENT_ID,
            "iat": iat,
            "exp": iat + 86_400 * 30,
            "jti": jti,
        }),
        TokenKind::IdToken => json!({
            "iss": IDP_ISSUER,
            "sub": SUBJECT,
            "aud": CLIENT_ID,
            "nonce": format!("n-{seq:04}"),
            "auth_time": iat,
            "iat": iat,
            "exp": iat + 300,
            "email": SUBJECT,
        }),
        TokenKind::IdJag => json!({
            "iss": IDP_ISSUER,
            "sub": SUBJECT,
            "aud": AS_ISSUER,
            "client_id": CLIENT_ID,
            "resource": RESOURCE,
            "scope": "todos.read",
            "iat": iat,
            "exp": iat + 300,
            "jti": jti,
        }),
    }
}

fn kind_slug(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::AuthorizationCode => "code",
        TokenKind::AccessToken => "at",
        TokenKind::RefreshToken => "rt",
        TokenKind::IdToken => "idt",
        TokenKind::IdJag => "jag",
    }
}

fn decode_segment(token: &str, index: usize) -> Option<Value> {
    let segment = token.split('.').nth(index)?;
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Decode the payload of a JWT-shaped string. No verification.
pub fn decode_claims(token: &str) -> Option<Value> {
    decode_segment(token, 1)
}

pub fn decode_header(token: &str) -> Option<Value> {
    decode_segment(token, 0)
}

/// Payload pretty-printed for display.
pub fn pretty_claims(token: &str) -> Option<String> {
    decode_claims(token).and_then(|claims| serde_json::to_string_pretty(&claims).ok())
}

/// Tokens issued so far in the current walk through a slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenWallet {
    tokens: Vec<DemoToken>,
    issued: u32,
}

impl TokenWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, kind: TokenKind) -> &DemoToken {
        self.issued += 1;
        let token = DemoToken::issue(kind, self.issued);
        // A newer token of the same kind replaces the old one.
        self.tokens.retain(|t| t.kind != kind);
        self.tokens.push(token);
        &self.tokens[self.tokens.len() - 1]
    }

    pub fn revoke_all(&mut self) {
        self.tokens.clear();
    }

    pub fn tokens(&self) -> &[DemoToken] {
        &self.tokens
    }

    pub fn latest(&self) -> Option<&DemoToken> {
        self.tokens.last()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_deterministic() {
        assert_eq!(
            DemoToken::issue(TokenKind::AccessToken, 3),
            DemoToken::issue(TokenKind::AccessToken, 3)
        );
        assert_ne!(
            DemoToken::issue(TokenKind::AccessToken, 3).value,
            DemoToken::issue(TokenKind::AccessToken, 4).value
        );
    }

    #[test]
    fn id_jag_has_its_own_typ() {
        let token = DemoToken::issue(TokenKind::IdJag, 1);
        let header = decode_header(&token.value).expect("header decodes");
        assert_eq!(header["typ"], ID_JAG_TYP);
        let claims = decode_claims(&token.value).expect("claims decode");
        assert_eq!(claims["aud"], AS_ISSUER);
        assert_eq!(claims["iss"], IDP_ISSUER);
    }

    #[test]
    fn token_has_three_url_safe_segments() {
        let token = DemoToken::issue(TokenKind::IdToken, 1);
        assert_eq!(token.value.split('.').count(), 3);
        assert!(!token.value.contains('='));
        assert!(!token.value.contains('+'));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_claims("not-a-token").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
    }

    #[test]
    fn wallet_replaces_same_kind_and_revokes() {
        let mut wallet = TokenWallet::new();
        wallet.issue(TokenKind::AccessToken);
        wallet.issue(TokenKind::RefreshToken);
        wallet.issue(TokenKind::AccessToken);
        assert_eq!(wallet.tokens().len(), 2);
        assert_eq!(wallet.latest().map(|t| t.kind), Some(TokenKind::AccessToken));

        wallet.revoke_all();
        assert!(wallet.is_empty());
    }

    #[test]
    fn short_form_elides_middle() {
        let token = DemoToken::issue(TokenKind::AccessToken, 1);
        let short = token.short();
        assert!(short.contains('\u{2026}'));
        assert!(short.chars().count() < token.value.chars().count());
    }
}
