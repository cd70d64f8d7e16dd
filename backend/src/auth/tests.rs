use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn token_with(secret: &str, sub: &str, exp: usize) -> String {
    let my_claims = UserClaims {
        sub: sub.to_string(),
        email: Some("test@example.com".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_verify_jwt_success() {
    let sub = "123e4567-e89b-12d3-a456-426614174000";
    let token = token_with(SECRET, sub, 9999999999);

    let claims = JwtVerifier::new(SECRET)
        .verify(&token)
        .expect("Valid token should pass");
    assert_eq!(claims.sub, sub);
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_verify_jwt_expired() {
    let token = token_with(SECRET, "123e4567-e89b-12d3-a456-426614174000", 1);

    assert!(JwtVerifier::new(SECRET).verify(&token).is_err());
}

#[test]
fn test_verify_jwt_invalid_signature() {
    let token = token_with("wrongsecret", "123e4567-e89b-12d3-a456-426614174000", 9999999999);

    assert!(JwtVerifier::new(SECRET).verify(&token).is_err());
}

#[test]
fn test_issued_test_token_verifies() {
    let token = issue_test_token(SECRET, "123e4567-e89b-12d3-a456-426614174000");

    assert!(JwtVerifier::new(SECRET).verify(&token).is_ok());
}
