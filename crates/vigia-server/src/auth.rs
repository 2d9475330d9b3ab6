//! HTTP Basic-auth verification against the configured user list.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::HeaderMap;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{UserConfig, error::Error};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub users: Vec<UserConfig>,
}

/// Verify credentials from headers; returns the authenticated username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = config
    .users
    .iter()
    .find(|u| u.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(username.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::header;

  fn config_with(username: &str, password: &str) -> AuthConfig {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      users: vec![UserConfig {
        username:      username.to_string(),
        password_hash: hash,
      }],
    }
  }

  fn basic_headers(user: &str, pass: &str) -> HeaderMap {
    let encoded = B64.encode(format!("{user}:{pass}"));
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      format!("Basic {encoded}").parse().unwrap(),
    );
    headers
  }

  #[test]
  fn correct_credentials_yield_username() {
    let config = config_with("ana", "secret");
    let headers = basic_headers("ana", "secret");
    assert_eq!(verify_auth(&headers, &config).unwrap(), "ana");
  }

  #[test]
  fn wrong_password() {
    let config = config_with("ana", "secret");
    let headers = basic_headers("ana", "wrong");
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unknown_user() {
    let config = config_with("ana", "secret");
    let headers = basic_headers("beto", "secret");
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let config = config_with("ana", "secret");
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let config = config_with("ana", "secret");
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      "Basic !!!not-base64!!!".parse().unwrap(),
    );
    assert!(matches!(
      verify_auth(&headers, &config),
      Err(Error::Unauthorized)
    ));
  }
}
