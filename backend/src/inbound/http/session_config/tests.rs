//! Session configuration under debug and release rules.

use std::collections::HashMap;
use std::io::Write;

use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[fixture]
fn release_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect()
}

fn release_env(key: &NamedTempFile) -> HashMap<String, String> {
    let path = key.path().to_string_lossy().into_owned();
    env_with(&[
        (KEY_FILE_ENV, path.as_str()),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ])
}

fn release_error(env: &HashMap<String, String>) -> SessionConfigError {
    match session_settings_from_env(env, BuildMode::Release) {
        Ok(_) => panic!("release settings should be rejected"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_configuration(release_key: NamedTempFile) {
    let settings = session_settings_from_env(&release_env(&release_key), BuildMode::Release)
        .expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(release_key: NamedTempFile, #[case] missing: &'static str) {
    let mut env = release_env(&release_key);
    env.remove(missing);
    let err = release_error(&env);
    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_malformed_toggles(
    release_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut env = release_env(&release_key);
    env.insert(name.to_owned(), value.to_owned());
    let err = release_error(&env);
    assert!(matches!(err, SessionConfigError::InvalidEnv { name: n, .. } if n == name));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
    let mut env = release_env(&release_key);
    env.insert(ALLOW_EPHEMERAL_ENV.to_owned(), "1".to_owned());
    assert!(matches!(
        release_error(&env),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none(release_key: NamedTempFile) {
    let mut env = release_env(&release_key);
    env.insert(COOKIE_SECURE_ENV.to_owned(), "0".to_owned());
    env.insert(SAMESITE_ENV.to_owned(), "None".to_owned());
    assert!(matches!(
        release_error(&env),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let err = release_error(&release_env(&short));
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_rejects_missing_key_file(release_key: NamedTempFile) {
    let mut env = release_env(&release_key);
    env.insert(KEY_FILE_ENV.to_owned(), "/nonexistent/market/session_key".to_owned());
    assert!(matches!(
        release_error(&env),
        SessionConfigError::KeyRead { .. }
    ));
}

#[rstest]
fn debug_defaults_to_secure_lax_and_ephemeral_key() {
    let env = env_with(&[(KEY_FILE_ENV, "/nonexistent/market/session_key")]);
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_falls_back_on_malformed_same_site(release_key: NamedTempFile) {
    let mut env = release_env(&release_key);
    env.insert(SAMESITE_ENV.to_owned(), "sideways".to_owned());
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("fallback");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_accepts_short_but_derivable_keys() {
    let short = key_file(48);
    let settings =
        session_settings_from_env(&release_env(&short), BuildMode::Debug).expect("debug key");
    assert!(settings.cookie_secure);
}
