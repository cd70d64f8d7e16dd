use std::{env, str::FromStr};

use anyhow::{Context, Result, anyhow};
use crates::{
    domain::value_objects::enums::locales::Locale,
    infra::{
        ai::gemini_client::{
            DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
        },
        db::postgres::postgres_connection::{
            DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
        },
    },
};

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, Gemini, UserSecret},
    stage::Stage,
};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT_MB: u64 = 10;
// Must outlast the AI request timeout.
const DEFAULT_SERVER_TIMEOUT_SECS: u64 = 90;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: parse_or("SERVER_PORT", DEFAULT_PORT)?,
        body_limit: parse_or("SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT_MB)?,
        timeout: parse_or("SERVER_TIMEOUT", DEFAULT_SERVER_TIMEOUT_SECS)?,
        allowed_origins: parse_origins(optional("CORS_ALLOWED_ORIGINS").as_deref()),
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        connect_timeout_secs: parse_or(
            "DATABASE_CONNECT_TIMEOUT",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?,
    };

    let user_secret = get_user_secret()?;

    let locale = match optional("AI_LOCALE") {
        Some(raw) => Locale::from_code(&raw).ok_or_else(|| anyhow!("AI_LOCALE is invalid: {raw}"))?,
        None => Locale::default(),
    };

    let gemini = Gemini {
        api_key: required("GEMINI_API_KEY")?,
        model: optional("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        base_url: optional("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        timeout_secs: parse_or("AI_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        locale,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        user_secret,
        gemini,
        stage: get_stage(),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_user_secret() -> Result<UserSecret> {
    dotenvy::dotenv().ok();

    Ok(UserSecret {
        secret: required("JWT_SECRET")?,
    })
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} is invalid"))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} is invalid: {raw}")),
        None => Ok(default),
    }
}

/// `*` or an empty list allows any origin.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        Vec::new()
    } else {
        origins
    }
}
