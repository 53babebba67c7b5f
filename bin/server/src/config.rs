use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DEFAULT_PUBLIC_URL,
    DEFAULT_PUSH_TIMEOUT_SECONDS, DEFAULT_PUSH_TTL_SECONDS, DEFAULT_VAPID_PRIVATE_KEY,
    DEFAULT_VAPID_PUBLIC_KEY, DEFAULT_VAPID_SUBJECT,
};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory holding uploaded photos
    pub data_dir: PathBuf,
    /// VAPID private key (PEM, SEC1 or PKCS#8)
    pub vapid_private_key: PathBuf,
    /// VAPID public key (PEM, SPKI)
    pub vapid_public_key: PathBuf,
    /// Base URL clients use to reach this server, without trailing slash
    pub public_url: String,
    /// VAPID contact
    pub vapid_subject: String,
    /// TTL header sent with every push message
    pub push_ttl_seconds: u32,
    /// Transport timeout for push requests
    pub push_timeout: Duration,
    /// Largest accepted JSON body
    pub max_upload_bytes: usize,
}

/// One setting: flag name, env var, default, help
const SETTINGS: &[(&str, &str, &str, &str)] = &[
    ("host", "SERVER_HOST", DEFAULT_HOST, "Server host"),
    ("port", "SERVER_PORT", DEFAULT_PORT, "Server port"),
    ("data-dir", "UPLOAD_DIR", DEFAULT_DATA_DIR, "Directory for uploaded photos"),
    (
        "vapid-private-key",
        "VAPID_PRIVATE_KEY",
        DEFAULT_VAPID_PRIVATE_KEY,
        "Path to the VAPID private key PEM",
    ),
    (
        "vapid-public-key",
        "VAPID_PUBLIC_KEY",
        DEFAULT_VAPID_PUBLIC_KEY,
        "Path to the VAPID public key PEM",
    ),
    (
        "public-url",
        "PUBLIC_URL",
        DEFAULT_PUBLIC_URL,
        "Base URL used in photo links sent to recipients",
    ),
    (
        "vapid-subject",
        "VAPID_SUBJECT",
        DEFAULT_VAPID_SUBJECT,
        "Contact sent to push services (mailto: or https: URI)",
    ),
    (
        "push-ttl",
        "PUSH_TTL_SECONDS",
        DEFAULT_PUSH_TTL_SECONDS,
        "Seconds a push service may hold an undelivered notification",
    ),
    (
        "push-timeout",
        "PUSH_TIMEOUT_SECONDS",
        DEFAULT_PUSH_TIMEOUT_SECONDS,
        "Timeout for one push request in seconds",
    ),
    (
        "max-upload-bytes",
        "MAX_UPLOAD_BYTES",
        DEFAULT_MAX_UPLOAD_BYTES,
        "Largest accepted request body in bytes",
    ),
];

impl ServerConfig {
    /// Load from command line arguments, environment variables, or defaults.
    /// Priority: command-line args > environment variables > defaults
    pub fn load() -> Result<Self, std::io::Error> {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches, |key| std::env::var(key).ok())
    }

    pub fn command() -> Command {
        SETTINGS
            .iter()
            .fold(Command::new("server"), |command, (name, env, default, help)| {
                command.arg(
                    Arg::new(*name)
                        .long(*name)
                        .value_name(*env)
                        .help(format!("{} (default: {}, or {} env var)", help, default, env)),
                )
            })
    }

    pub fn from_matches<F>(matches: &ArgMatches, env: F) -> Result<Self, std::io::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |name: &str| -> String {
            let (env_key, default) = SETTINGS
                .iter()
                .find(|(flag, ..)| *flag == name)
                .map(|(_, env_key, default, _)| (*env_key, *default))
                .unwrap_or(("", ""));
            matches
                .get_one::<String>(name)
                .cloned()
                .or_else(|| env(env_key))
                .unwrap_or_else(|| default.to_string())
        };

        let public_url = setting("public-url").trim_end_matches('/').to_string();

        Ok(ServerConfig {
            host: setting("host"),
            port: parse_number("port", &setting("port"))?,
            data_dir: PathBuf::from(setting("data-dir")),
            vapid_private_key: PathBuf::from(setting("vapid-private-key")),
            vapid_public_key: PathBuf::from(setting("vapid-public-key")),
            public_url,
            vapid_subject: setting("vapid-subject"),
            push_ttl_seconds: parse_number("push-ttl", &setting("push-ttl"))?,
            push_timeout: Duration::from_secs(parse_number(
                "push-timeout",
                &setting("push-timeout"),
            )?),
            max_upload_bytes: parse_number("max-upload-bytes", &setting("max-upload-bytes"))?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, std::io::Error> {
    value.trim().parse().map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid value for --{}: {}", name, value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(args: &[&str], env: &[(&str, &str)]) -> Result<ServerConfig, std::io::Error> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let matches = ServerConfig::command()
            .try_get_matches_from(std::iter::once("server").chain(args.iter().copied()))
            .unwrap();
        ServerConfig::from_matches(&matches, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[], &[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("uploads"));
        assert_eq!(
            config.vapid_private_key,
            PathBuf::from("vapid-keys/vapid_private_key.pem")
        );
        assert_eq!(config.public_url, "http://localhost:8080");
        assert_eq!(config.vapid_subject, "mailto:notifications@localhost");
        assert_eq!(config.push_ttl_seconds, 30);
        assert_eq!(config.push_timeout, Duration::from_secs(10));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_args_override_env_override_defaults() {
        let config = load(
            &["--port", "9000"],
            &[("SERVER_PORT", "7000"), ("SERVER_HOST", "127.0.0.1")],
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_public_url_trailing_slash_is_trimmed() {
        let config = load(&["--public-url", "https://pics.example.com/"], &[]).unwrap();
        assert_eq!(config.public_url, "https://pics.example.com");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[], &[("SERVER_PORT", "eighty")]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(load(&[], &[("PUSH_TTL_SECONDS", "-1")]).is_err());
    }
}
