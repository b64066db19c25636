//! Server configuration from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use audito_core::SynthConfig;

/// Runtime configuration for the HTTP front door.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub listen_addr: SocketAddr,
    /// Public host name clients reach the server under.
    pub public_host: String,
    /// Public scheme (`http` or `https`).
    pub scheme: String,
    /// Directory audio artifacts are written to and served from.
    pub webroot: PathBuf,
    /// Font size used by the rendered reader page, in pixels.
    pub font_size: u32,
    /// The source site unmatched requests are redirected to.
    pub source_site: String,
}

impl ServerConfig {
    /// Builds the configuration from the process environment.
    ///
    /// `LOCAL_PORT` selects the bind port (default 9005); setting
    /// `LISTEN_LOCAL` restricts the bind address to 127.0.0.1. `HOST` and
    /// `SCHEME` describe the public surface and are used only for the
    /// wrapper-prefix stripping of listen identifiers.
    pub fn from_env() -> Self {
        let port = env_or("LOCAL_PORT", "9005").parse().unwrap_or(9005);
        let ip: IpAddr = if env::var("LISTEN_LOCAL").is_ok() {
            Ipv4Addr::LOCALHOST.into()
        } else {
            Ipv4Addr::UNSPECIFIED.into()
        };

        Self {
            listen_addr: SocketAddr::new(ip, port),
            public_host: env_or("HOST", "127.0.0.1"),
            scheme: env_or("SCHEME", "http"),
            webroot: PathBuf::from(env_or("WEBROOT", "audio")),
            font_size: env_or("FONTSIZE", "17").parse().unwrap_or(17),
            source_site: env_or("BOOKSITE", "https://m.booklink.me"),
        }
    }

    /// The wrapper prefix a `listen` identifier carries when the reader page
    /// link was rewritten through this server; stripped before cache lookup.
    pub fn dest_prefix(&self) -> String {
        format!("{}://{}/?dest=", self.scheme, self.public_host)
    }
}

/// Synthesis configuration with per-field environment overrides.
pub fn synth_from_env() -> SynthConfig {
    let mut config = SynthConfig::default();
    if let Ok(endpoint) = env::var("TTS_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(speed) = parse_env("TTS_SPEED") {
        config.speed = speed;
    }
    if let Some(voice) = parse_env("TTS_VOICE") {
        config.voice = voice;
    }
    if let Some(volume) = parse_env("TTS_VOLUME") {
        config.volume = volume;
    }
    if let Some(segment_len) = parse_env("TTS_SEGMENT_LEN") {
        config.segment_len = segment_len;
    }
    config
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_prefix() {
        let config = ServerConfig {
            listen_addr: ([127, 0, 0, 1], 9005).into(),
            public_host: "reader.example.com".to_string(),
            scheme: "https".to_string(),
            webroot: PathBuf::from("audio"),
            font_size: 17,
            source_site: "https://m.booklink.me".to_string(),
        };
        assert_eq!(config.dest_prefix(), "https://reader.example.com/?dest=");
    }
}
