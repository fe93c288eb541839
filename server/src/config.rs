use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_CLIENT_DIST_DIR: &str = "client/dist";
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173,*";

/// Which browser origins may call the JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

pub fn port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PORT)
}

pub fn bind_addr() -> IpAddr {
    std::env::var("BIND_ADDR")
        .ok()
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
        .unwrap_or(DEFAULT_BIND_ADDR)
}

pub fn client_dist_dir() -> PathBuf {
    std::env::var("CLIENT_DIST_DIR")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLIENT_DIST_DIR.to_owned())
        .into()
}

pub fn cors_allowed_origins() -> CorsOrigins {
    let raw = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGINS.to_owned());
    parse_cors_origins(&raw)
}

fn parse_cors_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return CorsOrigins::Any;
    }
    if origins.is_empty() {
        return parse_cors_origins(DEFAULT_CORS_ALLOWED_ORIGINS);
    }
    CorsOrigins::List(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_on_missing_or_invalid_values() {
        temp_env::with_var_unset("PORT", || assert_eq!(port(), DEFAULT_PORT));
        temp_env::with_var("PORT", Some("not-a-port"), || {
            assert_eq!(port(), DEFAULT_PORT)
        });
        temp_env::with_var("PORT", Some("0"), || assert_eq!(port(), DEFAULT_PORT));
        temp_env::with_var("PORT", Some(" 8080 "), || assert_eq!(port(), 8080));
    }

    #[test]
    fn bind_addr_parses_ip_or_defaults() {
        temp_env::with_var_unset("BIND_ADDR", || {
            assert_eq!(bind_addr().to_string(), "0.0.0.0")
        });
        temp_env::with_var("BIND_ADDR", Some("127.0.0.1"), || {
            assert_eq!(bind_addr(), IpAddr::from([127, 0, 0, 1]))
        });
        temp_env::with_var("BIND_ADDR", Some("localhost"), || {
            assert_eq!(bind_addr(), DEFAULT_BIND_ADDR)
        });
    }

    #[test]
    fn client_dist_dir_ignores_blank_override() {
        temp_env::with_var("CLIENT_DIST_DIR", Some("   "), || {
            assert_eq!(client_dist_dir(), PathBuf::from(DEFAULT_CLIENT_DIST_DIR))
        });
        temp_env::with_var("CLIENT_DIST_DIR", Some("/srv/weatherguard"), || {
            assert_eq!(client_dist_dir(), PathBuf::from("/srv/weatherguard"))
        });
    }

    #[test]
    fn cors_origins_parse_lists_and_wildcard() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGINS", || {
            assert_eq!(cors_allowed_origins(), CorsOrigins::Any)
        });
        assert_eq!(
            parse_cors_origins("https://a.example, ,https://b.example"),
            CorsOrigins::List(vec![
                "https://a.example".to_owned(),
                "https://b.example".to_owned()
            ])
        );
        assert_eq!(parse_cors_origins("https://a.example,*"), CorsOrigins::Any);
        assert_eq!(parse_cors_origins(" , "), CorsOrigins::Any);
    }
}
