//! reqwest client for the REST backend
//!
//! Requires the `http` feature; without it every call fails with
//! [`KicklabError::Transport`].

use crate::config::BackendConfig;
use crate::error::{KicklabError, Result};
use crate::state::preset::{Preset, PresetDraft};

use super::{BackendApi, Credentials, GeneratedKick, KickDeleted, KickList, TokenPair};

#[cfg(feature = "http")]
use serde::de::DeserializeOwned;
#[cfg(feature = "http")]
use tracing::debug;

/// Blocking HTTP backend with bearer authentication
pub struct HttpBackend {
    base_url: String,
    #[cfg(feature = "http")]
    client: reqwest::blocking::Client,
    #[cfg(not(feature = "http"))]
    _timeout: std::time::Duration,
}

impl HttpBackend {
    #[cfg(feature = "http")]
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| KicklabError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[cfg(not(feature = "http"))]
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            _timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "http")]
impl HttpBackend {
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::blocking::RequestBuilder {
        let url = self.url(path);
        debug!("[API] {} {}", method, url);
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(&self, builder: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response> {
        let response = builder.send().map_err(|e| KicklabError::Transport {
            message: if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                e.to_string()
            },
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(super::error_from_status(status.as_u16(), &body))
    }

    fn json<T: DeserializeOwned>(&self, builder: reqwest::blocking::RequestBuilder) -> Result<T> {
        self.send(builder)?
            .json::<T>()
            .map_err(|e| KicklabError::Transport {
                message: format!("invalid response body: {e}"),
            })
    }
}

#[cfg(feature = "http")]
impl BackendApi for HttpBackend {
    fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.json(
            self.request(reqwest::Method::POST, "token/", None)
                .json(credentials),
        )
    }

    fn register(&self, credentials: &Credentials) -> Result<()> {
        self.send(
            self.request(reqwest::Method::POST, "register/", None)
                .json(credentials),
        )
        .map(|_| ())
    }

    fn shared_presets(&self, token: Option<&str>) -> Result<Vec<Preset>> {
        self.json(self.request(reqwest::Method::GET, "presets/shared/", token))
    }

    fn user_presets(&self, token: &str) -> Result<Vec<Preset>> {
        self.json(self.request(reqwest::Method::GET, "presets/", Some(token)))
    }

    fn create_preset(&self, token: &str, draft: &PresetDraft) -> Result<Preset> {
        self.json(
            self.request(reqwest::Method::POST, "presets/", Some(token))
                .json(draft),
        )
    }

    fn update_preset(&self, token: &str, id: u64, draft: &PresetDraft) -> Result<Preset> {
        self.json(
            self.request(reqwest::Method::PUT, &format!("presets/{id}/"), Some(token))
                .json(draft),
        )
    }

    fn delete_preset(&self, token: &str, id: u64) -> Result<()> {
        self.send(self.request(
            reqwest::Method::DELETE,
            &format!("presets/{id}/"),
            Some(token),
        ))
        .map(|_| ())
    }

    fn list_kicks(&self, token: &str) -> Result<KickList> {
        self.json(self.request(reqwest::Method::GET, "kicks/", Some(token)))
    }

    fn generate_kick(&self, token: &str) -> Result<GeneratedKick> {
        self.json(self.request(reqwest::Method::POST, "kicks/generate/", Some(token)))
    }

    fn delete_kick(&self, token: &str, id: u64, confirm: bool) -> Result<KickDeleted> {
        let path = if confirm {
            format!("kicks/{id}/?confirm=true")
        } else {
            format!("kicks/{id}/")
        };
        self.json(self.request(reqwest::Method::DELETE, &path, Some(token)))
    }
}

#[cfg(not(feature = "http"))]
impl HttpBackend {
    fn unavailable<T>(&self, path: &str) -> Result<T> {
        Err(KicklabError::Transport {
            message: format!(
                "HTTP support not compiled, cannot reach {}. Build with --features http",
                self.url(path)
            ),
        })
    }
}

#[cfg(not(feature = "http"))]
impl BackendApi for HttpBackend {
    fn obtain_token(&self, _credentials: &Credentials) -> Result<TokenPair> {
        self.unavailable("token/")
    }

    fn register(&self, _credentials: &Credentials) -> Result<()> {
        self.unavailable("register/")
    }

    fn shared_presets(&self, _token: Option<&str>) -> Result<Vec<Preset>> {
        self.unavailable("presets/shared/")
    }

    fn user_presets(&self, _token: &str) -> Result<Vec<Preset>> {
        self.unavailable("presets/")
    }

    fn create_preset(&self, _token: &str, _draft: &PresetDraft) -> Result<Preset> {
        self.unavailable("presets/")
    }

    fn update_preset(&self, _token: &str, id: u64, _draft: &PresetDraft) -> Result<Preset> {
        self.unavailable(&format!("presets/{id}/"))
    }

    fn delete_preset(&self, _token: &str, id: u64) -> Result<()> {
        self.unavailable(&format!("presets/{id}/"))
    }

    fn list_kicks(&self, _token: &str) -> Result<KickList> {
        self.unavailable("kicks/")
    }

    fn generate_kick(&self, _token: &str) -> Result<GeneratedKick> {
        self.unavailable("kicks/generate/")
    }

    fn delete_kick(&self, _token: &str, id: u64, _confirm: bool) -> Result<KickDeleted> {
        self.unavailable(&format!("kicks/{id}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000/api");
        assert_eq!(
            backend.url("/presets/shared/"),
            "http://localhost:8000/api/presets/shared/"
        );
    }
}
