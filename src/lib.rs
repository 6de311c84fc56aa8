#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(test, deny(warnings))]

//! # deepl-client
//!
//! The `deepl-client` crate is a small blocking client for the [DeepL](<https://www.deepl.com/docs-api>) v2 api.
//!
//!## Features
//! - Translate a sentence: `POST /v2/translate`
//! - Read the account's character usage: `POST /v2/usage`
//! - Every non-200 status is mapped to a typed [`ProviderError`].
//! - Calls take a [`Context`] that carries a deadline and can be cancelled.
//!
//! # Usage
//!
//! The api key is read from the environment on every call, by default from:
//!
//!- **DEEPL_API_KEY = "xyz"**
//!
//! A fixed key can be set with [`Config::api_key`] instead.
//!
//! ```rust,no_run
//!use deepl_client::{Client, Context, config::Config};
//!
//!fn main() -> Result<(), deepl_client::Error> {
//!    let cfg = Config::new("https://api-free.deepl.com")
//!        .api_key_env("DEEPL_API_KEY")
//!        .build();
//!
//!    let client = Client::with_config(cfg)?;
//!    let ctx = Context::background();
//!
//!    let result = client.translate(&ctx, "Hello", "EN", "JA")?;
//!    for translation in &result.translations {
//!        println!("{}: {}", translation.detected_source_language, translation.text);
//!    }
//!
//!    let usage = client.account_status(&ctx)?;
//!    println!("{} / {}", usage.character_count, usage.character_limit);
//!    Ok(())
//!}
//! ```
//!
//! Log records go through the [`log`](<https://docs.rs/log>) facade under the target
//! `deepl_client` (see [`Config::log_target`]). Api keys are never logged.
//!

use std::{sync::Arc, time::Duration};

use log::{debug, error, warn};
use url::Url;

use crate::{
    api::{TRANSLATE_PATH, USAGE_PATH, build_request, classify_response, parse_base_url},
    config::{Config, CredentialSource, DEFAULT_LOG_TARGET},
};

mod api;
pub mod config;
mod error;
pub mod transport;

pub use api::{AccountStatus, TranslateResult, Translation};
pub use error::{Error, ProviderError, Result};
pub use transport::{CancelHandle, Context, Transport, UreqTransport};

/// Client for the translate and usage endpoints.
///
/// Holds no per-call state; clone it or share it between threads freely.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    transport: Arc<dyn Transport>,
    credential: CredentialSource,
    user_agent: String,
    timeout: Option<Duration>,
    log_target: String,
}

impl Client {
    /// Client for `base_url` with the default [`Config`]
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(Config::new(base_url))
    }

    /// Client using the default [`UreqTransport`]
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Client sending its requests through `transport`
    pub fn with_transport<T: Transport + 'static>(config: Config, transport: T) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        Ok(Self {
            base_url,
            transport: Arc::new(transport),
            credential: config.credential,
            user_agent: config.user_agent,
            timeout: config.timeout,
            log_target: config
                .log_target
                .unwrap_or_else(|| DEFAULT_LOG_TARGET.to_string()),
        })
    }

    /// Client configured by [`Config::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::with_config(Config::from_env())
    }

    /// The url requests are built on
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Translate `text` from `source_lang` to `target_lang`.
    ///
    /// Language codes are passed through as is; the provider validates them.
    pub fn translate(
        &self,
        ctx: &Context,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<TranslateResult> {
        let api_key = self.credential.resolve()?;

        let params = [
            ("auth_key", api_key.as_str()),
            ("source_lang", source_lang),
            ("target_lang", target_lang),
            ("text", text),
        ];

        let result: TranslateResult =
            self.send(ctx, &TRANSLATE_PATH, &params, "translate response")?;

        debug!(
            target: self.log_target.as_str(),
            "Translated {} segment(s) {source_lang} -> {target_lang}",
            result.translations.len()
        );
        Ok(result)
    }

    /// Characters used and allowed in the current billing period
    pub fn account_status(&self, ctx: &Context) -> Result<AccountStatus> {
        let api_key = self.credential.resolve()?;

        self.send(
            ctx,
            &USAGE_PATH,
            &[("auth_key", api_key.as_str())],
            "usage response",
        )
    }

    fn send<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &Context,
        segments: &[&str],
        params: &[(&str, &str)],
        context: &'static str,
    ) -> Result<T> {
        let target = self.log_target.as_str();
        let request = build_request(&self.base_url, segments, params, &self.user_agent)?;
        let path = request.url.path().to_string();

        let ctx = ctx.clone().limited(self.timeout);
        if ctx.is_cancelled() {
            return Err(Error::network("Request cancelled"));
        }
        if ctx.is_expired() {
            return Err(Error::network("Deadline exceeded before sending request"));
        }

        debug!(target: target, "POST {path}");
        let response = self.transport.post(&request, &ctx).inspect_err(|err| {
            error!(target: target, "POST {path} failed: {err}");
        })?;

        //a transport may finish before it notices the cancel
        if ctx.is_cancelled() {
            debug!(target: target, "Discarding response from {path}: request cancelled");
            return Err(Error::network("Request cancelled"));
        }

        debug!(target: target, "{path} returned {}", response.status);

        classify_response(response.status, &response.body, context).inspect_err(|err| {
            warn!(target: target, "{path} failed: {err}");
        })
    }
}
