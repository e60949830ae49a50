use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::TranslationProviderConfig;
use crate::error::{StageError, StageResult};
use crate::language::LanguageCode;
use crate::providers::{http_client, TranslationProvider};

/// LibreTranslate-compatible translation client.
pub struct LibreTranslateProvider {
    api_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslateProvider {
    pub fn new(config: &TranslationProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            TranslationProviderConfig::Libretranslate { api_url, api_key } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "libretranslate provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageCode>,
        target: LanguageCode,
    ) -> StageResult<String> {
        let mut body = json!({
            "q": text,
            "source": source.map_or("auto", |lang| lang.as_code()),
            "target": target.as_code(),
            "format": "text",
        });
        if let (Some(key), Some(map)) = (&self.api_key, body.as_object_mut()) {
            map.insert("api_key".to_string(), json!(key));
        }

        let response = self
            .client
            .post(format!("{}/translate", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::TranslationUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranslationUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: LibreTranslateResponse = response
            .json()
            .await
            .map_err(|e| StageError::TranslationUnavailable(format!("malformed response: {e}")))?;

        Ok(parsed.translated_text.trim().to_string())
    }
}

/// DeepL translation client.
pub struct DeepLProvider {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL's target codes diverge from the wire codes the rest of the
/// pipeline uses: regional variants are mandatory for English and
/// Portuguese, and Chinese uses script subtags.
fn deepl_target(lang: LanguageCode) -> &'static str {
    match lang {
        LanguageCode::English => "EN-US",
        LanguageCode::Spanish => "ES",
        LanguageCode::French => "FR",
        LanguageCode::German => "DE",
        LanguageCode::Italian => "IT",
        LanguageCode::Portuguese => "PT-PT",
        LanguageCode::ChineseSimplified => "ZH-HANS",
        LanguageCode::ChineseTraditional => "ZH-HANT",
        LanguageCode::Japanese => "JA",
        LanguageCode::Korean => "KO",
        LanguageCode::Hindi => "HI",
        LanguageCode::Arabic => "AR",
        LanguageCode::Russian => "RU",
        LanguageCode::Dutch => "NL",
        LanguageCode::Polish => "PL",
        LanguageCode::Turkish => "TR",
    }
}

fn deepl_source(lang: LanguageCode) -> String {
    let primary = lang.as_code().split('-').next().unwrap_or("en");
    primary.to_uppercase()
}

fn text_from_deepl(response: DeepLResponse) -> StageResult<String> {
    response
        .translations
        .into_iter()
        .next()
        .map(|t| t.text.trim().to_string())
        .ok_or_else(|| StageError::TranslationUnavailable("no translation returned".to_string()))
}

impl DeepLProvider {
    pub fn new(config: &TranslationProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            TranslationProviderConfig::Deepl { api_url, api_key } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "deepl provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageCode>,
        target: LanguageCode,
    ) -> StageResult<String> {
        let mut form: Vec<(&str, String)> = vec![
            ("text", text.to_string()),
            ("target_lang", deepl_target(target).to_string()),
        ];
        if let Some(source) = source {
            form.push(("source_lang", deepl_source(source)));
        }

        let response = self
            .client
            .post(format!("{}/v2/translate", self.api_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| StageError::TranslationUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranslationUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: DeepLResponse = response
            .json()
            .await
            .map_err(|e| StageError::TranslationUnavailable(format!("malformed response: {e}")))?;

        text_from_deepl(parsed)
    }
}
