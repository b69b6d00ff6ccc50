// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Extrator de idioma (primeira tag do Accept-Language, sem a região)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    // O painel é brasileiro: sem cabeçalho, respondemos em português
    fn default() -> Self {
        Locale("pt".to_string())
    }
}

impl Locale {
    pub fn is_portuguese(&self) -> bool {
        self.0 == "pt"
    }

    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            .map(|tag_string| {
                // "pt-BR" -> "pt"
                let lang = tag_string.split('-').next().unwrap_or(tag_string.as_str());
                Locale(lang.to_lowercase())
            })
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_language_without_region() {
        assert_eq!(Locale::from_header("en-US,pt-BR;q=0.8").0, "en");
        assert_eq!(Locale::from_header("pt-BR").0, "pt");
    }

    #[test]
    fn empty_header_falls_back_to_portuguese() {
        assert!(Locale::from_header("").is_portuguese());
    }
}
