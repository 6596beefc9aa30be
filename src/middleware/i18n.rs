// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Idioma da requisição, tirado do Accept-Language ("pt-BR" -> "pt")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|header_str| {
                // parse() já devolve as tags ordenadas pelo peso (q=)
                accept_language::parse(header_str).first().map(|tag| {
                    tag.split('-')
                        .next()
                        .unwrap_or(tag)
                        .to_ascii_lowercase()
                })
            })
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn defaults_to_portuguese() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()), Locale("pt".into()));
    }

    #[test]
    fn keeps_only_the_primary_subtag() {
        assert_eq!(Locale::from_headers(&headers("pt-BR,pt;q=0.9")).0, "pt");
        assert_eq!(Locale::from_headers(&headers("en-US")).0, "en");
    }

    #[test]
    fn respects_quality_weights() {
        assert_eq!(Locale::from_headers(&headers("pt;q=0.5, en;q=0.9")).0, "en");
    }
}
