// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

// Catálogos embutidos no binário (não dependem do diretório de trabalho)
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

pub const DEFAULT_LANG: &str = "pt";

/// Mensagens traduzidas por idioma, carregadas uma vez na inicialização.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Busca a mensagem no idioma pedido, cai para o padrão e, por fim, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual a `translate`, substituindo os marcadores `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.translate(lang, key), |message, (name, value)| {
            message.replace(&format!("{{{}}}", name), value)
        })
    }
}
