// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";
pub const SUPPORTED_LANGS: &[&str] = &["pt", "en"];

// Catálogo de mensagens: (idioma, chave) -> modelo com marcadores `{nome}`
const MESSAGES: &[(&str, &str, &str)] = &[
    ("pt", "validation", "Um ou mais campos são inválidos."),
    ("en", "validation", "One or more fields are invalid."),
    ("pt", "invalid_body", "Dados inválidos."),
    ("en", "invalid_body", "Invalid data."),
    ("pt", "invalid_field", "Dados inválidos: {field}."),
    ("en", "invalid_field", "Invalid data: {field}."),
    ("pt", "email_exists", "Este e-mail já está em uso."),
    ("en", "email_exists", "This e-mail is already in use."),
    ("pt", "invalid_credentials", "E-mail ou senha inválidos."),
    ("en", "invalid_credentials", "Invalid e-mail or password."),
    ("pt", "invalid_token", "Token de autenticação inválido ou ausente."),
    ("en", "invalid_token", "Missing or invalid authentication token."),
    ("pt", "user_not_found", "Usuário não encontrado."),
    ("en", "user_not_found", "User not found."),
    ("pt", "chip_not_found", "Chip não encontrado ({id})."),
    ("en", "chip_not_found", "Chip not found ({id})."),
    ("pt", "device_not_found", "Aparelho não encontrado ({id})."),
    ("en", "device_not_found", "Device not found ({id})."),
    ("pt", "chip_inactive", "O chip {id} está inativo."),
    ("en", "chip_inactive", "Chip {id} is inactive."),
    ("pt", "device_inactive", "O aparelho {id} está inativo."),
    ("en", "device_inactive", "Device {id} is inactive."),
    ("pt", "slot_out_of_range", "O slot {slot} não existe neste aparelho (capacidade {capacity})."),
    ("en", "slot_out_of_range", "Slot {slot} does not exist on this device (capacity {capacity})."),
    ("pt", "slot_occupied", "O slot {slot} já está ocupado pelo chip {chip}."),
    ("en", "slot_occupied", "Slot {slot} is already taken by chip {chip}."),
    ("pt", "slot_type_mismatch", "O slot {slot} é {expected}, mas o chip é {found}."),
    ("en", "slot_type_mismatch", "Slot {slot} is {expected} but the chip is {found}."),
    ("pt", "chip_already_linked", "O chip já está vinculado ao aparelho {device} no slot {slot}."),
    ("en", "chip_already_linked", "The chip is already linked to device {device} in slot {slot}."),
    ("pt", "chip_not_linked", "O chip {id} não está vinculado a nenhum aparelho."),
    ("en", "chip_not_linked", "Chip {id} is not linked to any device."),
    ("pt", "no_free_slot", "O aparelho {id} não tem slot livre compatível."),
    ("en", "no_free_slot", "Device {id} has no compatible free slot."),
    ("pt", "capacity_conflict", "A nova capacidade não comporta o chip no slot {slot}."),
    ("en", "capacity_conflict", "The new capacity does not fit the chip in slot {slot}."),
    ("pt", "internal", "Ocorreu um erro inesperado."),
    ("en", "internal", "An unexpected error occurred."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    // idioma -> chave -> modelo
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for (lang, key, text) in MESSAGES {
            messages.entry(*lang).or_default().insert(*key, *text);
        }
        Self { messages }
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.messages.get(lang)?.get(key).copied()
    }

    /// Traduz `key` para `lang`, caindo para o português e, por fim, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_arguments() {
        let store = I18nStore::new();
        let msg = store.translate(
            "en",
            "slot_out_of_range",
            &[("slot", "9".to_string()), ("capacity", "4".to_string())],
        );
        assert_eq!(msg, "Slot 9 does not exist on this device (capacity 4).");
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "user_not_found", &[]),
            "Usuário não encontrado."
        );
    }

    #[test]
    fn every_key_has_all_languages() {
        let store = I18nStore::new();
        for (_, key, _) in MESSAGES {
            for lang in SUPPORTED_LANGS {
                assert!(store.lookup(lang, key).is_some(), "{lang}/{key}");
            }
        }
    }

    #[test]
    fn invalid_body_is_translated() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "invalid_body", &[]), "Invalid data.");
        assert_eq!(store.translate("pt", "invalid_body", &[]), "Dados inválidos.");
    }

    #[test]
    fn unknown_key_returns_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "nope", &[]), "nope");
    }
}
