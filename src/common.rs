pub mod error;
pub mod form_utils;
pub mod i18n;
