// src/common/form_utils.rs
//
// Conversões tolerantes para os valores que chegam dos formulários do painel
// (strings vazias, "None", "null", vírgula decimal, números como texto).

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

use crate::common::error::AppError;

const NULL_MARKERS: [&str; 4] = ["", "none", "null", "nan"];

pub fn is_null(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => NULL_MARKERS.contains(&v.trim().to_lowercase().as_str()),
    }
}

/// Texto aparado, ou `None` quando vazio/marcador nulo.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    if is_null(value) {
        return None;
    }
    value.map(|v| v.trim().to_string())
}

pub fn clean_upper(value: Option<&str>) -> Option<String> {
    clean_text(value).map(|v| v.to_uppercase())
}

/// Inteiro tolerante: aceita "3", " 3 ", "3.0"; devolve `None` para nulos e lixo.
pub fn to_int(value: Option<&str>) -> Option<i64> {
    let text = clean_text(value)?;
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Mesmo que `to_int`, para valores de um corpo JSON (número ou texto).
pub fn json_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => to_int(Some(s)),
        _ => None,
    }
}

/// Chave de registro vinda do JSON: só inteiros positivos.
pub fn json_id(value: Option<&Value>) -> Option<i64> {
    json_int(value).filter(|id| *id > 0)
}

pub fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => clean_text(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Valor em reais com vírgula ou ponto, arredondado em centavos como o NUMERIC(12,2).
/// Vazio vira `None`; texto inválido é erro.
pub fn parse_decimal(value: Option<&str>, field: &'static str) -> Result<Option<Decimal>, AppError> {
    let Some(text) = clean_text(value) else {
        return Ok(None);
    };
    let normalized = if text.contains(',') && text.contains('.') {
        // "1.234,56"
        text.replace('.', "").replace(',', ".")
    } else {
        text.replace(',', ".")
    };
    Decimal::from_str(&normalized)
        .map(|d| Some(d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)))
        .map_err(|_| AppError::InvalidField(field))
}

/// Datas em `AAAA-MM-DD` (opcionalmente com hora) ou `DD/MM/AAAA`.
pub fn parse_date(value: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>, AppError> {
    let Some(text) = clean_text(value) else {
        return Ok(None);
    };
    let date_part = text.split(['T', ' ']).next().unwrap_or(&text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .map(Some)
        .map_err(|_| AppError::InvalidField(field))
}
