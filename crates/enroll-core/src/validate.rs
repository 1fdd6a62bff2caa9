//! Registration Validation
//!
//! Turns raw, loosely-typed registration input into a normalized
//! [`Registration`] or a full ordered list of field errors. Validation always
//! runs to completion over every field before the caller touches the store.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::taxid;

/// Email syntax check, matching the format the enrollment form enforces
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex")
});

/// Raw registration payload as submitted by the client.
///
/// Field names follow the public wire format. `idade` is accepted as either
/// a JSON number or a numeric string; everything else arrives as text.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegistrationInput {
    #[serde(default)]
    pub nome: Option<String>,

    #[serde(default, deserialize_with = "loose_int")]
    pub idade: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub celular: Option<String>,

    #[serde(default, rename = "taxId")]
    pub tax_id: Option<String>,
}

/// Accept an integer given as a JSON number or as a numeric string
fn loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// A single violated-field message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Normalized registration data, ready to persist
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub age: u8,
    pub email: String,
    pub phone: String,
    pub tax_id: Option<String>,
}

/// Validate raw input, collecting every violation in field order
/// (nome, idade, email, celular, taxId).
pub fn validate_registration(input: &RegistrationInput) -> Result<Registration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match input.nome.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError {
                field: "nome",
                message: "Nome é obrigatório",
            });
            None
        }
        Some(trimmed) if trimmed.chars().count() < 3 => {
            errors.push(FieldError {
                field: "nome",
                message: "Nome precisa ter pelo menos 3 caracteres",
            });
            None
        }
        Some(trimmed) => Some(escape_markup(trimmed)),
    };

    let age = match input.idade {
        Some(n) if (1..=120).contains(&n) => u8::try_from(n).ok(),
        _ => {
            errors.push(FieldError {
                field: "idade",
                message: "Idade deve ser entre 1 e 120 anos",
            });
            None
        }
    };

    let email = match input.email.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let lowered = raw.to_lowercase();
            if EMAIL_RE.is_match(&lowered) {
                Some(lowered)
            } else {
                errors.push(FieldError {
                    field: "email",
                    message: "E-mail inválido",
                });
                None
            }
        }
        _ => {
            errors.push(FieldError {
                field: "email",
                message: "E-mail inválido",
            });
            None
        }
    };

    let phone = match input.celular.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError {
                field: "celular",
                message: "Celular é obrigatório",
            });
            None
        }
        Some(raw) => match normalize_phone(raw) {
            Some(digits) => Some(digits),
            None => {
                errors.push(FieldError {
                    field: "celular",
                    message: "Celular inválido (10-15 números)",
                });
                None
            }
        },
    };

    let tax_id = match input.tax_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match taxid::normalize_and_validate(raw) {
            Some(digits) => Some(digits),
            None => {
                errors.push(FieldError {
                    field: "taxId",
                    message: "CPF/CNPJ inválido",
                });
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every field produced a value once the error list is empty.
    if let (Some(name), Some(age), Some(email), Some(phone)) = (name, age, email, phone) {
        Ok(Registration {
            name,
            age,
            email,
            phone,
            tax_id,
        })
    } else {
        Err(errors)
    }
}

/// Escape markup-significant characters, mirroring the form-side sanitizer
fn escape_markup(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Strip common formatting characters; the remainder must be 10-15 digits
fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+'))
        .collect();

    let ok = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    ok.then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> RegistrationInput {
        RegistrationInput {
            nome: Some("Ana Silva".into()),
            idade: Some(25),
            email: Some("Ana@Example.com".into()),
            celular: Some("(11) 99999-8888".into()),
            tax_id: None,
        }
    }

    #[test]
    fn accepts_and_normalizes_valid_input() {
        let reg = validate_registration(&valid_input()).unwrap();
        assert_eq!(reg.name, "Ana Silva");
        assert_eq!(reg.age, 25);
        assert_eq!(reg.email, "ana@example.com");
        assert_eq!(reg.phone, "11999998888");
        assert_eq!(reg.tax_id, None);
    }

    #[test]
    fn collects_every_violation_in_field_order() {
        let input = RegistrationInput {
            nome: Some("ab".into()),
            idade: Some(0),
            email: Some("not-an-email".into()),
            celular: Some("123".into()),
            tax_id: Some("123".into()),
        };
        let errors = validate_registration(&input).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["nome", "idade", "email", "celular", "taxId"]);
    }

    #[test]
    fn rejects_age_out_of_range() {
        let mut input = valid_input();
        input.idade = Some(121);
        assert!(validate_registration(&input).is_err());

        input.idade = Some(0);
        assert!(validate_registration(&input).is_err());

        input.idade = None;
        assert!(validate_registration(&input).is_err());
    }

    #[test]
    fn accepts_age_as_numeric_string() {
        let input: RegistrationInput = serde_json::from_value(serde_json::json!({
            "nome": "Ana Silva",
            "idade": "25",
            "email": "ana@example.com",
            "celular": "11999998888",
        }))
        .unwrap();
        let reg = validate_registration(&input).unwrap();
        assert_eq!(reg.age, 25);
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["ana@", "@example.com", "ana example@x.com", "ana"] {
            let mut input = valid_input();
            input.email = Some(bad.into());
            assert!(validate_registration(&input).is_err(), "{bad}");
        }
    }

    #[test]
    fn phone_formatting_is_stripped() {
        let mut input = valid_input();
        input.celular = Some("+55 (11) 9.9999-8888".into());
        let reg = validate_registration(&input).unwrap();
        assert_eq!(reg.phone, "5511999998888");
    }

    #[test]
    fn rejects_phone_with_letters_or_bad_length() {
        for bad in ["11abc998888", "119999", "1234567890123456"] {
            let mut input = valid_input();
            input.celular = Some(bad.into());
            assert!(validate_registration(&input).is_err(), "{bad}");
        }
    }

    #[test]
    fn invalid_tax_id_rejects_the_request() {
        let mut input = valid_input();
        input.tax_id = Some("52998224724".into());
        let errors = validate_registration(&input).unwrap_err();
        assert_eq!(errors[0].field, "taxId");
    }

    #[test]
    fn valid_tax_id_is_normalized() {
        let mut input = valid_input();
        input.tax_id = Some("529.982.247-25".into());
        let reg = validate_registration(&input).unwrap();
        assert_eq!(reg.tax_id.as_deref(), Some("52998224725"));
    }

    #[test]
    fn name_markup_is_escaped() {
        let mut input = valid_input();
        input.nome = Some("<b>Ana</b>".into());
        let reg = validate_registration(&input).unwrap();
        assert_eq!(reg.name, "&lt;b&gt;Ana&lt;&#x2F;b&gt;");
    }
}
