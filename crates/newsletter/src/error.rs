//! Service error codes and their translated messages.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;

/// Business error code returned by the service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InternalServerError,
    DataNotFound,
    BadRequest,
    Conflict,
    Unauthorized,
    Forbidden,
    DatabaseConnectionFailed,
    TechnicalError,
    InvalidLanguage,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::DataNotFound => "DATA_NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Conflict => "CONFLICT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::DatabaseConnectionFailed => "DATABASE_CONNECTION_FAILED",
            Self::TechnicalError => "TECHNICAL_ERROR",
            Self::InvalidLanguage => "INVALID_LANGUAGE",
        }
    }

    /// Resolve the status, public code and text for this code in `language`.
    ///
    /// Codes without a translation entry resolve to a generic 500.
    pub fn message(&self, language: Language) -> ErrorMessage {
        let Some(entry) = entry(*self) else {
            return ErrorMessage {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: ErrorCode::InternalServerError,
                message: match language {
                    Language::Th => "เกิดข้อผิดพลาดบางอย่าง",
                    Language::En => "Something was wrong.",
                },
            };
        };

        ErrorMessage {
            status: entry.status,
            code: entry.code,
            message: match language {
                Language::Th => entry.th,
                Language::En => entry.en,
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ErrorCode {}

/// Response language selected by the `accept-language` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Th,
    #[default]
    En,
}

impl Language {
    /// Parse an `accept-language` value by the primary subtag of its first
    /// entry (`th-TH,en;q=0.9` is Thai). Only `th` and `en` are recognised.
    pub fn parse(value: &str) -> Option<Self> {
        let first = value.split(',').next()?;
        let tag = first.split(';').next()?.trim();
        let primary = tag.split(['-', '_']).next()?;
        if primary.eq_ignore_ascii_case("th") {
            Some(Self::Th)
        } else if primary.eq_ignore_ascii_case("en") {
            Some(Self::En)
        } else {
            None
        }
    }

    /// Language for an optional header value; anything unrecognised is English.
    pub fn from_header(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }
}

/// A resolved error: HTTP status, public code and localized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: &'static str,
}

struct Entry {
    code: ErrorCode,
    status: StatusCode,
    en: &'static str,
    th: &'static str,
}

fn entry(code: ErrorCode) -> Option<Entry> {
    let (public, status, en, th) = match code {
        ErrorCode::InternalServerError => (
            ErrorCode::InternalServerError,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "ระบบขัดข้อง",
        ),
        ErrorCode::DataNotFound => (
            ErrorCode::DataNotFound,
            StatusCode::NOT_FOUND,
            "Data not found",
            "ไม่พบข้อมูล",
        ),
        ErrorCode::BadRequest => (
            ErrorCode::BadRequest,
            StatusCode::BAD_REQUEST,
            "Bad request",
            "คำขอไม่ถูกต้อง",
        ),
        ErrorCode::Conflict => (
            ErrorCode::Conflict,
            StatusCode::CONFLICT,
            "Conflict",
            "ข้อมูลขัดแย้งในระบบ",
        ),
        ErrorCode::Unauthorized => (
            ErrorCode::Unauthorized,
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "สิทธิ์การเข้าใช้งานหมดอายุ",
        ),
        ErrorCode::Forbidden => (
            ErrorCode::Forbidden,
            StatusCode::FORBIDDEN,
            "Forbidden",
            "ไม่มีสิทธิ์เข้าถึง",
        ),
        // Surfaces as a generic internal error.
        ErrorCode::DatabaseConnectionFailed => (
            ErrorCode::InternalServerError,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database connection failed.",
            "ไม่สามารถเชื่อมต่อฐานข้อมูล",
        ),
        ErrorCode::InvalidLanguage => (
            ErrorCode::BadRequest,
            StatusCode::BAD_REQUEST,
            "Invalid accept language",
            "ภาษาที่ส่งมาไม่ถูกต้อง",
        ),
        ErrorCode::TechnicalError => return None,
    };

    Some(Entry {
        code: public,
        status,
        en,
        th,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_status_and_text() {
        let m = ErrorCode::DataNotFound.message(Language::En);
        assert_eq!(m.status, StatusCode::NOT_FOUND);
        assert_eq!(m.code, ErrorCode::DataNotFound);
        assert_eq!(m.message, "Data not found");

        let m = ErrorCode::InternalServerError.message(Language::Th);
        assert_eq!(m.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(m.message, "ระบบขัดข้อง");

        let m = ErrorCode::BadRequest.message(Language::Th);
        assert_eq!(m.status, StatusCode::BAD_REQUEST);
        assert_eq!(m.message, "คำขอไม่ถูกต้อง");

        let m = ErrorCode::Conflict.message(Language::En);
        assert_eq!(m.status, StatusCode::CONFLICT);
        assert_eq!(m.message, "Conflict");
    }

    #[test]
    fn aliased_codes_report_their_public_code() {
        let m = ErrorCode::DatabaseConnectionFailed.message(Language::En);
        assert_eq!(m.code, ErrorCode::InternalServerError);
        assert_eq!(m.message, "Database connection failed.");

        let m = ErrorCode::InvalidLanguage.message(Language::En);
        assert_eq!(m.code, ErrorCode::BadRequest);
        assert_eq!(m.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn untranslated_code_falls_back_to_500() {
        let m = ErrorCode::TechnicalError.message(Language::En);
        assert_eq!(m.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(m.code, ErrorCode::InternalServerError);
        assert_eq!(m.message, "Something was wrong.");

        let m = ErrorCode::TechnicalError.message(Language::Th);
        assert_eq!(m.message, "เกิดข้อผิดพลาดบางอย่าง");
    }

    #[test]
    fn language_from_header() {
        assert_eq!(Language::from_header(Some("th")), Language::Th);
        assert_eq!(Language::from_header(Some(" TH ")), Language::Th);
        assert_eq!(Language::from_header(Some("en")), Language::En);
        assert_eq!(Language::from_header(Some("fr")), Language::En);
        assert_eq!(Language::from_header(None), Language::En);
        assert_eq!(Language::parse("de"), None);
    }

    #[test]
    fn language_uses_primary_subtag_of_first_entry() {
        assert_eq!(Language::parse("th-TH"), Some(Language::Th));
        assert_eq!(Language::parse("th_TH"), Some(Language::Th));
        assert_eq!(Language::parse("th,en;q=0.9"), Some(Language::Th));
        assert_eq!(Language::parse("th;q=0.8, en"), Some(Language::Th));
        assert_eq!(Language::parse("en-US,th;q=0.5"), Some(Language::En));
        assert_eq!(Language::parse("fr-FR,th;q=0.9"), None);
        assert_eq!(Language::parse("*"), None);
        assert_eq!(Language::parse(""), None);
        assert_eq!(Language::from_header(Some("th-TH,th;q=0.9")), Language::Th);
    }

    #[test]
    fn codes_serialize_in_wire_form() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::DataNotFound).unwrap(),
            "\"DATA_NOT_FOUND\""
        );
        assert_eq!(ErrorCode::InternalServerError.to_string(), "INTERNAL_SERVER_ERROR");
    }
}
