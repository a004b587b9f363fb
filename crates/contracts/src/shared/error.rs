use serde::{Deserialize, Serialize};

/// Результат вызова внешнего API, переданного в хук
pub type ApiResult<T = serde_json::Value> = Result<T, CrudError>;

/// Категория сбоя CRUD-операции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudErrorKind {
    /// Форма не прошла проверку, отправка заблокирована
    Validation,
    /// Пользователь отклонил подтверждение
    Cancelled,
    /// Внешний API вернул ошибку
    Api,
    /// Не настроен обязательный API или коллаборатор
    Configuration,
}

impl CrudErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            CrudErrorKind::Validation => "VALIDATION_ERROR",
            CrudErrorKind::Cancelled => "CANCELLED",
            CrudErrorKind::Api => "API_ERROR",
            CrudErrorKind::Configuration => "CONFIGURATION_ERROR",
        }
    }
}

/// Ошибка CRUD-операции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudError {
    pub kind: CrudErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl CrudError {
    pub fn new(kind: CrudErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CrudErrorKind::Validation, message)
    }

    pub fn cancelled() -> Self {
        Self::new(CrudErrorKind::Cancelled, "Операция отменена пользователем")
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(CrudErrorKind::Api, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(CrudErrorKind::Configuration, message)
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == CrudErrorKind::Cancelled
    }
}

impl std::fmt::Display for CrudError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for CrudError {}

// Строковые ошибки транспорта считаются сбоем API
impl From<String> for CrudError {
    fn from(message: String) -> Self {
        CrudError::api(message)
    }
}

impl From<&str> for CrudError {
    fn from(message: &str) -> Self {
        CrudError::api(message)
    }
}

impl From<anyhow::Error> for CrudError {
    fn from(err: anyhow::Error) -> Self {
        CrudError::api(err.to_string())
    }
}

impl From<serde_json::Error> for CrudError {
    fn from(err: serde_json::Error) -> Self {
        CrudError::api("Некорректный формат данных").with_details(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_details() {
        let err = CrudError::configuration("Удаление не настроено").with_details("deleteApi");
        assert_eq!(
            err.to_string(),
            "[CONFIGURATION_ERROR] Удаление не настроено: deleteApi"
        );
    }

    #[test]
    fn test_from_anyhow_is_api_failure() {
        let err: CrudError = anyhow::anyhow!("connection refused").into();
        assert_eq!(err.kind, CrudErrorKind::Api);
        assert_eq!(err.message, "connection refused");
    }

    #[test]
    fn test_cancelled() {
        assert!(CrudError::cancelled().is_cancelled());
        assert!(!CrudError::api("x").is_cancelled());
    }
}
