//! Структуры для диагностических сообщений (синтаксис и связывание имён)

use serde::{Deserialize, Serialize};

use crate::core::position::{LineIndex, PackedSpan};

/// Уровень серьезности диагностики
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Hint,
}

/// Местоположение в исходном коде
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl Location {
    pub fn new(file: String, line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self { file, line, column, offset, length }
    }

    /// Location of `span` inside the text indexed by `index`.
    pub fn from_span(file: impl Into<String>, index: &LineIndex, span: PackedSpan) -> Self {
        let pos = index.to_position(span.start);
        Self::new(file.into(), pos.line, pos.column, pos.offset, span.len as usize)
    }
}

/// Детали диагностики
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticDetails {
    /// Найденное значение
    pub found: Option<String>,
    /// Ожидаемое значение
    pub expected: Option<String>,
}

/// Диагностическое сообщение
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub location: Location,
    pub code: String,
    pub message: String,
    pub details: DiagnosticDetails,
}

impl Diagnostic {
    /// Создает новую диагностику
    pub fn new(
        severity: DiagnosticSeverity,
        location: Location,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            location,
            code: code.into(),
            message: message.into(),
            details: DiagnosticDetails::default(),
        }
    }

    pub fn error(location: Location, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, location, code, message)
    }

    /// Добавляет информацию о найденном значении
    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.details.found = Some(found.into());
        self
    }

    /// Добавляет информацию об ожидаемом значении
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.details.expected = Some(expected.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Коды диагностик
pub mod codes {
    /// Синтаксическая ошибка
    pub const SYNTAX_ERROR: &str = "SR001";
    /// Лишние токены после тела функции
    pub const TRAILING_INPUT: &str = "SR002";
    /// Неразрешённое имя
    pub const UNRESOLVED_REFERENCE: &str = "SR003";
    /// Обращение к несуществующему члену класса
    pub const UNKNOWN_MEMBER: &str = "SR004";
}
