//! Ошибки просмотрщика.

use thiserror::Error;

/// Результат операций просмотрщика
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Ошибки построения слоёв и их представлений
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Ошибка тензорной операции
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Несовпадение размерностей
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Номер нейрона вне слоя
    #[error("Unit {unit} out of range, layer has {num_unit} units")]
    UnitOutOfRange { unit: usize, num_unit: usize },

    /// Слой не известен карте активаций
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// У слоя нет весов
    #[error("Layer '{0}' has no weights")]
    NoWeights(String),

    /// Неверная конфигурация (тема, шкалы цвета)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ViewerError {
    pub fn shape_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Проверка номера нейрона
    pub fn check_unit(unit: usize, num_unit: usize) -> ViewerResult<()> {
        if unit < num_unit {
            Ok(())
        } else {
            Err(Self::UnitOutOfRange { unit, num_unit })
        }
    }
}
