//! Слои просмотрщика нейронных сетей: отображение нейронов, сильнейших связей,
//! вкладок с гистограммами весов/градиентов и карт активаций.
//! Все результаты - сериализуемые описания (plotly/dash совместимые).

pub use std::collections::HashMap;

pub use candle_core::{DType, Device, Tensor};
pub use candle_nn::{seq, Activation, Linear, Module, Sequential};
pub use itertools::Itertools;
pub use rand::{Rng, RngCore};
pub use tracing::{debug, trace, warn};

mod error;
mod theme;
mod figure;
mod widgets;
mod statistics;
mod connector;
mod layer;
mod dense;
mod activation_mapper;

pub use self::error::*;
pub use self::theme::*;
pub use self::figure::*;
pub use self::widgets::*;
pub use self::statistics::*;
pub use self::connector::*;
pub use self::layer::*;
pub use self::dense::*;
pub use self::activation_mapper::*;
