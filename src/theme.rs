//! Тема оформления: шкалы цвета и параметры фигур.
//! Передаётся в слой явно и не меняется после создания.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::*;

/// Цвет RGB, компоненты в [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Разбор "#rrggbb" или "rrggbb"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        })
    }

    /// Линейная интерполяция
    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Строка для plotly: "rgb(r,g,b)"
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgb({},{},{})", c(self.r), c(self.g), c(self.b))
    }
}

/// Шкала цвета: опорные точки (позиция в [0, 1], "#rrggbb").
/// symmetric = диапазон [-max|v|, max|v|] (веса, градиенты), иначе [min, max].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub stops: Vec<(f32, String)>,
    #[serde(default)]
    pub symmetric: bool,
}

impl ColorScale {
    pub fn new(stops: &[(f32, &str)], symmetric: bool) -> Self {
        Self {
            stops: stops.iter().map(|(p, c)| (*p, c.to_string())).collect(),
            symmetric,
        }
    }

    /// Красный - белый - синий, для весов
    pub fn red_blue() -> Self {
        Self::new(&[(0.0, "#ca0020"), (0.5, "#f7f7f7"), (1.0, "#0571b0")], true)
    }

    /// Розовый - белый - зелёный, для градиентов
    pub fn pink_green() -> Self {
        Self::new(&[(0.0, "#d01c8b"), (0.5, "#f7f7f7"), (1.0, "#4dac26")], true)
    }

    /// Viridis, для активаций
    pub fn viridis() -> Self {
        Self::new(
            &[(0.0, "#440154"), (0.25, "#3b528b"), (0.5, "#21918c"), (0.75, "#5ec962"), (1.0, "#fde725")],
            false,
        )
    }

    /// Проверка опорных точек
    pub fn validate(&self) -> ViewerResult<()> {
        if self.stops.len() < 2 {
            return Err(ViewerError::invalid_config("color scale needs at least two stops"));
        }
        for (pos, color) in &self.stops {
            if !(0.0..=1.0).contains(pos) {
                return Err(ViewerError::invalid_config(format!("color stop {pos} out of [0, 1]")));
            }
            if Rgb::from_hex(color).is_none() {
                return Err(ViewerError::invalid_config(format!("bad color '{color}'")));
            }
        }
        if self.stops.windows(2).any(|w| w[0].0 > w[1].0) {
            return Err(ViewerError::invalid_config("color stops must be sorted"));
        }
        Ok(())
    }

    /// Диапазон значений для набора данных
    pub fn range(&self, values: &[f32]) -> (f32, f32) {
        if values.is_empty() {
            return (0.0, 0.0);
        }
        if self.symmetric {
            let m = values.iter().map(|v| v.abs()).fold(0.0f32, f32::max);
            (-m, m)
        } else {
            let min = values.iter().copied().fold(f32::INFINITY, f32::min);
            let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            (min, max)
        }
    }

    /// Цвет значения в диапазоне (cmin, cmax)
    pub fn color(&self, value: f32, (cmin, cmax): (f32, f32)) -> String {
        let t = if (cmax - cmin).abs() < f32::EPSILON {
            0.5
        } else {
            ((value - cmin) / (cmax - cmin)).clamp(0.0, 1.0)
        };
        self.sample(t).to_css()
    }

    /// Цвет в точке t шкалы
    fn sample(&self, t: f32) -> Rgb {
        let points: Vec<(f32, Rgb)> = self.stops
            .iter()
            .filter_map(|(p, c)| Rgb::from_hex(c).map(|rgb| (*p, rgb)))
            .collect();
        match points.as_slice() {
            [] => Rgb { r: 1.0, g: 1.0, b: 1.0 },
            [(_, only)] => *only,
            _ => {
                for w in points.windows(2) {
                    let ((p0, c0), (p1, c1)) = (w[0], w[1]);
                    if t >= p0 && t <= p1 {
                        let k = if (p1 - p0).abs() < 1e-6 { 0.0 } else { (t - p0) / (p1 - p0) };
                        return c0.lerp(&c1, k);
                    }
                }
                //за пределами опорных точек
                if t < points[0].0 { points[0].1 } else { points[points.len() - 1].1 }
            }
        }
    }

    /// Маркер plotly: значения + шкала + диапазон
    pub fn as_marker(&self, values: &[f32]) -> Marker {
        let (cmin, cmax) = self.range(values);
        Marker {
            color: Some(MarkerColor::Values(values.to_vec())),
            colorscale: Some(self.plotly_scale()),
            cmin: Some(cmin),
            cmax: Some(cmax),
            size: None,
        }
    }

    /// Шкала в формате plotly: [[0.0, "rgb(..)"], ...]
    pub fn plotly_scale(&self) -> Vec<(f32, String)> {
        self.stops
            .iter()
            .map(|(p, c)| (*p, Rgb::from_hex(c).map(|rgb| rgb.to_css()).unwrap_or_else(|| c.clone())))
            .collect()
    }
}

/// Поля фигуры
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

/// Тема оформления
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Шаблон plotly
    pub plotly: String,
    pub weight_color_scale: ColorScale,
    pub gradient_color_scale: ColorScale,
    pub activation_color_scale: ColorScale,
    /// Поля фигур нижней панели
    pub bottom_figure_margins: Margins,
    /// Толщина линий связей
    pub connector_width: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            plotly: "plotly_dark".to_string(),
            weight_color_scale: ColorScale::red_blue(),
            gradient_color_scale: ColorScale::pink_green(),
            activation_color_scale: ColorScale::viridis(),
            bottom_figure_margins: Margins { l: 10, r: 10, t: 35, b: 10 },
            connector_width: 1.0,
        }
    }
}

impl Theme {
    /// Тема из JSON (отсутствующие поля - по умолчанию)
    pub fn from_json_str(json: &str) -> ViewerResult<Self> {
        let theme: Theme = serde_json::from_str(json)?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ViewerResult<()> {
        self.weight_color_scale.validate()?;
        self.gradient_color_scale.validate()?;
        self.activation_color_scale.validate()?;
        if self.connector_width.is_nan() || self.connector_width <= 0.0 {
            return Err(ViewerError::invalid_config("connector_width must be positive"));
        }
        Ok(())
    }
}
