//! Описание фигур в формате plotly (данные + оформление + фигуры-линии).

use serde::Serialize;

/// Цвет маркера: один цвет или значения под шкалу
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(String),
    Values(Vec<f32>),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<MarkerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Vec<(f32, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

/// Точки (нейроны слоя)
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub hovertext: Vec<String>,
    pub mode: String,
    pub hoverinfo: String,
    pub name: String,
}

/// Гистограмма
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub x: Vec<f32>,
    pub marker: Marker,
}

/// Столбцы; base - начало столбца (для min/max), orientation "h" - горизонтальные
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Bar {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub x: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    pub hovertext: Vec<String>,
    pub hoverinfo: String,
    pub marker: Marker,
}

/// Трасса фигуры
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(Scatter),
    Histogram(Histogram),
    Bar(Bar),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f32,
}

/// Линия между двумя точками (связь)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub line: Line,
    pub layer: String,
}

impl Shape {
    pub fn line(from: (f32, f32), to: (f32, f32), color: String, width: f32) -> Self {
        Self {
            kind: "line".to_string(),
            x0: from.0,
            y0: from.1,
            x1: to.0,
            y1: to.1,
            line: Line { color, width },
            layer: "below".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

/// Оформление фигуры
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FigureLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<crate::Margins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

/// Фигура: трассы + оформление
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

impl Figure {
    pub fn new(data: Vec<Trace>) -> Self {
        Self {
            data,
            layout: FigureLayout::default(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    pub fn add_shapes(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.layout.shapes.extend(shapes);
    }

    /// Оформление гистограмм и столбцов нижней панели
    pub fn bottom_panel_layout(
        &mut self,
        theme: &crate::Theme,
        title: &str,
        xaxis_title: &str,
        yaxis_title: Option<&str>,
    ) {
        let axis = |text: &str| Axis {
            title: Some(Title { text: text.to_string(), font: None }),
        };
        self.layout.margin = Some(theme.bottom_figure_margins);
        self.layout.title = Some(Title {
            text: title.to_string(),
            font: Some(Font { size: 14 }),
        });
        self.layout.xaxis = Some(axis(xaxis_title));
        self.layout.yaxis = yaxis_title.map(axis);
        self.layout.bargap = Some(0.2);
        self.layout.template = Some(theme.plotly.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trace_tagged_by_type() {
        let trace = Trace::Histogram(Histogram {
            x: vec![0.5],
            marker: Marker::default(),
        });
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value, json!({"type": "histogram", "x": [0.5], "marker": {}}));
    }

    #[test]
    fn shape_serialization() {
        let shape = Shape::line((0.0, 1.0), (2.0, 3.0), "rgb(1,2,3)".to_string(), 1.0);
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(value["x1"], 2.0);
        assert_eq!(value["line"]["color"], "rgb(1,2,3)");
    }

    #[test]
    fn bottom_panel_layout() {
        let theme = crate::Theme::default();
        let mut fig = Figure::new(vec![]);
        fig.bottom_panel_layout(&theme, "Weight histogram", "Amplitude", None);
        let value = serde_json::to_value(&fig).unwrap();
        assert_eq!(value["layout"]["title"]["text"], "Weight histogram");
        assert_eq!(value["layout"]["title"]["font"]["size"], 14);
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], "Amplitude");
        assert!(value["layout"].get("yaxis").is_none());
        assert!(value["layout"].get("shapes").is_none());
        assert_eq!(value["layout"]["template"], "plotly_dark");
    }
}
