//! Элементы панели (заголовки, списки, графики, вкладки) для оболочки дашборда.

use serde::Serialize;

use crate::*;

/// Настройки отображения графика
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    pub scroll_zoom: bool,
    pub display_mode_bar: bool,
    pub displaylogo: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            scroll_zoom: false,
            display_mode_bar: false,
            displaylogo: false,
        }
    }
}

/// График с идентификатором для обратных вызовов оболочки
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Graph {
    pub id: String,
    pub animate: bool,
    pub config: GraphConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<Figure>,
}

impl Graph {
    pub fn new(id: &str, figure: Figure) -> Self {
        Self {
            id: id.to_string(),
            animate: false,
            config: GraphConfig::default(),
            figure: Some(figure),
        }
    }

    /// Пустой график (держит id в разметке)
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            animate: false,
            config: GraphConfig::default(),
            figure: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tab {
    pub value: String,
    pub label: String,
}

/// Панель вкладок
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tabs {
    pub id: String,
    pub tabs: Vec<Tab>,
    /// Активная вкладка
    pub value: String,
    /// Начальное содержимое активной вкладки
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<Element>>,
}

impl Tabs {
    /// Панель вкладок; активной остаётся предыдущая, если она есть в списке, иначе первая
    pub fn make(id: &str, tabs: &[(&str, &str)], previous_active: Option<&str>) -> Self {
        let value = previous_active
            .filter(|prev| tabs.iter().any(|(key, _)| key == prev))
            .or_else(|| tabs.first().map(|(key, _)| *key))
            .unwrap_or_default()
            .to_string();
        Self {
            id: id.to_string(),
            tabs: tabs
                .iter()
                .map(|(key, label)| Tab { value: key.to_string(), label: label.to_string() })
                .collect(),
            value,
            content: None,
        }
    }

    pub fn with_content(mut self, content: Element) -> Self {
        self.content = Some(Box::new(content));
        self
    }
}

/// Элемент разметки
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "props")]
pub enum Element {
    H5(String),
    Ul(Vec<String>),
    P(String),
    Graph(Graph),
    Div { children: Vec<Element>, hidden: bool },
    Tabs(Tabs),
}

impl Element {
    pub fn div(children: Vec<Element>) -> Self {
        Element::Div { children, hidden: false }
    }

    pub fn hidden(children: Vec<Element>) -> Self {
        Element::Div { children, hidden: true }
    }

    pub fn empty() -> Self {
        Element::div(Vec::new())
    }

    /// Сообщение об отсутствии градиентов
    pub fn no_gradients() -> Self {
        Element::P("No gradients available".to_string())
    }
}

/// Фигура min/max по нейронам: столбец от минимума до максимума коэффициентов нейрона,
/// цвет - по среднему
pub fn layer_minimax_figure(
    matrix: &Tensor,
    unit_labels: &[String],
    theme: &Theme,
    color_scale: &ColorScale,
) -> ViewerResult<Figure> {
    let rows: Vec<Vec<f32>> = matrix.to_vec2()?;
    let summaries = column_summaries(&rows);
    if summaries.len() != unit_labels.len() {
        return Err(ViewerError::shape_mismatch(
            format!("{} unit labels", summaries.len()),
            format!("{}", unit_labels.len()),
        ));
    }

    let means: Vec<f32> = summaries.iter().map(|s| s.mean).collect();
    let hovertext = summaries
        .iter()
        .zip(unit_labels)
        .map(|(s, label)| format!("{label}: {:.4} .. {:.4} (mean {:.4})", s.min, s.max, s.mean))
        .collect();
    let bar = Bar {
        x: (0..summaries.len()).map(|i| i as f32).collect(),
        y: summaries.iter().map(|s| s.max - s.min).collect(),
        base: Some(summaries.iter().map(|s| s.min).collect()),
        orientation: None,
        hovertext,
        hoverinfo: "text".to_string(),
        marker: color_scale.as_marker(&means),
    };

    let mut fig = Figure::new(vec![Trace::Bar(bar)]);
    fig.bottom_panel_layout(theme, "Min/max per unit", "Unit", Some("Amplitude"));
    Ok(fig)
}
