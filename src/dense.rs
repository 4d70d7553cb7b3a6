use crate::*;

const TABS: [(&str, &str); 3] = [("info", "Info"), ("weights", "Weights"), ("grads", "Gradients")];

/// Полносвязный слой из num_unit нейронов.
/// Веса - двумерный тензор: (нейроны предыдущего слоя, нейроны слоя)
#[derive(Clone, Debug)]
pub struct Dense {
    base: LayerBase,
}

impl Dense {
    /// Конструктор
    pub fn new(
        name: impl Into<String>,
        num_unit: usize,
        weights: Tensor,
        grads: Option<Tensor>,
        theme: Theme,
        unit_names: Option<Vec<String>>,
    ) -> ViewerResult<Self> {
        if weights.rank() != 2 {
            return Err(ViewerError::shape_mismatch("2D weight tensor", format!("{:?}", weights.dims())));
        }
        let (_, cols) = weights.dims2()?;
        if cols != num_unit {
            return Err(ViewerError::shape_mismatch(
                format!("{num_unit} weight columns"),
                format!("{cols}"),
            ));
        }
        let base = LayerBase::new(name, num_unit, Some(weights), grads, theme, unit_names)?;
        Ok(Self { base })
    }

    /// Слой со случайными весами из [-1, 1]
    pub fn random(
        rng: &mut dyn RngCore,
        name: impl Into<String>,
        prev_units: usize,
        num_unit: usize,
        theme: Theme,
    ) -> ViewerResult<Self> {
        let w: Vec<f32> = (0..prev_units * num_unit)
            .map(|_| rng.gen_range(-1.0..=1.0))
            .collect();
        let weights = Tensor::from_vec(w, (prev_units, num_unit), &Device::Cpu)?;
        Self::new(name, num_unit, weights, None, theme, None)
    }

    pub fn set_coordinates(&mut self, xoffset: f32, spacing_y: f32) {
        self.base.set_coordinates(xoffset, spacing_y);
    }

    fn weights(&self) -> ViewerResult<&Tensor> {
        self.base
            .weights
            .as_ref()
            .ok_or_else(|| ViewerError::NoWeights(self.base.name.clone()))
    }

    /// Гистограмма коэффициентов одного нейрона
    fn unit_histogram(&self, values: Vec<f32>, color_scale: &ColorScale, title: &str) -> Element {
        let marker = color_scale.as_marker(&values);
        let mut fig = Figure::new(vec![Trace::Histogram(Histogram { x: values, marker })]);
        fig.bottom_panel_layout(&self.base.theme, title, "Amplitude", None);
        Element::Graph(Graph::new("bottom-unit-figure", fig))
    }
}

impl Layer for Dense {
    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn plot(&self, fig: &mut Figure) {
        let (x, y) = self.get_positions();
        fig.add_trace(Trace::Scatter(Scatter {
            x,
            y,
            hovertext: self.get_unit_labels(),
            mode: "markers".to_string(),
            hoverinfo: "text".to_string(),
            name: self.base.name.clone(),
        }));
    }

    fn plot_topn_connections(
        &self,
        backward_layer: &dyn Layer,
        topn: usize,
        active_units: &[usize],
        direction: Direction,
    ) -> ViewerResult<(Vec<usize>, Vec<Shape>)> {
        let Some(weights) = self.base.weights.as_ref() else {
            return Ok((Vec::new(), Vec::new()));
        };

        //сильнейших не больше, чем нейронов на противоположной стороне
        let opposing = match direction {
            Direction::Backward => backward_layer.num_unit(),
            Direction::Forward => self.base.num_unit,
        };
        let mut projection = project_connections(Some(weights), active_units, topn.min(opposing), direction)?;

        //после Flatten число нейронов предыдущего слоя может не совпадать со строками весов
        let dropped = projection.retain_within(backward_layer.num_unit(), self.base.num_unit, direction);
        if dropped > 0 {
            warn!(
                layer = %self.base.name,
                backward = %backward_layer.name(),
                backward_units = backward_layer.num_unit(),
                dropped,
                "connections outside backward layer"
            );
        }
        let theme = &self.base.theme;
        let shapes = Connector::new(
            backward_layer,
            self,
            &projection.connectors,
            &theme.weight_color_scale,
            theme.connector_width,
        )
        .get_shapes()?;
        Ok((projection.units, shapes))
    }

    fn get_layer_title(&self) -> Element {
        Element::H5(format!("Dense '{}'", self.base.name))
    }

    fn get_layer_tabs(&self, previous_active: Option<&str>) -> ViewerResult<Tabs> {
        let tabs = Tabs::make("bottom-layer", &TABS, previous_active);
        let content = self.get_layer_tab_content(&tabs.value)?;
        Ok(tabs.with_content(content))
    }

    fn get_layer_tab_content(&self, active_tab: &str) -> ViewerResult<Element> {
        trace!(layer = %self.base.name, active_tab, "layer tab");
        let theme = &self.base.theme;
        let labels = self.get_unit_labels();
        match active_tab {
            "info" => Ok(Element::div(vec![
                Element::Ul(vec![format!("{} units", self.base.num_unit)]),
                Element::hidden(vec![Element::Graph(Graph::placeholder("bottom-layer-figure"))]),
            ])),
            "weights" => {
                let fig = layer_minimax_figure(self.weights()?, &labels, theme, &theme.weight_color_scale)?;
                Ok(Element::Graph(Graph::new("bottom-layer-figure", fig)))
            }
            "grads" => match self.base.grads.as_ref() {
                None => Ok(Element::no_gradients()),
                Some(grads) => {
                    let fig = layer_minimax_figure(grads, &labels, theme, &theme.gradient_color_scale)?;
                    Ok(Element::Graph(Graph::new("bottom-layer-figure", fig)))
                }
            },
            _ => Ok(Element::empty()),
        }
    }

    fn get_unit_tabs(&self, _unit_idx: usize, previous_active: Option<&str>) -> Tabs {
        Tabs::make("bottom-unit", &TABS, previous_active)
    }

    fn get_unit_tab_content(&self, unit_idx: usize, active_tab: &str) -> ViewerResult<Element> {
        trace!(layer = %self.base.name, unit_idx, active_tab, "unit tab");
        let theme = &self.base.theme;
        let w = self.base.unit_column(self.weights()?, unit_idx)?;
        match active_tab {
            "info" => Ok(Element::Ul(vec![format!("{} coefficients", w.len())])),
            "weights" => Ok(self.unit_histogram(w, &theme.weight_color_scale, "Weight histogram")),
            "grads" => match self.base.grads.as_ref() {
                None => Ok(Element::no_gradients()),
                Some(grads) => {
                    let g = self.base.unit_column(grads, unit_idx)?;
                    Ok(self.unit_histogram(g, &theme.gradient_color_scale, "Gradients histogram"))
                }
            },
            _ => Ok(Element::empty()),
        }
    }

    fn get_activation_map(
        &self,
        mapper: &dyn ActivationMapper,
        input: &Tensor,
        _unit_idx: usize,
    ) -> ViewerResult<Element> {
        let activation = mapper.get_activation(input, self)?;
        if activation.len() != self.base.num_unit {
            return Err(ViewerError::shape_mismatch(
                format!("{} activations", self.base.num_unit),
                format!("{}", activation.len()),
            ));
        }

        let theme = &self.base.theme;
        let bar = Bar {
            marker: theme.activation_color_scale.as_marker(&activation),
            y: (0..activation.len()).map(|i| i as f32).collect(),
            x: activation,
            base: None,
            orientation: Some("h".to_string()),
            hovertext: self.get_unit_labels(),
            hoverinfo: "text".to_string(),
        };
        let mut fig = Figure::new(vec![Trace::Bar(bar)]);
        fig.bottom_panel_layout(theme, "Layer activation", "Amplitude", Some("Unit"));
        Ok(Element::div(vec![Element::Graph(Graph::new("bottom-activation", fig))]))
    }
}
