use crate::*;

/// Общее состояние слоя просмотрщика
#[derive(Clone, Debug)]
pub struct LayerBase {
    pub name: String,
    /// Количество нейронов слоя
    pub num_unit: usize,
    /// Веса (нейроны предыдущего слоя, нейроны слоя), F32
    pub weights: Option<Tensor>,
    /// Градиенты, та же размерность что у весов
    pub grads: Option<Tensor>,
    pub theme: Theme,
    pub unit_names: Option<Vec<String>>,
    /// Положение слоя по x
    pub xoffset: f32,
    /// Расстояние между нейронами по y
    pub spacing_y: f32,
}

impl LayerBase {
    /// Конструктор; проверяет согласованность градиентов и имён нейронов
    pub fn new(
        name: impl Into<String>,
        num_unit: usize,
        weights: Option<Tensor>,
        grads: Option<Tensor>,
        theme: Theme,
        unit_names: Option<Vec<String>>,
    ) -> ViewerResult<Self> {
        let weights = weights.map(|w| w.to_dtype(DType::F32)).transpose()?;
        let grads = grads.map(|g| g.to_dtype(DType::F32)).transpose()?;
        if let Some(g) = grads.as_ref() {
            let expected = weights.as_ref().map(|w| w.dims().to_vec()).unwrap_or_default();
            if g.dims() != expected.as_slice() {
                return Err(ViewerError::shape_mismatch(
                    format!("gradients {expected:?}"),
                    format!("{:?}", g.dims()),
                ));
            }
        }
        if let Some(names) = unit_names.as_ref() {
            if names.len() != num_unit {
                return Err(ViewerError::shape_mismatch(
                    format!("{num_unit} unit names"),
                    format!("{}", names.len()),
                ));
            }
        }
        Ok(Self {
            name: name.into(),
            num_unit,
            weights,
            grads,
            theme,
            unit_names,
            xoffset: 0.0,
            spacing_y: 1.0,
        })
    }

    /// Размещение слоя на схеме
    pub fn set_coordinates(&mut self, xoffset: f32, spacing_y: f32) {
        self.xoffset = xoffset;
        self.spacing_y = spacing_y;
    }

    /// Координаты нейронов: столбец x = xoffset, по y - с шагом spacing_y, центр в 0
    pub fn get_positions(&self) -> (Vec<f32>, Vec<f32>) {
        let center = self.num_unit.saturating_sub(1) as f32 / 2.0;
        let x = vec![self.xoffset; self.num_unit];
        let y = (0..self.num_unit)
            .map(|i| (i as f32 - center) * self.spacing_y)
            .collect();
        (x, y)
    }

    /// Подписи нейронов: имена, если заданы, иначе номера
    pub fn get_unit_labels(&self) -> Vec<String> {
        match self.unit_names.as_ref() {
            Some(names) => names.clone(),
            None => (0..self.num_unit).map(|i| i.to_string()).collect(),
        }
    }

    /// Коэффициенты нейрона unit (столбец матрицы)
    pub fn unit_column(&self, matrix: &Tensor, unit: usize) -> ViewerResult<Vec<f32>> {
        ViewerError::check_unit(unit, self.num_unit)?;
        Ok(matrix.narrow(1, unit, 1)?.flatten_all()?.to_vec1()?)
    }
}

/// Слой просмотрщика; у каждого вида слоя своя реализация
pub trait Layer {
    fn base(&self) -> &LayerBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn num_unit(&self) -> usize {
        self.base().num_unit
    }

    fn get_positions(&self) -> (Vec<f32>, Vec<f32>) {
        self.base().get_positions()
    }

    fn get_unit_labels(&self) -> Vec<String> {
        self.base().get_unit_labels()
    }

    /// Нейроны слоя на общей фигуре
    fn plot(&self, fig: &mut Figure);

    /// Сильнейшие связи с предыдущим слоем: (затронутые нейроны, линии).
    /// Слои без весов связей не имеют.
    fn plot_topn_connections(
        &self,
        _backward_layer: &dyn Layer,
        _topn: usize,
        _active_units: &[usize],
        _direction: Direction,
    ) -> ViewerResult<(Vec<usize>, Vec<Shape>)> {
        Ok((Vec::new(), Vec::new()))
    }

    fn get_layer_title(&self) -> Element;

    /// Вкладки слоя вместе с содержимым активной вкладки
    fn get_layer_tabs(&self, previous_active: Option<&str>) -> ViewerResult<Tabs>;

    fn get_layer_tab_content(&self, _active_tab: &str) -> ViewerResult<Element> {
        Ok(Element::empty())
    }

    fn get_unit_tabs(&self, unit_idx: usize, previous_active: Option<&str>) -> Tabs;

    fn get_unit_tab_content(&self, _unit_idx: usize, _active_tab: &str) -> ViewerResult<Element> {
        Ok(Element::empty())
    }

    /// Карта активаций слоя для входного образца
    fn get_activation_map(
        &self,
        _mapper: &dyn ActivationMapper,
        _input: &Tensor,
        _unit_idx: usize,
    ) -> ViewerResult<Element> {
        Ok(Element::empty())
    }
}
