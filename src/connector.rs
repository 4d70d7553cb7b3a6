use crate::*;

/// Направление просмотра связей
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Активные нейроны - в этом слое, ищем сильнейшие входы из предыдущего слоя
    Backward,
    /// Активные нейроны - в предыдущем слое, ищем сильнейшие выходы в этот слой
    Forward,
}

/// Связи в виде параллельных последовательностей:
/// k-я связь = (from_indices[k], to_indices[k], values[k])
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorSet {
    pub from_indices: Vec<usize>,
    pub to_indices: Vec<usize>,
    pub values: Vec<f32>,
}

impl ConnectorSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.from_indices
            .iter()
            .zip(&self.to_indices)
            .zip(&self.values)
            .map(|((f, t), v)| (*f, *t, *v))
    }
}

/// Результат проекции сильнейших связей
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    /// Затронутые нейроны выбираемой стороны (по возрастанию, без повторов)
    pub units: Vec<usize>,
    pub connectors: ConnectorSet,
}

impl Projection {
    /// Оставляет связи с концами внутри слоёв из from_units и to_units нейронов.
    /// Возвращает число отброшенных связей.
    pub fn retain_within(&mut self, from_units: usize, to_units: usize, direction: Direction) -> usize {
        let before = self.connectors.len();
        let kept: Vec<(usize, usize, f32)> = self
            .connectors
            .iter()
            .filter(|&(from, to, _)| from < from_units && to < to_units)
            .collect();
        self.connectors = ConnectorSet {
            from_indices: kept.iter().map(|e| e.0).collect(),
            to_indices: kept.iter().map(|e| e.1).collect(),
            values: kept.iter().map(|e| e.2).collect(),
        };
        let bound = match direction {
            Direction::Backward => from_units,
            Direction::Forward => to_units,
        };
        self.units.retain(|&u| u < bound);
        before - self.connectors.len()
    }
}

/// Сильнейшие связи активных нейронов.
/// weights - (нейроны предыдущего слоя, нейроны этого слоя); без весов - пустой результат.
/// Связи раскладываются по рангам: для каждого ранга - по всем активным нейронам,
/// активный нейрон повторяется на каждый ранг.
pub fn project_connections(
    weights: Option<&Tensor>,
    active_units: &[usize],
    topn: usize,
    direction: Direction,
) -> ViewerResult<Projection> {
    let Some(weights) = weights else {
        return Ok(Projection::default());
    };

    //столбцы матрицы - нейроны стороны активных
    let matrix = match direction {
        Direction::Backward => weights.clone(),
        Direction::Forward => weights.t()?.contiguous()?,
    };
    let (_, cols) = matrix.dims2()?;
    for &unit in active_units {
        ViewerError::check_unit(unit, cols)?;
    }
    if active_units.is_empty() {
        return Ok(Projection::default());
    }

    let ids: Vec<u32> = active_units.iter().map(|&u| u as u32).collect();
    let ids = Tensor::new(ids.as_slice(), matrix.device())?;
    let slice: Vec<Vec<f32>> = matrix.index_select(&ids, 1)?.to_dtype(DType::F32)?.to_vec2()?;
    let strongest = get_strongest(&slice, topn);

    let mut connectors = ConnectorSet::default();
    let mut selected: Vec<usize> = Vec::new();
    for rank in 0..strongest.ranks() {
        let indices = strongest.indices(rank);
        match direction {
            Direction::Backward => {
                connectors.from_indices.extend(&indices);
                connectors.to_indices.extend_from_slice(active_units);
            }
            Direction::Forward => {
                connectors.from_indices.extend_from_slice(active_units);
                connectors.to_indices.extend(&indices);
            }
        }
        connectors.values.extend(strongest.values(rank));
        selected.extend(indices);
    }

    let units: Vec<usize> = selected.into_iter().sorted().dedup().collect();
    debug!(?direction, edges = connectors.len(), units = units.len(), "strongest connections");
    Ok(Projection { units, connectors })
}

/// Линии связей между нейронами двух слоёв
pub struct Connector<'a> {
    from_layer: &'a dyn Layer,
    to_layer: &'a dyn Layer,
    connectors: &'a ConnectorSet,
    color_scale: &'a ColorScale,
    width: f32,
}

impl<'a> Connector<'a> {
    pub fn new(
        from_layer: &'a dyn Layer,
        to_layer: &'a dyn Layer,
        connectors: &'a ConnectorSet,
        color_scale: &'a ColorScale,
        width: f32,
    ) -> Self {
        Self { from_layer, to_layer, connectors, color_scale, width }
    }

    /// Фигуры-линии, цвет по значению в симметричном диапазоне
    pub fn get_shapes(&self) -> ViewerResult<Vec<Shape>> {
        let (x_from, y_from) = self.from_layer.get_positions();
        let (x_to, y_to) = self.to_layer.get_positions();
        let m = self.connectors.values.iter().map(|v| v.abs()).fold(0.0f32, f32::max);
        let range = (-m, m);

        self.connectors
            .iter()
            .map(|(from, to, value)| {
                ViewerError::check_unit(from, x_from.len())?;
                ViewerError::check_unit(to, x_to.len())?;
                Ok(Shape::line(
                    (x_from[from], y_from[from]),
                    (x_to[to], y_to[to]),
                    self.color_scale.color(value, range),
                    self.width,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tensor {
        Tensor::new(&[[0.1f32, 0.9], [0.5, 0.2], [0.8, 0.4]], &Device::Cpu).unwrap()
    }

    #[test]
    fn backward() {
        let p = project_connections(Some(&sample()), &[0, 1], 2, Direction::Backward).unwrap();
        //ранг 0, затем ранг 1
        assert_eq!(p.connectors.from_indices, vec![2, 0, 1, 2]);
        assert_eq!(p.connectors.to_indices, vec![0, 1, 0, 1]);
        assert_eq!(p.connectors.values, vec![0.8, 0.9, 0.5, 0.4]);
        assert_eq!(p.units, vec![0, 1, 2]);
    }

    #[test]
    fn backward_single_active() {
        let p = project_connections(Some(&sample()), &[1], 1, Direction::Backward).unwrap();
        assert_eq!(p.connectors.iter().collect::<Vec<_>>(), vec![(0, 1, 0.9)]);
        assert_eq!(p.units, vec![0]);
    }

    #[test]
    fn forward() {
        //активные - нейроны предыдущего слоя (строки), ищем среди 2 нейронов этого слоя
        let p = project_connections(Some(&sample()), &[0, 2], 5, Direction::Forward).unwrap();
        assert_eq!(p.connectors.len(), 4);
        assert_eq!(p.connectors.from_indices, vec![0, 2, 0, 2]);
        assert_eq!(p.connectors.to_indices, vec![1, 0, 0, 1]);
        assert_eq!(p.connectors.values, vec![0.9, 0.8, 0.1, 0.4]);
        assert_eq!(p.units, vec![0, 1]);
    }

    #[test]
    fn forward_is_backward_of_transpose() {
        let w = sample();
        let wt = w.t().unwrap().contiguous().unwrap();
        for topn in 1..=3 {
            let f = project_connections(Some(&w), &[1, 2], topn, Direction::Forward).unwrap();
            let b = project_connections(Some(&wt), &[1, 2], topn, Direction::Backward).unwrap();
            assert_eq!(f.units, b.units);
            assert_eq!(f.connectors.values, b.connectors.values);
        }
    }

    #[test]
    fn units_are_distinct_selected() {
        let p = project_connections(Some(&sample()), &[0, 1, 0], 3, Direction::Backward).unwrap();
        let mut expected = p.connectors.from_indices.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(p.units, expected);
        assert_eq!(p.connectors.len(), 9);
    }

    #[test]
    fn retain_within_layers() {
        let mut p = project_connections(Some(&sample()), &[0, 1], 2, Direction::Backward).unwrap();
        //предыдущий слой - 2 нейрона: связи из нейрона 2 отбрасываются
        let dropped = p.retain_within(2, 2, Direction::Backward);
        assert_eq!(dropped, 2);
        assert_eq!(p.connectors.iter().collect::<Vec<_>>(), vec![(0, 1, 0.9), (1, 0, 0.5)]);
        assert_eq!(p.units, vec![0, 1]);
    }

    #[test]
    fn no_weights() {
        let p = project_connections(None, &[0, 1], 3, Direction::Backward).unwrap();
        assert!(p.units.is_empty());
        assert!(p.connectors.is_empty());
    }

    #[test]
    fn empty_active() {
        let p = project_connections(Some(&sample()), &[], 3, Direction::Forward).unwrap();
        assert_eq!(p, Projection::default());
    }

    #[test]
    fn active_out_of_range() {
        let r = project_connections(Some(&sample()), &[2], 1, Direction::Backward);
        assert!(matches!(r, Err(ViewerError::UnitOutOfRange { unit: 2, num_unit: 2 })));
        assert!(project_connections(Some(&sample()), &[2], 1, Direction::Forward).is_ok());
    }
}
