use crate::*;

/// Источник активаций слоя для входного образца
pub trait ActivationMapper {
    /// Активации всех нейронов слоя layer, по одной на нейрон
    fn get_activation(&self, input: &Tensor, layer: &dyn Layer) -> ViewerResult<Vec<f32>>;
}

/// Полносвязная ступень сети
#[derive(Clone, Debug)]
pub struct DenseStage {
    /// Имя слоя, по нему ищется ступень
    pub name: String,
    /// Веса (входы, нейроны), F32
    pub weights: Tensor,
    /// Смещения (нейроны)
    pub bias: Option<Tensor>,
    /// Функция активации; None - линейный выход
    pub activation: Option<Activation>,
}

/// Активации по цепочке полносвязных слоёв (candle_nn Linear)
#[derive(Clone, Debug, Default)]
pub struct SequentialActivationMapper {
    stages: Vec<DenseStage>,
}

impl SequentialActivationMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавление ступени; входы ступени должны совпадать с выходами предыдущей
    pub fn push(
        &mut self,
        name: impl Into<String>,
        weights: &Tensor,
        bias: Option<&Tensor>,
        activation: Option<Activation>,
    ) -> ViewerResult<()> {
        let (inputs, units) = weights.dims2()?;
        if let Some(last) = self.stages.last() {
            let (_, last_units) = last.weights.dims2()?;
            if last_units != inputs {
                return Err(ViewerError::shape_mismatch(
                    format!("{last_units} stage inputs"),
                    format!("{inputs}"),
                ));
            }
        }
        let bias = match bias {
            Some(b) => {
                if b.elem_count() != units {
                    return Err(ViewerError::shape_mismatch(
                        format!("{units} biases"),
                        format!("{}", b.elem_count()),
                    ));
                }
                Some(b.flatten_all()?.to_dtype(DType::F32)?)
            }
            None => None,
        };
        self.stages.push(DenseStage {
            name: name.into(),
            weights: weights.to_dtype(DType::F32)?,
            bias,
            activation,
        });
        Ok(())
    }

    /// Ступень из весов слоя просмотрщика
    pub fn push_layer(
        &mut self,
        layer: &dyn Layer,
        bias: Option<&Tensor>,
        activation: Option<Activation>,
    ) -> ViewerResult<()> {
        let weights = layer
            .base()
            .weights
            .as_ref()
            .ok_or_else(|| ViewerError::NoWeights(layer.name().to_string()))?;
        self.push(layer.name(), weights, bias, activation)
    }

    pub fn stages(&self) -> &[DenseStage] {
        &self.stages
    }

    /// Модель для расчёта: ступени с первой по last включительно
    fn model(&self, last: usize) -> ViewerResult<Sequential> {
        let mut model = seq();
        for stage in &self.stages[..=last] {
            //Linear ждёт веса (нейроны, входы)
            let wt_mx = stage.weights.t()?.contiguous()?;
            model = model.add(Linear::new(wt_mx, stage.bias.clone()));
            if let Some(act) = stage.activation {
                model = model.add(act);
            }
        }
        Ok(model)
    }
}

impl ActivationMapper for SequentialActivationMapper {
    fn get_activation(&self, input: &Tensor, layer: &dyn Layer) -> ViewerResult<Vec<f32>> {
        let last = self
            .stages
            .iter()
            .position(|s| s.name == layer.name())
            .ok_or_else(|| ViewerError::UnknownLayer(layer.name().to_string()))?;

        let (inputs, _) = self.stages[0].weights.dims2()?;
        let count = input.elem_count();
        if count != inputs {
            return Err(ViewerError::shape_mismatch(format!("{inputs} inputs"), format!("{count}")));
        }
        let xs = input.flatten_all()?.to_dtype(DType::F32)?.reshape((1, inputs))?;

        debug!(layer = layer.name(), stages = last + 1, "activation");
        let out = self.model(last)?.forward(&xs)?;
        Ok(out.flatten_all()?.to_vec1()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layers() -> (Dense, Dense) {
        //2 входа -> 3 нейрона -> 2 нейрона
        let w1 = Tensor::new(&[[0.2f32, 0.5, 0.8], [0.3, 0.6, 0.9]], &Device::Cpu).unwrap();
        let w2 = Tensor::new(&[[1.1f32, 1.5], [1.2, 1.6], [1.3, 1.7]], &Device::Cpu).unwrap();
        (
            Dense::new("hidden", 3, w1, None, Theme::default(), None).unwrap(),
            Dense::new("out", 2, w2, None, Theme::default(), None).unwrap(),
        )
    }

    #[test]
    fn hidden_and_output_activations() {
        let (hidden, out) = layers();
        let b1 = Tensor::new(&[0.1f32, 0.4, 0.7], &Device::Cpu).unwrap();
        let b2 = Tensor::new(&[1.0f32, 1.4], &Device::Cpu).unwrap();
        let mut mapper = SequentialActivationMapper::new();
        mapper.push_layer(&hidden, Some(&b1), Some(Activation::Relu)).unwrap();
        mapper.push_layer(&out, Some(&b2), Some(Activation::Relu)).unwrap();

        let input = Tensor::new(&[0.5f32, 0.7], &Device::Cpu).unwrap();
        //h = relu(x·w1 + b1) = [0.41, 1.07, 1.73]
        let h = mapper.get_activation(&input, &hidden).unwrap();
        assert_relative_eq!(h.as_slice(), [0.41f32, 1.07, 1.73].as_slice(), epsilon = 1e-5);
        //o = relu(h·w2 + b2) = [4.984, 6.668]
        let o = mapper.get_activation(&input, &out).unwrap();
        assert_relative_eq!(o.as_slice(), [4.984f32, 6.668].as_slice(), epsilon = 1e-4);
    }

    #[test]
    fn linear_output_keeps_sign() {
        let w = Tensor::new(&[[-1.0f32], [0.5]], &Device::Cpu).unwrap();
        let layer = Dense::new("lin", 1, w, None, Theme::default(), None).unwrap();
        let mut mapper = SequentialActivationMapper::new();
        mapper.push_layer(&layer, None, None).unwrap();
        let input = Tensor::new(&[[2.0f64, 1.0]], &Device::Cpu).unwrap();
        let a = mapper.get_activation(&input, &layer).unwrap();
        assert_relative_eq!(a.as_slice(), [-1.5f32].as_slice());
    }

    #[test]
    fn errors() {
        let (hidden, out) = layers();
        let mut mapper = SequentialActivationMapper::new();
        mapper.push_layer(&hidden, None, Some(Activation::Relu)).unwrap();

        //неизвестный слой
        let input = Tensor::new(&[0.5f32, 0.7], &Device::Cpu).unwrap();
        assert!(matches!(mapper.get_activation(&input, &out), Err(ViewerError::UnknownLayer(_))));

        //неверный размер входа
        let wide = Tensor::new(&[0.5f32, 0.7, 0.1], &Device::Cpu).unwrap();
        assert!(matches!(mapper.get_activation(&wide, &hidden), Err(ViewerError::ShapeMismatch { .. })));

        //несогласованная цепочка
        assert!(mapper.push_layer(&hidden, None, None).is_err());
        //неверное число смещений
        let b = Tensor::new(&[1.0f32], &Device::Cpu).unwrap();
        assert!(mapper.push_layer(&out, Some(&b), None).is_err());
        assert_eq!(mapper.stages().len(), 1);
    }

    #[test]
    fn with_dense_activation_map() {
        let (hidden, _) = layers();
        let mut mapper = SequentialActivationMapper::new();
        mapper.push_layer(&hidden, None, Some(Activation::Relu)).unwrap();
        let input = Tensor::new(&[1.0f32, 0.0], &Device::Cpu).unwrap();
        let element = hidden.get_activation_map(&mapper, &input, 0).unwrap();
        let Element::Div { children, .. } = element else { panic!("div expected") };
        let Element::Graph(graph) = &children[0] else { panic!("graph expected") };
        let Trace::Bar(bar) = &graph.figure.as_ref().unwrap().data[0] else { panic!("bar expected") };
        assert_relative_eq!(bar.x.as_slice(), [0.2f32, 0.5, 0.8].as_slice());
    }
}
