use crate::*;

/// Сильнейшие коэффициенты по столбцам.
/// columns[c] - пары (номер строки, значение) по убыванию модуля, не больше n штук.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Strongest {
    pub columns: Vec<Vec<(usize, f32)>>,
}

impl Strongest {
    /// Количество выбранных на столбец (одинаково для всех столбцов)
    pub fn ranks(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.ranks() == 0
    }

    /// Номера строк ранга rank по всем столбцам
    pub fn indices(&self, rank: usize) -> Vec<usize> {
        self.columns.iter().map(|c| c[rank].0).collect()
    }

    /// Значения ранга rank по всем столбцам
    pub fn values(&self, rank: usize) -> Vec<f32> {
        self.columns.iter().map(|c| c[rank].1).collect()
    }
}

/// Выбор n сильнейших (по модулю) строк в каждом столбце.
/// slice - построчно (строки = кандидаты, столбцы = активные нейроны).
/// Равные по модулю остаются в исходном порядке строк.
pub fn get_strongest(slice: &[Vec<f32>], n: usize) -> Strongest {
    let rows = slice.len();
    let cols = slice.first().map_or(0, |r| r.len());
    let n = n.min(rows);
    if n == 0 || cols == 0 {
        return Strongest::default();
    }

    let columns = (0..cols)
        .map(|c| {
            (0..rows)
                .map(|r| (r, slice[r][c]))
                //sorted_by - устойчивая сортировка
                .sorted_by(|(_, a), (_, b)| b.abs().total_cmp(&a.abs()))
                .take(n)
                .collect()
        })
        .collect();
    Strongest { columns }
}

/// Сводка по столбцу матрицы
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSummary {
    pub min: f32,
    pub mean: f32,
    pub max: f32,
}

/// min/mean/max каждого столбца
pub fn column_summaries(matrix: &[Vec<f32>]) -> Vec<ColumnSummary> {
    let cols = matrix.first().map_or(0, |r| r.len());
    (0..cols)
        .map(|c| {
            let column = matrix.iter().map(|row| row[c]);
            let (min, max) = column
                .clone()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            let mean = column.sum::<f32>() / matrix.len() as f32;
            ColumnSummary { min, mean, max }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Vec<Vec<f32>> {
        vec![
            vec![0.1, 0.9],
            vec![0.5, 0.2],
            vec![0.8, 0.4],
        ]
    }

    #[test]
    fn strongest_per_column() {
        let s = get_strongest(&sample(), 2);
        assert_eq!(s.columns[0], vec![(2, 0.8), (1, 0.5)]);
        assert_eq!(s.columns[1], vec![(0, 0.9), (2, 0.4)]);
        assert_eq!(s.ranks(), 2);
        assert_eq!(s.indices(0), vec![2, 0]);
        assert_eq!(s.values(1), vec![0.5, 0.4]);
    }

    #[test]
    fn strongest_by_magnitude() {
        let m = vec![vec![0.3], vec![-0.7], vec![0.6]];
        let s = get_strongest(&m, 2);
        assert_eq!(s.columns[0], vec![(1, -0.7), (2, 0.6)]);
    }

    #[test]
    fn strongest_clamped() {
        let s = get_strongest(&sample(), 10);
        assert_eq!(s.ranks(), 3);
        for column in &s.columns {
            assert!(column.windows(2).all(|w| w[0].1.abs() >= w[1].1.abs()));
        }
    }

    #[test]
    fn strongest_ties_keep_row_order() {
        let m = vec![vec![0.5], vec![-0.5], vec![0.2], vec![0.5]];
        let s = get_strongest(&m, 3);
        assert_eq!(s.columns[0], vec![(0, 0.5), (1, -0.5), (3, 0.5)]);
    }

    #[test]
    fn strongest_empty() {
        assert!(get_strongest(&[], 3).is_empty());
        assert!(get_strongest(&sample(), 0).is_empty());
        assert!(get_strongest(&[vec![], vec![]], 1).columns.is_empty());
    }

    #[test]
    fn summaries() {
        let s = column_summaries(&sample());
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s[0].min, 0.1);
        assert_relative_eq!(s[0].max, 0.8);
        assert_relative_eq!(s[1].mean, 0.5, epsilon = 1e-6);
        assert!(column_summaries(&[]).is_empty());
    }
}
