// Случайное разбиение на обучающую и тестовую части с фиксированным зерном.
// Индексы 0..n перемешиваются генератором StdRng, первые n_test уходят в тест,
// остальные в обучение (обе части в перемешанном порядке).

use crate::error::{DataError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Индексы обучающей и тестовой частей.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Считает размеры частей: n_test = ceil(test_size * n), n_train = n - n_test.
pub fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    let invalid = |reason| DataError::InvalidSplit {
        n_samples,
        test_size,
        reason,
    };

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(invalid("test_size must be in (0, 1)"));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_train == 0 {
        return Err(invalid("the training partition would be empty"));
    }

    Ok((n_train, n_test))
}

pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    let (n_train, n_test) = split_sizes(n_samples, test_size)?;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    tracing::debug!("Dataset split: {} training, {} testing", n_train, n_test);

    Ok(SplitIndices {
        train,
        test: indices,
    })
}

/// Выбирает элементы по индексам, сохраняя порядок индексов.
pub fn take<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_round_test_up() {
        assert_eq!(split_sizes(10, 0.2).unwrap(), (8, 2));
        assert_eq!(split_sizes(11, 0.2).unwrap(), (8, 3));
        assert_eq!(split_sizes(2, 0.2).unwrap(), (1, 1));
    }

    #[test]
    fn test_split_rejects_degenerate_inputs() {
        assert!(split_sizes(0, 0.2).is_err());
        assert!(split_sizes(1, 0.2).is_err());
        assert!(split_sizes(10, 1.0).is_err());
        assert!(split_sizes(10, 0.0).is_err());
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.2, 42).unwrap();
        assert_eq!(split.train.len(), 40);
        assert_eq!(split.test.len(), 10);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        let first = train_test_split(100, 0.2, 42).unwrap();
        let second = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(first, second);

        let other = train_test_split(100, 0.2, 7).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_take_follows_index_order() {
        let items = vec!["a", "b", "c", "d"];
        assert_eq!(take(&items, &[3, 0, 2]), vec!["d", "a", "c"]);
    }
}
