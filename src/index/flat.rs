use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("cannot build an index from an empty vector set")]
    Empty,
    #[error("vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Flat in-memory nearest-neighbor index over embedding vectors, searched
/// exhaustively by squared Euclidean distance. Fully regenerable from the
/// chunk table; replaced wholesale on every rebuild rather than mutated.
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index from one vector per chunk, in chunk-table order.
    /// The dimension is taken from the first vector; every other vector
    /// must match it.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let dimension = match vectors.first() {
            Some(first) => first.len(),
            None => return Err(IndexError::Empty),
        };
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: vector.len(),
                });
            }
        }
        Ok(Self { dimension, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The `k` nearest vectors to `query` as `(position, squared_distance)`
    /// pairs, ascending by distance. `k` is clamped to the index size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k.min(self.vectors.len()));
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_empty() {
        assert!(matches!(FlatIndex::build(vec![]), Err(IndexError::Empty)));
    }

    #[test]
    fn test_build_rejects_ragged_vectors() {
        let result = FlatIndex::build(vec![vec![0.0, 1.0], vec![0.0]]);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_search_orders_by_distance_ascending() {
        let index = FlatIndex::build(vec![
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![3.0, 0.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 2);
        assert_eq!(hits[2].0, 0);
        assert!(hits[0].1 <= hits[1].1 && hits[1].1 <= hits[2].1);
        assert_eq!(hits[0].1, 1.0);
    }

    #[test]
    fn test_search_clamps_k() {
        let index = FlatIndex::build(vec![vec![0.0], vec![1.0]]).unwrap();
        let hits = index.search(&[0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = FlatIndex::build(vec![vec![0.0, 0.0]]).unwrap();
        assert!(index.search(&[0.0], 1).is_err());
    }
}
