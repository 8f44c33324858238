//! Weighted rank fusion of per-candidate costs.

/// Ascending competition ranks: `rank_i = 1 + #{j : v_j < v_i}`.
///
/// Equal values share a rank, so a cue that is constant over all candidates
/// shifts every fused score by the same amount and cannot reorder them.
pub fn competition_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0usize; values.len()];
    let mut rank = 1;
    for (pos, &idx) in order.iter().enumerate() {
        if pos > 0 && values[order[pos - 1]].total_cmp(&values[idx]).is_lt() {
            rank = pos + 1;
        }
        ranks[idx] = rank;
    }
    ranks
}

/// `w_b · rank(boundary) + w_c · rank(composition)` per candidate.
///
/// Without composition costs the fused score is the boundary rank alone.
pub fn rank_fusion(
    boundary: &[f64],
    composition: Option<&[f64]>,
    boundary_weight: f64,
    composition_weight: f64,
) -> Vec<f64> {
    let b_ranks = competition_ranks(boundary);
    match composition {
        Some(costs) => {
            debug_assert_eq!(costs.len(), boundary.len());
            let c_ranks = competition_ranks(costs);
            b_ranks
                .iter()
                .zip(&c_ranks)
                .map(|(&b, &c)| boundary_weight * b as f64 + composition_weight * c as f64)
                .collect()
        }
        None => b_ranks
            .iter()
            .map(|&b| boundary_weight * b as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_the_lowest_rank() {
        assert_eq!(competition_ranks(&[0.3, 0.1, 0.3, 0.0]), vec![3, 2, 3, 1]);
        assert_eq!(competition_ranks(&[5.0; 4]), vec![1; 4]);
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn composition_outweighs_boundary() {
        let boundary = [0.0, 1.0, 2.0];
        let composition = [3.0, 2.0, 1.0];
        let fused = rank_fusion(&boundary, Some(&composition), 1.0, 5.0);
        assert_eq!(fused, vec![1.0 + 15.0, 2.0 + 10.0, 3.0 + 5.0]);
    }

    #[test]
    fn constant_composition_matches_boundary_only() {
        let boundary = [4.0, 0.5, 0.5, 9.0];
        let constant = [0.0; 4];
        let with = rank_fusion(&boundary, Some(&constant), 1.0, 5.0);
        let without = rank_fusion(&boundary, None, 1.0, 5.0);
        for (a, b) in with.iter().zip(&without) {
            assert_eq!(a - b, 5.0);
        }
    }
}
