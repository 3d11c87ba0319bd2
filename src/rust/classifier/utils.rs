use ndarray::{ArrayBase, DataMut, Data, Ix1};

/// Scales a vector to unit L2 norm. All-zero vectors are left untouched.
pub(crate) fn normalize_vector<S: DataMut<Elem = f64>>(vec: &mut ArrayBase<S, Ix1>) {
    let norm: f64 = vec.iter().map(|&x| x * x).sum::<f64>().sqrt();
    if norm > 1e-10 {
        vec.mapv_inplace(|x| x / norm);
    }
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn argmax<S: Data<Elem = f64>>(vec: &ArrayBase<S, Ix1>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in vec.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}
