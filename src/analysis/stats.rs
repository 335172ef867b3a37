use statrs::statistics::Statistics;

pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Describe-style summary of a numeric column. Missing values are skipped;
/// fields that can't be computed (empty column, `std` with one value) are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn of(values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
        present.sort_by(f64::total_cmp);

        Self {
            count: present.len(),
            // NaN when empty; std is n - 1 and NaN below two values
            mean: present.iter().copied().mean(),
            std: present.iter().copied().std_dev(),
            min: present.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&present, 0.25),
            q50: quantile_sorted(&present, 0.50),
            q75: quantile_sorted(&present, 0.75),
            max: present.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Values in [`STAT_LABELS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Quantile with linear interpolation between closest ranks (the "linear"
/// estimator; statrs' `OrderStatistics` uses a different one). `sorted` must
/// be ascending.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Pearson correlation over rows where both sides are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` × `labels.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn compute(columns: &[(&str, &[Option<f64>])]) -> Self {
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, (_, a))| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(j, (_, b))| {
                        let r = pearson(a, b);
                        // a column with any spread correlates exactly with itself
                        if i == j && !r.is_nan() {
                            1.0
                        } else {
                            r
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            labels: columns.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}
