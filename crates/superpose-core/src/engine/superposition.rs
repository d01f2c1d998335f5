use super::correspondence::{CorrespondencePair, MIN_PAIRS};
use super::error::EngineError;
use nalgebra::linalg::SVD;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use serde::Serialize;

/// The optimal rigid-body superposition of one matched point set onto another.
///
/// `rotation` and `translation` map a point from set A into set B's frame:
/// `p_b ≈ rotation * p_a + translation`. The rotation is always proper
/// (determinant +1, no reflection) regardless of the chirality or degeneracy
/// of the input point sets. Computed once per alignment request and owned by
/// the caller; RMSD is in the same length units as the input coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuperpositionResult {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
    pub rmsd: f64,
}

impl SuperpositionResult {
    /// Maps a point from set A into set B's frame.
    pub fn transform(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }
}

/// Computes the Kabsch superposition of the paired point sets.
///
/// Steps: center both sets on their centroids, accumulate the 3x3
/// cross-covariance matrix `H = P'^T Q'`, decompose `H = U S V^T`, and form
/// the rotation `R = V diag(1, 1, d) U^T` with `d = sign(det(V U^T))`. The
/// `d` correction turns an improper (reflecting) optimum into the best proper
/// rotation; it also covers rank-deficient covariance (coplanar or collinear
/// point sets beyond the 3-point minimum) with no special-case branch.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateInput`] when fewer than [`MIN_PAIRS`]
/// pairs are supplied, any coordinate is non-finite, or the SVD fails to
/// converge.
pub fn superpose(pairs: &[CorrespondencePair]) -> Result<SuperpositionResult, EngineError> {
    if pairs.len() < MIN_PAIRS {
        return Err(EngineError::DegenerateInput(format!(
            "{} correspondence pair(s), need at least {}",
            pairs.len(),
            MIN_PAIRS
        )));
    }
    for pair in pairs {
        if !is_finite(&pair.point_a) || !is_finite(&pair.point_b) {
            return Err(EngineError::DegenerateInput(format!(
                "non-finite coordinate at residue {}",
                pair.residue_number
            )));
        }
    }

    let n = pairs.len() as f64;
    let centroid_a = Point3::from(
        pairs
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.point_a.coords)
            / n,
    );
    let centroid_b = Point3::from(
        pairs
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.point_b.coords)
            / n,
    );

    let mut covariance = Matrix3::zeros();
    for pair in pairs {
        let p = pair.point_a - centroid_a;
        let q = pair.point_b - centroid_b;
        covariance += p * q.transpose();
    }

    let svd = SVD::try_new(covariance, true, true, f64::EPSILON, 250).ok_or_else(|| {
        EngineError::DegenerateInput(
            "SVD of the cross-covariance matrix did not converge".to_string(),
        )
    })?;
    let u = svd.u.ok_or_else(|| {
        EngineError::DegenerateInput("SVD did not produce left singular vectors".to_string())
    })?;
    let v = svd
        .v_t
        .ok_or_else(|| {
            EngineError::DegenerateInput("SVD did not produce right singular vectors".to_string())
        })?
        .transpose();

    let d = if (v * u.transpose()).determinant() < 0.0 {
        -1.0
    } else {
        1.0
    };
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    let rotation = Rotation3::from_matrix_unchecked(v * correction * u.transpose());
    let translation = centroid_b.coords - (rotation * centroid_a).coords;

    let squared_sum: f64 = pairs
        .iter()
        .map(|pair| {
            let rotated = rotation * (pair.point_a - centroid_a);
            let target = pair.point_b - centroid_b;
            (rotated - target).norm_squared()
        })
        .sum();

    Ok(SuperpositionResult {
        rotation,
        translation,
        rmsd: (squared_sum / n).sqrt(),
    })
}

fn is_finite(point: &Point3<f64>) -> bool {
    point.coords.iter().all(|c| c.is_finite())
}
