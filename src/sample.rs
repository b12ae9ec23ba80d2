use std::fmt;

use ark_ec::CurveGroup;
use ark_std::UniformRand;
use rand::Rng;

use crate::curve::{
    DeviceAffine, DeviceScalar, Fr, G1Affine, G1Projective, affine_to_device, scalar_to_device,
};
use crate::error::BenchError;

/// One point of the size sweep: `size = 2^degree` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProblemSize {
    degree: u32,
    size: usize,
}

impl ProblemSize {
    pub const MAX_DEGREE: u32 = 30;

    pub fn new(degree: u32) -> Result<Self, BenchError> {
        if degree > Self::MAX_DEGREE {
            return Err(BenchError::InvalidConfig(format!(
                "degree {degree} exceeds the maximum of {}",
                Self::MAX_DEGREE
            )));
        }
        Ok(Self { degree, size: 1usize << degree })
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2^{}", self.degree)
    }
}

/// Scalars and affine bases for one problem size.
///
/// Alongside the arkworks values it keeps their device-layout mirror, still in
/// Montgomery form, which is what the GPU pipeline copies to the device. The
/// mirror is built once here so the conversion never lands inside a timed
/// region.
pub struct SampleSet {
    scalars: Vec<Fr>,
    points: Vec<G1Affine>,
    device_scalars: Vec<DeviceScalar>,
    device_points: Vec<DeviceAffine>,
}

impl SampleSet {
    /// `size` uniformly random scalars and `size` random points.
    pub fn generate<R: Rng + ?Sized>(size: ProblemSize, rng: &mut R) -> Self {
        let n = size.size();
        let scalars: Vec<Fr> = (0..n).map(|_| Fr::rand(rng)).collect();
        let projective: Vec<G1Projective> = (0..n).map(|_| G1Projective::rand(rng)).collect();
        let points = G1Projective::normalize_batch(&projective);

        Self::mirrored(scalars, points)
    }

    pub fn from_parts(scalars: Vec<Fr>, points: Vec<G1Affine>) -> Result<Self, BenchError> {
        if scalars.len() != points.len() || scalars.is_empty() {
            return Err(BenchError::SampleShape { scalars: scalars.len(), points: points.len() });
        }
        Ok(Self::mirrored(scalars, points))
    }

    fn mirrored(scalars: Vec<Fr>, points: Vec<G1Affine>) -> Self {
        let device_scalars = scalars.iter().map(scalar_to_device).collect();
        let device_points = points.iter().map(affine_to_device).collect();
        Self { scalars, points, device_scalars, device_points }
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    pub fn scalars(&self) -> &[Fr] {
        &self.scalars
    }

    pub fn points(&self) -> &[G1Affine] {
        &self.points
    }

    /// Scalars in device layout, Montgomery form.
    pub fn device_scalars(&self) -> &[DeviceScalar] {
        &self.device_scalars
    }

    /// Bases in device layout, Montgomery form.
    pub fn device_points(&self) -> &[DeviceAffine] {
        &self.device_points
    }
}
