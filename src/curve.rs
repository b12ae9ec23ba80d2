//! BN254 types on both sides of the benchmark and the conversions between them.
//!
//! The CPU side is arkworks, whose field elements live in Montgomery form in
//! memory. The device side is icicle. Host data handed to the device keeps the
//! arkworks Montgomery limbs byte for byte; the GPU pipeline converts them to
//! canonical form on the device. The MSM result comes back canonical and
//! projective and is normalised to an arkworks affine point.

use ark_ff::{BigInteger, Field, PrimeField};
use icicle_core::traits::FieldImpl;

pub use ark_bn254::{Fq, Fr, G1Affine, G1Projective};

pub use icicle_bn254::curve::{
    BaseField as DeviceBaseField, CurveCfg as DeviceCurveCfg, G1Affine as DeviceAffine,
    G1Projective as DeviceProjective, ScalarField as DeviceScalar,
};

/// Reinterprets a scalar's Montgomery limbs as a device scalar.
///
/// The result is still in Montgomery form and must be converted on the
/// device before it is used as a canonical value.
pub fn scalar_to_device(scalar: &Fr) -> DeviceScalar {
    // `scalar.0` is the raw Montgomery representation, not `into_bigint()`
    DeviceScalar::from_bytes_le(&scalar.0.to_bytes_le())
}

/// Reinterprets an affine point's Montgomery coordinates as a device point.
///
/// The point at infinity maps to the device's all-zero encoding, which is the
/// same in both representations.
pub fn affine_to_device(point: &G1Affine) -> DeviceAffine {
    if point.infinity {
        return DeviceAffine::zero();
    }

    DeviceAffine {
        x: DeviceBaseField::from_bytes_le(&point.x.0.to_bytes_le()),
        y: DeviceBaseField::from_bytes_le(&point.y.0.to_bytes_le()),
    }
}

/// Normalises a canonical projective device point to affine.
///
/// One inversion of `Z` and two multiplications: `x = X/Z`, `y = Y/Z`.
/// `Z = 0` is the point at infinity.
pub fn projective_to_affine(point: &DeviceProjective) -> G1Affine {
    let x = Fq::from_le_bytes_mod_order(&point.x.to_bytes_le());
    let y = Fq::from_le_bytes_mod_order(&point.y.to_bytes_le());
    let z = Fq::from_le_bytes_mod_order(&point.z.to_bytes_le());

    match z.inverse() {
        Some(z_inv) => G1Affine::new_unchecked(x * z_inv, y * z_inv),
        None => G1Affine::identity(),
    }
}
