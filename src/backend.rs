//! The device-side collaborator of the staged GPU runner.
//!
//! [`DeviceMsm`] exposes each device operation separately so the runner can
//! time them one by one. Buffers are owned values: every `alloc_*` hands one
//! out and the matching `free_*` takes it back.

use crate::curve::{DeviceAffine, DeviceProjective, DeviceScalar};
use crate::error::BenchError;

pub mod icicle;

pub use self::icicle::IcicleBackend;

pub trait DeviceMsm {
    type Scalars;
    type Bases;

    fn alloc_bases(&mut self, count: usize) -> Result<Self::Bases, BenchError>;

    fn alloc_scalars(&mut self, count: usize) -> Result<Self::Scalars, BenchError>;

    fn copy_bases_to_device(
        &mut self,
        host: &[DeviceAffine],
        bases: &mut Self::Bases,
    ) -> Result<(), BenchError>;

    fn copy_scalars_to_device(
        &mut self,
        host: &[DeviceScalar],
        scalars: &mut Self::Scalars,
    ) -> Result<(), BenchError>;

    /// Converts device-resident bases from Montgomery to canonical form in place.
    fn bases_from_montgomery(&mut self, bases: &mut Self::Bases) -> Result<(), BenchError>;

    /// Converts device-resident scalars from Montgomery to canonical form in place.
    fn scalars_from_montgomery(&mut self, scalars: &mut Self::Scalars) -> Result<(), BenchError>;

    /// Runs the MSM over canonical device inputs. The result is written to
    /// host memory before this returns.
    fn msm(
        &mut self,
        scalars: &Self::Scalars,
        bases: &Self::Bases,
    ) -> Result<DeviceProjective, BenchError>;

    fn free_bases(&mut self, bases: Self::Bases);

    fn free_scalars(&mut self, scalars: Self::Scalars);
}
