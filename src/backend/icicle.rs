use icicle_core::msm::{self, MSMConfig};
use icicle_core::traits::MontgomeryConvertible;
use icicle_runtime::errors::eIcicleError;
use icicle_runtime::memory::{DeviceVec, HostOrDeviceSlice, HostSlice};
use icicle_runtime::stream::IcicleStream;
use tracing::trace;

use super::DeviceMsm;
use crate::curve::{DeviceAffine, DeviceProjective, DeviceScalar};
use crate::device::DeviceContext;
use crate::error::BenchError;
use crate::timing::Stage;

/// Montgomery conversion reports a bare status code instead of a `Result`.
fn check_status(status: eIcicleError, stage: Stage, count: usize) -> Result<(), BenchError> {
    match status {
        eIcicleError::Success => Ok(()),
        err => Err(BenchError::stage(stage, count, err)),
    }
}

/// [`DeviceMsm`] over icicle device memory on the context's device.
///
/// Runs everything on the default stream with `is_async = false`, so each
/// call has finished on the device when it returns.
pub struct IcicleBackend {
    ctx: DeviceContext,
    stream: IcicleStream,
    cfg: MSMConfig,
}

impl IcicleBackend {
    pub fn new(ctx: DeviceContext) -> Self {
        let mut cfg = MSMConfig::default();
        cfg.is_async = false;
        Self { ctx, stream: IcicleStream::default(), cfg }
    }
}

impl DeviceMsm for IcicleBackend {
    type Scalars = DeviceVec<DeviceScalar>;
    type Bases = DeviceVec<DeviceAffine>;

    fn alloc_bases(&mut self, count: usize) -> Result<Self::Bases, BenchError> {
        // first device call of every run
        self.ctx.activate()?;
        DeviceVec::<DeviceAffine>::device_malloc(count)
            .map_err(|e| BenchError::stage(Stage::Allocate, count, e))
    }

    fn alloc_scalars(&mut self, count: usize) -> Result<Self::Scalars, BenchError> {
        DeviceVec::<DeviceScalar>::device_malloc(count)
            .map_err(|e| BenchError::stage(Stage::Allocate, count, e))
    }

    fn copy_bases_to_device(
        &mut self,
        host: &[DeviceAffine],
        bases: &mut Self::Bases,
    ) -> Result<(), BenchError> {
        bases
            .copy_from_host(HostSlice::from_slice(host))
            .map_err(|e| BenchError::stage(Stage::BasesH2D, host.len(), e))
    }

    fn copy_scalars_to_device(
        &mut self,
        host: &[DeviceScalar],
        scalars: &mut Self::Scalars,
    ) -> Result<(), BenchError> {
        scalars
            .copy_from_host(HostSlice::from_slice(host))
            .map_err(|e| BenchError::stage(Stage::ScalarsH2D, host.len(), e))
    }

    fn bases_from_montgomery(&mut self, bases: &mut Self::Bases) -> Result<(), BenchError> {
        let count = bases.len();
        check_status(
            DeviceAffine::from_mont(&mut bases[..], &self.stream),
            Stage::BasesMontgomery,
            count,
        )
    }

    fn scalars_from_montgomery(&mut self, scalars: &mut Self::Scalars) -> Result<(), BenchError> {
        let count = scalars.len();
        check_status(
            DeviceScalar::from_mont(&mut scalars[..], &self.stream),
            Stage::ScalarsMontgomery,
            count,
        )
    }

    fn msm(
        &mut self,
        scalars: &Self::Scalars,
        bases: &Self::Bases,
    ) -> Result<DeviceProjective, BenchError> {
        let mut result = vec![DeviceProjective::zero(); 1];

        msm::msm(
            &scalars[..],
            &bases[..],
            &self.cfg,
            HostSlice::from_mut_slice(&mut result),
        )
        .map_err(|e| BenchError::stage(Stage::MsmCompute, scalars.len(), e))?;

        trace!(count = scalars.len(), device = %self.ctx, "msm done");
        Ok(result[0])
    }

    fn free_bases(&mut self, bases: Self::Bases) {
        // DeviceVec releases its device memory on drop
        drop(bases);
    }

    fn free_scalars(&mut self, scalars: Self::Scalars) {
        drop(scalars);
    }
}

#[cfg(test)]
mod tests {
    use super::check_status;
    use crate::error::BenchError;
    use crate::timing::Stage;
    use icicle_runtime::errors::eIcicleError;

    #[test]
    fn test_success_status_is_ok() {
        assert!(check_status(eIcicleError::Success, Stage::BasesMontgomery, 8).is_ok());
    }

    #[test]
    fn test_failed_status_names_the_stage() {
        let err = check_status(eIcicleError::InvalidArgument, Stage::ScalarsMontgomery, 8)
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Stage { stage: Stage::ScalarsMontgomery, count: 8, .. }
        ));
    }
}
