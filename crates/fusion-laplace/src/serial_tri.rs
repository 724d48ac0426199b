// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Serial Tridiagonal Laplacian
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Laplacian inversion with the whole x extent on one process.
//!
//! Per x-z slice:
//! 1. Forward FFT in z of every x row (boundary rows may come from `x0`)
//! 2. One tridiagonal solve in x per retained mode, modes in parallel
//! 3. Optional DC removal
//! 4. Inverse FFT of every x row

use std::f64::consts::TAU;

use fusion_field::{Field3D, FieldPerp};
use fusion_math::fft::ModeTransform;
use fusion_types::config::LaplaceConfig;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::PerpMesh;
use ndarray::Array2;
use num_complex::Complex64;

use crate::boundary::{BoundaryPolicy, BoundaryWidths};
use crate::coefficients::{Coefficients, FiniteDifferenceBuilder, ModeContext, ModeSystem, SystemBuilder};
use crate::postprocess::{remove_null_space_offset, zero_dc};
use crate::scheduler::ModeScheduler;
use crate::solver::{ThomasSolver, TridiagonalSolver};

/// Inversion session. Coefficients and flags are fixed at construction; the
/// mode work arrays are reused across calls.
#[derive(Debug)]
pub struct LaplaceSerialTri<B = FiniteDifferenceBuilder, S = ThomasSolver> {
    mesh: PerpMesh,
    config: LaplaceConfig,
    coefs: Coefficients,
    policy: BoundaryPolicy,
    maxmode: usize,
    transform: ModeTransform,
    scheduler: ModeScheduler,
    builder: B,
    solver: S,
    /// Transformed right-hand side `[nx, nz/2 + 1]`.
    bk: Array2<Complex64>,
    /// Mode solutions `[nx, nz/2 + 1]`.
    xk: Array2<Complex64>,
}

impl LaplaceSerialTri {
    pub fn new(mesh: PerpMesh, config: LaplaceConfig, coefs: Coefficients) -> FusionResult<Self> {
        Self::with_collaborators(mesh, config, coefs, FiniteDifferenceBuilder, ThomasSolver)
    }
}

impl<B: SystemBuilder, S: TridiagonalSolver> LaplaceSerialTri<B, S> {
    pub fn with_collaborators(
        mesh: PerpMesh,
        config: LaplaceConfig,
        coefs: Coefficients,
        builder: B,
        solver: S,
    ) -> FusionResult<Self> {
        mesh.validate()?;
        if !mesh.is_x_local() {
            return Err(FusionError::Precondition(format!(
                "x direction split over {} processes; this solver needs it local",
                mesh.nxpe
            )));
        }
        if mesh.periodic_x {
            return Err(FusionError::Precondition(
                "x-periodic meshes are not supported".into(),
            ));
        }
        let maxmode = config.validate(mesh.local_nz)?;
        coefs.validate(&mesh)?;

        let transform = ModeTransform::new(mesh.local_nz, maxmode)?;
        let scheduler = ModeScheduler::new(config.schedule, config.num_threads)?;
        let policy = BoundaryPolicy::new(&config, mesh.local_nx);
        let shape = (mesh.local_nx, transform.nmodes());

        log::debug!(
            "LaplaceSerialTri: nx={}, nz={}, maxmode={maxmode}, widths={:?}, schedule={:?} ({} threads)",
            mesh.local_nx,
            mesh.local_nz,
            policy.widths(),
            scheduler.schedule(),
            scheduler.num_threads()
        );

        Ok(Self {
            mesh,
            config,
            coefs,
            policy,
            maxmode,
            transform,
            scheduler,
            builder,
            solver,
            bk: Array2::zeros(shape),
            xk: Array2::zeros(shape),
        })
    }

    pub fn config(&self) -> &LaplaceConfig {
        &self.config
    }

    pub fn mesh(&self) -> &PerpMesh {
        &self.mesh
    }

    pub fn widths(&self) -> BoundaryWidths {
        self.policy.widths()
    }

    pub fn maxmode(&self) -> usize {
        self.maxmode
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefs
    }

    /// Replace A, C and D. The new set is validated against the mesh.
    pub fn set_coefficients(&mut self, coefs: Coefficients) -> FusionResult<()> {
        coefs.validate(&self.mesh)?;
        self.coefs = coefs;
        Ok(())
    }

    /// Solve with boundary values taken from `b` itself.
    pub fn solve(&mut self, b: &FieldPerp) -> FusionResult<FieldPerp> {
        self.solve_with_boundary(b, b)
    }

    /// Solve for the slice `b`. Rows flagged by the boundary policy take
    /// their right-hand side from `x0` instead.
    pub fn solve_with_boundary(&mut self, b: &FieldPerp, x0: &FieldPerp) -> FusionResult<FieldPerp> {
        self.check_slice(b, "b")?;
        self.check_slice(x0, "x0")?;
        if x0.index() != b.index() {
            return Err(FusionError::Precondition(format!(
                "x0 is slice y={} but b is slice y={}",
                x0.index(),
                b.index()
            )));
        }
        let jy = b.index();
        let nx = self.mesh.local_nx;
        let nz = self.mesh.local_nz;

        for ix in 0..nx {
            let source = if self.policy.use_auxiliary(ix) { x0 } else { b };
            self.transform.forward(source.row(ix), self.bk.row_mut(ix))?;
        }

        let bk = &self.bk;
        let mesh = &self.mesh;
        let coefs = &self.coefs;
        let config = &self.config;
        let builder = &self.builder;
        let solver = &self.solver;
        let widths = self.policy.widths();
        let remove_offset = config.global.remove_kx_zero_offset;

        let solutions = self.scheduler.run(self.maxmode + 1, |kz| {
            let mut sys = ModeSystem::new(nx);
            for (rhs, value) in sys.rhs.iter_mut().zip(bk.column(kz)) {
                *rhs = *value;
            }
            let ctx = ModeContext {
                jy,
                kz,
                kwave: kz as f64 * TAU / mesh.zlength,
                mesh,
                coefs,
                config,
                widths,
            };
            builder.build(&ctx, &mut sys)?;

            let mut xk1d = vec![Complex64::new(0.0, 0.0); nx];
            solver
                .solve(&sys, &mut xk1d)
                .map_err(|e| match e {
                    FusionError::SingularPivot { .. } => FusionError::SingularSystem {
                        mode: kz,
                        reason: e.to_string(),
                    },
                    other => other,
                })?;
            if remove_offset && kz == 0 {
                remove_null_space_offset(&mut xk1d, mesh.xstart, mesh.xend);
            }
            log::trace!("LaplaceSerialTri: y={jy} mode {kz} solved");
            Ok(xk1d)
        })?;

        for (kz, xk1d) in solutions.into_iter().enumerate() {
            for (ix, value) in xk1d.into_iter().enumerate() {
                self.xk[[ix, kz]] = value;
            }
        }
        if self.config.global.force_dc_zero {
            zero_dc(&mut self.xk);
        }

        let mut x = FieldPerp::new(nx, nz, jy);
        for ix in 0..nx {
            self.transform
                .inverse(self.xk.row(ix), x.data_mut().row_mut(ix))?;
            if self.config.check_finite {
                if let Some((iz, &value)) = x.row(ix).indexed_iter().find(|(_, v)| !v.is_finite()) {
                    return Err(FusionError::NonFinite {
                        x: ix,
                        y: jy,
                        z: iz,
                        value,
                    });
                }
            }
        }
        Ok(x)
    }

    /// Solve every y slice in `[ystart, yend]` of a 3D right-hand side.
    /// Slices outside that range are zero in the result.
    pub fn solve_field(&mut self, b: &Field3D) -> FusionResult<Field3D> {
        self.solve_field_with_boundary(b, b)
    }

    pub fn solve_field_with_boundary(&mut self, b: &Field3D, x0: &Field3D) -> FusionResult<Field3D> {
        let expected = [self.mesh.local_nx, self.mesh.local_ny, self.mesh.local_nz];
        for (name, field) in [("b", b), ("x0", x0)] {
            if field.shape() != expected {
                return Err(FusionError::Precondition(format!(
                    "{name} has shape {:?}, mesh is {expected:?}",
                    field.shape()
                )));
            }
        }

        let mut out = Field3D::filled(b.pool(), 0.0);
        out.set_location(b.location());
        for jy in self.mesh.ystart..=self.mesh.yend {
            let rhs = b.slice(jy)?;
            let bndry = x0.slice(jy)?;
            let x = self.solve_with_boundary(&rhs, &bndry)?;
            out.set_slice(&x)?;
        }
        Ok(out)
    }

    fn check_slice(&self, perp: &FieldPerp, name: &str) -> FusionResult<()> {
        let (nx, nz) = (self.mesh.local_nx, self.mesh.local_nz);
        if perp.nx() != nx || perp.nz() != nz {
            return Err(FusionError::Precondition(format!(
                "{name} has shape ({}, {}), mesh is ({nx}, {nz})",
                perp.nx(),
                perp.nz()
            )));
        }
        if perp.index() >= self.mesh.local_ny {
            return Err(FusionError::Precondition(format!(
                "{name} y index {} outside ny={}",
                perp.index(),
                self.mesh.local_ny
            )));
        }
        Ok(())
    }
}
