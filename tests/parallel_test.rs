//! Serial and rayon paths must agree.
#![cfg(feature = "parallel")]

use dg_advect::{
    BoundaryTable, DofHandler, GlobalSolution, LocalOperatorBuilder, Mesh2D, StandardIntegrator,
    TimeStepper, UniformWind, UpdateKernel,
};

fn swirl(x: f64, y: f64) -> (f64, f64) {
    (0.5 - y, x - 0.3)
}

#[test]
fn test_parallel_assembly_matches_serial() {
    let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 6, 5);
    mesh.set_boundary_ids();
    let builder = LocalOperatorBuilder::new(2);
    let serial = builder.assemble(&mesh, &swirl).unwrap();
    let parallel = builder.assemble_parallel(&mesh, &swirl).unwrap();

    assert_eq!(serial.len(), parallel.len());
    for k in 0..serial.len() {
        let (a, b) = (serial.cell(k), parallel.cell(k));
        assert_eq!(a.stiffness, b.stiffness);
        for f in 0..4 {
            assert_eq!(a.lifting[f], b.lifting[f]);
            assert_eq!(a.normal_velocity[f], b.normal_velocity[f]);
        }
    }
}

#[test]
fn test_parallel_steps_match_serial() {
    let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 8, 8);
    mesh.set_boundary_ids();
    let wind = UniformWind::from_polar(1.0, 0.4);
    let dofs = DofHandler::new(&mesh, 2);
    let store = LocalOperatorBuilder::new(2).assemble(&mesh, &wind).unwrap();
    let boundary = BoundaryTable::default();
    let kernel = UpdateKernel::new(&mesh, &dofs, &store, &boundary).unwrap();

    let u0 = dofs.interpolate(|x, y| (6.0 * x).sin() + y);
    for integrator in [StandardIntegrator::ForwardEuler, StandardIntegrator::SspRk3] {
        let mut serial = GlobalSolution::from_values(u0.clone(), dofs.n_dofs_per_cell);
        let mut parallel = serial.clone();
        let mut serial_stepper = TimeStepper::new(integrator);
        let mut parallel_stepper = TimeStepper::new(integrator).with_parallel(true);

        for _ in 0..20 {
            serial_stepper.step(&kernel, &mut serial, 2e-3);
            parallel_stepper.step(&kernel, &mut parallel, 2e-3);
        }
        for (a, b) in serial.values().iter().zip(parallel.values()) {
            assert!((a - b).abs() < 1e-11, "{}: {} vs {}", integrator.name(), a, b);
        }
    }
}
