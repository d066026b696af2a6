use fennec::assembly::{
    AssemblyContext, BulkAssembler, DofMap, FeMesh, GlobalSystem, NodeMajorDofMap, SolutionStates,
};
use fennec::bc::{apply_initial_dirichlet, apply_penalty_dirichlet, suggested_penalty};
use fennec::kernels::CalcType;
use fennec::materials::MaterialsContainer;
use fennec::registry::{ElmtBlock, ElmtRegistry, ElmtType};
use fennec::shape::ReferenceShapeTable;
use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DVector, Vector3};

use crate::{ConstMaterials, SingleQuadMesh, UnitSquareMesh};

fn poisson_registry() -> ElmtRegistry {
    let mut registry = ElmtRegistry::new();
    registry.add_block(ElmtBlock {
        name: "bulk".to_string(),
        elmt_type: ElmtType::Poisson,
        dofs: vec!["phi".to_string()],
        domain: "alldomain".to_string(),
    });
    registry.validate(2).unwrap();
    registry
}

fn poisson_materials(sigma: f64, f: f64) -> ConstMaterials {
    let mut mate = MaterialsContainer::new();
    mate.set_scalar("sigma", sigma);
    mate.set_scalar("dsigmadu", 0.0);
    mate.set_scalar("f", f);
    mate.set_scalar("dfdu", 0.0);
    ConstMaterials(mate)
}

fn zeros_like(u: &DVector<f64>) -> DVector<f64> {
    DVector::zeros(u.len())
}

#[test]
fn single_element_conduction_residual() {
    // One unit quadrilateral, sigma = 2, u = x: the assembled residual is
    // the stiffness action on the linear field, -1 / +1 per node pair.
    let mesh = SingleQuadMesh::unit();
    let dofs = NodeMajorDofMap::new(4, 1);
    let registry = poisson_registry();
    let materials = poisson_materials(2.0, 0.0);

    let u = DVector::from_vec(vec![0.0, 1.0, 1.0, 0.0]);
    let aux = zeros_like(&u);
    let states = SolutionStates {
        u: &u,
        u_old: &aux,
        u_older: &aux,
        v: &aux,
        a: &aux,
    };
    let ctx = AssemblyContext {
        mesh: &mesh,
        dofs: &dofs,
        shapes: &ReferenceShapeTable,
        materials: &materials,
        t: 0.0,
        dt: 1.0,
        ctan: [1.0, 0.0, 0.0],
    };

    let mut system = GlobalSystem::new(dofs.n_dofs());
    BulkAssembler::new(&registry)
        .form_bulk_fe(CalcType::ResidualAndJacobian, &ctx, &states, &mut system)
        .unwrap();

    let expected = [-1.0, 1.0, 1.0, -1.0];
    for (i, &val) in expected.iter().enumerate() {
        assert_scalar_eq!(system.rhs()[i], val, comp = abs, tol = 1e-13);
    }
    assert!(system.max_abs_k() > 0.0);
}

#[test]
fn poisson_manufactured_solution_is_recovered() {
    // u* = 1 + x^2 + 2 y^2 with sigma = 1 needs f = 6; on a uniform grid
    // of bilinear elements the nodal interpolant of u* satisfies the
    // discrete equations exactly, so one Newton step from the preset
    // state recovers it to penalty accuracy.
    let mesh = UnitSquareMesh::new(4, 4);
    let dofs = NodeMajorDofMap::new(mesh.n_nodes(), 1);
    let registry = poisson_registry();
    let materials = poisson_materials(1.0, 6.0);
    let exact = |p: Vector3<f64>| 1.0 + p[0] * p[0] + 2.0 * p[1] * p[1];

    let mut u = DVector::zeros(dofs.n_dofs());
    for &node in &mesh.boundary_nodes() {
        apply_initial_dirichlet(&[node], &[0], exact(mesh.node_coords(node)), &dofs, &mut u)
            .unwrap();
    }

    let mut system = GlobalSystem::new(dofs.n_dofs());
    {
        let aux = zeros_like(&u);
        let states = SolutionStates {
            u: &u,
            u_old: &aux,
            u_older: &aux,
            v: &aux,
            a: &aux,
        };
        let ctx = AssemblyContext {
            mesh: &mesh,
            dofs: &dofs,
            shapes: &ReferenceShapeTable,
            materials: &materials,
            t: 0.0,
            dt: 1.0,
            ctan: [1.0, 0.0, 0.0],
        };
        BulkAssembler::new(&registry)
            .form_bulk_fe(CalcType::ResidualAndJacobian, &ctx, &states, &mut system)
            .unwrap();
    }

    let penalty = suggested_penalty(system.max_abs_k());
    for &node in &mesh.boundary_nodes() {
        apply_penalty_dirichlet(
            CalcType::ResidualAndJacobian,
            &[node],
            &[0],
            exact(mesh.node_coords(node)),
            penalty,
            &dofs,
            &mut u,
            &mut system,
        )
        .unwrap();
    }

    // Dense Newton step; the problem is linear so one step solves it.
    let n = dofs.n_dofs();
    let csr = system.to_csr();
    let mut dense = DMatrix::zeros(n, n);
    for (i, j, v) in csr.triplet_iter() {
        dense[(i, j)] += *v;
    }
    let neg_r = -system.rhs().clone();
    let delta = dense.lu().solve(&neg_r).expect("stiffness must be invertible");
    u += delta;

    for node in 0..mesh.n_nodes() {
        assert_scalar_eq!(u[node], exact(mesh.node_coords(node)), comp = abs, tol = 1e-5);
    }
}

#[test]
fn repeated_assembly_is_bit_identical() {
    let mesh = UnitSquareMesh::new(3, 3);
    let dofs = NodeMajorDofMap::new(mesh.n_nodes(), 1);
    let registry = poisson_registry();
    let materials = poisson_materials(1.7, 0.4);

    let u = DVector::from_iterator(
        dofs.n_dofs(),
        (0..dofs.n_dofs()).map(|i| (i as f64 * 0.37).sin()),
    );
    let aux = zeros_like(&u);
    let states = SolutionStates {
        u: &u,
        u_old: &aux,
        u_older: &aux,
        v: &aux,
        a: &aux,
    };
    let ctx = AssemblyContext {
        mesh: &mesh,
        dofs: &dofs,
        shapes: &ReferenceShapeTable,
        materials: &materials,
        t: 0.0,
        dt: 1.0,
        ctan: [1.0, 0.0, 0.0],
    };
    let assembler = BulkAssembler::new(&registry);

    let mut first = GlobalSystem::new(dofs.n_dofs());
    let mut second = GlobalSystem::new(dofs.n_dofs());
    assembler
        .form_bulk_fe(CalcType::ResidualAndJacobian, &ctx, &states, &mut first)
        .unwrap();
    assembler
        .form_bulk_fe(CalcType::ResidualAndJacobian, &ctx, &states, &mut second)
        .unwrap();

    assert_eq!(first.rhs(), second.rhs());
    let (csr_a, csr_b) = (first.to_csr(), second.to_csr());
    assert_eq!(csr_a.values(), csr_b.values());
    assert_eq!(csr_a.col_indices(), csr_b.col_indices());
}

#[test]
fn parallel_residual_matches_serial() {
    let mesh = UnitSquareMesh::new(5, 4);
    let dofs = NodeMajorDofMap::new(mesh.n_nodes(), 1);
    let registry = poisson_registry();
    let materials = poisson_materials(0.9, -2.3);

    let u = DVector::from_iterator(
        dofs.n_dofs(),
        (0..dofs.n_dofs()).map(|i| (i as f64 * 0.61).cos()),
    );
    let aux = zeros_like(&u);
    let states = SolutionStates {
        u: &u,
        u_old: &aux,
        u_older: &aux,
        v: &aux,
        a: &aux,
    };
    let ctx = AssemblyContext {
        mesh: &mesh,
        dofs: &dofs,
        shapes: &ReferenceShapeTable,
        materials: &materials,
        t: 0.0,
        dt: 1.0,
        ctan: [1.0, 0.0, 0.0],
    };
    let assembler = BulkAssembler::new(&registry);

    let mut serial = GlobalSystem::new(dofs.n_dofs());
    let mut parallel = GlobalSystem::new(dofs.n_dofs());
    assembler
        .form_bulk_fe(CalcType::Residual, &ctx, &states, &mut serial)
        .unwrap();
    assembler
        .form_residual_par(&ctx, &states, &mut parallel)
        .unwrap();

    assert_eq!(serial.rhs(), parallel.rhs());
}

#[test]
fn unbound_domain_is_a_configuration_error() {
    let mesh = SingleQuadMesh::unit();
    let dofs = NodeMajorDofMap::new(4, 1);
    let registry = ElmtRegistry::new();
    let materials = poisson_materials(1.0, 0.0);

    let u = DVector::zeros(4);
    let aux = zeros_like(&u);
    let states = SolutionStates {
        u: &u,
        u_old: &aux,
        u_older: &aux,
        v: &aux,
        a: &aux,
    };
    let ctx = AssemblyContext {
        mesh: &mesh,
        dofs: &dofs,
        shapes: &ReferenceShapeTable,
        materials: &materials,
        t: 0.0,
        dt: 1.0,
        ctan: [1.0, 0.0, 0.0],
    };
    let mut system = GlobalSystem::new(4);
    let err = BulkAssembler::new(&registry)
        .form_bulk_fe(CalcType::Residual, &ctx, &states, &mut system)
        .unwrap_err();
    assert!(err.to_string().contains("alldomain"));
}
