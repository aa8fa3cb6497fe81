// Integration tests for the quadratic formula and root classification

use quadra_api::{Equation, QuadraticSolver, RootKind, Roots, Solver};

fn solve(a: f64, b: f64, c: f64) -> Roots {
    let equation = Equation::new(a, b, c).expect("valid equation");
    QuadraticSolver.solve(&equation)
}

#[test]
fn test_distinct_real_roots() {
    let equation = Equation::new(1.0, -3.0, 2.0).unwrap();
    assert_eq!(equation.discriminant(), 1.0);
    assert_eq!(equation.root_kind(), RootKind::Distinct);

    let roots = QuadraticSolver.solve(&equation);
    assert_eq!(roots, Roots::new(2.0, 0.0));
    assert!(roots.is_real());
}

#[test]
fn test_complex_roots() {
    let equation = Equation::new(1.0, 0.0, 1.0).unwrap();
    assert_eq!(equation.discriminant(), -4.0);
    assert_eq!(equation.root_kind(), RootKind::Complex);

    let roots = QuadraticSolver.solve(&equation);
    assert_eq!(roots.real, 0.0);
    assert!(roots.real.is_sign_positive());
    assert_eq!(roots.imag, 1.0);
    assert_eq!(roots.to_string(), "0 + 1i");
    assert_eq!(roots.conjugate(), Roots::new(0.0, -1.0));
}

#[test]
fn test_repeated_root() {
    let equation = Equation::new(1.0, 2.0, 1.0).unwrap();
    assert_eq!(equation.discriminant(), 0.0);
    assert_eq!(equation.root_kind(), RootKind::Repeated);
    assert_eq!(QuadraticSolver.solve(&equation), Roots::new(-1.0, 0.0));
}

#[test]
fn test_negative_leading_coefficient() {
    // -x^2 + 4 = 0 -> roots +-2; (-b + sqrt(d)) / 2a picks -2
    assert_eq!(solve(-1.0, 0.0, 4.0), Roots::new(-2.0, 0.0));

    // -x^2 - 1 = 0 -> imaginary part carries the sign of 2a
    let roots = solve(-1.0, 0.0, -1.0);
    assert_eq!(roots.real, 0.0);
    assert_eq!(roots.imag, -1.0);
}

#[test]
fn test_closure_solver() {
    let constant = |_: &Equation| Roots::new(42.0, 0.0);
    let equation = Equation::new(3.0, 1.0, 1.0).unwrap();
    assert_eq!(constant.solve(&equation), Roots::new(42.0, 0.0));
}

#[test]
fn test_root_kind_from_discriminant() {
    assert_eq!(RootKind::from_discriminant(0.5), RootKind::Distinct);
    assert_eq!(RootKind::from_discriminant(0.0), RootKind::Repeated);
    assert_eq!(RootKind::from_discriminant(-0.0), RootKind::Repeated);
    assert_eq!(RootKind::from_discriminant(-1e-12), RootKind::Complex);
}

#[test]
fn test_equation_display() {
    let equation = Equation::new(1.5, -2.0, 0.25).unwrap();
    assert_eq!(equation.to_string(), "1.5x^2 + -2x + 0.25 = 0");
    assert_eq!(equation.coefficients(), (1.5, -2.0, 0.25));
}
