// Integration tests for full coordinator runs

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use quadra::logging;
use quadra::pool::config::{FeedMode, ShutdownStrategy, SolverSystemConfig, Workload};
use quadra::pool::coordinator::{Coordinator, CoordinatorState};
use quadra::pool::error::SystemError;
use quadra::pool::worker::WorkerExit;
use quadra::report::RunReport;
use quadra_api::{
    CoefficientSource, Equation, FixedSource, QuadraticSolver, Roots, Solver, UniformSource,
};

fn config(workload: Workload, workers: usize, capacity: usize) -> SolverSystemConfig {
    SolverSystemConfig {
        workload,
        worker_count: workers,
        channel_capacity: capacity,
        collect_solutions: true,
        ..Default::default()
    }
}

/// Checks that every submitted equation came back exactly once with the
/// right roots.
fn assert_conserved(report: &RunReport, seed: u64, total: u64) {
    let mut replay = UniformSource::with_seed(seed, -5.0, 5.0).unwrap();
    let submitted: Vec<Equation> = (0..total).filter_map(|_| replay.next_equation()).collect();

    assert_eq!(report.total_solved, total);
    assert_eq!(report.processed_by_workers(), total);
    assert_eq!(report.solutions.len() as u64, total);

    let mut seen = HashSet::new();
    for solution in &report.solutions {
        assert!(seen.insert(solution.sequence), "duplicate {}", solution.sequence);
        let equation = submitted[solution.sequence as usize];
        assert_eq!(solution.equation, equation);
        assert_eq!(solution.roots, QuadraticSolver.solve(&equation));
    }
    assert_eq!(seen.len() as u64, total);
}

#[test]
fn test_three_equation_scenario() {
    logging::init_test();
    let mut coordinator = Coordinator::new(config(Workload::Custom(3), 1, 2)).unwrap();
    let mut source =
        FixedSource::from_coefficients([(1.0, -3.0, 2.0), (1.0, 0.0, 1.0), (1.0, 2.0, 1.0)])
            .unwrap();

    let report = coordinator.run_with(&mut source, |_| {}).unwrap();

    let discriminants: Vec<f64> = report
        .solutions
        .iter()
        .map(|s| s.equation.discriminant())
        .collect();
    assert_eq!(discriminants, vec![1.0, -4.0, 0.0]);

    let roots: Vec<Roots> = report.solutions.iter().map(|s| s.roots).collect();
    assert_eq!(
        roots,
        vec![
            Roots::new(2.0, 0.0),
            Roots::new(0.0, 1.0),
            Roots::new(-1.0, 0.0)
        ]
    );
    assert_eq!(report.total_solved, 3);
    assert_eq!(report.workers.len(), 1);
    assert_eq!(report.workers[0].processed, 3);
    assert_eq!(coordinator.state(), CoordinatorState::Done);
}

#[test]
fn test_large_run_conserves_equations() {
    logging::init_test();
    let seed = 42;
    let mut cfg = config(Workload::Large, 10, 10);
    cfg.seed = Some(seed);
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let report = coordinator.run().unwrap();

    assert_eq!(report.total_equations, 3000);
    assert_conserved(&report, seed, 3000);
    assert_eq!(report.workers.len(), 10);
    assert!(report.equation_channel_peak <= 10);
    assert!(report.result_channel_peak <= 10);
    for worker in &report.workers {
        assert!(matches!(worker.exit, WorkerExit::Closed | WorkerExit::Stopped));
    }
}

#[test]
fn test_pipelined_run_conserves_equations() {
    logging::init_test();
    let seed = 7;
    let mut cfg = config(Workload::Custom(2000), 8, 4);
    cfg.seed = Some(seed);
    cfg.feed_mode = FeedMode::Pipelined;
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let report = coordinator.run().unwrap();

    assert_conserved(&report, seed, 2000);
    assert!(report.equation_channel_peak <= 4);
    assert!(report.result_channel_peak <= 4);
}

#[test]
fn test_pipelined_single_worker_keeps_order() {
    logging::init_test();
    let mut cfg = config(Workload::Custom(200), 1, 3);
    cfg.seed = Some(1);
    cfg.feed_mode = FeedMode::Pipelined;
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let report = coordinator.run().unwrap();

    let sequences: Vec<u64> = report.solutions.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, (0..200).collect::<Vec<_>>());
}

#[test]
fn test_poison_pill_shutdown_stops_every_worker() {
    logging::init_test();
    let mut cfg = config(Workload::Custom(100), 3, 1);
    cfg.shutdown_strategy = ShutdownStrategy::PoisonPill;
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let report = coordinator.run().unwrap();

    assert_eq!(report.total_solved, 100);
    assert_eq!(report.processed_by_workers(), 100);
    assert!(report
        .workers
        .iter()
        .all(|worker| worker.exit == WorkerExit::Poisoned));
}

#[test]
fn test_observer_sees_every_solution() {
    logging::init_test();
    let mut cfg = config(Workload::Custom(50), 4, 2);
    cfg.collect_solutions = false;
    let mut coordinator = Coordinator::new(cfg).unwrap();
    let mut source = UniformSource::with_seed(5, -5.0, 5.0).unwrap();

    let mut observed = Vec::new();
    let report = coordinator
        .run_with(&mut source, |solution| observed.push(solution.sequence))
        .unwrap();

    observed.sort_unstable();
    assert_eq!(observed, (0..50).collect::<Vec<_>>());
    assert!(report.solutions.is_empty());
}

#[test]
fn test_panicking_solver_fails_the_run() {
    logging::init_test();
    let solver = |equation: &Equation| {
        if equation.a() == 3.0 {
            panic!("cannot solve {}", equation);
        }
        QuadraticSolver.solve(equation)
    };
    let mut coordinator =
        Coordinator::with_solver(config(Workload::Custom(4), 2, 2), Arc::new(solver)).unwrap();
    let mut source = FixedSource::from_coefficients([
        (1.0, 0.0, -1.0),
        (2.0, 0.0, -8.0),
        (3.0, 1.0, 1.0),
        (4.0, 0.0, -16.0),
    ])
    .unwrap();

    let err = coordinator.run_with(&mut source, |_| {}).unwrap_err();

    match err {
        SystemError::WorkerPanicked { message, .. } => assert!(message.contains("cannot solve")),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(coordinator.state(), CoordinatorState::Failed);
}

#[test]
fn test_exhausted_source_is_reported() {
    logging::init_test();
    for mode in [FeedMode::Lockstep, FeedMode::Pipelined] {
        let mut cfg = config(Workload::Custom(5), 2, 2);
        cfg.feed_mode = mode;
        let mut coordinator = Coordinator::new(cfg).unwrap();
        let mut source = FixedSource::from_coefficients([(1.0, 1.0, 1.0), (2.0, 2.0, 2.0)]).unwrap();

        match coordinator.run_with(&mut source, |_| {}) {
            Err(SystemError::SourceExhausted { produced, expected }) => {
                assert_eq!(produced, 2);
                assert_eq!(expected, 5);
            }
            other => panic!("{:?}: unexpected outcome {:?}", mode, other.map(|r| r.total_solved)),
        }
        assert_eq!(coordinator.state(), CoordinatorState::Failed);
    }
}

#[test]
fn test_drain_timeout_fails_the_run() {
    logging::init_test();
    let slow = |equation: &Equation| {
        std::thread::sleep(Duration::from_millis(200));
        QuadraticSolver.solve(equation)
    };
    let mut cfg = config(Workload::Custom(3), 1, 1);
    cfg.drain_timeout = Some(Duration::from_millis(20));
    let mut coordinator = Coordinator::with_solver(cfg, Arc::new(slow)).unwrap();

    let err = coordinator.run().unwrap_err();

    assert!(matches!(err, SystemError::Timeout(_)), "got {}", err);
    assert_eq!(coordinator.state(), CoordinatorState::Failed);
}

#[test]
fn test_coordinator_runs_only_once() {
    logging::init_test();
    let mut coordinator = Coordinator::new(config(Workload::Custom(5), 2, 2)).unwrap();
    coordinator.run().unwrap();

    match coordinator.run() {
        Err(SystemError::InvalidState(state)) => assert_eq!(state, "done"),
        other => panic!("unexpected outcome {:?}", other.map(|r| r.total_solved)),
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = Coordinator::new(config(Workload::Small, 0, 10)).unwrap_err();
    assert!(matches!(err, SystemError::ConfigError(_)));

    let err = Coordinator::new(config(Workload::Small, 10, 0)).unwrap_err();
    assert!(matches!(err, SystemError::ConfigError(_)));
}

#[test]
fn test_more_workers_than_equations() {
    logging::init_test();
    let mut coordinator = Coordinator::new(config(Workload::Custom(2), 10, 10)).unwrap();
    let report = coordinator.run().unwrap();
    assert_eq!(report.total_solved, 2);
    assert_eq!(report.workers.len(), 10);
    assert_eq!(report.processed_by_workers(), 2);
}

#[test]
fn test_lockstep_keeps_one_equation_in_flight() {
    logging::init_test();
    let mut cfg = config(Workload::Custom(500), 10, 10);
    cfg.seed = Some(3);
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let report = coordinator.run().unwrap();

    assert_eq!(report.total_solved, 500);
    // The next equation is only submitted after one solution was drained.
    assert_eq!(report.equation_channel_peak, 1);
    assert_eq!(report.result_channel_peak, 1);
}

#[test]
fn test_run_observed_streams_solutions_while_draining() {
    logging::init_test();
    let mut cfg = config(Workload::Custom(20), 3, 2);
    cfg.seed = Some(11);
    cfg.collect_solutions = false;
    let mut coordinator = Coordinator::new(cfg).unwrap();

    let mut observed = Vec::new();
    let report = coordinator
        .run_observed(|solution| observed.push(*solution))
        .unwrap();

    assert_eq!(observed.len(), 20);
    assert!(report.solutions.is_empty());
    let mut replay = UniformSource::with_seed(11, -5.0, 5.0).unwrap();
    let submitted: Vec<Equation> = (0..20).filter_map(|_| replay.next_equation()).collect();
    for solution in &observed {
        assert_eq!(solution.equation, submitted[solution.sequence as usize]);
    }
}

#[test]
fn test_elapsed_covers_production_within_run() {
    logging::init_test();
    let slow = |equation: &Equation| {
        std::thread::sleep(Duration::from_millis(20));
        QuadraticSolver.solve(equation)
    };
    let mut coordinator =
        Coordinator::with_solver(config(Workload::Custom(3), 1, 1), Arc::new(slow)).unwrap();

    let started = std::time::Instant::now();
    let report = coordinator.run().unwrap();
    let wall = started.elapsed();

    assert!(report.elapsed >= Duration::from_millis(60), "{:?}", report.elapsed);
    assert!(report.elapsed <= wall);
}
