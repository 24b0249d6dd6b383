//! Hopper driven through a few solver iterations.
//!
//! Each iteration rolls out the current controller across two scheduled
//! ground impacts, evaluates the performance index, proposes a bias update
//! from a PD law, line-searches it and updates the ground multipliers.
//!
//! Run: `RUST_LOG=strider_oc=debug cargo run -p strider-demos --bin hybrid_rollout`

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use strider_core::{Controller, ModeSchedule, StriderError, TimeWindow};
use strider_demos::{HOPPER_CONFIG, HeightTrackingCost, Hopper, HopperConfig, hopper_problem, init_tracing, pd_thrust};
use strider_oc::{
    LineSearchContext, LinearController, PrimalSolution, TimeTriggeredRollout, compute_rollout_metrics,
    compute_rollout_performance_index, initialize_dual_solution, rollout_trajectory, update_dual_solution,
};
use strider_switched::mode;
use tracing::{info, warn};

const TARGET_HEIGHT: f64 = 0.8;
const NUM_ITERATIONS: usize = 6;

fn main() -> Result<(), StriderError> {
    init_tracing();
    println!("=== Hybrid Rollout Example ===\n");

    // ---------------------------------------------------------------
    // 1. Configuration and problem
    // ---------------------------------------------------------------
    let config = HopperConfig::from_toml_str(HOPPER_CONFIG)?;
    let rollout = TimeTriggeredRollout::new(Arc::new(Hopper { restitution: 0.6 }), config.solver.rollout.clone())?;
    let problem = hopper_problem(
        HeightTrackingCost {
            target_height: TARGET_HEIGHT,
            input_weight: 1e-3,
        },
        config.penalty.build()?,
    );

    let window = TimeWindow::new(0.0, 2.0)?;
    let schedule = ModeSchedule::new(vec![0.45, 1.2], vec![mode::FLY, mode::STANCE, mode::FLY])?;
    let x0 = DVector::from_vec(vec![1.0, 0.0]);
    println!(
        "Window [{}, {}], impacts at {:?}",
        window.start,
        window.end,
        schedule.event_times()
    );

    // ---------------------------------------------------------------
    // 2. Baseline: no thrust
    // ---------------------------------------------------------------
    let mut controller = LinearController::zeros(vec![window.start, window.end], 2, 1)?;
    let mut primal = PrimalSolution::default();
    rollout_trajectory(&rollout, window, &x0, &schedule, &controller, &mut primal)?;
    let mut dual = initialize_dual_solution(&problem, &primal);

    // ---------------------------------------------------------------
    // 3. Iterate
    // ---------------------------------------------------------------
    for iteration in 0..NUM_ITERATIONS {
        rollout_trajectory(&rollout, window, &x0, &schedule, &controller, &mut primal)?;
        let metrics = compute_rollout_metrics(&problem, &primal, &dual)?;
        let baseline = compute_rollout_performance_index(&primal.time_trajectory, &metrics);
        println!("\n--- Iteration {iteration} ---");
        println!("  {baseline}");

        let biases: Vec<DVector<f64>> = primal
            .time_trajectory
            .iter()
            .zip(&primal.state_trajectory)
            .map(|(&t, x)| controller.compute_input(t, x))
            .collect();
        let delta_biases = primal
            .state_trajectory
            .iter()
            .zip(&biases)
            .map(|(x, b)| DVector::from_element(1, pd_thrust(TARGET_HEIGHT, x) - b[0]))
            .collect();
        let n = biases.len();
        let unoptimized = LinearController::new(primal.time_trajectory.clone(), vec![DMatrix::zeros(1, 2); n], biases)?
            .with_delta_biases(delta_biases)?;
        println!("  update size: {:.4e}", unoptimized.update_input_sensitivity());

        let context = LineSearchContext {
            rollout: &rollout,
            problem: &problem,
            window,
            init_state: &x0,
            mode_schedule: &schedule,
            dual: &dual,
        };
        let Some(trial) = context.search(&unoptimized, &baseline, &config.solver.line_search) else {
            warn!(iteration, "line search found no improving step");
            break;
        };
        info!(iteration, step_length = trial.step_length, merit = trial.performance_index.merit(), "step accepted");
        println!(
            "  accepted step {:.3}: merit {:.6e} -> {:.6e}",
            trial.step_length,
            baseline.merit(),
            trial.performance_index.merit()
        );

        update_dual_solution(&problem, &trial.primal, &trial.metrics, &mut dual)?;
        controller = trial.controller;
    }

    // ---------------------------------------------------------------
    // 4. Final trajectory
    // ---------------------------------------------------------------
    rollout_trajectory(&rollout, window, &x0, &schedule, &controller, &mut primal)?;
    if let Some(x) = primal.final_state() {
        println!("\nFinal height {:.4} m, velocity {:.4} m/s", x[0], x[1]);
    }
    println!("\n=== Done ===");
    Ok(())
}
