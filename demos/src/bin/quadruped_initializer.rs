//! Com-kino initialization along a trot schedule.
//!
//! A planner-owned [`ModeScheduleManager`] is shared with the initializer;
//! the demo queries the seed at a few times, replaces the schedule, and
//! queries again.
//!
//! Run: `cargo run -p strider-demos --bin quadruped_initializer`

use std::sync::Arc;

use nalgebra::DVector;
use strider_core::{ModeSchedule, StriderError};
use strider_demos::init_tracing;
use strider_switched::state::{com_twist, contact_force};
use strider_switched::{
    ComKinoInitializer, Initializer, ModeScheduleManager, PointMassComModel, STATE_DIM, mode,
    mode_number_to_contact_flags,
};

fn print_seed(initializer: &dyn Initializer, time: f64, state: &DVector<f64>) -> Result<(), StriderError> {
    let (input, next_state) = initializer.compute(time, state, time + 0.1)?;
    let forces: Vec<String> = (0..4)
        .map(|leg| format!("{:6.2}", contact_force(&input, leg).z))
        .collect();
    println!(
        "  t = {time:4.2}: vertical forces [{}], base twist norm {:.1}",
        forces.join(", "),
        com_twist(&next_state).norm()
    );
    Ok(())
}

fn main() -> Result<(), StriderError> {
    init_tracing();
    println!("=== Quadruped Initializer Example ===\n");

    // ---------------------------------------------------------------
    // 1. Shared schedule: stance, trot, trot, stance
    // ---------------------------------------------------------------
    let trot = ModeSchedule::new(
        vec![0.2, 0.5, 0.8],
        vec![mode::STANCE, mode::LF_RH, mode::RF_LH, mode::STANCE],
    )?;
    let manager = Arc::new(ModeScheduleManager::new(trot));
    for &m in manager.mode_schedule().mode_sequence() {
        println!("mode {m:2}: contacts {:?}", mode_number_to_contact_flags(m)?);
    }

    let initializer = ComKinoInitializer::new(Arc::new(PointMassComModel { total_mass: 30.0 }), manager.clone());

    // ---------------------------------------------------------------
    // 2. Seeds from a moving state
    // ---------------------------------------------------------------
    let mut state = DVector::zeros(STATE_DIM);
    state[5] = 0.45; // base height
    state[9] = 0.3; // forward velocity
    println!("\nTrot schedule:");
    for time in [0.1, 0.3, 0.6, 0.9] {
        print_seed(&initializer, time, &state)?;
    }

    // ---------------------------------------------------------------
    // 3. Planner swaps in a flight phase
    // ---------------------------------------------------------------
    manager.set_mode_schedule(ModeSchedule::new(vec![0.4], vec![mode::STANCE, mode::FLY])?);
    println!("\nJump schedule:");
    for time in [0.1, 0.6] {
        print_seed(&initializer, time, &state)?;
    }

    println!("\n=== Done ===");
    Ok(())
}
