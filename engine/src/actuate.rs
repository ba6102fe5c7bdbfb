use crate::simulator::Simulator;

/// Applies `action` for `frame_skip` emulator frames, summing reward, then
/// collapses the sum to its sign when `scale_rewards` is set. Shared by the
/// real per-frame step, UCT expansion's one-step simulation, and UCT
/// rollouts, so frame-skip semantics live in exactly one place. Matches the
/// original's unconditional frame loop: a simulator is expected to return
/// zero reward once the game is already over rather than this helper
/// short-circuiting the loop.
pub fn apply_action<S: Simulator>(
    sim: &mut S,
    action: usize,
    frame_skip: u32,
    scale_rewards: bool,
) -> f64 {
    let mut reward = 0.0;
    for _ in 0..frame_skip.max(1) {
        reward += sim.act(action);
    }
    if scale_rewards {
        reward.signum()
    } else {
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ToySimulator;

    #[test]
    fn sums_reward_across_skipped_frames() {
        let mut sim = ToySimulator::new();
        let reward = apply_action(&mut sim, 0, 3, false);
        assert_eq!(reward, 3.0); // action 0 yields +1 each frame in the toy sim
    }

    #[test]
    fn scaling_collapses_to_sign() {
        let mut sim = ToySimulator::new();
        let reward = apply_action(&mut sim, 0, 3, true);
        assert_eq!(reward, 1.0);
    }

    #[test]
    fn acting_past_game_over_is_a_harmless_noop() {
        let mut sim = ToySimulator::new();
        while !sim.game_over() {
            sim.act(1);
        }
        let before = sim.frame_number();
        let reward = apply_action(&mut sim, 0, 10, false);
        assert_eq!(sim.frame_number(), before);
        assert_eq!(reward, 0.0);
    }
}
