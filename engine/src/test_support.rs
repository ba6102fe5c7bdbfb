//! A small deterministic stand-in for a real ALE binding, used throughout
//! this workspace's tests and benches and wired up as `ale-cli`'s bundled
//! default backend. It is not a claim of real Atari emulation — a real
//! deployment swaps in an FFI crate implementing [`Simulator`] instead.

use crate::constants::RAM_BYTES;
use crate::simulator::Simulator;

const TOY_LEGAL_ACTIONS: [usize; 2] = [0, 1];

#[derive(Debug, Clone, PartialEq)]
pub struct ToyState {
    frame: u64,
    ram: [u8; RAM_BYTES],
}

/// Two legal actions: action 0 always yields reward 1, action 1 always
/// yields reward 0. The episode ends after a fixed number of frames. RAM
/// byte 0 mirrors the frame counter so feature extraction has something to
/// chew on.
#[derive(Debug, Clone)]
pub struct ToySimulator {
    frame: u64,
    terminal_frame: u64,
    ram: [u8; RAM_BYTES],
}

impl ToySimulator {
    pub fn new() -> Self {
        Self::with_terminal_frame(5)
    }

    pub fn with_terminal_frame(terminal_frame: u64) -> Self {
        Self {
            frame: 0,
            terminal_frame,
            ram: [0u8; RAM_BYTES],
        }
    }
}

impl Default for ToySimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for ToySimulator {
    type State = ToyState;

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn legal_actions(&self) -> &[usize] {
        &TOY_LEGAL_ACTIONS
    }

    fn act(&mut self, action: usize) -> f64 {
        if self.game_over() {
            return 0.0;
        }
        self.frame += 1;
        self.ram[0] = (self.frame % 256) as u8;
        if action == 0 {
            1.0
        } else {
            0.0
        }
    }

    fn game_over(&self) -> bool {
        self.frame >= self.terminal_frame
    }

    fn frame_number(&self) -> u64 {
        self.frame
    }

    fn clone_state(&self) -> Self::State {
        ToyState {
            frame: self.frame,
            ram: self.ram,
        }
    }

    fn restore_state(&mut self, state: &Self::State) {
        self.frame = state.frame;
        self.ram = state.ram;
    }

    fn reset_game(&mut self) {
        self.frame = 0;
        self.ram = [0u8; RAM_BYTES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminates_after_fixed_frame_count() {
        let mut sim = ToySimulator::with_terminal_frame(3);
        assert!(!sim.game_over());
        sim.act(0);
        sim.act(0);
        sim.act(0);
        assert!(sim.game_over());
    }

    #[test]
    fn clone_restore_round_trips_state() {
        let mut sim = ToySimulator::new();
        sim.act(0);
        let snapshot = sim.clone_state();
        sim.act(0);
        sim.act(1);
        sim.restore_state(&snapshot);
        assert_eq!(sim.frame_number(), 1);
    }
}
