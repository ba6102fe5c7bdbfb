/// The capability the core needs from an Atari 2600 emulator: RAM access,
/// the legal action set, stepping one frame, termination, and a clonable
/// / restorable state used by UCT to roll the world forward and back.
///
/// A real ALE binding implements this trait; the core (feature extraction,
/// LFA, Sarsa, Dyna-2, UCT) is generic over it and never assumes a
/// concrete emulator.
pub trait Simulator {
    type State: Clone + PartialEq;

    /// Current RAM snapshot, `RAM_BYTES` long.
    fn ram(&self) -> &[u8];

    /// Actions legal in the current state.
    fn legal_actions(&self) -> &[usize];

    /// Applies `action` for one emulator frame, returning the reward.
    fn act(&mut self, action: usize) -> f64;

    fn game_over(&self) -> bool;

    fn frame_number(&self) -> u64;

    fn clone_state(&self) -> Self::State;

    fn restore_state(&mut self, state: &Self::State);

    fn reset_game(&mut self);
}
