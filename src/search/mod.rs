pub mod eval;
pub mod policy;
pub mod score;
pub mod solve;

pub use eval::{FlipMove, evaluate_flip};
pub use policy::{Greedy, MovePolicy, NoisyGreedy, PolicyKind, WalkSat};
pub use score::ScoreIndex;
pub use solve::{SearchParams, SolveOutcome, solve, solve_instance, solve_with};
