mod model;
mod state;

pub use model::SessionModel;
pub use state::{KillRecord, PlayerState, SuicideRecord};
