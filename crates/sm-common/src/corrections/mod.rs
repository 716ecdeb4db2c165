pub mod category;
pub mod gender;
pub mod placement;
pub mod state;

pub use category::correct_category;
pub use gender::correct_gender;
pub use placement::{correct_placement_status, correct_training_result};
pub use state::{correct_state, normalize_place};
