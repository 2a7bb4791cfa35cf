pub mod activity;
pub mod bar;
pub mod decision;
pub mod indicators;
pub mod patterns;
pub mod performance;
pub mod risk;
pub mod score;
pub mod sentiment;
pub mod signals;

pub use activity::*;
pub use bar::*;
pub use decision::*;
pub use indicators::*;
pub use patterns::*;
pub use performance::*;
pub use risk::*;
pub use score::*;
pub use sentiment::*;
pub use signals::*;
