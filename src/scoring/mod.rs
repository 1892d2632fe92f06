pub mod excitement;

pub use excitement::{comeback_factor, excitement_score, wp_volatility};
