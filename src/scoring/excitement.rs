//! Excitement score model
//!
//! Two-factor model over the home team's win probability trajectory:
//! normalized per-play WP volatility (primary) plus the comeback factor
//! (largest deficit the winner overcame). Weights were tuned against
//! historical seasons to land a roughly normal score distribution with a
//! mean near 6.

const VOLATILITY_WEIGHT: f64 = 2.2607;
const COMEBACK_WEIGHT: f64 = 0.7701;
const COMEBACK_SCALE: f64 = 7.5;

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

/// Mean absolute WP change per play, as a percentage
pub fn wp_volatility(wp_history: &[f64]) -> f64 {
    if wp_history.len() < 2 {
        return 0.0;
    }

    let total: f64 = wp_history
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum();

    total / (wp_history.len() - 1) as f64 * 100.0
}

/// How far below 50% the eventual winner's probability dropped, scaled
pub fn comeback_factor(wp_history: &[f64], home_score: i32, away_score: i32) -> f64 {
    if wp_history.len() < 2 {
        return 0.0;
    }

    let home_won = home_score > away_score;
    let deficit_overcome = if home_won {
        let min_wp = wp_history.iter().cloned().fold(f64::INFINITY, f64::min);
        0.5 - min_wp
    } else {
        let max_wp = wp_history.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        max_wp - 0.5
    };

    (deficit_overcome * COMEBACK_SCALE).max(0.0)
}

/// Excitement score for a finished game, clamped to [1.0, 10.0]
pub fn excitement_score(wp_history: &[f64], home_score: i32, away_score: i32) -> f64 {
    let volatility = wp_volatility(wp_history);
    let comeback = comeback_factor(wp_history, home_score, away_score);

    (volatility * VOLATILITY_WEIGHT + comeback * COMEBACK_WEIGHT).clamp(MIN_SCORE, MAX_SCORE)
}
