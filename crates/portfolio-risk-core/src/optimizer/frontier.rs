use crate::RiskResult;

use super::engine::PortfolioOptimizer;
use super::types::{FrontierPoint, SimulatedPortfolio};

impl PortfolioOptimizer {
    /// Efficient frontier of a fresh Monte-Carlo trace with `simulations`
    /// portfolios, interpolated to `num_points`.
    pub fn generate_efficient_frontier(
        &self,
        simulations: usize,
        num_points: usize,
    ) -> RiskResult<Vec<FrontierPoint>> {
        let trace = self.simulate(simulations)?;
        Ok(generate_efficient_frontier(
            &trace,
            num_points,
            self.risk_free_rate,
        ))
    }
}

/// Upper envelope of simulated (volatility, return) pairs.
///
/// Portfolios are sorted by volatility and kept only when their return
/// beats every lower-volatility one. The envelope is then resampled at
/// `num_points` evenly spaced volatilities by linear interpolation. With
/// fewer than two envelope points, or `num_points < 2`, the raw envelope
/// is returned.
pub fn generate_efficient_frontier(
    simulations: &[SimulatedPortfolio],
    num_points: usize,
    risk_free_rate: f64,
) -> Vec<FrontierPoint> {
    let mut pairs: Vec<(f64, f64)> = simulations
        .iter()
        .filter(|p| p.volatility.is_finite() && p.expected_return.is_finite())
        .map(|p| (p.volatility, p.expected_return))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.total_cmp(&a.1)));

    let mut envelope: Vec<(f64, f64)> = Vec::new();
    for (vol, ret) in pairs {
        if envelope.last().map_or(true, |(_, best)| ret > *best) {
            envelope.push((vol, ret));
        }
    }

    let point = |vol: f64, ret: f64| FrontierPoint {
        volatility: vol,
        expected_return: ret,
        sharpe_ratio: if vol > 0.0 {
            (ret - risk_free_rate) / vol
        } else {
            0.0
        },
    };

    if envelope.len() < 2 || num_points < 2 {
        return envelope.into_iter().map(|(v, r)| point(v, r)).collect();
    }

    let (v_min, v_max) = (envelope[0].0, envelope[envelope.len() - 1].0);
    let step = (v_max - v_min) / (num_points - 1) as f64;
    let mut segment = 0;
    (0..num_points)
        .map(|k| {
            let vol = if k == num_points - 1 {
                v_max
            } else {
                v_min + step * k as f64
            };
            while segment + 2 < envelope.len() && envelope[segment + 1].0 < vol {
                segment += 1;
            }
            let (v0, r0) = envelope[segment];
            let (v1, r1) = envelope[segment + 1];
            let ret = if v1 > v0 {
                r0 + (r1 - r0) * (vol - v0) / (v1 - v0)
            } else {
                r1
            };
            point(vol, ret)
        })
        .collect()
}
