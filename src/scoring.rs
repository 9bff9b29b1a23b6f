//! Route candidate scoring and selection.
//!
//! Each candidate gets a traffic tier, a fuel estimate and a safety score.
//! Selections are deterministic: when candidates tie, the earliest one in
//! input order wins.

use serde::{Deserialize, Serialize};

use crate::fuel;
use crate::models::{MotorFuelProfile, RouteCandidate};

/// Upper traffic-ratio bound (inclusive) for tiers 1 through 4.
const TIER_BREAKPOINTS: [f64; 4] = [1.2, 1.5, 2.0, 2.5];

pub const MAX_SAFETY_SCORE: f64 = 100.0;
const HEAVY_TRAFFIC_PENALTY: f64 = 20.0;
const LONG_DISTANCE_PENALTY: f64 = 10.0;
const LONG_DURATION_PENALTY: f64 = 15.0;
/// Tiers above this count as heavy traffic.
const HEAVY_TRAFFIC_TIER: u8 = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Price of one litre of fuel, in the deployment's currency.
    pub fuel_price_per_liter: f64,
    /// Routes longer than this (meters) are penalized.
    pub long_distance_m: f64,
    /// Routes slower than this (seconds, nominal) are penalized.
    pub long_duration_s: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fuel_price_per_liter: 1.0,
            long_distance_m: 50_000.0,
            long_duration_s: 7_200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HeavyTraffic,
    LongDistance,
    LongDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteScore {
    pub traffic_tier: u8,
    /// Traffic over nominal duration; `None` without delay data.
    pub traffic_ratio: Option<f64>,
    pub fuel_liters: f64,
    pub fuel_cost: f64,
    pub safety_score: f64,
    pub risk_factors: Vec<RiskFactor>,
}

/// A candidate annotated with its score. `index` is the input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRoute {
    pub index: usize,
    pub distance_m: f64,
    pub duration_s: f64,
    pub traffic_duration_s: Option<f64>,
    pub candidate: RouteCandidate,
    pub score: RouteScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficAnalysis {
    pub average_traffic_tier: f64,
    pub worst_traffic_route: usize,
    pub best_traffic_route: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEstimate {
    pub route: usize,
    pub fuel_liters: f64,
    pub fuel_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyMetric {
    pub route: usize,
    pub safety_score: f64,
    pub risk_factors: Vec<RiskFactor>,
}

/// Scoring output. Indexes refer to the input candidate order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysis {
    pub routes: Vec<ScoredRoute>,
    pub best_route: Option<usize>,
    pub most_fuel_efficient_route: Option<usize>,
    pub traffic_analysis: Option<TrafficAnalysis>,
    pub fuel_estimates: Vec<FuelEstimate>,
    pub safety_metrics: Vec<SafetyMetric>,
}

/// Bucket a traffic-adjusted duration against the nominal one.
///
/// Missing or zero nominal duration, or missing traffic data, is tier 1.
pub fn traffic_tier(nominal_s: f64, traffic_s: Option<f64>) -> (u8, Option<f64>) {
    let Some(traffic_s) = traffic_s else {
        return (1, None);
    };
    if !(nominal_s.is_finite() && nominal_s > 0.0 && traffic_s.is_finite()) {
        return (1, None);
    }
    let ratio = traffic_s / nominal_s;
    (tier_for_ratio(ratio), Some(ratio))
}

pub fn tier_for_ratio(ratio: f64) -> u8 {
    TIER_BREAKPOINTS
        .iter()
        .position(|&bound| ratio <= bound)
        .map_or(5, |i| i as u8 + 1)
}

#[derive(Debug, Clone, Default)]
pub struct RouteScorer {
    config: ScoringConfig,
}

impl RouteScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score a single candidate. The profile is expected to be checked.
    pub fn score_route(
        &self,
        candidate: &RouteCandidate,
        profile: Option<&MotorFuelProfile>,
    ) -> RouteScore {
        let distance_m = candidate.distance_m();
        let duration_s = candidate.duration_s();
        let (traffic_tier, traffic_ratio) = traffic_tier(duration_s, candidate.traffic_duration_s());

        let fuel_liters = fuel::fuel_liters(distance_m, profile);
        let fuel_cost = fuel::fuel_cost(fuel_liters, self.config.fuel_price_per_liter);

        let mut safety_score = MAX_SAFETY_SCORE;
        let mut risk_factors = Vec::new();
        if traffic_tier > HEAVY_TRAFFIC_TIER {
            safety_score -= HEAVY_TRAFFIC_PENALTY;
            risk_factors.push(RiskFactor::HeavyTraffic);
        }
        if distance_m > self.config.long_distance_m {
            safety_score -= LONG_DISTANCE_PENALTY;
            risk_factors.push(RiskFactor::LongDistance);
        }
        if duration_s > self.config.long_duration_s {
            safety_score -= LONG_DURATION_PENALTY;
            risk_factors.push(RiskFactor::LongDuration);
        }

        RouteScore {
            traffic_tier,
            traffic_ratio,
            fuel_liters,
            fuel_cost,
            safety_score: safety_score.max(0.0),
            risk_factors,
        }
    }

    /// Score and rank a set of candidates. Candidates without legs are
    /// skipped; if none remain the analysis is empty.
    pub fn score(
        &self,
        candidates: &[RouteCandidate],
        profile: Option<&MotorFuelProfile>,
    ) -> RouteAnalysis {
        let routes: Vec<ScoredRoute> = candidates
            .iter()
            .enumerate()
            .filter(|(index, candidate)| {
                if candidate.legs.is_empty() {
                    tracing::debug!(index, "skipping route candidate without legs");
                    return false;
                }
                true
            })
            .map(|(index, candidate)| ScoredRoute {
                index,
                distance_m: candidate.distance_m(),
                duration_s: candidate.duration_s(),
                traffic_duration_s: candidate.traffic_duration_s(),
                candidate: candidate.clone(),
                score: self.score_route(candidate, profile),
            })
            .collect();

        if routes.is_empty() {
            return RouteAnalysis::default();
        }

        let best_route = first_min_by(&routes, |r| r.duration_s);
        let most_fuel_efficient_route = first_min_by(&routes, |r| r.score.fuel_cost);
        let best_traffic_route = first_min_by(&routes, |r| f64::from(r.score.traffic_tier));
        let worst_traffic_route = first_min_by(&routes, |r| -f64::from(r.score.traffic_tier));
        let average_traffic_tier = routes
            .iter()
            .map(|r| f64::from(r.score.traffic_tier))
            .sum::<f64>()
            / routes.len() as f64;

        let fuel_estimates = routes
            .iter()
            .map(|r| FuelEstimate {
                route: r.index,
                fuel_liters: r.score.fuel_liters,
                fuel_cost: r.score.fuel_cost,
            })
            .collect();
        let safety_metrics = routes
            .iter()
            .map(|r| SafetyMetric {
                route: r.index,
                safety_score: r.score.safety_score,
                risk_factors: r.score.risk_factors.clone(),
            })
            .collect();

        RouteAnalysis {
            best_route,
            most_fuel_efficient_route,
            traffic_analysis: match (worst_traffic_route, best_traffic_route) {
                (Some(worst), Some(best)) => Some(TrafficAnalysis {
                    average_traffic_tier,
                    worst_traffic_route: worst,
                    best_traffic_route: best,
                }),
                _ => None,
            },
            fuel_estimates,
            safety_metrics,
            routes,
        }
    }
}

/// Input index of the route with the smallest key. Only a strictly
/// smaller key displaces the current pick, so the earliest route wins ties.
fn first_min_by<F>(routes: &[ScoredRoute], key: F) -> Option<usize>
where
    F: Fn(&ScoredRoute) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for route in routes {
        let value = key(route);
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((route.index, value)),
        }
    }
    best.map(|(index, _)| index)
}
