//! Simulated annealing refinement (spec §4.4.4).
//!
//! Starting from the initial placement, repeatedly proposes a move on a
//! candidate drawn from [`find_suboptimal_placements`], accepting it under
//! the Metropolis criterion. The schedule cools geometrically and always
//! consumes the caller-supplied seed (spec §5: the engine never self-seeds).

use crate::placement::cost::{total_cost, unroutable_edges, UnroutableEdge};
use crate::placement::moves::{find_suboptimal_placements, propose_move, revert_move};
use gpx_builder::{DeviceGraph, NetlistGraph, Netlist};
use gpx_config::AnnealConfig;
use gpx_device::Device;
use gpx_diag::DiagnosticSink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of a completed annealing run.
#[derive(Debug)]
pub struct AnnealResult {
    /// Placement cost of the best placement seen during the run (spec §6.3:
    /// "the engine returns the best-seen placement ... for diagnostic use").
    /// `ngraph`/`dgraph` are left holding this placement, which may not be
    /// the one the schedule happened to end on if a late Metropolis-accepted
    /// uphill move left the graphs worse off than an earlier point.
    pub final_cost: u64,
    /// Number of candidate moves attempted across the whole schedule.
    pub moves_attempted: u64,
    /// Number of those moves accepted (either cost-improving or accepted
    /// under the Metropolis criterion).
    pub moves_accepted: u64,
    /// Netlist-graph edges with no routable path between their mated
    /// endpoints in the best-seen placement. Empty iff `final_cost` has no
    /// unroutable-edge component.
    pub unroutable_edges: Vec<UnroutableEdge>,
}

fn accept(new_cost: u64, old_cost: u64, temperature: f64, rng: &mut impl Rng) -> bool {
    if new_cost <= old_cost {
        return true;
    }
    let delta = (new_cost - old_cost) as f64;
    let probability = (-delta / temperature.max(f64::EPSILON)).exp();
    rng.gen::<f64>() < probability
}

/// Runs the annealing schedule to completion: either the placement reaches
/// zero cost, the candidate set empties (nothing left to improve), or the
/// temperature drops below `config.min_temperature`.
///
/// `config.seed` is required (spec §5); the driver validates this before
/// calling in (a missing seed is a configuration error, not a PAR failure).
pub fn anneal(
    netlist: &Netlist,
    ngraph: &mut NetlistGraph,
    dgraph: &mut DeviceGraph,
    device: &Device,
    config: &AnnealConfig,
    sink: &DiagnosticSink,
) -> AnnealResult {
    let seed = config.seed.expect("AnnealConfig.seed validated non-None by the driver");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut current_cost = total_cost(ngraph, dgraph, device);
    let mut temperature = config.initial_temp_scale * (current_cost as f64).sqrt().max(1.0);

    let mut moves_attempted = 0u64;
    let mut moves_accepted = 0u64;

    let mut best_cost = current_cost;
    let mut best_ngraph = ngraph.clone();
    let mut best_dgraph = dgraph.clone();

    while current_cost > 0 && temperature > config.min_temperature {
        let candidates = find_suboptimal_placements(netlist, ngraph, dgraph, device);
        if candidates.is_empty() {
            break;
        }

        let moves_this_step = (config.moves_per_temp_multiplier as usize * candidates.len()).max(1);
        for _ in 0..moves_this_step {
            let candidates = find_suboptimal_placements(netlist, ngraph, dgraph, device);
            if candidates.is_empty() {
                break;
            }
            let candidate = candidates[rng.gen_range(0..candidates.len())];
            let Some(record) = propose_move(netlist, ngraph, dgraph, device, candidate, &mut rng) else {
                continue;
            };
            moves_attempted += 1;

            let new_cost = total_cost(ngraph, dgraph, device);
            if accept(new_cost, current_cost, temperature, &mut rng) {
                current_cost = new_cost;
                moves_accepted += 1;
                if current_cost < best_cost {
                    best_cost = current_cost;
                    best_ngraph = ngraph.clone();
                    best_dgraph = dgraph.clone();
                }
            } else {
                revert_move(ngraph, dgraph, &record);
            }

            if current_cost == 0 {
                break;
            }
        }

        temperature *= config.cooling_rate;
    }

    // The schedule may end on a worse placement than the best one seen (a
    // late Metropolis-accepted uphill move is never rolled back on its own);
    // restore the best-seen placement before returning (spec §6.3).
    if current_cost > best_cost {
        *ngraph = best_ngraph;
        *dgraph = best_dgraph;
        current_cost = best_cost;
    }

    if current_cost > 0 {
        sink.warning(format!(
            "annealing ended with nonzero placement cost {current_cost}; post-PAR DRC will likely fail"
        ));
    }

    AnnealResult {
        final_cost: current_cost,
        moves_attempted,
        moves_accepted,
        unroutable_edges: unroutable_edges(ngraph, dgraph),
    }
}
