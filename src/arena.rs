//! Headless walled arena that drives droid brains and measures fitness.
//!
//! Each droid steers with three network outputs (turn, throttle, feeler scale)
//! and senses the walls through feelers cast along its velocity. It dies when
//! it touches a wall. Fitness is the number of distinct grid cells entered
//! while moving forward.

use std::collections::HashSet;

use ndarray::{Array1, array};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use neurodroids::engine::activation::Activation;
use neurodroids::engine::error::{EvolutionError, Result};
use neurodroids::engine::network::FeedforwardNetwork;
use neurodroids::engine::params::Topology;
use neurodroids::engine::population::Population;
use neurodroids::engine::schedule::GenerationSchedule;

const MIN_FEELER_SCALE: f32 = 0.375;
const MAX_FEELER_SCALE: f32 = 1.875;

/// Arena and droid parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaParams {
    /// Walls sit at `±half_extent` on both axes.
    pub half_extent: f32,
    /// Side length of a fitness grid cell.
    pub cell_size: f32,
    /// Droid collision radius.
    pub body_radius: f32,
    /// Fixed simulation timestep in seconds.
    pub dt: f32,
    /// Throttle multiplier.
    pub speed: f32,
    /// Force vector is clamped to this magnitude.
    pub max_speed: f32,
    /// Degrees turned per tick at full turn output.
    pub turn_rate: f32,
    /// Feelers as (angle from velocity in degrees, base length) pairs.
    pub feelers: Vec<(f32, f32)>,
    /// Droids spawn within `±spawn_spread` of the centre.
    pub spawn_spread: f32,
    /// Neuron activation for droid brains.
    #[serde(default)]
    pub activation: Activation,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            half_extent: 12.0,
            cell_size: 1.0,
            body_radius: 0.3,
            dt: 0.02,
            speed: 1.0,
            max_speed: 1.2,
            turn_rate: 10.0,
            feelers: vec![(-20.0, 1.5), (20.0, 1.5), (0.0, 2.0)],
            spawn_spread: 2.0,
            activation: Activation::Tanh,
        }
    }
}

impl ArenaParams {
    /// Network shape for these feelers: feeler distances, feeler scale and
    /// speed in; turn, throttle and feeler scale out.
    pub fn topology(&self) -> Topology {
        let num_inputs = self.feelers.len() + 2;
        let num_outputs = 3;
        Topology {
            num_inputs,
            num_outputs,
            num_hidden_layers: 2,
            neurons_per_hidden_layer: num_inputs + num_outputs,
            bias: -1.0,
        }
    }
}

/// A single agent and its brain.
#[derive(Debug, Clone)]
pub struct Droid {
    brain: FeedforwardNetwork,
    inputs: Vec<f32>,
    outputs: Vec<f32>,
    pos: Array1<f32>,
    vel: Array1<f32>,
    direction: Array1<f32>,
    feeler_scale: f32,
    alive: bool,
    visited: HashSet<(i32, i32)>,
    journey_length: f32,
    lifetime: f32,
}

impl Droid {
    /// Creates a droid with a zeroed brain.
    pub fn new(topology: Topology) -> Result<Self> {
        let brain = FeedforwardNetwork::new(topology)?;
        Ok(Self {
            inputs: vec![0.0; topology.num_inputs],
            outputs: vec![0.0; topology.num_outputs],
            brain,
            pos: Array1::zeros(2),
            vel: Array1::zeros(2),
            direction: array![1.0, 0.0],
            feeler_scale: 1.0,
            alive: true,
            visited: HashSet::new(),
            journey_length: 0.0,
            lifetime: 0.0,
        })
    }

    /// Loads new weights and places the droid for a new generation.
    pub fn reset(&mut self, weights: &[f32], pos: Array1<f32>, heading: f32) -> Result<()> {
        self.brain.load_weights(weights)?;
        self.pos = pos;
        self.vel = Array1::zeros(2);
        self.direction = array![heading.cos(), heading.sin()];
        self.feeler_scale = 1.0;
        self.alive = true;
        self.visited.clear();
        self.journey_length = 0.0;
        self.lifetime = 0.0;
        self.inputs.iter_mut().for_each(|x| *x = 0.0);
        Ok(())
    }

    /// Whether the droid is still moving.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Distinct cells entered while moving forward.
    pub fn journey_length(&self) -> f32 {
        self.journey_length
    }

    /// Seconds survived.
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Advances one tick.
    pub fn step(&mut self, params: &ArenaParams) -> Result<()> {
        if !self.alive {
            return Ok(());
        }

        let speed = norm(&self.vel);
        let n = params.feelers.len();
        self.inputs[n] = self.feeler_scale.clamp(MIN_FEELER_SCALE, MAX_FEELER_SCALE);
        self.inputs[n + 1] = speed.clamp(-100.0, 100.0);
        let activation = params.activation;
        self.brain
            .feed_forward(&self.inputs, &mut self.outputs, |x| activation.apply(x))?;

        // tanh outputs are in (-1, 1); map the last one onto the feeler scale range
        self.feeler_scale =
            ((self.outputs[2] + 1.5) * 0.75).clamp(MIN_FEELER_SCALE, MAX_FEELER_SCALE);
        self.direction = rotate(&self.direction, self.outputs[0] * params.turn_rate);

        let force = clamp_magnitude(
            &self.direction * (self.outputs[1] * params.speed),
            params.max_speed,
        );
        let corrected = force - &self.vel * speed;
        // NaN impulses are dropped
        if corrected.iter().all(|x| x.is_finite()) {
            self.vel += &corrected;
        }
        self.pos += &(&self.vel * params.dt);
        self.lifetime += params.dt;

        let limit = params.half_extent - params.body_radius;
        if self.pos.iter().any(|c| !c.is_finite() || c.abs() >= limit) {
            self.alive = false;
            return Ok(());
        }

        let moving_forward = self.vel.dot(&self.direction) > 0.0;
        if moving_forward && self.visited.insert(cell_of(&self.pos, params.cell_size)) {
            self.journey_length += 1.0;
        }

        self.cast_feelers(params);
        Ok(())
    }

    fn cast_feelers(&mut self, params: &ArenaParams) {
        let speed = norm(&self.vel);
        let heading = if speed > f32::EPSILON {
            &self.vel / speed
        } else {
            self.direction.clone()
        };

        for (i, &(angle, base_length)) in params.feelers.iter().enumerate() {
            let ray = rotate(&heading, angle);
            let length = base_length * self.feeler_scale;
            self.inputs[i] = distance_to_wall(&self.pos, &ray, params.half_extent).min(length);
        }
    }
}

/// All droids of one population.
pub struct Arena {
    params: ArenaParams,
    droids: Vec<Droid>,
}

impl Arena {
    /// Builds one droid per population slot.
    pub fn new(params: ArenaParams, population_size: usize) -> Result<Self> {
        let topology = params.topology();
        let droids = (0..population_size)
            .map(|_| Droid::new(topology))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { params, droids })
    }

    /// Droids in population order.
    pub fn droids(&self) -> &[Droid] {
        &self.droids
    }

    /// Loads a population and scatters the droids around the centre.
    pub fn reset<R: Rng + ?Sized>(&mut self, population: &Population, rng: &mut R) -> Result<()> {
        if population.len() != self.droids.len() {
            return Err(EvolutionError::DimensionMismatch {
                what: "population",
                expected: self.droids.len(),
                actual: population.len(),
            });
        }

        let spread = self.params.spawn_spread;
        for (droid, genome) in self.droids.iter_mut().zip(population) {
            let heading = rng.random_range(0.0..std::f32::consts::TAU);
            let pos = array![
                rng.random_range(-spread..=spread),
                rng.random_range(-spread..=spread)
            ];
            droid.reset(genome.weights(), pos, heading)?;
        }
        Ok(())
    }

    /// Runs until the schedule says the generation is over; returns fitness
    /// per droid.
    pub fn run_generation(&mut self, schedule: &GenerationSchedule) -> Result<Vec<f32>> {
        let params = &self.params;
        let total = self.droids.len();
        let mut elapsed = 0.0;

        loop {
            let inactive = self.droids.iter().filter(|d| !d.is_alive()).count();
            if schedule.should_end(elapsed, inactive, total) {
                break;
            }
            self.droids
                .par_iter_mut()
                .try_for_each(|droid| droid.step(params))?;
            elapsed += params.dt;
        }

        Ok(self.droids.iter().map(Droid::journey_length).collect())
    }
}

fn norm(v: &Array1<f32>) -> f32 {
    v.dot(v).sqrt()
}

fn rotate(v: &Array1<f32>, degrees: f32) -> Array1<f32> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    array![v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos]
}

fn clamp_magnitude(v: Array1<f32>, max: f32) -> Array1<f32> {
    let length = norm(&v);
    if length > max { v * (max / length) } else { v }
}

fn cell_of(pos: &Array1<f32>, cell_size: f32) -> (i32, i32) {
    (
        (pos[0] / cell_size).floor() as i32,
        (pos[1] / cell_size).floor() as i32,
    )
}

/// Distance along a unit ray from `pos` to the square's walls.
fn distance_to_wall(pos: &Array1<f32>, ray: &Array1<f32>, half_extent: f32) -> f32 {
    let mut nearest = f32::INFINITY;
    for axis in 0..2 {
        let d = ray[axis];
        let t = if d > 0.0 {
            (half_extent - pos[axis]) / d
        } else if d < 0.0 {
            (-half_extent - pos[axis]) / d
        } else {
            continue;
        };
        nearest = nearest.min(t.max(0.0));
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurodroids::engine::genome::Genome;
    use neurodroids::engine::schedule::ScheduleParams;

    #[test]
    fn test_default_topology_has_147_weights() {
        assert_eq!(ArenaParams::default().topology().weight_count(), 147);
    }

    #[test]
    fn test_activation_read_from_config() {
        let mut json = serde_json::to_value(ArenaParams::default()).unwrap();
        json.as_object_mut().unwrap().remove("activation");
        let params: ArenaParams = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(params.activation, Activation::Tanh);

        json["activation"] = serde_json::json!("relu");
        let params: ArenaParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.activation, Activation::Relu);
    }

    #[test]
    fn test_distance_to_wall() {
        let pos = array![0.0, 0.0];
        assert!((distance_to_wall(&pos, &array![1.0, 0.0], 10.0) - 10.0).abs() < 1e-5);
        assert!((distance_to_wall(&pos, &array![0.0, -1.0], 10.0) - 10.0).abs() < 1e-5);

        let corner = array![std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2];
        let off_centre = array![5.0, 0.0];
        let expected = 5.0 / std::f32::consts::FRAC_1_SQRT_2;
        assert!((distance_to_wall(&off_centre, &corner, 10.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(&array![1.0, 0.0], 90.0);
        assert!(v[0].abs() < 1e-6);
        assert!((v[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_brain_stays_put() {
        let params = ArenaParams::default();
        let mut droid = Droid::new(params.topology()).unwrap();
        droid.reset(&vec![0.0; 147], array![0.0, 0.0], 0.0).unwrap();
        for _ in 0..100 {
            droid.step(&params).unwrap();
        }
        assert!(droid.is_alive());
        assert_eq!(droid.journey_length(), 0.0);
    }

    #[test]
    fn test_generation_yields_one_fitness_per_droid() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let params = ArenaParams::default();
        let topology = params.topology();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut evolver = neurodroids::Evolver::new(
            neurodroids::EvolverParams::for_topology(&topology, 8),
        )
        .unwrap();
        evolver.initialize(vec![Genome::random(147, &mut rng, -1.0..=1.0)], &mut rng).unwrap();

        let mut arena = Arena::new(params, 8).unwrap();
        arena.reset(evolver.population().unwrap(), &mut rng).unwrap();

        let schedule = GenerationSchedule::new(ScheduleParams {
            starting_length: 1.0,
            ..ScheduleParams::default()
        });
        let fitness = arena.run_generation(&schedule).unwrap();
        assert_eq!(fitness.len(), 8);
        assert!(fitness.iter().all(|f| *f >= 0.0));
    }
}
