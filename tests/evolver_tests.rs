#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use neurodroids::{EvolutionError, Evolver, EvolverParams, EvolverState, Genome, Topology};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn droid_topology() -> Topology {
    Topology {
        num_inputs: 5,
        num_outputs: 3,
        num_hidden_layers: 2,
        neurons_per_hidden_layer: 8,
        bias: -1.0,
    }
}

fn create_test_params() -> EvolverParams {
    EvolverParams::for_topology(&droid_topology(), 20)
}

fn ready_evolver(seed: u64) -> (Evolver, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut evolver = Evolver::new(create_test_params()).unwrap();
    evolver.initialize(Vec::new(), &mut rng).unwrap();
    (evolver, rng)
}

/// Fitness that rewards large first weights, so rankings are non-trivial.
fn score(evolver: &Evolver) -> Vec<f32> {
    evolver
        .population()
        .unwrap()
        .iter()
        .map(|g| g.weights()[0] + 1.0)
        .collect()
}

#[test]
fn test_initialize_random_population() {
    let (evolver, _) = ready_evolver(2);
    let population = evolver.population().unwrap();

    assert_eq!(evolver.state(), EvolverState::Ready);
    assert_eq!(evolver.generation(), 0);
    assert_eq!(population.len(), 20);
    for genome in population {
        assert_eq!(genome.len(), 147);
        assert_eq!(genome.fitness(), None);
        assert!(genome.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
    }
}

#[test]
fn test_uninitialized_evolver_refuses_work() {
    let mut evolver = Evolver::new(create_test_params()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    assert_eq!(evolver.state(), EvolverState::Uninitialized);
    assert!(matches!(
        evolver.population(),
        Err(EvolutionError::Uninitialized)
    ));
    assert!(matches!(
        evolver.new_generation(&[0.0; 20], &mut rng),
        Err(EvolutionError::Uninitialized)
    ));
    assert!(matches!(
        evolver.import_genome(Genome::new(vec![0.0; 147])),
        Err(EvolutionError::Uninitialized)
    ));
}

#[test]
fn test_invalid_params_rejected() {
    let mut params = create_test_params();
    params.population_size = 0;
    assert!(matches!(
        Evolver::new(params),
        Err(EvolutionError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_seeds_fill_front_then_random() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let seeds: Vec<Genome> = (0..3)
        .map(|i| Genome::new(vec![i as f32; 147]).with_fitness(50.0))
        .collect();

    let mut evolver = Evolver::new(create_test_params()).unwrap();
    evolver.initialize(seeds.clone(), &mut rng).unwrap();
    let population = evolver.population().unwrap();

    assert_eq!(population.len(), 20);
    for (i, seed) in seeds.iter().enumerate() {
        assert_eq!(population[i].weights(), seed.weights());
        assert_eq!(population[i].fitness(), None, "seed fitness is cleared");
    }
    for genome in population.iter().skip(3) {
        assert!(genome.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
    }
}

#[test]
fn test_excess_seeds_truncated() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let seeds: Vec<Genome> = (0..30).map(|i| Genome::new(vec![i as f32; 147])).collect();

    let mut evolver = Evolver::new(create_test_params()).unwrap();
    evolver.initialize(seeds, &mut rng).unwrap();
    let population = evolver.population().unwrap();

    assert_eq!(population.len(), 20);
    assert_eq!(population[19].weights()[0], 19.0);
}

#[test]
fn test_wrong_length_seed_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut evolver = Evolver::new(create_test_params()).unwrap();
    let result = evolver.initialize(vec![Genome::new(vec![0.0; 10])], &mut rng);
    assert!(matches!(
        result,
        Err(EvolutionError::DimensionMismatch {
            expected: 147,
            actual: 10,
            ..
        })
    ));
    assert_eq!(evolver.state(), EvolverState::Uninitialized);
}

#[test]
fn test_new_generation_keeps_shape() {
    let (mut evolver, mut rng) = ready_evolver(2);

    for _ in 0..10 {
        let fitness = score(&evolver);
        evolver.new_generation(&fitness, &mut rng).unwrap();

        let population = evolver.population().unwrap();
        assert_eq!(population.len(), 20);
        assert!(population.iter().all(|g| g.len() == 147));
    }
    assert_eq!(evolver.generation(), 10);
}

#[test]
fn test_fitness_length_mismatch_leaves_population_alone() {
    let (mut evolver, mut rng) = ready_evolver(2);
    let before = evolver.population().unwrap().clone();

    let result = evolver.new_generation(&[1.0; 19], &mut rng);
    assert!(matches!(
        result,
        Err(EvolutionError::ArgumentMismatch {
            expected: 20,
            actual: 19
        })
    ));
    assert_eq!(evolver.population().unwrap().genomes(), before.genomes());
    assert_eq!(evolver.generation(), 0);
}

#[test]
fn test_elite_slots_copy_top_genomes() {
    let (mut evolver, mut rng) = ready_evolver(3);
    let before = evolver.population().unwrap().clone();

    // genome 7 best, genome 12 second
    let mut fitness = vec![1.0; 20];
    fitness[7] = 10.0;
    fitness[12] = 8.0;

    evolver.new_generation(&fitness, &mut rng).unwrap();
    let population = evolver.population().unwrap();

    for slot in 0..4 {
        assert_eq!(population[slot].weights(), before[7].weights());
        assert_eq!(population[slot].fitness(), Some(10.0));
    }
    for slot in 4..8 {
        assert_eq!(population[slot].weights(), before[12].weights());
        assert_eq!(population[slot].fitness(), Some(8.0));
    }
    for slot in 8..20 {
        assert_eq!(population[slot].fitness(), None, "bred slot {slot}");
    }
}

#[test]
fn test_elite_ties_prefer_earlier_genome() {
    let (mut evolver, mut rng) = ready_evolver(4);
    let before = evolver.population().unwrap().clone();

    let mut fitness = vec![0.5; 20];
    fitness[3] = 9.0;
    fitness[15] = 9.0;
    fitness[9] = 9.0;

    evolver.new_generation(&fitness, &mut rng).unwrap();
    let population = evolver.population().unwrap();
    assert_eq!(population[0].weights(), before[3].weights());
    assert_eq!(population[4].weights(), before[9].weights());
}

#[test]
fn test_best_fitness_never_regresses() {
    let (mut evolver, mut rng) = ready_evolver(11);

    let mut best_so_far = f32::NEG_INFINITY;
    for _ in 0..15 {
        let fitness = score(&evolver);
        let stats = evolver.new_generation(&fitness, &mut rng).unwrap();
        assert!(stats.best_fitness >= best_so_far);
        best_so_far = stats.best_fitness;

        // the elite slice carries the generation's best forward
        let population = evolver.population().unwrap();
        assert_eq!(population[0].fitness(), Some(stats.best_fitness));
        assert_eq!(population[0].weights()[0] + 1.0, stats.best_fitness);
    }
}

#[test]
fn test_selection_improves_mean_fitness() {
    let (mut evolver, mut rng) = ready_evolver(12);

    let initial = evolver.new_generation(&score(&evolver), &mut rng).unwrap();
    let mut last = initial;
    for _ in 0..40 {
        last = evolver.new_generation(&score(&evolver), &mut rng).unwrap();
    }
    assert!(last.average_fitness > initial.average_fitness);
}

#[test]
fn test_non_positive_fitness_still_breeds() {
    let (mut evolver, mut rng) = ready_evolver(6);
    let stats = evolver.new_generation(&[-1.0; 20], &mut rng).unwrap();
    assert_eq!(stats.best_fitness, -1.0);
    assert_eq!(evolver.population().unwrap().len(), 20);
}

#[test]
fn test_non_finite_fitness_is_accepted() {
    let (mut evolver, mut rng) = ready_evolver(6);
    let mut fitness = vec![1.0; 20];
    fitness[0] = f32::NAN;
    fitness[1] = f32::INFINITY;

    evolver.new_generation(&fitness, &mut rng).unwrap();
    let population = evolver.population().unwrap();
    assert_eq!(population.len(), 20);
    assert_eq!(population[0].fitness(), Some(f32::INFINITY));
}

#[test]
fn test_same_seed_same_generations() {
    let run = |seed: u64| {
        let (mut evolver, mut rng) = ready_evolver(seed);
        for _ in 0..5 {
            let fitness = score(&evolver);
            evolver.new_generation(&fitness, &mut rng).unwrap();
        }
        evolver
            .population()
            .unwrap()
            .iter()
            .flat_map(|g| g.weights().iter().map(|w| w.to_bits()).collect::<Vec<_>>())
            .collect::<Vec<u32>>()
    };

    assert_eq!(run(31), run(31));
    assert_ne!(run(31), run(32));
}

#[test]
fn test_import_replaces_weakest() {
    let (mut evolver, mut rng) = ready_evolver(8);

    let mut fitness: Vec<f32> = (0..20).map(|i| 20.0 - i as f32).collect();
    fitness[5] = -3.0;
    evolver.new_generation(&fitness, &mut rng).unwrap();

    // bred slots are unevaluated, so the last of them goes first
    let imported = Genome::new(vec![0.25; 147]);
    let slot = evolver.import_genome(imported.clone()).unwrap();
    assert_eq!(slot, 19);
    assert_eq!(evolver.population().unwrap()[19], imported);
    assert_eq!(evolver.generation(), 1);
}

#[test]
fn test_import_spares_elites_when_fitness_is_negative() {
    let (mut evolver, mut rng) = ready_evolver(8);
    let elite_slots = evolver.params().elite_slots();

    let fitness: Vec<f32> = (1..=20).map(|i| -(i as f32)).collect();
    evolver.new_generation(&fitness, &mut rng).unwrap();
    let elites: Vec<Genome> = evolver.population().unwrap().genomes()[..elite_slots].to_vec();

    let slot = evolver.import_genome(Genome::new(vec![0.0; 147])).unwrap();
    assert!(slot >= elite_slots);
    assert_eq!(slot, 19);
    assert_eq!(&evolver.population().unwrap().genomes()[..elite_slots], &elites[..]);
}

#[test]
fn test_import_rejects_wrong_length() {
    let (mut evolver, _) = ready_evolver(8);
    assert!(matches!(
        evolver.import_genome(Genome::new(vec![0.0; 3])),
        Err(EvolutionError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_fittest_exports_best_first() {
    let (mut evolver, mut rng) = ready_evolver(9);
    let fitness: Vec<f32> = (0..20).map(|i| i as f32).collect();
    evolver.new_generation(&fitness, &mut rng).unwrap();

    let top = evolver.fittest(3).unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].fitness(), Some(19.0));
    assert_eq!(top[1].fitness(), Some(19.0));
    assert_eq!(top[2].fitness(), Some(19.0));

    let all = evolver.fittest(100).unwrap();
    assert_eq!(all.len(), 20);
}

#[test]
fn test_history_tracks_generations() {
    let (mut evolver, mut rng) = ready_evolver(10);
    for _ in 0..3 {
        let fitness = score(&evolver);
        evolver.new_generation(&fitness, &mut rng).unwrap();
    }
    let history = evolver.history();
    assert_eq!(history.entries().len(), 3);
    assert_eq!(history.latest().unwrap().generation, 3);
    assert!(history.best_ever().is_some());
}
