//! Neurodroids - headless training host.
//!
//! Evolves droid brains in a walled arena and saves the fittest genomes.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neurodroids::engine::population::compare_fitness;
use neurodroids::engine::record::GenerationRecord;
use neurodroids::engine::schedule::GenerationSchedule;
use neurodroids::engine::select::select_top_n;
use neurodroids::{Evolver, Genome};

mod arena;
mod config;

use arena::Arena;
use config::DemoConfig;

#[derive(Parser)]
#[command(name = "neurodroids")]
#[command(version)]
#[command(about = "Evolve feedforward droid brains with a genetic algorithm")]
struct Cli {
    /// Configuration file (JSON); defaults are used when it does not exist
    #[arg(short, long, global = true, default_value = "neurodroids.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new run from a random population
    Train {
        /// Number of generations to evolve
        #[arg(short, long, default_value = "50")]
        generations: u32,

        /// Where to save the fittest half of the final population
        #[arg(short, long, default_value = "population.json")]
        output: PathBuf,

        /// Override the genome seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Continue from a saved population
    Resume {
        /// Saved population to continue from
        #[arg(short, long, default_value = "population.json")]
        input: PathBuf,

        /// Number of additional generations
        #[arg(short, long, default_value = "50")]
        generations: u32,

        /// Where to save; defaults to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the fittest saved genome as base64
    Export {
        /// Saved population
        #[arg(short, long, default_value = "population.json")]
        input: PathBuf,
    },

    /// Insert a shared genome into a saved population and continue
    Import {
        /// Base64 genome produced by `export`
        genome: String,

        /// Saved population to import into
        #[arg(short, long, default_value = "population.json")]
        input: PathBuf,

        /// Number of generations to run after importing
        #[arg(short, long, default_value = "10")]
        generations: u32,

        /// Where to save; defaults to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "neurodroids.json")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            generations,
            output,
            seed,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(seed) = seed {
                config.genome_seed = seed;
            }
            let record = GenerationRecord::fresh(config.schedule.starting_length);
            run(&config, record, None, generations, &output)
        }

        Commands::Resume {
            input,
            generations,
            output,
        } => {
            let config = load_config(&cli.config)?;
            let record = GenerationRecord::load_or(
                &input,
                GenerationRecord::fresh(config.schedule.starting_length),
            );
            let output = output.unwrap_or(input);
            run(&config, record, None, generations, &output)
        }

        Commands::Export { input } => export(&input),

        Commands::Import {
            genome,
            input,
            generations,
            output,
        } => {
            let config = load_config(&cli.config)?;
            let genome = Genome::from_base64(&genome)?;
            let record = GenerationRecord::load_or(
                &input,
                GenerationRecord::fresh(config.schedule.starting_length),
            );
            let output = output.unwrap_or(input);
            run(&config, record, Some(genome), generations, &output)
        }

        Commands::InitConfig { output } => {
            DemoConfig::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<DemoConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        log::info!("loading config from {}", path.display());
        DemoConfig::from_file(path)
    } else {
        log::info!("using default configuration");
        Ok(DemoConfig::default())
    }
}

fn run(
    config: &DemoConfig,
    mut record: GenerationRecord,
    import: Option<Genome>,
    generations: u32,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = config.evolver_params();
    let population_size = params.population_size;

    let mut genome_rng = ChaCha8Rng::seed_from_u64(config.genome_seed);
    let mut spawn_rng = ChaCha8Rng::seed_from_u64(config.spawn_seed);

    let mut evolver = Evolver::new(params)?;
    evolver.initialize(std::mem::take(&mut record.genomes), &mut genome_rng)?;
    if let Some(genome) = import {
        let slot = evolver.import_genome(genome)?;
        log::info!("imported genome into droid {}", slot);
    }

    let mut arena = Arena::new(config.arena.clone(), population_size)?;
    let mut schedule = GenerationSchedule::resume(config.schedule, record.generation_length);
    let mut generation_count = record.generation_count;
    let mut fittest = Vec::new();

    log::info!(
        "starting at generation {} with {} droids, generation length {:.1}s",
        generation_count,
        population_size,
        schedule.length()
    );

    for _ in 0..generations {
        arena.reset(evolver.population()?, &mut spawn_rng)?;
        let fitness = arena.run_generation(&schedule)?;

        let lifetime: f32 = arena.droids().iter().map(arena::Droid::lifetime).sum();
        log::debug!(
            "generation {}: mean lifetime {:.2}s",
            generation_count,
            lifetime / population_size as f32
        );

        // keep the evaluated half so the saved genomes carry their fitness
        let scored: Vec<Genome> = evolver
            .population()?
            .iter()
            .zip(&fitness)
            .map(|(genome, &f)| genome.clone().with_fitness(f))
            .collect();
        fittest = select_top_n(&scored, population_size / 2, compare_fitness)
            .into_iter()
            .cloned()
            .collect();

        evolver.new_generation(&fitness, &mut genome_rng)?;
        schedule.advance();
        generation_count += 1;
    }

    if generations == 0 {
        fittest = evolver.fittest(population_size / 2)?;
    }

    if let Some(best) = evolver.history().best_ever() {
        log::info!("best fitness this run: {:.1}", best);
    }

    let mut saved = GenerationRecord::new(fittest, generation_count, schedule.length());
    saved.save_to_file(output)?;
    log::info!(
        "saved {} genomes at generation {} to {}",
        saved.genomes.len(),
        generation_count,
        output.display()
    );

    Ok(())
}

fn export(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let record = GenerationRecord::load_from_file(input)?;
    let best = select_top_n(&record.genomes, 1, compare_fitness);
    match best.first() {
        Some(genome) => {
            println!("{}", genome.to_base64()?);
            Ok(())
        }
        None => Err(format!("{} holds no genomes", input.display()).into()),
    }
}
