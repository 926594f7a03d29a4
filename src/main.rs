use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config_file::FromConfigFile;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lasergrid::config::SimConfig;
use lasergrid::env::Environment;
use lasergrid::learner::{greedy_rollout, Learner};
use lasergrid::state::Action;

/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Train an agent to cross a grid of sweeping lasers", long_about = None)]
pub struct Args {
    /// Path to lasergrid configuration TOML file.
    config_path: PathBuf,

    #[command(subcommand)]
    command: Commands
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the grid with beams as they are at clock T.
    Show {
        #[arg(short, long, default_value_t = 0)]
        t: usize,
    },
    /// Reset and apply a scripted sequence of actions (up, down, left, right, wait).
    Step {
        actions: Vec<Action>,
    },
    /// Train the Q-learner and print the greedy policy.
    Train {
        /// Override the seed from the configuration file.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the trained value table to this CSV file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "lasergrid=info".parse() {
        filter = filter.add_directive(d);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();
    let config = read_config(&args.config_path)?;
    let mut env = config.build_environment()?;

    match args.command {
        Commands::Show { t } => {
            print!("{}", env.render_at(t));
        }
        Commands::Step { actions } => {
            let s = env.reset();
            println!("reset -> {s}");
            for a in actions {
                let result = env.step(a);
                println!("{a:>5} -> {}  reward: {:+.1}  terminal: {}",
                         result.state, result.reward, result.terminal);
                if result.terminal {
                    break;
                }
            }
            print!("{}", env.render());
        }
        Commands::Train { seed, output } => {
            train(&config, &mut env, seed.unwrap_or(config.seed), output)?;
        }
    }
    Ok(())
}

fn read_config(config_path: &PathBuf) -> Result<SimConfig, Box<dyn std::error::Error>> {
    info!(path = %config_path.display(), "reading config file");
    Ok(SimConfig::from_config_file(config_path)?)
}

fn train(
    config: &SimConfig, env: &mut Environment, seed: u64, output: Option<PathBuf>
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut learner = Learner::new(config.learner.clone(), env)?;
    info!(episodes = config.learner.episodes, seed, period = env.period(), "training");
    let report = learner.train(env, &mut rng)?;

    let window = (config.learner.episodes / 10).max(1);
    let (mean, std_dev) = report.recent_returns(window);
    println!("Last {window} episodes: mean return {mean:.2} (sd {std_dev:.2}), success rate {:.1}%",
             100.0 * report.success_rate(window));

    let table = learner.into_table();
    println!("\n=== Greedy Policy ===");
    print!("{}", table.show_policy(env));

    let rollout = greedy_rollout(env, &table, config.learner.max_steps_per_episode)?;
    println!("\n=== Greedy Rollout ===");
    for (a, s) in rollout.actions.iter().zip(rollout.states.iter().skip(1)) {
        println!("{a:>5} -> {s}");
    }
    println!("{:?} after {} steps, return {:.1}",
             rollout.outcome, rollout.actions.len(), rollout.total_reward);

    if let Some(path) = output {
        table.write_csv(File::create(&path)?)?;
        info!(path = %path.display(), "wrote value table");
    }
    Ok(())
}
