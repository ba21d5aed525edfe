// SPDX-License-Identifier: Apache-2.0

//! Command-line driver: seeds identity circuits into the catalog, unrolls
//! representatives, and reports on or exports dimension groups. All
//! semantics live in the library; this binary only orchestrates.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use revsynth::catalog::store::MemStore;
use revsynth::catalog::Catalog;
use revsynth::seed::{SeedGenerator, SeedOptions};
use revsynth::solver::Backend;
use revsynth::unroller::{unroll, CancelToken};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog snapshot to load and save.
    #[arg(long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// SAT backend: varisat (in process), or an external binary such as
    /// cadical, kissat, minisat, glucose.
    #[arg(long, default_value = "varisat")]
    solver: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate identity seeds for a dimension and insert them.
    Seed {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        length: usize,
        /// How many seeds to generate.
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// RNG seed for reproducible runs.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 10)]
        max_attempts: usize,
        /// Forbid the mirrored forward circuit as the inverse.
        #[arg(long, default_value_t = false)]
        exclude_mirror: bool,
    },
    /// Unroll every representative of a dimension group and fold the
    /// resulting equivalents.
    Unroll {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        length: usize,
        #[arg(long, default_value_t = 10_000)]
        max_equivalents: usize,
    },
    /// Print per-dimension-group catalog statistics.
    Stats,
    /// Dump a dimension group in the plain-text exchange format.
    Export {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        length: usize,
        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load circuits from a plain-text dump.
    Import { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let backend = Backend::by_name(&args.solver)?;
    let store = if args.catalog.exists() {
        MemStore::load(&args.catalog)
            .with_context(|| format!("loading catalog {}", args.catalog.display()))?
    } else {
        MemStore::new()
    };
    let mut catalog = Catalog::open(store);

    match args.command {
        Command::Seed {
            width,
            length,
            count,
            seed,
            max_attempts,
            exclude_mirror,
        } => {
            let mut generator = SeedGenerator::new(seed, backend);
            let options = SeedOptions {
                max_attempts,
                exclude_mirror,
            };
            let cancel = CancelToken::new();
            let mut new_circuits = 0;
            for _ in 0..count {
                let outcome = generator.generate(width, length, &options, &cancel)?;
                let inserted = catalog.insert_identity(&outcome.identity)?;
                if inserted.was_new {
                    new_circuits += 1;
                }
                println!(
                    "circuit {} ({}): {}",
                    inserted.id,
                    if inserted.was_new { "new" } else { "known" },
                    outcome.identity
                );
            }
            let stats = generator.stats();
            println!(
                "{} new circuits in ({}, {}); {} attempts, {} successes",
                new_circuits, width, length, stats.attempts, stats.successes
            );
        }
        Command::Unroll {
            width,
            length,
            max_equivalents,
        } => {
            let representatives = catalog.list_representatives(width, length);
            if representatives.is_empty() {
                println!("no representatives in ({}, {})", width, length);
            }
            let cancel = CancelToken::new();
            for rep in representatives {
                let row = catalog
                    .circuit_by_id(rep.circuit_id)
                    .context("representative circuit missing")?;
                let circuit = row.to_circuit()?;
                let outcome = unroll(&circuit, max_equivalents, &cancel)?;
                let stats = catalog.fold_equivalents(rep.id, &outcome)?;
                println!(
                    "representative {} {}: {} circuits in class ({}), {}",
                    rep.id,
                    rep.composition,
                    outcome.circuits.len(),
                    if outcome.fully_unrolled {
                        "complete"
                    } else {
                        "truncated"
                    },
                    stats
                );
            }
        }
        Command::Stats => {
            for group in catalog.dim_groups() {
                let representatives = catalog.list_representatives(group.width, group.length);
                let unrolled = representatives
                    .iter()
                    .filter(|rep| rep.fully_unrolled)
                    .count();
                println!(
                    "({}, {}): {} circuits, {} representatives ({} fully unrolled)",
                    group.width, group.length, group.circuit_count, representatives.len(), unrolled
                );
            }
        }
        Command::Export { width, length, out } => {
            let text = catalog.export_dim_group(width, length);
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{}", text),
            }
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let new_circuits = catalog.import_dim_group(&text)?;
            println!("imported {} new circuits", new_circuits);
        }
    }

    catalog
        .into_store()
        .save(&args.catalog)
        .with_context(|| format!("saving catalog {}", args.catalog.display()))?;
    Ok(())
}
