use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use frozen_chain::ChainTable;
use frozen_chain::FrozenMap;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of input values that repeat an earlier key.
    #[arg(short = 'd', long = "duplicates", default_value_t = 0.0)]
    duplicates: f64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    let repeats = (args.target_capacity as f64 * args.duplicates.clamp(0.0, 1.0)) as usize;
    let distinct = args.target_capacity - repeats;
    let input = (0..distinct as u64)
        .chain((0..repeats as u64).map(|i| i % distinct.max(1) as u64))
        .collect::<Vec<u64>>();

    println!(
        "Building ChainTable from {} values ({} distinct)",
        input.len(),
        distinct.min(input.len())
    );

    let table = ChainTable::<u64>::build(input.iter().copied(), |&v| hash_u64(v), |a, b| a == b);

    println!("Actual capacity: {}", table.capacity());
    println!("Stored {} values", table.len());

    table.print_chain_histogram();
    table.stats().print();

    let map: FrozenMap<u64, usize> = input.iter().copied().zip(0..).collect();
    println!();
    println!("FrozenMap with the default hasher:");
    map.stats().print();

    let missing = input.iter().filter(|k| !map.contains_key(k)).count();
    println!("Keys missing after build: {}", missing);
}
