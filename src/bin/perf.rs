use log::{info, LevelFilter};
use rand::{prelude::random, rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use structopt::StructOpt;

use std::time;

use rbtree::RbTree;

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u128>,

    #[structopt(long = "loads", default_value = "1000000")] // default 1M
    loads: usize,

    #[structopt(long = "finds", default_value = "1000000")] // default 1M
    finds: usize,

    #[structopt(long = "erases", default_value = "0")] // 0 erase all
    erases: usize,

    #[structopt(long = "key-space", default_value = "0")] // 0 full u64
    key_space: u64,

    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let opts = Opt::from_args();
    if let Err(err) = TermLogger::init(
        opts.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger init failed: {}", err);
    }

    let seed = opts.seed.unwrap_or_else(random);
    info!("perf seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed as u64);

    let mut index: RbTree<u64> = RbTree::with_capacity(opts.loads);
    let mut keys = Vec::with_capacity(opts.loads);

    let start = time::Instant::now();
    for _i in 0..opts.loads {
        let key = gen_key(&mut rng, opts.key_space);
        if let Err(err) = index.insert(key) {
            info!("insert failed after {} items: {}", index.len(), err);
            return;
        }
        keys.push(key);
    }
    info!("loaded {} items in {:?}", opts.loads, start.elapsed());

    let start = time::Instant::now();
    let mut hits = 0;
    for _i in 0..opts.finds {
        let key = gen_key(&mut rng, opts.key_space);
        if index.find(&key).is_some() {
            hits += 1;
        }
    }
    info!(
        "find {} keys, {} hits, took {:?}",
        opts.finds,
        hits,
        start.elapsed()
    );

    let start = time::Instant::now();
    let items = index.to_array(index.len());
    info!("to_array {} items, took {:?}", items.len(), start.elapsed());

    if let Err(err) = index.validate() {
        info!("validate failed: {}", err);
        return;
    }

    keys.shuffle(&mut rng);
    let erases = match opts.erases {
        0 => keys.len(),
        n => n.min(keys.len()),
    };
    let start = time::Instant::now();
    for key in keys.iter().take(erases) {
        if let Err(err) = index.erase_key(key) {
            info!("erase failed: {}", err);
            return;
        }
    }
    info!(
        "erased {} items, {} remain, took {:?}",
        erases,
        index.len(),
        start.elapsed()
    );
}

fn gen_key(rng: &mut SmallRng, key_space: u64) -> u64 {
    match key_space {
        0 => rng.gen(),
        n => rng.gen::<u64>() % n,
    }
}
