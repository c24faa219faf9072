pub mod docking;
pub mod edit;
pub mod fold;
pub mod guide;
pub mod report;
pub mod sequence;
pub mod settings;

/// dimensional analysis types
pub type Mfe = f64;
pub type Probability = f64;

/// Boltzmann constant, kcal/(mol.K)
pub const BOLTZMANN: f64 = 1.986e-3;
/// mammalian body temperature, K
pub const BODY_TEMPERATURE: f64 = 310.0;

// search parameters
pub const MAX_GUIDE_LEVELS: usize = 30;
pub const BULK_FOLD_THRESHOLD: usize = 100;

// transcript trimming parameters. the tail covers the worst
// runs of consecutive deletions a single guide can direct.
pub const TRIM_TAIL: usize = 50;
/// how far 3' of a progressed index re-docking is biased toward
pub const REDOCK_OFFSET: usize = 5;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// initialize logging to terminal and a timestamped file
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
