use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process;

use getopts::Options;
use log::{info, LevelFilter};

use rtc_paths::{load_execution_list, CoordinateTransform, ExecutionListConfig,
                ListConfig, ListProtocolDriver, RecordingSink, Shape,
                ShapeCompiler, ShapeElement, UnitConverter};
use rtc_paths::shapes;

fn usage(prg: &str, opts: Options)
{
    let brief = format!("Usage: {} [options] FILE", prg);
    print!("{}", opts.usage(&brief));
}

fn parse_opt<T: std::str::FromStr>(matches: &getopts::Matches, name: &str,
                                   default: T) -> Result<T, String>
    where T::Err: std::fmt::Display
{
    match matches.opt_str(name) {
        Some(arg) => arg.parse::<T>()
            .map_err(|e| format!("Invalid {}: {}", name, e)),
        None => Ok(default)
    }
}

fn load_shape(file_name: &str) -> Result<Vec<ShapeElement>, String>
{
    let file = File::open(file_name)
        .map_err(|e| format!("Failed to open {}: {}", file_name, e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("Failed to parse shape {}: {}", file_name, e))
}

fn run(matches: &getopts::Matches) -> Result<(), String>
{
    let file_name = match matches.free.first() {
        Some(f) => f.clone(),
        None => return Err("No file name".to_string())
    };
    let list = ListConfig {
        list_id: parse_opt(matches, "list-id", rtc_paths::list_protocol::DEFAULT_LIST_ID)?,
        list_memory: parse_opt(matches, "list-memory",
                               rtc_paths::list_protocol::DEFAULT_LIST_MEMORY)?
    };
    let passes = parse_opt(matches, "passes", 1usize)?;
    if passes < 1 {
        return Err("Passes must be >= 1".to_string());
    }
    if passes > list.capacity() {
        return Err(format!("{} passes do not fit list memory of {} entries",
                           passes, list.list_memory));
    }
    let bits_per_um = parse_opt(matches, "bits-per-um",
                                rtc_paths::units::BITS_PER_UM as f64)?;
    let transform = match matches.opt_str("correction") {
        Some(path) => CoordinateTransform::load_or_identity(Path::new(&path)).0,
        None => CoordinateTransform::identity()
    };
    let compiler = ShapeCompiler::new(transform)
        .with_units(UnitConverter::new(bits_per_um));

    let (config, shape) = if matches.opt_present("shape") {
        let elements = shapes::repeat(&load_shape(&file_name)?, passes)
            .map_err(|e| e.to_string())?;
        let shape = compiler.compile(&elements).map_err(|e| e.to_string())?;
        (ExecutionListConfig::default(), shape)
    } else {
        let parsed = load_execution_list(Path::new(&file_name))
            .map_err(|e| format!("Failed to read {}: {}", file_name, e))?;
        if !parsed.skipped.is_empty() {
            info!("{} statements skipped", parsed.skipped.len());
        }
        let mut commands = Vec::new();
        if parsed.commands.len().saturating_mul(passes) > list.capacity() {
            return Err(format!("{} passes of {} commands do not fit list memory",
                               passes, parsed.commands.len()));
        }
        for _ in 0..passes {
            commands.extend_from_slice(&parsed.commands);
        }
        let shape = Shape::new(commands).map_err(|e| e.to_string())?;
        (parsed.config, shape)
    };

    let mut driver = ListProtocolDriver::with_list_config(RecordingSink::new(), list);
    driver.run(&config, &shape).map_err(|e| e.to_string())?;
    if matches.opt_present("home") {
        let home = compiler.compile(&shapes::home()).map_err(|e| e.to_string())?;
        driver.run(&config, &home).map_err(|e| e.to_string())?;
    }
    for call in driver.sink().calls() {
        println!("{}", call);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();
    let mut opts = Options::new();
    opts.optflag("e", "execution-list", "FILE is a vendor execution list (default)");
    opts.optflag("s", "shape", "FILE is a JSON shape in micrometers");
    opts.optopt("c", "correction", "JSON correction matrix", "FILE");
    opts.optopt("", "bits-per-um", "scanner bits per micrometer", "N");
    opts.optopt("", "list-id", "card list to load", "ID");
    opts.optopt("", "list-memory", "list memory size in entries", "N");
    opts.optopt("", "passes", "repeat the path N times", "N");
    opts.optflag("", "home", "jump to the field centre afterwards");
    opts.optflag("v", "verbose", "log progress");
    opts.optflag("h", "help", "print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}", f);
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        usage(&program, opts);
        return;
    }

    let mut logger = env_logger::Builder::from_default_env();
    if matches.opt_present("v") && env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
    }
    logger.init();

    if let Err(msg) = run(&matches) {
        eprintln!("{}", msg);
        process::exit(1);
    }
}
