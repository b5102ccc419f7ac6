use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use groundtrack::catalog::parse_selection;
use groundtrack::frames::norm;
use groundtrack::render::{Frame, GeoJsonRenderer, LogRenderer};
use groundtrack::{
    init_logger, Animation, CancelToken, Catalog, Ephemeris, Epoch, Evaluation, FrameConverter,
    GstModel, OemHeader, OemRecord, Renderer, Result, Sgp4Engine, TrackerConfig,
    TrajectoryHistory,
};

#[derive(Parser, Debug)]
#[command(name = "groundtrack", version, about = "Satellite ground track and CCSDS OEM from TLE catalogs")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    catalog_url: Option<String>,

    /// Local TLE file used instead of the remote feed
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// 1-based catalog index; prompts when omitted
    #[arg(short, long)]
    select: Option<String>,

    /// RFC 3339 epoch, defaults to now
    #[arg(long)]
    epoch: Option<String>,

    /// Step the epoch forward and accumulate the ground track
    #[arg(short, long)]
    animate: bool,

    #[arg(long)]
    steps: Option<usize>,

    #[arg(long)]
    step_minutes: Option<i64>,

    /// cubic | linear
    #[arg(long)]
    gst_model: Option<GstModel>,

    /// Print a CCSDS OEM to stdout
    #[arg(long)]
    oem: bool,

    /// Write the OEM to a file instead of stdout
    #[arg(long)]
    oem_out: Option<PathBuf>,

    /// Write the map as GeoJSON
    #[arg(long)]
    geojson: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(url) = &args.catalog_url {
        config.catalog_url = url.clone();
    }
    if let Some(path) = &args.catalog_file {
        config.catalog_file = Some(path.clone());
    }
    if let Some(steps) = args.steps {
        config.max_steps = steps;
    }
    if let Some(step) = args.step_minutes {
        config.step_minutes = step;
    }
    if let Some(model) = args.gst_model {
        config.gst_model = model;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let catalog = match &config.catalog_file {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::fetch(&config.catalog_url, config.fetch_timeout())?,
    };

    println!("\n Listing of all satellites: \n");
    for (i, set) in catalog.iter().enumerate() {
        println!("{}. {}", i + 1, set.name());
    }

    let input = match &args.select {
        Some(s) => s.clone(),
        None => prompt("\n Please choose a satellite number from the list above: ")?,
    };
    let set = parse_selection(&catalog, &input)?;
    info!("Selected {} (NORAD {})", set.name(), set.catalog_id());

    let epoch = match &args.epoch {
        Some(text) => Epoch::parse(text)?,
        None => Epoch::now(),
    };

    let engine = Sgp4Engine::new(config.dut1_s);
    let converter = FrameConverter::new(config.gst_model, config.dut1_s);
    let mut renderer = (
        LogRenderer::default(),
        args.geojson.as_ref().map(|p| GeoJsonRenderer::new(p, config.zoom_deg)),
    );
    let want_oem = args.oem || args.oem_out.is_some();
    let mut record = OemRecord::new(OemHeader::now(&config.originator), set, engine.frame());

    if args.animate {
        let animation = Animation {
            engine: &engine,
            converter,
            set,
            base: epoch,
            step_minutes: config.step_minutes,
            max_steps: config.max_steps,
            stations: &config.ground_stations,
        };
        let mut history = TrajectoryHistory::with_capacity(config.max_steps);
        let summary = animation.run(&mut history, &mut renderer, &CancelToken::new(), |eval| {
            if want_oem {
                record.push(eval.epoch, eval.state);
            }
            Ok(())
        })?;
        if let Some(last) = &summary.last {
            print_evaluation(last, &converter);
        }
    } else {
        let eval = Evaluation::compute(&engine, &converter, set, epoch)?;
        print_evaluation(&eval, &converter);
        renderer.draw(&Frame {
            title: set.name(),
            epoch: &eval.epoch,
            sub_point: &eval.sub_point,
            trajectory: &[],
            stations: &config.ground_stations,
        })?;
        renderer.finish()?;
        record.push(eval.epoch, eval.state);
    }

    if want_oem {
        match &args.oem_out {
            Some(path) => {
                fs::write(path, record.to_string())?;
                info!("OEM written to {:?}", path);
            }
            None => println!("{record}"),
        }
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    println!("{message}");
    io::stdout().flush()?;
    // EOF leaves the line empty, which selection rejects
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn print_evaluation(eval: &Evaluation, converter: &FrameConverter) {
    let [x, y, z] = eval.state.position;
    let [vx, vy, vz] = eval.state.velocity;
    println!("\n Epoch (UTC): {}", eval.epoch);
    println!(" Position (km):     [{x:.4}, {y:.4}, {z:.4}]  |r| = {:.4}", norm(eval.state.position));
    println!(" Velocity (km/s):   [{vx:.6}, {vy:.6}, {vz:.6}]");
    println!(
        " UT1 ({} model argument): {:.10}",
        converter.model,
        converter.model.ut1_argument(&eval.epoch, converter.dut1_s)
    );
    println!(" GST (deg): {:.6}", eval.gst_deg);
    let [ex, ey, ez] = eval.earth_fixed;
    println!(" Earth-fixed (km):  [{ex:.4}, {ey:.4}, {ez:.4}]");
    println!(
        " Sub-point: Longitude {:.2}  Latitude {:.2}  Altitude {:.1} km",
        eval.sub_point.longitude_deg, eval.sub_point.latitude_deg, eval.sub_point.altitude_km
    );
}
