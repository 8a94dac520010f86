//! # Strux CLI Application
//!
//! Builds a single-bay portal frame with a floor plate, writes it as a
//! `.struxml` document and, when asked, runs the external analysis engine
//! on it.
//!
//! ```text
//! strux_cli [OUTPUT.struxml] [--run TEMPLATE.bsc ...]
//! ```
//!
//! The engine is located through `STRUX_ENGINE_PATH`; see
//! [`EngineConfig::from_env`].

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use strux_core::bars::{Bar, Eccentricity};
use strux_core::calculate::{Analysis, Engine, FdScript, JobOutput};
use strux_core::config::{DocumentSettings, EngineConfig};
use strux_core::entity::NamingSequence;
use strux_core::file_io::{load_model, save_model};
use strux_core::geometry::{Edge, Point3, Region, Vector3};
use strux_core::loads::{LoadCase, PointLoad};
use strux_core::materials::Material;
use strux_core::model::Model;
use strux_core::releases::Connectivity;
use strux_core::restricted::MaterialFamily;
use strux_core::sections::Section;
use strux_core::shells::{LocationValue, ShellProperties, Slab};
use strux_core::{StruxError, StruxResult};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_OUTPUT: &str = "portal_frame.struxml";

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

/// Command line: an optional output path, then `--run` and its templates
struct Args {
    output: PathBuf,
    templates: Vec<PathBuf>,
    run: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        output: PathBuf::from(DEFAULT_OUTPUT),
        templates: Vec::new(),
        run: false,
    };
    for arg in env::args().skip(1) {
        if arg == "--run" {
            args.run = true;
        } else if args.run {
            args.templates.push(PathBuf::from(arg));
        } else {
            args.output = PathBuf::from(arg);
        }
    }
    args
}

/// Two columns, a beam across their heads and a floor plate under a point load
fn build_frame(span: f64, height: f64, load: f64) -> StruxResult<Model> {
    let mut model = Model::new();
    let mut names = NamingSequence::new();

    let steel = model.add_material(Material::steel_s355())?;
    let concrete = model.add_material(Material::concrete_c30_37())?;
    let column_section = model.add_section(Section::rectangle("R 300x300", MaterialFamily::Steel, 0.3, 0.3)?)?;
    let beam_section = model.add_section(Section::rectangle("R 200x500", MaterialFamily::Steel, 0.2, 0.5)?)?;

    for x in [0.0, span] {
        let column = Bar::column(
            &mut names,
            Edge::line(Point3::new(x, 0.0, 0.0), Point3::new(x, 0.0, height))?,
            steel,
            &[column_section],
            &[Eccentricity::default()],
            &[Connectivity::rigid()],
        )?;
        model.add_bar(column)?;
    }

    let beam = Bar::beam(
        &mut names,
        Edge::line(Point3::new(0.0, 0.0, height), Point3::new(span, 0.0, height))?,
        steel,
        &[beam_section],
        &[Eccentricity::default()],
        &[Connectivity::hinged()],
    )?;
    model.add_bar(beam)?;

    let floor = Region::rectangle(Point3::ORIGIN, Vector3::new(span, 0.0, 0.0), Vector3::new(0.0, span, 0.0))?;
    let plate = Slab::plate(
        &mut names,
        floor.clone(),
        LocationValue::uniform(&floor, 0.25)?,
        concrete,
        ShellProperties::default(),
    )?;
    model.add_slab(plate)?;

    let dead = model.add_load_case(LoadCase::dead_load("DL"))?;
    model.add_point_load(PointLoad::force(
        dead,
        Point3::new(span / 2.0, span / 2.0, 0.0),
        Vector3::new(0.0, 0.0, -load),
        "mid-span",
    )?)?;

    model.validate_references()?;
    Ok(model)
}

fn run_engine(model_path: &Path, templates: &[PathBuf]) -> StruxResult<JobOutput> {
    let engine = Engine::new(EngineConfig::from_env());
    let output_dir = model_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let model_path = model_path
        .canonicalize()
        .map_err(|e| StruxError::file_error("resolve", model_path.display().to_string(), e.to_string()))?;

    let script = FdScript::analysis(
        engine.config(),
        &model_path,
        Analysis::static_analysis(),
        None,
        templates,
        &output_dir,
        true,
    )?;
    engine.run(&script)
}

fn report(err: &StruxError) {
    error!(code = err.error_code(), "{}", err);
    eprintln!("Error: {}", err);
    if let Ok(json) = serde_json::to_string_pretty(err) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strux_cli=info,strux_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args();

    println!("Strux CLI - Structural Model Export");
    println!("===================================");
    println!();

    let span = prompt_f64("Enter frame span (m) [6.0]: ", 6.0);
    let height = prompt_f64("Enter column height (m) [3.5]: ", 3.5);
    let load = prompt_f64("Enter point load (kN) [20.0]: ", 20.0);

    let model = match build_frame(span, height, load) {
        Ok(model) => model,
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = save_model(&model, &DocumentSettings::default(), &args.output) {
        report(&e);
        std::process::exit(1);
    }
    info!(path = %args.output.display(), "document written");

    match load_model(&args.output) {
        Ok(read) => {
            println!();
            println!("Document: {}", args.output.display());
            println!("  Model:      {}", read.id);
            println!("  Entities:   {}", read.entity_count());
            println!("  Bars:       {}", read.bars().len());
            println!("  Slabs:      {}", read.slabs().len());
            println!("  Load cases: {}", read.load_cases().len());
        }
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }

    if !args.run {
        return;
    }

    println!();
    println!("Running analysis engine...");
    match run_engine(&args.output, &args.templates) {
        Ok(output) => {
            println!("  Exit code: {:?}", output.exit_code);
            for artifact in &output.artifacts {
                println!("  {} -> {}", artifact.template.display(), artifact.path.display());
            }
            println!();
            println!("JSON Output:");
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                println!("{}", json);
            }
        }
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}
