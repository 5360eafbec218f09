//! Marrow CLI - medial axis description and segmentation tool.
//!
//! Usage: marrow <COMMAND> [OPTIONS] <INPUTS...> <OUTPUT>
//!
//! Run `marrow --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::{Point3, Vector3};

use marrow::algo::{
    grow_regions_with_progress, neighbor_graph, GrowParameters, Method, Progress,
};
use marrow::io::{self, ply, PlyOptions};
use marrow::medial::{compute_descriptors, split_interior_exterior, DescriptorOptions, MedialAxis};
use marrow::sample;

#[derive(Parser)]
#[command(name = "marrow")]
#[command(author, version, about = "Medial axis segmentation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display medial descriptor statistics
    Info {
        /// Surface samples (PLY with normals)
        surface: PathBuf,

        /// Medial points (PLY with qidx)
        medial: PathBuf,
    },

    /// Compute descriptors and write MAT records
    Describe {
        /// Surface samples (PLY with normals)
        surface: PathBuf,

        /// Medial points (PLY with qidx)
        medial: PathBuf,

        /// Output text file
        output: PathBuf,

        /// Translation added to every written coordinate
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        offset: Option<Vec<f64>>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Segment the medial axis by region growing
    Segment {
        /// Surface samples (PLY with normals)
        surface: PathBuf,

        /// Medial points (PLY with qidx)
        medial: PathBuf,

        /// Output PLY file with a segment_id per medial point
        output: PathBuf,

        /// Region growing criterion
        #[arg(short, long, value_enum, default_value = "bisector")]
        method: GrowMethod,

        /// Maximum bisector angle in degrees
        #[arg(long, default_value = "5.0")]
        bisector_angle: f64,

        /// Maximum separation angle difference in degrees
        #[arg(long, default_value = "5.0")]
        separation_angle: f64,

        /// Ball overlap factor
        #[arg(long, default_value = "1.2")]
        ball_overlap: f64,

        /// Region size cap for the count criterion
        #[arg(long, default_value = "15")]
        shape_count: usize,

        /// Number of nearest neighbors
        #[arg(short, long, default_value = "10")]
        k: usize,

        /// Minimum region size; smaller regions are reported as -1
        #[arg(long, default_value = "10")]
        min_count: usize,

        /// Stop starting new regions after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,

        /// Write binary PLY instead of ASCII
        #[arg(long)]
        binary: bool,

        /// Also write interior and exterior halves next to the output
        #[arg(long)]
        split: bool,

        /// Write the neighbor graph as a CSV edge list
        #[arg(long)]
        adjacencies: Option<PathBuf>,

        /// Translation added to every written coordinate
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        offset: Option<Vec<f64>>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Write a synthetic sample of two orthogonal planes
    Sample {
        /// Output PLY file
        output: PathBuf,

        /// Lattice size per plane
        #[arg(short, long, default_value = "50")]
        grid: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum GrowMethod {
    /// Angle between neighboring bisectors
    #[value(name = "bisector", alias = "0")]
    Bisector,
    /// Difference of separation angles
    #[value(name = "sepangle", alias = "1")]
    Sepangle,
    /// Center distance against the sum of both radii
    #[value(name = "balloverlap", alias = "2")]
    Balloverlap,
    /// Fixed region size cap
    #[value(name = "count", alias = "3")]
    Count,
}

impl From<GrowMethod> for Method {
    fn from(method: GrowMethod) -> Self {
        match method {
            GrowMethod::Bisector => Method::BisectorAngle,
            GrowMethod::Sepangle => Method::SeparationAngle,
            GrowMethod::Balloverlap => Method::BallOverlap,
            GrowMethod::Count => Method::Count,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { surface, medial } => {
            cmd_info(&surface, &medial)?;
        }
        Commands::Describe {
            surface,
            medial,
            output,
            offset,
            sequential,
        } => {
            cmd_describe(&surface, &medial, &output, parse_offset(offset), sequential)?;
        }
        Commands::Segment {
            surface,
            medial,
            output,
            method,
            bisector_angle,
            separation_angle,
            ball_overlap,
            shape_count,
            k,
            min_count,
            time_limit,
            binary,
            split,
            adjacencies,
            offset,
            sequential,
        } => {
            let mut params = GrowParameters::default()
                .with_method(method.into())
                .with_bisector_angle(bisector_angle)
                .with_separation_angle(separation_angle)
                .with_ball_overlap(ball_overlap)
                .with_shape_count(shape_count)
                .with_k(k)
                .with_min_count(min_count)
                .with_parallel(!sequential);
            if let Some(seconds) = time_limit {
                params = params.with_time_limit(Duration::try_from_secs_f64(seconds)?);
            }
            let options = PlyOptions::default()
                .with_binary(binary)
                .with_offset(parse_offset(offset));

            cmd_segment(&surface, &medial, &output, &params, &options, split, adjacencies.as_deref())?;
        }
        Commands::Sample { output, grid } => {
            cmd_sample(&output, grid)?;
        }
    }

    Ok(())
}

fn parse_offset(offset: Option<Vec<f64>>) -> Vector3<f64> {
    match offset.as_deref() {
        Some([x, y, z]) => Vector3::new(*x, *y, *z),
        _ => Vector3::zeros(),
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Regions finish in bursts; only redraw when the percentage grows.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn load_axis(
    surface: &Path,
    medial: &Path,
    parallel: bool,
) -> Result<(Vec<Point3<f64>>, MedialAxis), Box<dyn std::error::Error>> {
    let (points, normals) = ply::load_oriented_points(surface)?;
    let (coords, qidx) = ply::load_medial_points(medial)?;
    println!("Loaded: {} surface samples, {} medial points", points.len(), coords.len());

    let options = DescriptorOptions::default().with_parallel(parallel);
    let start = Instant::now();
    let axis = compute_descriptors(&points, &normals, &coords, &qidx, &options)?;
    println!("Descriptors: {} medial points ({:.2?})", axis.len(), start.elapsed());

    Ok((points, axis))
}

fn cmd_info(surface: &Path, medial: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (_, axis) = load_axis(surface, medial, true)?;

    println!("Surface samples: {}", axis.surface_len());
    println!("Medial points: {}", axis.len());
    println!("Degenerate: {}", axis.num_degenerate());

    for (name, half) in [("Interior", axis.interior()), ("Exterior", axis.exterior())] {
        let radii: Vec<f64> = half.iter().map(|p| p.radius).filter(|r| r.is_finite()).collect();
        let angles: Vec<f64> = half
            .iter()
            .map(|p| p.separation_angle.to_degrees())
            .filter(|a| a.is_finite())
            .collect();

        println!("\n{}:", name);
        if let Some((min, max, avg)) = summarize(&radii) {
            println!("  Radius:           min={:.4}, max={:.4}, avg={:.4}", min, max, avg);
        }
        if let Some((min, max, avg)) = summarize(&angles) {
            println!("  Separation (deg): min={:.2}, max={:.2}, avg={:.2}", min, max, avg);
        }
    }

    Ok(())
}

fn summarize(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, max, avg))
}

fn cmd_describe(
    surface: &Path,
    medial: &Path,
    output: &Path,
    offset: Vector3<f64>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (points, axis) = load_axis(surface, medial, !sequential)?;

    io::save_mat_records(output, &points, &axis, &offset)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_segment(
    surface: &Path,
    medial: &Path,
    output: &Path,
    params: &GrowParameters,
    options: &PlyOptions,
    split: bool,
    adjacencies: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    params.validate()?;
    let (_, axis) = load_axis(surface, medial, params.parallel)?;

    let mode = if params.parallel { "parallel" } else { "sequential" };
    println!("Building neighbor graph (k={}, {})...", params.k, mode);
    let graph = neighbor_graph(&axis, params.k, params.parallel)?;

    if let Some(path) = adjacencies {
        io::save_adjacencies(path, &graph)?;
        println!("Saved: {}", path.display());
    }

    println!("Growing regions ({})...", params.method);
    let progress = create_progress();
    let start = Instant::now();
    let segments = grow_regions_with_progress(
        axis.points(),
        &graph,
        &params.criterion()?,
        &params.grow_options(),
        &progress,
    )?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} segments, {} unsegmented ({:.2?})",
        segments.num_segments(),
        segments.num_unsegmented(),
        elapsed
    );

    ply::save_labelled_points(&axis.coordinates(), segments.ids(), output, options)?;
    println!("Saved: {}", output.display());

    if split {
        let (interior, exterior) = split_interior_exterior(&axis, &segments)?;
        for (suffix, half) in [("interior", interior), ("exterior", exterior)] {
            let path = sibling(output, suffix);
            ply::save_labelled_points(&half.coordinates, &half.segment_ids, &path, options)?;
            println!("Saved: {}", path.display());
        }
    }

    Ok(())
}

/// `out.ply` -> `out_<suffix>.ply`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("segments");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(name)
}

fn cmd_sample(output: &Path, grid: usize) -> Result<(), Box<dyn std::error::Error>> {
    let cloud = sample::orthogonal_planes(grid);
    ply::save_oriented_points(&cloud.points, &cloud.normals, output)?;
    println!("Saved: {} ({} points)", output.display(), cloud.points.len());
    Ok(())
}
