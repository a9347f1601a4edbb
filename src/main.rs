//! `star-tracker`: generate a pattern-hash database from a star catalog,
//! or solve a set of image centroids against one

use std::path::Path;
use std::time::Instant;

use clap::Command;

use star_tracker::solver::SolverConfig;
use star_tracker::{catalogs, cmdline, Database, DatabaseProperties, SolveResult, Solver};

//fi build_cli
fn build_cli() -> Command {
    let generate = cmdline::add_output_arg(cmdline::add_magnitude_arg(
        cmdline::add_simplify_pattern_arg(cmdline::add_verification_stars_per_fov_arg(
            cmdline::add_pattern_stars_per_fov_arg(cmdline::add_pattern_max_error_arg(
                cmdline::add_min_fov_arg(cmdline::add_max_fov_arg(
                    cmdline::add_catalog_format_arg(cmdline::add_catalog_arg(Command::new(
                        "generate",
                    ))),
                )),
            )),
        )),
    ))
    .about("Build a pattern-hash database from a star catalog");

    let solve = cmdline::add_match_threshold_arg(cmdline::add_match_radius_arg(
        cmdline::add_pattern_checking_stars_arg(cmdline::add_fov_max_error_arg(
            cmdline::add_fov_estimate_arg(cmdline::add_height_arg(cmdline::add_width_arg(
                cmdline::add_centroids_arg(cmdline::add_database_arg(Command::new("solve"))),
            ))),
        )),
    ))
    .about("Solve a set of image centroids against a generated database");

    let info =
        cmdline::add_database_arg(Command::new("info")).about("Print a database's properties");

    Command::new("star-tracker")
        .about("Lost-in-space star pattern database generator and solver")
        .version("0.1.0")
        .subcommand_required(true)
        .subcommand(generate)
        .subcommand(solve)
        .subcommand(info)
}

//fi run_generate
fn run_generate(matches: &clap::ArgMatches) -> Result<(), star_tracker::Error> {
    let catalog_path = cmdline::catalog(matches);
    let catalog_format = cmdline::catalog_format(matches);
    let magnitude = cmdline::magnitude(matches);
    let max_fov = cmdline::max_fov(matches);
    let min_fov = cmdline::min_fov(matches);
    let pattern_max_error = cmdline::pattern_max_error(matches);
    let pattern_stars_per_fov = cmdline::pattern_stars_per_fov(matches);
    let verification_stars_per_fov = cmdline::verification_stars_per_fov(matches);
    let simplify_pattern = cmdline::simplify_pattern(matches);
    let output = cmdline::output(matches);

    let current_year = chrono::Utc::now()
        .format("%Y")
        .to_string()
        .parse::<f64>()
        .unwrap_or(2026.0);

    log::info!("loading {} catalog from {}", catalog_format, catalog_path);
    let source = catalogs::load(
        &catalog_format,
        Path::new(&catalog_path),
        magnitude,
        current_year,
        None,
        None,
    )?;
    log::info!("loaded {} stars", source.len());

    let properties = DatabaseProperties::new(
        catalog_format,
        max_fov,
        min_fov,
        pattern_max_error,
        pattern_stars_per_fov,
        verification_stars_per_fov,
        magnitude,
        simplify_pattern,
        None,
        None,
    );

    let start = Instant::now();
    let db = Database::generate(properties, &source)?;
    log::info!(
        "database generated in {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    db.save(Path::new(&output))?;
    println!("wrote database to {}", output);
    Ok(())
}

//fi run_solve
fn run_solve(matches: &clap::ArgMatches) -> Result<(), star_tracker::Error> {
    let database_path = cmdline::database(matches);
    let centroids_path = cmdline::centroids(matches);
    let width = cmdline::width(matches) as f64;
    let height = cmdline::height(matches) as f64;
    let fov_estimate = cmdline::fov_estimate(matches);
    let fov_max_error = cmdline::fov_max_error(matches);

    let config = SolverConfig {
        pattern_checking_stars: cmdline::pattern_checking_stars(matches),
        match_radius: cmdline::match_radius(matches),
        match_threshold: cmdline::match_threshold(matches),
    };

    let db = Database::load(Path::new(&database_path))?;

    let text = std::fs::read_to_string(&centroids_path).map_err(|source| {
        star_tracker::Error::CatalogFile {
            path: Path::new(&centroids_path).to_path_buf(),
            source,
        }
    })?;
    let centroids: Vec<(f64, f64)> = serde_json::from_str(&text)?;

    let solver = Solver::new(&db, config);
    match solver.solve(&centroids, (height, width), fov_estimate, fov_max_error) {
        SolveResult::Solved(solution) => {
            println!(
                "solved: RA={:.4} Dec={:.4} Roll={:.4} FOV={:.4} RMSE={:.2}\" matches={} p_mismatch={:.2e} ({:.1}ms)",
                solution.ra_deg,
                solution.dec_deg,
                solution.roll_deg,
                solution.fov_deg,
                solution.rmse_arcsec,
                solution.matches,
                solution.prob_mismatch,
                solution.t_solve_ms,
            );
        }
        SolveResult::NotSolved { t_solve_ms } => {
            println!("not solved ({:.1}ms)", t_solve_ms);
        }
    }
    Ok(())
}

//fi run_info
fn run_info(matches: &clap::ArgMatches) -> Result<(), star_tracker::Error> {
    let database_path = cmdline::database(matches);
    let db = Database::load(Path::new(&database_path))?;
    let props = db.properties();
    println!("star catalog:                {}", props.star_catalog);
    println!(
        "field of view range:         {:.2} - {:.2} deg",
        props.min_fov.to_degrees(),
        props.max_fov.to_degrees()
    );
    println!("pattern bins:                 {}", props.pattern_bins);
    println!("pattern max error:            {}", props.pattern_max_error);
    println!("star max magnitude:           {}", props.star_max_magnitude);
    println!("pattern stars per fov:        {}", props.pattern_stars_per_fov);
    println!(
        "verification stars per fov:  {}",
        props.verification_stars_per_fov
    );
    println!("simplify pattern:             {}", props.simplify_pattern);
    println!("verification stars:           {}", db.catalog().len());
    println!("patterns:                     {}", db.patterns().len());
    Ok(())
}

//fi main
fn main() {
    env_logger::init();
    let cmd = build_cli();
    let matches = cmd.get_matches();

    let result = match matches.subcommand() {
        Some(("generate", sub)) => run_generate(sub),
        Some(("solve", sub)) => run_solve(sub),
        Some(("info", sub)) => run_info(sub),
        _ => unreachable!("subcommand_required"),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
