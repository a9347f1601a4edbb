//! Command-line argument builders and parsers
//!
//! Each argument is a pair of functions in the teacher's style: `add_X_arg`
//! attaches the [clap] definition to a [Command], and `X` reads the parsed
//! value back out of the resulting [ArgMatches], applying a default and
//! any unit conversion (degrees on the command line, radians internally)

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

//fp add_catalog_arg
pub fn add_catalog_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("catalog")
            .long("catalog")
            .short('c')
            .required(true)
            .help("Path to the star catalog file")
            .action(ArgAction::Set),
    )
}
pub fn catalog(matches: &ArgMatches) -> String {
    matches.get_one::<String>("catalog").unwrap().to_string()
}

//fp add_catalog_format_arg
pub fn add_catalog_format_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("catalog_format")
            .long("catalog-format")
            .help("Star catalog format: bsc5, hip_main, tyc_main or generic")
            .action(ArgAction::Set),
    )
}
pub fn catalog_format(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("catalog_format")
        .cloned()
        .unwrap_or_else(|| "bsc5".to_string())
}

//fp add_database_arg
pub fn add_database_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("database")
            .long("database")
            .short('d')
            .required(true)
            .help("Path to a generated database archive")
            .action(ArgAction::Set),
    )
}
pub fn database(matches: &ArgMatches) -> String {
    matches.get_one::<String>("database").unwrap().to_string()
}

//fp add_output_arg
pub fn add_output_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("output")
            .long("output")
            .short('o')
            .required(true)
            .help("Output file to write")
            .action(ArgAction::Set),
    )
}
pub fn output(matches: &ArgMatches) -> String {
    matches.get_one::<String>("output").unwrap().to_string()
}

//fp add_magnitude_arg
pub fn add_magnitude_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("magnitude")
            .long("magnitude")
            .short('m')
            .help("Faintest star magnitude to admit")
            .value_parser(value_parser!(f32))
            .action(ArgAction::Set),
    )
}
pub fn magnitude(matches: &ArgMatches) -> f32 {
    *matches.get_one::<f32>("magnitude").unwrap_or(&6.0)
}

//fp add_max_fov_arg
pub fn add_max_fov_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("max_fov")
            .long("max-fov")
            .help("Largest field of view to generate patterns at, degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn max_fov(matches: &ArgMatches) -> f64 {
    matches
        .get_one::<f64>("max_fov")
        .copied()
        .unwrap_or(30.0)
        .to_radians()
}

//fp add_min_fov_arg
pub fn add_min_fov_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("min_fov")
            .long("min-fov")
            .help("Smallest field of view to generate patterns at, degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn min_fov(matches: &ArgMatches) -> f64 {
    matches
        .get_one::<f64>("min_fov")
        .copied()
        .unwrap_or(30.0)
        .to_radians()
}

//fp add_pattern_max_error_arg
pub fn add_pattern_max_error_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("pattern_max_error")
            .long("pattern-max-error")
            .help("Edge-ratio quantization tolerance")
            .value_parser(value_parser!(f32))
            .action(ArgAction::Set),
    )
}
pub fn pattern_max_error(matches: &ArgMatches) -> f32 {
    *matches.get_one::<f32>("pattern_max_error").unwrap_or(&0.01)
}

//fp add_pattern_stars_per_fov_arg
pub fn add_pattern_stars_per_fov_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("pattern_stars_per_fov")
            .long("pattern-stars-per-fov")
            .help("Target pattern-star density, stars per field of view")
            .value_parser(value_parser!(u16))
            .action(ArgAction::Set),
    )
}
pub fn pattern_stars_per_fov(matches: &ArgMatches) -> u16 {
    *matches
        .get_one::<u16>("pattern_stars_per_fov")
        .unwrap_or(&10)
}

//fp add_verification_stars_per_fov_arg
pub fn add_verification_stars_per_fov_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("verification_stars_per_fov")
            .long("verification-stars-per-fov")
            .help("Target verification-star density, stars per field of view")
            .value_parser(value_parser!(u16))
            .action(ArgAction::Set),
    )
}
pub fn verification_stars_per_fov(matches: &ArgMatches) -> u16 {
    *matches
        .get_one::<u16>("verification_stars_per_fov")
        .unwrap_or(&20)
}

//fp add_simplify_pattern_arg
pub fn add_simplify_pattern_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("simplify_pattern")
            .long("simplify-pattern")
            .help("Center patterns on the pivot star for a faster, less symmetric database")
            .action(ArgAction::SetTrue),
    )
}
pub fn simplify_pattern(matches: &ArgMatches) -> bool {
    matches.get_flag("simplify_pattern")
}

//fp add_width_arg
pub fn add_width_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("width")
            .long("width")
            .short('W')
            .help("Image width in pixels")
            .value_parser(value_parser!(usize))
            .action(ArgAction::Set),
    )
}
pub fn width(matches: &ArgMatches) -> usize {
    *matches.get_one::<usize>("width").unwrap_or(&1280)
}

//fp add_height_arg
pub fn add_height_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("height")
            .long("height")
            .short('H')
            .help("Image height in pixels")
            .value_parser(value_parser!(usize))
            .action(ArgAction::Set),
    )
}
pub fn height(matches: &ArgMatches) -> usize {
    *matches.get_one::<usize>("height").unwrap_or(&960)
}

//fp add_centroids_arg
pub fn add_centroids_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("centroids")
            .required(true)
            .help("JSON file of brightness-ordered [y, x] pixel centroids")
            .action(ArgAction::Set),
    )
}
pub fn centroids(matches: &ArgMatches) -> String {
    matches.get_one::<String>("centroids").unwrap().to_string()
}

//fp add_fov_estimate_arg
pub fn add_fov_estimate_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("fov_estimate")
            .long("fov-estimate")
            .help("Estimated field of view, degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn fov_estimate(matches: &ArgMatches) -> Option<f64> {
    matches.get_one::<f64>("fov_estimate").copied()
}

//fp add_fov_max_error_arg
pub fn add_fov_max_error_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("fov_max_error")
            .long("fov-max-error")
            .help("Reject candidates whose refined FOV differs from the estimate by more than this, degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn fov_max_error(matches: &ArgMatches) -> Option<f64> {
    matches.get_one::<f64>("fov_max_error").copied()
}

//fp add_pattern_checking_stars_arg
pub fn add_pattern_checking_stars_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("pattern_checking_stars")
            .long("pattern-checking-stars")
            .help("Only the brightest N centroids are used for candidate pattern enumeration")
            .value_parser(value_parser!(usize))
            .action(ArgAction::Set),
    )
}
pub fn pattern_checking_stars(matches: &ArgMatches) -> usize {
    *matches
        .get_one::<usize>("pattern_checking_stars")
        .unwrap_or(&8)
}

//fp add_match_radius_arg
pub fn add_match_radius_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("match_radius")
            .long("match-radius")
            .help("Angular match tolerance, as a fraction of the field of view")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn match_radius(matches: &ArgMatches) -> f64 {
    *matches.get_one::<f64>("match_radius").unwrap_or(&0.01)
}

//fp add_match_threshold_arg
pub fn add_match_threshold_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("match_threshold")
            .long("match-threshold")
            .help("Maximum acceptable mismatch probability")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn match_threshold(matches: &ArgMatches) -> f64 {
    *matches
        .get_one::<f64>("match_threshold")
        .unwrap_or(&1e-9)
}
