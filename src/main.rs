use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use college_predictor::categories::Gender;
use college_predictor::config::Config;
use college_predictor::eligibility::{ScoreMetric, ScoreMode};
use college_predictor::export;
use college_predictor::loader::DatasetLoader;
use college_predictor::logging;
use college_predictor::models::{ExamType, RankedResult};
use college_predictor::options::extract_filter_options;
use college_predictor::query::{PredictionQuery, UniversityType};
use college_predictor::CollegePredictor;
use std::fs;
use std::path::{Path, PathBuf};

fn query_args() -> Vec<Arg> {
    vec![
        Arg::new("percentile")
            .long("percentile")
            .value_name("PERCENTILE")
            .help("Your percentile (single mode)")
            .value_parser(value_parser!(f64)),
        Arg::new("rank")
            .long("rank")
            .value_name("RANK")
            .help("Your rank (single mode)")
            .value_parser(value_parser!(i64)),
        Arg::new("min-percentile")
            .long("min-percentile")
            .value_name("PERCENTILE")
            .help("Lower bound of a cutoff percentile band")
            .value_parser(value_parser!(f64)),
        Arg::new("max-percentile")
            .long("max-percentile")
            .value_name("PERCENTILE")
            .help("Upper bound of a cutoff percentile band")
            .value_parser(value_parser!(f64)),
        Arg::new("min-rank")
            .long("min-rank")
            .value_name("RANK")
            .help("Lower bound of a cutoff rank band")
            .value_parser(value_parser!(i64)),
        Arg::new("max-rank")
            .long("max-rank")
            .value_name("RANK")
            .help("Upper bound of a cutoff rank band")
            .value_parser(value_parser!(i64)),
        Arg::new("category")
            .long("category")
            .value_name("CATEGORY")
            .help("Reservation category (OPEN, EWS, SC, ST, VJ, NT1, NT2, NT3, OBC, SEBC)"),
        Arg::new("female")
            .long("female")
            .help("Candidate is female")
            .action(ArgAction::SetTrue),
        Arg::new("defence")
            .long("defence")
            .help("Candidate qualifies for defence seats")
            .action(ArgAction::SetTrue),
        Arg::new("pwd")
            .long("pwd")
            .help("Candidate qualifies for disability seats")
            .action(ArgAction::SetTrue),
        Arg::new("branch")
            .long("branch")
            .value_name("BRANCH")
            .help("Only show this branch (repeatable)")
            .action(ArgAction::Append),
        Arg::new("region")
            .long("region")
            .value_name("REGION")
            .help("Only show colleges in this region (repeatable)")
            .action(ArgAction::Append),
        Arg::new("university-type")
            .long("university-type")
            .value_name("TYPE")
            .help("any, hu, ohu or sl"),
        Arg::new("csv")
            .long("csv")
            .value_name("FILE")
            .help("Write the preference list as CSV to FILE"),
        Arg::new("json")
            .long("json")
            .value_name("FILE")
            .help("Write the ranked result as JSON to FILE"),
    ]
}

fn main() -> Result<()> {
    logging::init();

    let matches = Command::new("college-predictor")
        .version("1.0")
        .about("Finds the colleges and branches a score is eligible for")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml")
                .global(true),
        )
        .arg(
            Arg::new("exam")
                .long("exam")
                .value_name("EXAM")
                .help("mht-cet or all-india")
                .global(true),
        )
        .arg(
            Arg::new("round")
                .long("round")
                .value_name("ROUND")
                .help("Admission round (1-4)")
                .value_parser(value_parser!(u8).range(1..=4))
                .global(true),
        )
        .subcommand(
            Command::new("predict")
                .about("Rank eligible colleges for a candidate profile")
                .args(query_args()),
        )
        .subcommand(Command::new("options").about("List the branches, districts and regions in a dataset"))
        .get_matches();

    let args = matches.subcommand().map(|(_, m)| m).unwrap_or(&matches);
    let config_file = args
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let mut config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        default_config
    };

    if let Some(exam) = args.get_one::<String>("exam") {
        config.exam_type = exam.parse::<ExamType>().map_err(anyhow::Error::msg)?;
    }
    if let Some(round) = args.get_one::<u8>("round") {
        config.cap_round = *round;
    }

    let data_dir = config.data_directory.clone().unwrap_or_else(|| "data".to_string());
    let loader = DatasetLoader::new(
        &data_dir,
        config.mht_cet_file_pattern.clone(),
        config.all_india_file_pattern.clone(),
    );
    let selector = config.selector();

    println!("📂 Reading cutoffs from: {}", loader.path_for(selector).display());
    let dataset = loader.load(selector)?;
    println!("   ✅ Found {} colleges ({} round {})", dataset.colleges.len(), selector.exam_type, selector.round);

    let predictor = CollegePredictor::new(
        config.category_fallbacks.clone(),
        config.regions.clone(),
        config.exclusions.clone(),
    );

    match matches.subcommand() {
        Some(("options", _)) => {
            let options = extract_filter_options(&dataset, predictor.regions());
            println!("\n🏫 Branches ({}):", options.branches.len());
            for branch in &options.branches {
                println!("   - {}", branch);
            }
            println!("\n📍 Districts: {}", options.districts.join(", "));
            println!("🗺️  Regions: {}", options.regions.join(", "));
            if !options.categories.is_empty() {
                println!("🏷️  Categories: {}", options.categories.join(", "));
            }
            Ok(())
        }
        Some(("predict", sub)) => {
            apply_query_overrides(&mut config.query, sub)?;
            run_predict(&predictor, &dataset, &config, Some(sub))
        }
        _ => run_predict(&predictor, &dataset, &config, None),
    }
}

/// Merge command-line query flags over the configured query.
fn apply_query_overrides(query: &mut PredictionQuery, args: &ArgMatches) -> Result<()> {
    if let Some(value) = args.get_one::<f64>("percentile") {
        query.metric = ScoreMetric::Percentile;
        query.mode = ScoreMode::Single;
        query.percentile = Some(*value);
    }
    if let Some(value) = args.get_one::<i64>("rank") {
        query.metric = ScoreMetric::Rank;
        query.mode = ScoreMode::Single;
        query.rank = Some(*value);
    }

    let min_percentile = args.get_one::<f64>("min-percentile").copied();
    let max_percentile = args.get_one::<f64>("max-percentile").copied();
    if min_percentile.is_some() || max_percentile.is_some() {
        query.metric = ScoreMetric::Percentile;
        query.mode = ScoreMode::Range;
        query.min_percentile = min_percentile;
        query.max_percentile = max_percentile;
    }

    let min_rank = args.get_one::<i64>("min-rank").copied();
    let max_rank = args.get_one::<i64>("max-rank").copied();
    if min_rank.is_some() || max_rank.is_some() {
        query.metric = ScoreMetric::Rank;
        query.mode = ScoreMode::Range;
        query.min_rank = min_rank;
        query.max_rank = max_rank;
    }

    if let Some(category) = args.get_one::<String>("category") {
        query.category = Some(category.clone());
    }
    if args.get_flag("female") {
        query.gender = Gender::Female;
    }
    if args.get_flag("defence") {
        query.defence = true;
    }
    if args.get_flag("pwd") {
        query.pwd = true;
    }
    if let Some(branches) = args.get_many::<String>("branch") {
        query.branches = branches.cloned().collect();
    }
    if let Some(regions) = args.get_many::<String>("region") {
        query.regions = regions.cloned().collect();
    }
    if let Some(value) = args.get_one::<String>("university-type") {
        query.university_type = UniversityType::parse(value)
            .ok_or_else(|| anyhow::anyhow!("unknown university type: {}", value))?;
    }

    Ok(())
}

fn run_predict(
    predictor: &CollegePredictor,
    dataset: &college_predictor::CutoffDataset,
    config: &Config,
    args: Option<&ArgMatches>,
) -> Result<()> {
    println!("\n🎯 Matching profile...");
    let result = match predictor.predict(dataset, &config.query) {
        Ok(result) => result,
        Err(e) => {
            println!("❌ Error: {}", e);
            std::process::exit(2);
        }
    };

    let output_dir = config.output_directory.as_deref().unwrap_or("output");
    fs::create_dir_all(output_dir)?;

    let csv_path = args
        .and_then(|a| a.get_one::<String>("csv"))
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(output_dir).join("preference_list.csv"));
    let json_path = args
        .and_then(|a| a.get_one::<String>("json"))
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(output_dir).join("results.json"));

    let rows = export::write_csv(&result, &csv_path)?;
    export::write_json(&result, &json_path)?;
    export::write_report(&result, &Path::new(output_dir).join("report.txt"))?;

    print_summary(&result);

    println!("\n📄 Preference list: {} ({} rows)", csv_path.display(), rows);
    println!("📄 Full result: {}", json_path.display());
    Ok(())
}

fn print_summary(result: &RankedResult) {
    println!("\n📊 SUMMARY");
    println!("==========\n");

    if result.is_empty() {
        println!("🔍 No matching colleges found. Try widening your filters.");
        return;
    }

    println!(
        "✅ {} colleges matched, showing {} ({} branches)",
        result.total_matches,
        result.colleges.len(),
        result.branch_count()
    );
    for (i, college) in result.colleges.iter().enumerate() {
        let closing = match result.metric {
            ScoreMetric::Percentile => format!("{:.2} %ile", college.closing_percentile),
            ScoreMetric::Rank => format!("rank {}", college.closing_rank),
        };
        let marker = if college.has_primary_category_match { "⭐" } else { "  " };
        println!(
            "   {}. {} {} - {} ({} branches, closing {})",
            i + 1,
            marker,
            college.display_name,
            college.region,
            college.branches.len(),
            closing
        );
    }
}
