use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use inventory_atlas::{
    group_markers, Dashboard, FilterSpec, MapBounds, ModelGroups, QueryError, Selection,
};

// The web UI paginates the list view at 100 rows; the CLI does the same.
const LIST_LIMIT: usize = 100;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let csv_path = args[1].clone();
    let spec = parse_filter_args(&args[2..])?;

    run_query(Path::new(&csv_path), &spec)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <inventory.csv> [filters]", program);
    eprintln!();
    eprintln!("Filters (repeatable):");
    eprintln!("  --model <name>    model code or group label, e.g. \"SM-F766 (N0/NK 통합)\"");
    eprintln!("  --color <name>    device color, e.g. 블랙");
    eprintln!("  --owner <name>    holder name (normalized), e.g. 강남점");
    eprintln!("  --region <name>   region bucket, e.g. 동남 / 사무실");
}

fn parse_filter_args(args: &[String]) -> Result<FilterSpec> {
    let mut models = Vec::new();
    let mut colors = Vec::new();
    let mut owners = Vec::new();
    let mut regions = Vec::new();

    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let value = match it.next() {
            Some(v) => v.clone(),
            None => bail!("Missing value for {}", flag),
        };
        match flag.as_str() {
            "--model" => models.push(value),
            "--color" => colors.push(value),
            "--owner" => owners.push(value),
            "--region" => regions.push(value),
            other => bail!("Unknown option: {}", other),
        }
    }

    // Group labels expand into their member model codes
    let groups = ModelGroups::builtin();
    let selection = |values: Vec<String>| {
        if values.is_empty() {
            Selection::All
        } else {
            Selection::specific(values)
        }
    };

    Ok(FilterSpec {
        models: if models.is_empty() {
            Selection::All
        } else {
            Selection::Specific(groups.expand(models.iter().map(String::as_str)))
        },
        colors: selection(colors),
        owners: selection(owners),
        regions: selection(regions),
    })
}

fn run_query(csv_path: &Path, spec: &FilterSpec) -> Result<()> {
    let mut dash = Dashboard::new();

    println!("📂 Loading {}...", csv_path.display());
    let dataset = dash.load_csv(csv_path)?;
    println!(
        "✓ Loaded {} records ({}, fingerprint {})",
        dataset.len(),
        dataset.source_file,
        &dataset.fingerprint[..12]
    );

    let result = match dash.query(spec) {
        Ok(result) => result,
        Err(QueryError::UnderspecifiedQuery) => {
            eprintln!("⚠️  {}", QueryError::UnderspecifiedQuery);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n검색 총수량 ({}건)", result.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if result.is_empty() {
        println!("조건에 맞는 결과가 없습니다.");
        return Ok(());
    }

    for record in result.list_view.iter().take(LIST_LIMIT) {
        println!(
            "{}  :  {} | {} | {} | {}",
            record.holder_normalized,
            record.model_display(),
            record.color_display(),
            record.status_display(),
            record.target_display(),
        );
    }
    if result.len() > LIST_LIMIT {
        println!("... ({} more)", result.len() - LIST_LIMIT);
    }

    let markers = group_markers(&result.map_view);
    println!("\n🗺️  Map markers: {}", markers.len());
    if let Some(bounds) = MapBounds::from_records(&result.map_view) {
        let center = bounds.center();
        println!("   center: ({:.4}, {:.4})", center.lat, center.lon);
    }
    for marker in &markers {
        println!(
            "   {} @ ({:.4}, {:.4}) - {}대, colors: {}",
            marker.popup_title(),
            marker.coordinate.lat,
            marker.coordinate.lon,
            marker.total(),
            marker.unique_colors.join("/"),
        );
    }

    Ok(())
}
