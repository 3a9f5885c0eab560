use anyhow::Result;
use walkability::{io::read_units_geojson, summary, Filter, Summary};

use crate::cli::{Cli, SummaryArgs};

pub fn run(_cli: &Cli, args: &SummaryArgs) -> Result<()> {
    let records = read_units_geojson(&args.geojson)?;
    let filter = Filter { district: args.district.clone(), unit: args.unit.clone() };
    let result = Summary::compute(&records, &filter);

    match &args.district {
        Some(district) => println!("Units in {district}: {}", summary::units_in(&records, district).join(", ")),
        None => println!("Districts: {}", summary::districts(&records).join(", ")),
    }
    println!("Selected units: {}", result.count);

    let Some(means) = result.means else {
        println!("No units match the selection.");
        return Ok(());
    };
    println!();
    println!("{:<24}{:>10.1}", "Walkability score", means.score);
    println!("{:<24}{:>10.1}", "Intersections / km²", means.intersection_density);
    println!("{:<24}{:>10.1}", "Avg block length (m)", means.avg_block_length);
    println!("{:<24}{:>10.1}", "Sidewalk coverage (%)", means.sidewalk_pct);
    println!("{:<24}{:>10.1}", "Amenity access (%)", means.amenity_pct);

    println!();
    println!("Score distribution:");
    let width = 100 / summary::HISTOGRAM_BINS;
    for (i, count) in result.histogram.iter().enumerate() {
        println!("{:>3}-{:<3} {:>5} {}", i * width, (i + 1) * width, count, "#".repeat(*count));
    }

    println!();
    println!("Lowest-scoring units:");
    for unit in &result.bottom {
        println!("{:>6.1}  {} ({})", unit.score, unit.kelurahan, unit.kecamatan);
    }
    Ok(())
}
