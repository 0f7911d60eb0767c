use ql_encode::{CalibrationRecord, Dimension, EncoderConfig, MonochromeBitmap, Station};
use std::env;

//
// cargo run --example encode_image label.png 29 90 label.bin
//

fn print_usage() {
    println!("Usage: cargo run --example encode_image IMAGE WIDTH_MM HEIGHT_MM [OUTPUT]");
    println!("  IMAGE      PNG or any format the image crate reads");
    println!("  WIDTH_MM   label width in millimeters");
    println!("  HEIGHT_MM  label length in millimeters, 0 for continuous rolls");
    println!("  OUTPUT     file to write the command stream to (default: label.bin)");
    println!("\nStation settings are read from .env, see demos/station.env.example.");
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn station_from_env() -> Station {
    let dpi = env::var("STATION_DPI")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    let calibration = CalibrationRecord::new(
        env_f64("STATION_SCALE_X", 1.0),
        env_f64("STATION_SCALE_Y", 1.0),
    )
    .offsets(
        env_f64("STATION_OFFSET_X_MM", 0.0),
        env_f64("STATION_OFFSET_Y_MM", 0.0),
    );

    Station::new(dpi)
        .calibration(calibration)
        .encoder(EncoderConfig::new().invalidate(true))
}

fn main() {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let (width_mm, height_mm) = match (args[2].parse::<f64>(), args[3].parse::<f64>()) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            eprintln!("Error: WIDTH_MM and HEIGHT_MM must be numbers");
            print_usage();
            return;
        }
    };
    let output = args.get(4).cloned().unwrap_or_else(|| "label.bin".to_string());

    let station = station_from_env();
    let nominal = Dimension::new(width_mm, height_mm).expect("invalid label size");
    let label = station.prepare(nominal, None).expect("cannot prepare label");

    println!(
        "Label {} x {} mm -> {} x {} dots on {}",
        label.size.width_mm, label.size.height_mm, label.width_dots, label.height_dots, label.media
    );

    let image = image::open(&args[1]).expect("cannot open image").to_luma8();
    let length = if label.height_dots == 0 {
        // continuous: keep the image aspect ratio
        (image.height() as f64 * label.width_dots as f64 / image.width() as f64).round() as u32
    } else {
        label.height_dots
    };
    let image = image::imageops::resize(
        &image,
        label.width_dots,
        length,
        image::imageops::FilterType::Triangle,
    );

    let bitmap = MonochromeBitmap::from_luma(label.width_dots, length, &image.into_raw(), 80)
        .expect("bitmap conversion failed");

    match station.encode(&label, &bitmap) {
        Ok(encoded) => {
            for warning in &encoded.warnings {
                println!("warning: {}", warning);
            }
            std::fs::write(&output, &encoded.bytes).expect("cannot write output");
            println!(
                "Wrote {} bytes for media {} to {}",
                encoded.bytes.len(),
                encoded.media_id,
                output
            );
        }
        Err(err) => eprintln!("ERROR {:#?}", err),
    }
}
