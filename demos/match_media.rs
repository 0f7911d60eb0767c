use ql_encode::{
    detect_media_type, find_paper_match, fit_text, validate_brother_profile, FontDescriptor,
    HeuristicMetrics, OverflowMode, OverflowPolicy, PrinterCapabilities, TextBox, Tolerances,
};

//
// cargo run --example match_media capabilities.json 29 90 "Employee 0042"
//

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("usage: match_media <capabilities.json> <width-mm> <height-mm> [text]");
        return;
    }

    let json = std::fs::read_to_string(&args[1]).expect("cannot read capabilities");
    let capabilities = match PrinterCapabilities::from_json(&json) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Invalid capabilities: {}", err);
            return;
        }
    };
    let width_mm: f64 = args[2].parse().expect("width must be a number");
    let height_mm: f64 = args[3].parse().expect("height must be a number");

    let presets = [
        ("default", Tolerances::default()),
        ("tight", Tolerances::tight()),
    ];
    for (name, tolerances) in presets.iter() {
        let media = detect_media_type(width_mm, height_mm, tolerances);
        let paper = find_paper_match(
            &capabilities.papers,
            width_mm,
            height_mm,
            tolerances.paper_tenths_mm,
        );
        println!("[{}] media {} ({}), paper {:?}", name, media.id(), media, paper);
    }

    let validation = validate_brother_profile(width_mm, height_mm);
    println!("{:#?}", validation);

    if let Some(text) = args.get(4) {
        // 1 mm is roughly 3.78 px at 96 dpi
        let text_box = TextBox::new(width_mm * 3.78 * 0.9, height_mm.max(10.0) * 3.78 * 0.3);
        let font = FontDescriptor::new("Helvetica", 700, 24.0);
        let policy = OverflowPolicy::new(OverflowMode::WrapLines, 6.0).max_lines(2);
        let fit = fit_text(text, text_box, &font, &policy, &HeuristicMetrics::default());
        println!("{:?} -> {:.1}pt", text, fit.font_size_pt);
        if let Some(warning) = fit.warning {
            println!("warning: {}", warning);
        }
    }
}
