use ql_encode::{
    apply_calibration, detect_media_type, encode, find_paper_match, CalibrationRecord, Dimension,
    EncoderConfig, Error, Media, MonochromeBitmap, PaperSize, PrinterCapabilities, RasterJob,
    Rotation, Station, Tolerances, Warning, FINALIZE_LEN, LINE_OVERHEAD, PREAMBLE_LEN,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const CAPABILITIES: &str = r#"{
    "papers": {
        "Letter": [2159, 2794],
        "62mm x 100mm": [620, 1000],
        "29mm x 90mm": [290, 900],
        "62mm": [620, null],
        "broken": "n/a"
    },
    "dpis": ["300x300", "300x600"],
    "supports_custom_paper_size": false
}"#;

fn papers() -> Vec<(String, PaperSize)> {
    PrinterCapabilities::from_json(CAPABILITIES).unwrap().papers
}

#[test]
fn calibrated_die_cut_label_end_to_end() {
    init();
    let capabilities = PrinterCapabilities::from_json(CAPABILITIES).unwrap();
    assert_eq!(capabilities.papers.len(), 4);

    let station = Station::new(300).calibration(CalibrationRecord::new(1.02, 1.0));
    let label = station
        .prepare(Dimension::new(29.0, 90.0).unwrap(), Some(&capabilities))
        .unwrap();

    assert_eq!(label.media, Media::DieCut29x90);
    let paper = label.paper_match.clone().unwrap();
    assert_eq!(paper.paper_name, "29mm x 90mm");
    assert_eq!(paper.rotation, Rotation::Deg0);
    // 29.58 mm is more than 0.05 mm off the preset
    assert!(label
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::InexactPreset(_))));

    let mut bitmap = MonochromeBitmap::blank(label.width_dots, label.height_dots);
    bitmap.set(0, 0, true);
    let encoded = station.encode(&label, &bitmap).unwrap();

    let bpl = (label.width_dots as usize + 7) / 8;
    assert_eq!(
        encoded.bytes.len(),
        PREAMBLE_LEN + label.height_dots as usize * (LINE_OVERHEAD + bpl) + FINALIZE_LEN
    );
    assert_eq!(encoded.media_id, "29x90");
    assert_eq!(encoded.bytes[PREAMBLE_LEN + LINE_OVERHEAD], 0x80);
}

#[test]
fn continuous_label_end_to_end() {
    init();
    let capabilities = PrinterCapabilities::from_json(CAPABILITIES).unwrap();
    let station = Station::new(300);
    let label = station
        .prepare(Dimension::continuous(62.0).unwrap(), Some(&capabilities))
        .unwrap();

    assert_eq!(label.media, Media::Continuous62);
    assert_eq!(label.paper_match.as_ref().unwrap().paper_name, "62mm");
    assert!(label.warnings.is_empty(), "{:?}", label.warnings);

    // length comes from whatever the renderer produced
    let bitmap = MonochromeBitmap::blank(label.width_dots, 400);
    let encoded = station.encode(&label, &bitmap).unwrap();
    assert!(encoded.warnings.is_empty());
    assert_eq!(encoded.bytes[9], 0x0A);
    assert_eq!(
        encoded.bytes.len(),
        PREAMBLE_LEN + 400 * (LINE_OVERHEAD + 92) + FINALIZE_LEN
    );
}

#[test]
fn landscape_label_on_portrait_stock() {
    init();
    let capabilities = PrinterCapabilities::from_json(CAPABILITIES).unwrap();
    let station = Station::new(300);
    let label = station
        .prepare(Dimension::new(90.0, 29.0).unwrap(), Some(&capabilities))
        .unwrap();
    assert_eq!(label.rotation(), Rotation::Deg90);
    assert_eq!(label.media, Media::DieCut29x90);

    let bitmap = MonochromeBitmap::blank(label.width_dots, label.height_dots);
    let encoded = station.encode(&label, &bitmap).unwrap();
    assert_eq!(encoded.media_id, "29x90");
    assert_eq!(encoded.paper_name.as_deref(), Some("29mm x 90mm"));
    // die-cut code, lines as wide as the 29 mm stock
    assert_eq!(encoded.bytes[9], 0x0B);
    let bpl = (label.height_dots as usize + 7) / 8;
    assert_eq!(encoded.bytes[PREAMBLE_LEN + 2] as usize, bpl);
    assert_eq!(
        encoded.bytes.len(),
        PREAMBLE_LEN + label.width_dots as usize * (LINE_OVERHEAD + bpl) + FINALIZE_LEN
    );
}

#[test]
fn unmatched_size_still_encodes() {
    init();
    let capabilities = PrinterCapabilities::from_json(CAPABILITIES).unwrap();
    let station = Station::new(300);
    let label = station
        .prepare(Dimension::new(15.0, 40.0).unwrap(), Some(&capabilities))
        .unwrap();

    assert_eq!(label.paper_match, None);
    assert_eq!(label.media, Media::Continuous29);
    assert!(label
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::MediaMatchFailed { .. })));

    let bitmap = MonochromeBitmap::blank(label.width_dots, label.height_dots);
    let encoded = station.encode(&label, &bitmap).unwrap();
    assert_eq!(encoded.media_id, "29");
}

#[test]
fn adjusted_size_drives_matching() {
    let record = CalibrationRecord::new(1.0, 1.06);
    let nominal = Dimension::new(29.0, 85.0).unwrap();
    let adjusted = apply_calibration(nominal, &record);
    let tight = Tolerances::tight();

    // nominal 85 mm is too short for the tight band, calibrated 90.1 mm is not
    let (width, height) = (nominal.width_mm, nominal.height_mm);
    assert_eq!(detect_media_type(width, height, &tight), Media::Continuous29);
    assert!(find_paper_match(&papers(), width, height, 10).is_none());

    let (width, height) = (adjusted.width_mm, adjusted.height_mm);
    assert_eq!(detect_media_type(width, height, &tight), Media::DieCut29x90);
    let paper = find_paper_match(&papers(), width, height, 10).unwrap();
    assert_eq!(paper.paper_name, "29mm x 90mm");
}

#[test]
fn unknown_media_emits_nothing() {
    let bitmap = MonochromeBitmap::blank(232, 709);
    match RasterJob::new(&bitmap, "DK-99999", 203) {
        Err(Error::UnknownMediaCode(id)) => assert_eq!(id, "DK-99999"),
        other => panic!("unexpected {:?}", other),
    }

    let job = RasterJob::new(&bitmap, "29x90", 203).unwrap();
    let out = encode(&job, &EncoderConfig::new()).unwrap();
    assert_eq!(out.len(), PREAMBLE_LEN + 709 * (LINE_OVERHEAD + 29) + FINALIZE_LEN);
}
