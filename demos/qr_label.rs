use image::{GrayImage, Luma};
use ql_encode::{Dimension, EncoderConfig, Matrix, MonochromeBitmap, Station};
use qrcode::QrCode;

//
// cargo run --example qr_label 12345 qr.bin
//

struct QrLabels<'a> {
    payload: &'a str,
    counter: u16,
    width_dots: u32,
    height_dots: u32,
}

impl<'a> Iterator for QrLabels<'a> {
    type Item = Matrix;

    fn next(&mut self) -> Option<Self::Item> {
        if self.counter == 0 {
            return None;
        }
        self.counter -= 1;

        let side = self.width_dots.min(self.height_dots) * 9 / 10;
        let qrcode = QrCode::new(format!("{}-{}", self.payload, self.counter + 1)).ok()?;
        let qrcode: GrayImage = qrcode
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .max_dimensions(side, side)
            .build();

        let mut canvas = GrayImage::from_pixel(self.width_dots, self.height_dots, Luma([255]));
        let x = self.width_dots.saturating_sub(qrcode.width()) / 2;
        let y = self.height_dots.saturating_sub(qrcode.height()) / 2;
        image::imageops::overlay(&mut canvas, &qrcode, x, y);

        let bitmap =
            MonochromeBitmap::from_luma(self.width_dots, self.height_dots, &canvas.into_raw(), 80)
                .ok()?;
        Some(
            (0..bitmap.height_dots)
                .map(|row| bitmap.row(row))
                .collect(),
        )
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let payload = args.get(1).map(String::as_str).unwrap_or("12345");
    let output = args.get(2).map(String::as_str).unwrap_or("qr.bin");

    let station = Station::new(300).encoder(EncoderConfig::new().compress(true));
    let label = station
        .prepare(Dimension::new(62.0, 29.0).unwrap(), None)
        .expect("cannot prepare label");

    let labels = QrLabels {
        payload,
        counter: 2,
        width_dots: label.width_dots,
        height_dots: label.height_dots,
    };

    let mut stream = Vec::new();
    for rows in labels {
        let bitmap = MonochromeBitmap::from_rows(label.width_dots, &rows).unwrap();
        let encoded = station.encode(&label, &bitmap).unwrap();
        stream.extend_from_slice(&encoded.bytes);
    }

    std::fs::write(output, &stream).unwrap();
    println!("Wrote {} bytes for {} to {}", stream.len(), label.media, output);
}
