use log::debug;

use crate::{
    bitmap::{bytes_per_line, MonochromeBitmap},
    error::Error,
    media::Media,
};

const INVALIDATE_LEN: usize = 400;

const RESET: [u8; 2] = [0x1B, 0x40]; // ESC @ : Initialize
const RASTER_MODE: [u8; 4] = [0x1B, 0x69, 0x61, 0x01]; // ESC i a : Switch to raster mode
const MEDIA_INFO: [u8; 3] = [0x1B, 0x69, 0x7A]; // ESC i z : Print information
const MEDIA_INFO_PARAMS: usize = 10;
// Validity flags for the declared print information fields
const PI_KIND: u8 = 0x02;
const PI_WIDTH: u8 = 0x04;
const PI_LENGTH: u8 = 0x08;
const PI_RECOVER: u8 = 0x80;
const MARGINS: [u8; 5] = [0x1B, 0x69, 0x64, 0x00, 0x00]; // ESC i d : Margin amount
const COMPRESSION: u8 = 0x4D; // M : Compression mode
const NO_COMPRESSION: u8 = 0x00;
const PACK_BITS: u8 = 0x02;
const RASTER_LINE: [u8; 2] = [0x67, 0x00]; // g : Raster graphics transfer
const PRINT_AND_CUT: u8 = 0x1A; // Control-Z : Print then eject

/// Bytes emitted before the first raster line with the default configuration.
pub const PREAMBLE_LEN: usize = RESET.len()
    + RASTER_MODE.len()
    + MEDIA_INFO.len()
    + MEDIA_INFO_PARAMS
    + MARGINS.len()
    + 2;

/// Opcode and length byte in front of every raster line.
pub const LINE_OVERHEAD: usize = RASTER_LINE.len() + 1;

pub const FINALIZE_LEN: usize = 1;

/// Optional protocol features. The default emits the plain command stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EncoderConfig {
    invalidate: bool,
    declare_media_size: bool,
    compress: bool,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send 400 zero bytes before the reset so a half received job is flushed.
    pub fn invalidate(self, flag: bool) -> Self {
        EncoderConfig {
            invalidate: flag,
            ..self
        }
    }

    /// Send the full print information command.
    ///
    /// The first parameter byte then carries validity flags, and media type,
    /// width, length and raster count follow it. Left off, only the media type
    /// is sent and the printer uses the loaded roll.
    pub fn declare_media_size(self, flag: bool) -> Self {
        EncoderConfig {
            declare_media_size: flag,
            ..self
        }
    }

    pub fn compress(self, flag: bool) -> Self {
        EncoderConfig {
            compress: flag,
            ..self
        }
    }
}

/// A bitmap bound to the stock it will be printed on.
#[derive(Debug)]
pub struct RasterJob<'a> {
    bitmap: &'a MonochromeBitmap,
    media: Media,
    dpi: u32,
}

impl<'a> RasterJob<'a> {
    /// Resolve `media_id` against the catalog. Unknown ids are rejected here,
    /// before anything is encoded.
    pub fn new(bitmap: &'a MonochromeBitmap, media_id: &str, dpi: u32) -> Result<Self, Error> {
        let media = Media::from_id(media_id)?;
        Ok(RasterJob { bitmap, media, dpi })
    }

    pub fn media(&self) -> Media {
        self.media
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

/// Encode a raster job into one Brother QL command stream.
pub fn encode(job: &RasterJob, config: &EncoderConfig) -> Result<Vec<u8>, Error> {
    let bitmap = job.bitmap;
    if bitmap.is_empty() {
        return Err(Error::EmptyBitmap);
    }

    let bpl = bytes_per_line(bitmap.width_dots);
    if bpl > u8::MAX as usize {
        return Err(Error::LineTooWide { bytes_per_line: bpl });
    }

    let mut buf: Vec<u8> = Vec::with_capacity(
        PREAMBLE_LEN + bitmap.height_dots as usize * (LINE_OVERHEAD + bpl) + FINALIZE_LEN,
    );

    if config.invalidate {
        buf.append(&mut [0x00; INVALIDATE_LEN].to_vec());
    }
    buf.extend_from_slice(&RESET);
    buf.extend_from_slice(&RASTER_MODE);

    buf.extend_from_slice(&MEDIA_INFO);
    buf.extend_from_slice(&media_info(job, config));

    buf.extend_from_slice(&MARGINS);

    if config.compress {
        buf.extend_from_slice(&[COMPRESSION, PACK_BITS]);
    } else {
        buf.extend_from_slice(&[COMPRESSION, NO_COMPRESSION]);
    }

    debug!(
        "encoding {} lines of {} bytes on {} at {} dpi",
        bitmap.height_dots,
        bpl,
        job.media.id(),
        job.dpi
    );

    for y in 0..bitmap.height_dots {
        let row = bitmap.row(y);
        if config.compress {
            let mut packed = pack_bits(&row);
            let len = packed.len();
            if len > u8::MAX as usize {
                return Err(Error::LineTooWide { bytes_per_line: len });
            }
            buf.extend_from_slice(&RASTER_LINE);
            buf.push(len as u8);
            buf.append(&mut packed);
        } else {
            buf.extend_from_slice(&RASTER_LINE);
            buf.push(bpl as u8);
            buf.extend_from_slice(&row);
        }
    }

    buf.push(PRINT_AND_CUT);
    debug!("encoded {} bytes", buf.len());
    Ok(buf)
}

fn media_info(job: &RasterJob, config: &EncoderConfig) -> [u8; MEDIA_INFO_PARAMS] {
    let mut params = [0x00; MEDIA_INFO_PARAMS];
    if !config.declare_media_size {
        params[0] = job.media.code();
        return params;
    }

    let spec = job.media.spec();
    params[0] = if job.media.is_continuous() {
        PI_RECOVER | PI_KIND | PI_WIDTH
    } else {
        PI_RECOVER | PI_KIND | PI_WIDTH | PI_LENGTH
    };
    params[1] = job.media.code();
    params[2] = spec.width_mm.round() as u8;
    params[3] = spec.height_mm.round() as u8;
    params[4..8].copy_from_slice(&job.bitmap.height_dots.to_le_bytes());
    // params[8] is the page number, 0 for the first page of a job
    params
}

/// PackBits run length encoding of one raster line.
///
/// Runs of two or more equal bytes become `(1 - n, value)`, anything else a
/// literal block `(n - 1, bytes..)`. Blocks never exceed 128 bytes.
pub fn pack_bits(data: &[u8]) -> Vec<u8> {
    const MAX_BLOCK: usize = 128;

    let mut packed = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let mut run_length = 1;
        while i + run_length < data.len()
            && run_length < MAX_BLOCK
            && data[i + run_length] == data[i]
        {
            run_length += 1;
        }

        if run_length > 1 {
            packed.push((1 - run_length as i16) as i8 as u8);
            packed.push(data[i]);
            i += run_length;
        } else {
            let start = i;
            while i < data.len()
                && i - start < MAX_BLOCK
                && !(i + 1 < data.len() && data[i] == data[i + 1])
            {
                i += 1;
            }
            packed.push((i - start - 1) as u8);
            packed.extend_from_slice(&data[start..i]);
        }
    }

    packed
}
