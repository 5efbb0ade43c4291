//! Decode regression tests
//!
//! Symbols are rendered with the `qrcode` crate at known version and EC
//! level, then pushed through the decoder and the capture pipeline. These
//! protect the luma conversion, the metadata mapping and the polarity
//! handling.

use image::{Rgba, RgbaImage};
use qr_scan::models::ECLevel;
use qr_scan::source::synthetic::{SyntheticStream, render_modules};
use qr_scan::{CapturePipeline, DecodeOptions, DecodeOutcome, Decoder, QrDecoder};
use qrcode::{Color, EcLevel, QrCode};
use std::env;
use std::sync::Once;

static PRINT_TEST_SETTINGS: Once = Once::new();

/// Module scale, overridable with `QR_TEST_SCALE`
fn test_scale(default: u32) -> u32 {
    let scale = match env::var("QR_TEST_SCALE") {
        Ok(val) => val.trim().parse::<u32>().ok().filter(|&v| v > 0).unwrap_or(default),
        Err(_) => default,
    };
    PRINT_TEST_SETTINGS.call_once(|| {
        println!("Test settings: QR_TEST_SCALE={}", scale);
    });
    scale
}

fn render(code: &QrCode) -> RgbaImage {
    let modules: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    render_modules(&modules, code.width(), test_scale(6), 4)
}

fn invert(frame: &mut RgbaImage) {
    for px in frame.pixels_mut() {
        px.0[0] = 255 - px.0[0];
        px.0[1] = 255 - px.0[1];
        px.0[2] = 255 - px.0[2];
    }
}

fn decode(decoder: &mut QrDecoder, frame: &RgbaImage, options: DecodeOptions) -> Option<String> {
    decoder
        .decode(frame.as_raw(), frame.width(), frame.height(), options)
        .map(|symbol| symbol.payload.into_string())
}

#[test]
fn test_decode_url() {
    let code = QrCode::new(b"https://example.com").expect("fits");
    let frame = render(&code);
    let mut decoder = QrDecoder::new();
    assert_eq!(
        decode(&mut decoder, &frame, DecodeOptions::DONT_INVERT).as_deref(),
        Some("https://example.com")
    );
}

#[test]
fn test_decode_reports_metadata() {
    let text = "version and error correction survive decoding";
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H).expect("fits");
    let frame = render(&code);
    let mut decoder = QrDecoder::new();

    let symbol = decoder
        .decode(frame.as_raw(), frame.width(), frame.height(), DecodeOptions::DONT_INVERT)
        .expect("rendered symbol decodes");

    assert_eq!(symbol.payload.as_str(), text);
    assert_eq!(symbol.error_correction, Some(ECLevel::H));
    let version = symbol.version.expect("version reported");
    assert_eq!(version.size(), code.width());
    assert!(symbol.mask.is_some());

    // Corners land inside the frame
    for corner in &symbol.corners {
        assert!(corner.x >= 0.0 && corner.x < frame.width() as f32);
        assert!(corner.y >= 0.0 && corner.y < frame.height() as f32);
    }
}

#[test]
fn test_decode_high_version() {
    let text = "x".repeat(400);
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L).expect("fits");
    let frame = render(&code);
    let mut decoder = QrDecoder::new();

    let symbol = decoder
        .decode(frame.as_raw(), frame.width(), frame.height(), DecodeOptions::DONT_INVERT)
        .expect("rendered symbol decodes");
    assert_eq!(symbol.payload.as_str(), text);
    assert!(symbol.version.is_some_and(|v| v.number() >= 10));
}

#[test]
fn test_decode_parallel_luma_matches_serial() {
    let code = QrCode::new(b"parallel").expect("fits");
    let frame = render(&code);
    let mut serial = QrDecoder::new().with_parallel_threshold(usize::MAX);
    let mut parallel = QrDecoder::new().with_parallel_threshold(0);
    assert_eq!(
        decode(&mut serial, &frame, DecodeOptions::DONT_INVERT),
        decode(&mut parallel, &frame, DecodeOptions::DONT_INVERT)
    );
}

#[test]
fn test_inverted_symbol_needs_inversion() {
    let code = QrCode::new(b"light on dark").expect("fits");
    let mut frame = render(&code);
    invert(&mut frame);
    let mut decoder = QrDecoder::new();

    assert_eq!(decode(&mut decoder, &frame, DecodeOptions::DONT_INVERT), None);
    assert_eq!(
        decode(&mut decoder, &frame, DecodeOptions::ATTEMPT_BOTH).as_deref(),
        Some("light on dark")
    );
}

#[test]
fn test_live_pipeline_misses_inverted_symbol() {
    let code = QrCode::new(b"light on dark").expect("fits");
    let mut frame = render(&code);
    invert(&mut frame);

    let (mut stream, _probe) = SyntheticStream::new(vec![frame]);
    let mut pipeline = CapturePipeline::new(QrDecoder::new());
    assert_eq!(pipeline.capture_and_decode(&mut stream), DecodeOutcome::NoCode);
}

#[test]
fn test_pipeline_follows_resolution_change() {
    let code = QrCode::new(b"resolution change").expect("fits");
    let symbol = render(&code);

    // Same symbol placed on a larger canvas after the camera renegotiates
    let mut large = RgbaImage::from_pixel(
        symbol.width() * 2,
        symbol.height() + 40,
        Rgba([255, 255, 255, 255]),
    );
    image::imageops::overlay(&mut large, &symbol, 20, 20);

    let blank = RgbaImage::from_pixel(64, 48, Rgba([255, 255, 255, 255]));
    let (mut stream, probe) = SyntheticStream::new(vec![blank, symbol.clone(), large]);
    let mut pipeline = CapturePipeline::new(QrDecoder::new());

    assert_eq!(pipeline.capture_and_decode(&mut stream), DecodeOutcome::NoCode);
    assert_eq!(
        pipeline.capture_and_decode(&mut stream),
        DecodeOutcome::Found("resolution change".into())
    );
    assert_eq!(
        pipeline.capture_and_decode(&mut stream),
        DecodeOutcome::Found("resolution change".into())
    );
    assert_eq!(
        (pipeline.surface().width(), pipeline.surface().height()),
        (symbol.width() * 2, symbol.height() + 40)
    );
    assert_eq!(pipeline.stats().decode_calls, 3);
    assert_eq!(probe.frames_copied(), 3);
}

#[test]
fn test_noise_frame_is_a_miss() {
    // Deterministic pseudo-random noise
    let mut state = 0x2545_f491u32;
    let frame = RgbaImage::from_fn(160, 120, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let v = (state & 0xff) as u8;
        Rgba([v, v, v, 255])
    });
    let mut decoder = QrDecoder::new();
    assert_eq!(decode(&mut decoder, &frame, DecodeOptions::ATTEMPT_BOTH), None);
}
