/// Integration tests for PCM and transport encoding
///
/// Validates the i16 wire format, the quantization error bound, and the
/// end-to-end frame scenario from capture to transport payload.
use livecap::audio::encoder::{
    bytes_to_pcm16, decode_pcm16, decode_transport, encode_frame, encode_pcm16, pcm16_to_bytes,
};
use livecap::audio::resampler::resample;

#[test]
fn test_quantization_error_bound() {
    println!("\n=== Quantization Error Bound Test ===");

    // Sweep the full range plus out-of-range values that must clamp
    let samples: Vec<f32> = (-1300..=1300).map(|i| i as f32 / 1000.0).collect();

    let decoded = decode_pcm16(&encode_pcm16(&samples));

    for (&original, &roundtripped) in samples.iter().zip(decoded.iter()) {
        let clamped = original.clamp(-1.0, 1.0);
        let error = (roundtripped - clamped).abs();

        // One quantization step: 1/32768 on the negative side, 1/32767 on
        // the positive side (the asymmetric scaling)
        let step = if clamped < 0.0 { 1.0 / 32768.0 } else { 1.0 / 32767.0 };
        assert!(
            error <= step,
            "sample {}: error {} exceeds one quantization step",
            original,
            error
        );
    }

    println!("✓ decode16(encode16(clamp(s))) within one quantization step");
}

#[test]
fn test_asymmetric_scaling() {
    println!("\n=== Asymmetric Scaling Test ===");

    let pcm = encode_pcm16(&[-1.0, 1.0, -0.25, 0.25]);

    assert_eq!(pcm[0], -32768, "negative full scale uses the 32768 factor");
    assert_eq!(pcm[1], 32767, "positive full scale uses the 32767 factor");
    assert_eq!(pcm[2], -8192);
    assert_eq!(pcm[3], 8191); // 0.25 * 32767 = 8191.75, truncated

    println!("✓ s<0 scales by 32768, s>=0 by 32767");
}

#[test]
fn test_full_pipeline_scenario() {
    println!("\n=== Frame Encoding Scenario ===");

    // 4096 mono samples at 48 kHz, all 1.0, resampled to 16 kHz then
    // PCM-encoded: little-endian 0x7FFF repeated for every sample
    let frame = vec![1.0f32; 4096];
    let resampled = resample(&frame, 48000, 16000);
    assert_eq!(resampled.len(), 1365);

    let payload = encode_frame(&resampled);
    let bytes = decode_transport(&payload).unwrap();

    assert_eq!(bytes.len(), 1365 * 2);
    for pair in bytes.chunks_exact(2) {
        assert_eq!(pair, [0xFF, 0x7F], "little-endian 0x7FFF");
    }

    println!("✓ {} bytes of LE 0x7FFF", bytes.len());
}

#[test]
fn test_byte_layout_roundtrip() {
    println!("\n=== Byte Layout Test ===");

    let pcm: Vec<i16> = vec![0, 1, -1, 256, -256, i16::MIN, i16::MAX];
    let bytes = pcm16_to_bytes(&pcm);

    assert_eq!(bytes.len(), pcm.len() * 2);
    assert_eq!(bytes_to_pcm16(&bytes), pcm);

    println!("✓ LE byte layout roundtrips");
}

#[test]
fn test_transport_encoding_is_standard_base64() {
    println!("\n=== Transport Encoding Test ===");

    // A known vector: "Man" in ASCII encodes to "TWFu"
    let encoded = livecap::audio::encoder::encode_transport(b"Man");
    assert_eq!(encoded, "TWFu");

    let decoded = decode_transport("TWFu").unwrap();
    assert_eq!(decoded, b"Man");

    // Decode is the exact inverse for binary payloads
    let payload: Vec<u8> = (0..=255).collect();
    let roundtripped =
        decode_transport(&livecap::audio::encoder::encode_transport(&payload)).unwrap();
    assert_eq!(roundtripped, payload);

    println!("✓ Standard base64, exact inverse");
}
