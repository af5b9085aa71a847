//! Profiling tool for the generation passes and the codec

use std::time::Instant;

use hex_worldgen::codec;
use hex_worldgen::config::GeneratorConfig;
use hex_worldgen::generation::generate_map_detailed;
use hex_worldgen::noise_field::WrapMode;

fn main() {
    let width = 1024;
    let height = 512;
    let seed = "profile";

    println!("=== Performance Profiling ===");
    println!("Map size: {}x{} ({} cells)", width, height, width * height);
    println!("Worker threads: {}", rayon::current_num_threads());
    println!();

    for wrap in [WrapMode::Plane, WrapMode::Torus] {
        let config = GeneratorConfig {
            wrap,
            ..GeneratorConfig::with_dimensions(width, height)
        };

        let generated = match generate_map_detailed(seed, &config) {
            Ok(generated) => generated,
            Err(e) => {
                eprintln!("Generation failed: {}", e);
                return;
            }
        };
        let report = &generated.report;

        let start = Instant::now();
        let bytes = codec::encode(&generated.artifact);
        let encode_time = start.elapsed();

        let start = Instant::now();
        let decoded = codec::decode(&bytes);
        let decode_time = start.elapsed();
        if let Err(e) = decoded {
            eprintln!("Decode failed: {}", e);
            return;
        }

        let total = report.height_pass + report.classify_pass + encode_time + decode_time;
        let pct = |d: std::time::Duration| 100.0 * d.as_secs_f64() / total.as_secs_f64();

        println!("--- {:?} ---", wrap);
        println!("Height pass:      {:>8.2}% ({:?})", pct(report.height_pass), report.height_pass);
        println!("Classify pass:    {:>8.2}% ({:?})", pct(report.classify_pass), report.classify_pass);
        println!("Encode:           {:>8.2}% ({:?})", pct(encode_time), encode_time);
        println!("Decode:           {:>8.2}% ({:?})", pct(decode_time), decode_time);
        println!("─────────────────────────────────");
        println!("TOTAL:            {:>8}  {:?}", "100%", total);
        println!("Encoded size: {} bytes", bytes.len());
        println!();
    }
}
