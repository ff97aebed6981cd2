//! Build script that embeds every file under `assets/` into the binary.
//!
//! Generates `$OUT_DIR/embedded_assets.rs`, which `configuration::assets`
//! includes as a static `(name, bytes)` table. Dotfiles are skipped.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let manifest_directory =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let output_directory = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let asset_directory = manifest_directory.join("assets");
    println!("cargo:rerun-if-changed={}", asset_directory.display());

    let mut assets: Vec<(String, PathBuf)> = Vec::new();
    if let Ok(entries) = fs::read_dir(&asset_directory) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            println!("cargo:rerun-if-changed={}", path.display());
            assets.push((name.to_string(), path.clone()));
        }
    }
    assets.sort();

    let mut generated = String::from("pub(super) static EMBEDDED_ASSETS: &[(&str, &[u8])] = &[\n");
    for (name, path) in &assets {
        generated.push_str(&format!(
            "    ({:?}, include_bytes!({:?})),\n",
            name,
            path.display().to_string()
        ));
    }
    generated.push_str("];\n");

    fs::write(output_directory.join("embedded_assets.rs"), generated)
        .expect("Failed to write embedded asset table");
}
