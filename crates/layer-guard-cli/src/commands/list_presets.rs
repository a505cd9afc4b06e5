//! List-presets command implementation.

use layer_guard_core::Preset;

/// Runs the list-presets command.
pub fn run() {
    println!("Built-in presets:\n");

    for name in Preset::BUILTIN {
        // Builtin names always resolve.
        let Ok(preset) = Preset::by_name(name) else {
            continue;
        };
        println!("{name}");
        println!("  {}", preset.hierarchy);
        for layer in &preset.layers {
            let allowed = if layer.allowed_imports.is_empty() {
                "nothing".to_owned()
            } else {
                layer.allowed_imports.join(", ")
            };
            println!("  {:<16} {:<24} may import: {allowed}", layer.name, layer.pattern);
        }
        println!();
    }

    println!("Select one with `preset = \"<name>\"` in layer-guard.toml,");
    println!("or override any preset with inline [[layers]] definitions.");
}
