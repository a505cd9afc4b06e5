//! Kind-specific remediation guidance attached to violations.

use layer_guard_core::{Preset, ViolationKind};

/// Context for building suggestions for one violation.
#[derive(Debug, Default)]
pub struct SuggestionContext<'a> {
    /// Layer of the importing file.
    pub from_layer: Option<&'a str>,
    /// Layer of the import target.
    pub to_layer: Option<&'a str>,
    /// Layers the importing file may use.
    pub allowed_layers: &'a [String],
    /// The literal import path.
    pub import_path: &'a str,
}

/// Builds guidance text for a violation kind.
///
/// The text embeds the concrete allowed-layer set and hierarchy so the
/// reader does not have to open the preset definition.
#[must_use]
pub fn suggestions_for(
    kind: ViolationKind,
    preset: &Preset,
    ctx: &SuggestionContext<'_>,
) -> Vec<String> {
    let allowed = if ctx.allowed_layers.is_empty() {
        "nothing".to_owned()
    } else {
        ctx.allowed_layers.join(", ")
    };

    match kind {
        ViolationKind::LayerViolation => vec![
            format!(
                "move the imported module into a layer '{}' may use (allowed: {allowed})",
                ctx.from_layer.unwrap_or("?")
            ),
            format!(
                "extract the shared part into the lowest common layer of the hierarchy: {}",
                preset.hierarchy
            ),
            "convert to a dynamic import() if the dependency is genuinely lazy".to_owned(),
        ],
        ViolationKind::CrossSlice => vec![
            format!(
                "extract code used by both slices into a shared segment instead of importing '{}'",
                ctx.import_path
            ),
            "compose the two slices at a higher layer rather than coupling them directly"
                .to_owned(),
        ],
        ViolationKind::CircularDependency => vec![
            "extract the common part both modules need into a lower layer".to_owned(),
            "split an interface out so one side depends on an abstraction".to_owned(),
            "invert one of the two dependencies (dependency injection)".to_owned(),
        ],
        ViolationKind::FileType => {
            vec!["rename the file to .ts/.tsx and add types".to_owned()]
        }
        ViolationKind::InvalidSharedSegment => vec![
            "move this module out of the reserved internal segment into a named shared module"
                .to_owned(),
        ],
        ViolationKind::DeepNesting => vec![
            format!(
                "import from the slice public entry instead of '{}'",
                ctx.import_path
            ),
            "re-export the needed symbol from the slice's index module".to_owned(),
        ],
        ViolationKind::RouteRestriction => vec![
            format!("route entry files may only import from: {allowed}"),
            "move shared page logic into a widget or feature and import that".to_owned(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_violation_names_allowed_layers() {
        let preset = Preset::layered();
        let allowed = vec!["entities".to_owned(), "shared".to_owned()];
        let ctx = SuggestionContext {
            from_layer: Some("features"),
            to_layer: Some("widgets"),
            allowed_layers: &allowed,
            import_path: "@/widgets/header",
        };
        let suggestions = suggestions_for(ViolationKind::LayerViolation, &preset, &ctx);
        assert!(suggestions[0].contains("entities, shared"));
        assert!(suggestions[1].contains(&preset.hierarchy));
    }

    #[test]
    fn every_kind_produces_guidance() {
        let preset = Preset::layered();
        let ctx = SuggestionContext {
            import_path: "x",
            ..SuggestionContext::default()
        };
        for kind in ViolationKind::ALL {
            assert!(!suggestions_for(kind, &preset, &ctx).is_empty(), "{kind}");
        }
    }
}
