//! Engine-wide configuration.
//!
//! Per §9 "Global state": these are plain, serde-(de)serializable values
//! threaded in as parameters by the embedder. Nothing here is a
//! module-level singleton.

use serde::{Deserialize, Serialize};

/// Configuration for the operation executor and renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When true, mutating ops require the target (or its parent container)
    /// to already be visible (§4.G "Visibility gate").
    pub visibility_gate_enabled: bool,
    /// Default pagination window applied by `view` when the op carries no
    /// explicit `page`.
    pub default_page_limit: u32,
    /// Hard ceiling on `page.limit`, matching the tool surface's declared
    /// `page.limit ∈ [1, 500]`.
    pub max_page_limit: u32,
    /// Renderer: maximum lines of children previewed per open container
    /// (§4.H item 3).
    pub renderer_preview_cap: usize,
    /// Renderer: cap on how many enum values are expanded in the schema
    /// hints section before truncating with an ellipsis.
    pub renderer_enum_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            visibility_gate_enabled: true,
            default_page_limit: 50,
            max_page_limit: 500,
            renderer_preview_cap: 24,
            renderer_enum_cap: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_spec_compliant() {
        let cfg = EngineConfig::default();
        assert!(cfg.max_page_limit >= cfg.default_page_limit);
        assert!(cfg.max_page_limit <= 500);
    }
}
