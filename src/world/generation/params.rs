//! Generation parameters
//!
//! Every tunable value of the map pipeline, stored in fixed slots keyed by
//! layer or tunnel class, with a typed update surface for incremental edits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::random::scramble_seed;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{variable} expects an integer, got {value}")]
    ExpectedInt { variable: &'static str, value: f32 },
}

/// A value for a typed parameter update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f32),
}

impl ParamValue {
    fn as_int(self, variable: &'static str) -> Result<i64, ParamError> {
        match self {
            ParamValue::Int(v) => Ok(v),
            ParamValue::Float(value) => Err(ParamError::ExpectedInt { variable, value }),
        }
    }

    fn as_float(self) -> f32 {
        match self {
            ParamValue::Int(v) => v as f32,
            ParamValue::Float(v) => v,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

/// Noise-driven layers, each owning one [`NoiseParams`] slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseLayer {
    Surface = 0,
    Cave = 1,
    LargeClump = 2,
    SmallClump = 3,
    Dots = 4,
    Water = 5,
}

impl NoiseLayer {
    pub const COUNT: usize = 6;

    pub const ALL: [NoiseLayer; NoiseLayer::COUNT] = [
        NoiseLayer::Surface,
        NoiseLayer::Cave,
        NoiseLayer::LargeClump,
        NoiseLayer::SmallClump,
        NoiseLayer::Dots,
        NoiseLayer::Water,
    ];

    /// Multiplier of the seed scramble applied after each run
    pub fn seed_factor(self) -> f64 {
        match self {
            NoiseLayer::Surface => 4.51,
            NoiseLayer::Cave => 5.16,
            NoiseLayer::LargeClump => 6.84,
            NoiseLayer::SmallClump => 8.67,
            NoiseLayer::Dots => 6.56,
            NoiseLayer::Water => 6.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseVariable {
    Seed,
    ScaleX,
    ScaleY,
    OffsetX,
    OffsetY,
    Octaves,
    Persistence,
    Lacunarity,
    Threshold,
}

/// Fractal noise settings for one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub seed: i64,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub scale: (f32, f32),
    pub offset: (f32, f32),
    /// Cells at or below this level pass
    pub threshold: f32,
}

impl NoiseParams {
    pub fn new(seed: i64, scale: f32, octaves: u32, threshold: f32) -> Self {
        Self {
            seed,
            octaves,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: (scale, scale),
            offset: (0.0, 0.0),
            threshold,
        }
    }

    /// Apply one typed update in place
    pub fn set(&mut self, variable: NoiseVariable, value: ParamValue) -> Result<(), ParamError> {
        match variable {
            NoiseVariable::Seed => self.seed = value.as_int("seed")?,
            NoiseVariable::ScaleX => self.scale.0 = value.as_float(),
            NoiseVariable::ScaleY => self.scale.1 = value.as_float(),
            NoiseVariable::OffsetX => self.offset.0 = value.as_float(),
            NoiseVariable::OffsetY => self.offset.1 = value.as_float(),
            NoiseVariable::Octaves => self.octaves = value.as_int("octaves")?.max(0) as u32,
            NoiseVariable::Persistence => self.persistence = value.as_float(),
            NoiseVariable::Lacunarity => self.lacunarity = value.as_float(),
            NoiseVariable::Threshold => self.threshold = value.as_float(),
        }
        Ok(())
    }
}

/// Tunnel classes carved through the cave field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelClass {
    Surface = 0,
    Vertical = 1,
    Horizontal = 2,
    Flat = 3,
}

impl TunnelClass {
    pub const COUNT: usize = 4;

    pub const ALL: [TunnelClass; TunnelClass::COUNT] = [
        TunnelClass::Surface,
        TunnelClass::Vertical,
        TunnelClass::Horizontal,
        TunnelClass::Flat,
    ];

    pub fn seed_factor(self) -> f64 {
        match self {
            TunnelClass::Surface => 5.953,
            TunnelClass::Vertical => 7.213,
            TunnelClass::Horizontal => 6.213,
            TunnelClass::Flat => 5.213,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelVariable {
    Seed,
    MinTunnels,
    MaxTunnels,
    MinVertexCount,
    MaxVertexCount,
    MinVertexDist,
    MaxVertexDist,
    MinRatio,
    MaxRatio,
    Thickness,
}

/// Random-walk tunnel settings for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TunnelParams {
    pub seed: i64,
    pub min_tunnels: i32,
    pub max_tunnels: i32,
    pub min_vertex_count: i32,
    pub max_vertex_count: i32,
    pub min_vertex_dist: f32,
    pub max_vertex_dist: f32,
    /// Angle ratio, 0 = horizontal and 1 = vertical
    pub min_ratio: f32,
    pub max_ratio: f32,
    pub thickness: u32,
}

impl TunnelParams {
    pub fn set(&mut self, variable: TunnelVariable, value: ParamValue) -> Result<(), ParamError> {
        match variable {
            TunnelVariable::Seed => self.seed = value.as_int("seed")?,
            TunnelVariable::MinTunnels => self.min_tunnels = value.as_int("min_tunnels")? as i32,
            TunnelVariable::MaxTunnels => self.max_tunnels = value.as_int("max_tunnels")? as i32,
            TunnelVariable::MinVertexCount => {
                self.min_vertex_count = value.as_int("min_vertex_count")? as i32
            }
            TunnelVariable::MaxVertexCount => {
                self.max_vertex_count = value.as_int("max_vertex_count")? as i32
            }
            TunnelVariable::MinVertexDist => self.min_vertex_dist = value.as_float(),
            TunnelVariable::MaxVertexDist => self.max_vertex_dist = value.as_float(),
            TunnelVariable::MinRatio => self.min_ratio = value.as_float(),
            TunnelVariable::MaxRatio => self.max_ratio = value.as_float(),
            TunnelVariable::Thickness => {
                self.thickness = value.as_int("thickness")?.max(0) as u32
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureVariable {
    Seed,
    MinTreasure,
    MaxTreasure,
    MinTreasureDepth,
    MaxTreasureDepth,
    MinCrystalClusters,
    MaxCrystalClusters,
    MinCrystalRadius,
    MaxCrystalRadius,
}

/// Treasure pocket and crystal cluster settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureParams {
    pub seed: i64,
    pub min_treasure: i32,
    pub max_treasure: i32,
    pub min_treasure_depth: i32,
    pub max_treasure_depth: i32,
    pub min_crystal_clusters: i32,
    pub max_crystal_clusters: i32,
    pub min_crystal_radius: i32,
    pub max_crystal_radius: i32,
}

impl StructureParams {
    pub const SEED_FACTOR: f64 = 9.345;

    pub fn set(&mut self, variable: StructureVariable, value: ParamValue) -> Result<(), ParamError> {
        let v = value.as_int("structure value")?;
        match variable {
            StructureVariable::Seed => self.seed = v,
            StructureVariable::MinTreasure => self.min_treasure = v as i32,
            StructureVariable::MaxTreasure => self.max_treasure = v as i32,
            StructureVariable::MinTreasureDepth => self.min_treasure_depth = v as i32,
            StructureVariable::MaxTreasureDepth => self.max_treasure_depth = v as i32,
            StructureVariable::MinCrystalClusters => self.min_crystal_clusters = v as i32,
            StructureVariable::MaxCrystalClusters => self.max_crystal_clusters = v as i32,
            StructureVariable::MinCrystalRadius => self.min_crystal_radius = v as i32,
            StructureVariable::MaxCrystalRadius => self.max_crystal_radius = v as i32,
        }
        Ok(())
    }
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            seed: 4_829_113,
            min_treasure: 3,
            max_treasure: 8,
            min_treasure_depth: 4,
            max_treasure_depth: 12,
            min_crystal_clusters: 2,
            max_crystal_clusters: 6,
            min_crystal_radius: 3,
            max_crystal_radius: 8,
        }
    }
}

/// Full parameter set of the map pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Fine cells per coarse biome cell, on each axis
    pub biome_size: usize,
    /// Width of the dithered seam, as a percentage of half a block
    pub transition_percent: f32,
    /// Surface band as percentages of the map height
    pub surface_min_percent: f32,
    pub surface_max_percent: f32,
    pub noise: [NoiseParams; NoiseLayer::COUNT],
    pub tunnels: [TunnelParams; TunnelClass::COUNT],
    pub structures: StructureParams,
    /// Cave pockets smaller than this are filled in; 0 keeps every pocket
    pub min_cave_region: usize,
    /// Draw cosmetic coin flips from entropy instead of the structure seed
    pub cosmetic_jitter: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            biome_size: 64,
            transition_percent: 50.0,
            surface_min_percent: 70.0,
            surface_max_percent: 90.0,
            noise: [
                NoiseParams::new(1_204_512, 180.0, 4, 0.0),
                NoiseParams::new(3_718_204, 45.0, 4, 0.32),
                NoiseParams::new(5_502_871, 28.0, 3, 0.3),
                NoiseParams::new(2_190_447, 9.0, 3, 0.25),
                NoiseParams::new(7_731_059, 2.5, 2, 0.12),
                NoiseParams::new(6_044_310, 22.0, 3, 0.35),
            ],
            tunnels: [
                TunnelParams {
                    seed: 1_845_672,
                    min_tunnels: 1,
                    max_tunnels: 4,
                    min_vertex_count: 2,
                    max_vertex_count: 5,
                    min_vertex_dist: 10.0,
                    max_vertex_dist: 30.0,
                    min_ratio: 0.5,
                    max_ratio: 1.0,
                    thickness: 2,
                },
                TunnelParams {
                    seed: 2_934_018,
                    min_tunnels: 1,
                    max_tunnels: 3,
                    min_vertex_count: 2,
                    max_vertex_count: 5,
                    min_vertex_dist: 10.0,
                    max_vertex_dist: 40.0,
                    min_ratio: 0.6,
                    max_ratio: 1.0,
                    thickness: 2,
                },
                TunnelParams {
                    seed: 3_402_781,
                    min_tunnels: 1,
                    max_tunnels: 4,
                    min_vertex_count: 2,
                    max_vertex_count: 6,
                    min_vertex_dist: 15.0,
                    max_vertex_dist: 40.0,
                    min_ratio: 0.0,
                    max_ratio: 0.4,
                    thickness: 2,
                },
                TunnelParams {
                    seed: 4_187_320,
                    min_tunnels: 1,
                    max_tunnels: 3,
                    min_vertex_count: 2,
                    max_vertex_count: 4,
                    min_vertex_dist: 20.0,
                    max_vertex_dist: 50.0,
                    min_ratio: 0.0,
                    max_ratio: 0.15,
                    thickness: 1,
                },
            ],
            structures: StructureParams::default(),
            min_cave_region: 0,
            cosmetic_jitter: false,
        }
    }
}

impl GenerationParams {
    pub fn noise(&self, layer: NoiseLayer) -> &NoiseParams {
        &self.noise[layer as usize]
    }

    pub fn noise_mut(&mut self, layer: NoiseLayer) -> &mut NoiseParams {
        &mut self.noise[layer as usize]
    }

    pub fn tunnel(&self, class: TunnelClass) -> &TunnelParams {
        &self.tunnels[class as usize]
    }

    pub fn tunnel_mut(&mut self, class: TunnelClass) -> &mut TunnelParams {
        &mut self.tunnels[class as usize]
    }

    /// Update one noise variable of one layer
    pub fn set_noise(
        &mut self,
        layer: NoiseLayer,
        variable: NoiseVariable,
        value: impl Into<ParamValue>,
    ) -> Result<(), ParamError> {
        self.noise_mut(layer).set(variable, value.into())
    }

    /// Update one tunnel variable of one class
    pub fn set_tunnel(
        &mut self,
        class: TunnelClass,
        variable: TunnelVariable,
        value: impl Into<ParamValue>,
    ) -> Result<(), ParamError> {
        self.tunnel_mut(class).set(variable, value.into())
    }

    pub fn set_structure(
        &mut self,
        variable: StructureVariable,
        value: impl Into<ParamValue>,
    ) -> Result<(), ParamError> {
        self.structures.set(variable, value.into())
    }

    pub fn set_biome_size(&mut self, size: usize) {
        self.biome_size = size;
    }

    pub fn set_transition_percent(&mut self, percent: f32) {
        self.transition_percent = percent;
    }

    pub fn set_surface_min_percent(&mut self, percent: f32) {
        self.surface_min_percent = percent;
    }

    pub fn set_surface_max_percent(&mut self, percent: f32) {
        self.surface_max_percent = percent;
    }

    /// Advance every layer, tunnel and structure seed by its scramble factor
    pub fn evolve_seeds(&mut self) {
        for layer in NoiseLayer::ALL {
            let slot = self.noise_mut(layer);
            slot.seed = scramble_seed(slot.seed, layer.seed_factor());
        }
        for class in TunnelClass::ALL {
            let slot = self.tunnel_mut(class);
            slot.seed = scramble_seed(slot.seed, class.seed_factor());
        }
        self.structures.seed = scramble_seed(self.structures.seed, StructureParams::SEED_FACTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_noise_updates_slot_in_place() {
        let mut params = GenerationParams::default();
        params
            .set_noise(NoiseLayer::Cave, NoiseVariable::Threshold, 0.6f32)
            .unwrap();
        params
            .set_noise(NoiseLayer::Cave, NoiseVariable::Seed, 42i64)
            .unwrap();
        assert_eq!(params.noise(NoiseLayer::Cave).threshold, 0.6);
        assert_eq!(params.noise(NoiseLayer::Cave).seed, 42);
        // Other slots untouched
        assert_eq!(params.noise(NoiseLayer::Dots), &GenerationParams::default().noise[4]);
    }

    #[test]
    fn test_float_into_int_variable_rejected() {
        let mut params = GenerationParams::default();
        let err = params.set_tunnel(TunnelClass::Flat, TunnelVariable::Thickness, 1.5f32);
        assert!(err.is_err());
        assert!(params
            .set_tunnel(TunnelClass::Flat, TunnelVariable::MaxRatio, 1i64)
            .is_ok());
        assert_eq!(params.tunnel(TunnelClass::Flat).max_ratio, 1.0);
    }

    #[test]
    fn test_evolve_seeds_changes_every_slot() {
        let mut params = GenerationParams::default();
        let before = params.clone();
        params.evolve_seeds();
        for layer in NoiseLayer::ALL {
            assert_ne!(params.noise(layer).seed, before.noise(layer).seed);
        }
        for class in TunnelClass::ALL {
            assert_ne!(params.tunnel(class).seed, before.tunnel(class).seed);
        }
        assert_ne!(params.structures.seed, before.structures.seed);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let params: GenerationParams = ron::from_str("(biome_size: 16)").unwrap();
        assert_eq!(params.biome_size, 16);
        assert_eq!(params.tunnels, GenerationParams::default().tunnels);
    }
}
