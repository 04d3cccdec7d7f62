//! Terrain, grid, origin axes and background
//!
//! Terrain descriptors are resolved once per name and cached for the life of
//! the process. Grid, axes and background are re-applied on every terrain
//! message, cached or not.

use std::collections::HashMap;
use std::rc::Rc;

use crate::assets::AssetLocator;
use crate::protocol::UtmTerrain;
use crate::render::{Appearance, Geometry, RenderHandle, Scene};

/// Caches terrain descriptors and owns the ground-level primitives
pub struct TerrainCache {
    scene: Scene,
    locator: Rc<dyn AssetLocator>,
    terrains: HashMap<String, UtmTerrain>,
    grid: Option<RenderHandle>,
    origin_axes: Option<RenderHandle>,
    terrain: Option<RenderHandle>,
}

impl std::fmt::Debug for TerrainCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainCache")
            .field("cached", &self.terrains.keys().collect::<Vec<_>>())
            .field("grid", &self.grid)
            .field("origin_axes", &self.origin_axes)
            .field("terrain", &self.terrain)
            .finish()
    }
}

impl TerrainCache {
    /// Create the cache and draw the default grid and origin axes
    pub fn new(
        scene: Scene,
        locator: Rc<dyn AssetLocator>,
        grid_size: f64,
        grid_spacing: f64,
        origin_length: f64,
    ) -> Self {
        let grid = scene.add(Geometry::Grid { size: grid_size, spacing: grid_spacing }, Appearance::uncolored());
        let origin_axes = scene.add(Geometry::OriginAxes { length: origin_length }, Appearance::uncolored());
        Self {
            scene,
            locator,
            terrains: HashMap::new(),
            grid: Some(grid),
            origin_axes: Some(origin_axes),
            terrain: None,
        }
    }

    /// Apply a terrain message
    ///
    /// Returns the descriptor whose geometry is on screen, which is the
    /// first one ever seen for this name, or `None` when terrain is disabled
    /// in the message.
    pub fn apply(&mut self, utm: UtmTerrain) -> Option<&UtmTerrain> {
        self.grid = None;
        if utm.enable_grid {
            self.grid = Some(self.scene.add(
                Geometry::Grid { size: utm.grid_size, spacing: utm.grid_spacing },
                Appearance::uncolored(),
            ));
        }

        self.origin_axes = None;
        if utm.show_origin {
            self.origin_axes = Some(self.scene.add(
                Geometry::OriginAxes { length: utm.origin_length },
                Appearance::uncolored(),
            ));
        }

        self.scene.set_background_color(utm.background.to_rgb());

        if !utm.enable_terrain {
            return None;
        }

        let locator = &self.locator;
        let descriptor = self
            .terrains
            .entry(utm.terrain_name.clone())
            .or_insert_with(|| resolve(locator.as_ref(), utm));

        self.terrain = None;
        match &descriptor.mesh_file {
            Some(mesh_file) => {
                self.terrain = Some(self.scene.add(
                    Geometry::Terrain {
                        mesh_file: mesh_file.clone(),
                        texture_file: descriptor.texture_file.clone(),
                        translate: descriptor.translate,
                    },
                    Appearance::uncolored(),
                ));
            }
            None => log::warn!("Terrain '{}' has no mesh; skipping terrain geometry", descriptor.terrain_name),
        }

        Some(descriptor)
    }

    /// Whether a descriptor for `name` is cached
    pub fn contains(&self, name: &str) -> bool {
        self.terrains.contains_key(name)
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}

/// Fill in asset paths for a first-seen terrain
fn resolve(locator: &dyn AssetLocator, mut utm: UtmTerrain) -> UtmTerrain {
    match locator.locate_terrain(&utm.terrain_name) {
        Ok(assets) => {
            log::info!("Loaded terrain '{}'", utm.terrain_name);
            utm.texture_file = assets.texture_file;
            utm.mesh_file = assets.mesh_file;
            utm.translate = assets.translate;
        }
        Err(e) => log::warn!("Terrain '{}' unavailable: {}", utm.terrain_name, e),
    }
    utm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, ModelAssets, TerrainAssets};
    use crate::foundation::math::Vec3;
    use crate::protocol::Color;
    use crate::render::HeadlessRenderer;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    #[derive(Default)]
    struct CountingLocator {
        lookups: Cell<usize>,
    }

    impl AssetLocator for CountingLocator {
        fn locate_terrain(&self, name: &str) -> Result<TerrainAssets, AssetError> {
            self.lookups.set(self.lookups.get() + 1);
            if name == "missing" {
                return Err(AssetError::NotFound(name.to_string()));
            }
            Ok(TerrainAssets {
                texture_file: None,
                mesh_file: Some(PathBuf::from(format!("{}.vtk", name))),
                translate: Vec3::new(1.0, 2.0, 3.0),
            })
        }

        fn locate_model(&self, name: &str) -> Result<ModelAssets, AssetError> {
            Err(AssetError::NotFound(name.to_string()))
        }
    }

    fn setup() -> (Rc<RefCell<HeadlessRenderer>>, Rc<CountingLocator>, TerrainCache) {
        let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
        let locator = Rc::new(CountingLocator::default());
        let cache = TerrainCache::new(Scene::new(renderer.clone()), locator.clone(), 10_000.0, 100.0, 1.0);
        (renderer, locator, cache)
    }

    fn terrain(name: &str) -> UtmTerrain {
        UtmTerrain {
            terrain_name: name.to_string(),
            enable_terrain: true,
            ..Default::default()
        }
    }

    fn grids(renderer: &RefCell<HeadlessRenderer>) -> usize {
        renderer.borrow().count_where(|g| matches!(g, Geometry::Grid { .. }))
    }

    fn terrains(renderer: &RefCell<HeadlessRenderer>) -> usize {
        renderer.borrow().count_where(|g| matches!(g, Geometry::Terrain { .. }))
    }

    #[test]
    fn test_default_grid_and_axes_drawn() {
        let (renderer, _, _cache) = setup();
        assert_eq!(grids(&renderer), 1);
        assert_eq!(renderer.borrow().primitive_count(), 2);
    }

    #[test]
    fn test_cache_hit_reuses_first_descriptor_but_reapplies_background() {
        let (renderer, locator, mut cache) = setup();

        cache.apply(terrain("mcmillan"));
        assert_eq!(locator.lookups.get(), 1);
        assert_eq!(terrains(&renderer), 1);

        let mut second = terrain("mcmillan");
        second.background = Color::new(0, 0, 255);
        second.enable_grid = false;
        second.translate = Vec3::new(9.0, 9.0, 9.0);
        let used = cache.apply(second).unwrap().clone();

        assert_eq!(locator.lookups.get(), 1);
        assert_eq!(used.translate, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(renderer.borrow().background(), Color::new(0, 0, 255).to_rgb());
        assert_eq!(grids(&renderer), 0);
        // The previous terrain primitive was released before the new one
        assert_eq!(terrains(&renderer), 1);
    }

    #[test]
    fn test_disabled_terrain_skips_geometry() {
        let (renderer, locator, mut cache) = setup();
        let mut utm = terrain("mcmillan");
        utm.enable_terrain = false;
        utm.show_origin = false;

        assert!(cache.apply(utm).is_none());
        assert_eq!(locator.lookups.get(), 0);
        assert_eq!(terrains(&renderer), 0);
        assert_eq!(renderer.borrow().count_where(|g| matches!(g, Geometry::OriginAxes { .. })), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_assets_degrade_without_terrain() {
        let (renderer, _, mut cache) = setup();
        assert!(cache.apply(terrain("missing")).is_some());
        assert!(cache.contains("missing"));
        assert_eq!(terrains(&renderer), 0);
    }
}
