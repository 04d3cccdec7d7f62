//! Tracked entities and their render handles
//!
//! The registry turns frames of [`Contact`] snapshots into on-screen
//! entities. Each [`ActorContact`] owns a body, a label and a bounded trail
//! of position samples; dropping it releases all of them.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use crate::assets::AssetLocator;
use crate::foundation::math::{Transform, Vec3};
use crate::protocol::{Color, Contact, ContactType, ContactVisual, Frame, VisualMode};
use crate::render::{Appearance, Geometry, RenderHandle, Scene};

/// Maximum number of trail samples kept per entity
pub const TRAIL_CAPACITY: usize = 20;

const DEFAULT_COLOR: Color = Color::new(161, 161, 161);
const DEFAULT_OPACITY: f64 = 0.25;
const STALE_OPACITY: f64 = 0.10;
const LABEL_HEIGHT: f64 = 1.5;
const TRAIL_POINT_SIZE: f64 = 5.0;
const AIRCRAFT_SIZE: f64 = 2.0;

/// One tracked entity
#[derive(Debug)]
pub struct ActorContact {
    contact: Contact,
    body: RenderHandle,
    label: RenderHandle,
    trail: VecDeque<RenderHandle>,
    color: Color,
    scale: f64,
    seen_this_tick: bool,
    pending_removal: bool,
    applied_style: Option<String>,
}

impl ActorContact {
    fn spawn(scene: &Scene, contact: &Contact, scale: f64) -> Self {
        let body = scene.add(
            Geometry::Sphere { center: Vec3::zeros(), radius: 1.0 },
            Appearance::new(DEFAULT_COLOR.to_rgb(), DEFAULT_OPACITY),
        );
        let label = scene.add(
            Geometry::Label { text: contact.id.to_string() },
            Appearance::opaque(Color::WHITE.to_rgb()),
        );
        Self {
            contact: contact.clone(),
            body,
            label,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY + 1),
            color: DEFAULT_COLOR,
            scale,
            seen_this_tick: true,
            pending_removal: false,
            applied_style: None,
        }
    }

    /// Last received snapshot
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Body primitive
    pub fn body(&self) -> &RenderHandle {
        &self.body
    }

    /// Label primitive
    pub fn label(&self) -> &RenderHandle {
        &self.label
    }

    /// Number of trail samples
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Display color, also used for the trail
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current uniform body scale
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether an inactive marker was seen for this entity
    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Name of the style the body was last built from
    pub fn applied_style(&self) -> Option<&str> {
        self.applied_style.as_deref()
    }

    fn place(&self) {
        let position = self.contact.position;
        self.body
            .set_transform(&Transform::new(position, self.contact.orientation, self.scale));
        self.label
            .set_transform(&Transform::from_position(position + Vec3::new(0.0, 0.0, LABEL_HEIGHT)));
    }

    fn push_trail_sample(&mut self, scene: &Scene) {
        let sample = scene.add(
            Geometry::TrailPoint { position: self.contact.position, point_size: TRAIL_POINT_SIZE },
            Appearance::opaque(self.color.to_rgb()),
        );
        self.trail.push_back(sample);
        while self.trail.len() > TRAIL_CAPACITY {
            self.trail.pop_front();
        }
    }
}

/// A received visual style and whether it still has to be applied
#[derive(Debug, Clone)]
struct StyleEntry {
    visual: ContactVisual,
    dirty: bool,
}

/// Owner of every tracked entity
pub struct EntityRegistry {
    scene: Scene,
    locator: Rc<dyn AssetLocator>,
    actors: BTreeMap<i32, ActorContact>,
    styles: HashMap<i32, StyleEntry>,
    trails_enabled: bool,
    global_scale: f64,
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("actors", &self.actors.keys().collect::<Vec<_>>())
            .field("styles", &self.styles.len())
            .field("trails_enabled", &self.trails_enabled)
            .field("global_scale", &self.global_scale)
            .finish()
    }
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new(scene: Scene, locator: Rc<dyn AssetLocator>) -> Self {
        Self {
            scene,
            locator,
            actors: BTreeMap::new(),
            styles: HashMap::new(),
            trails_enabled: false,
            global_scale: 1.0,
        }
    }

    /// Tracked entities by id
    pub fn entities(&self) -> &BTreeMap<i32, ActorContact> {
        &self.actors
    }

    /// Look up one entity
    pub fn get(&self, id: i32) -> Option<&ActorContact> {
        self.actors.get(&id)
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Whether trails are drawn
    pub fn trails_enabled(&self) -> bool {
        self.trails_enabled
    }

    /// Enable or disable trails; takes effect on the next update
    pub fn set_trails_enabled(&mut self, enabled: bool) {
        self.trails_enabled = enabled;
    }

    /// Global scale factor applied on top of style scales
    pub fn global_scale(&self) -> f64 {
        self.global_scale
    }

    /// Store a visual style, replacing any previous one for the same id
    pub fn set_visual(&mut self, visual: ContactVisual) {
        self.styles.insert(visual.id, StyleEntry { visual, dirty: true });
    }

    /// Whether the style for `id` is still waiting to be applied
    pub fn is_style_dirty(&self, id: i32) -> bool {
        self.styles.get(&id).is_some_and(|entry| entry.dirty)
    }

    /// Flag every tracked entity reported inactive in any of `frames`
    ///
    /// Returns the number of entities flagged.
    pub fn flag_inactive<'a>(&mut self, frames: impl IntoIterator<Item = &'a Frame>) -> usize {
        let mut flagged = 0;
        for contact in frames.into_iter().flat_map(|f| f.contacts.iter()) {
            if contact.active {
                continue;
            }
            if let Some(actor) = self.actors.get_mut(&contact.id) {
                if !actor.pending_removal {
                    actor.pending_removal = true;
                    flagged += 1;
                }
            }
        }
        flagged
    }

    /// Apply one frame's worth of contacts
    ///
    /// Creates entities for new active ids, refreshes every entity present,
    /// dims the ones that were absent, then deletes the ones flagged for
    /// removal.
    pub fn upsert(&mut self, contacts: &[Contact]) {
        for contact in contacts {
            if contact.active && !self.actors.contains_key(&contact.id) {
                log::debug!("Tracking entity {}", contact.id);
                let actor = ActorContact::spawn(&self.scene, contact, self.global_scale);
                self.actors.insert(contact.id, actor);
            }
        }

        for contact in contacts {
            let Some(actor) = self.actors.get_mut(&contact.id) else {
                continue;
            };
            actor.seen_this_tick = true;
            actor.contact = contact.clone();

            if let Some(entry) = self.styles.get_mut(&contact.id) {
                if entry.dirty {
                    apply_visual(&self.scene, self.locator.as_ref(), self.global_scale, actor, &entry.visual);
                    entry.dirty = false;
                }
            }

            actor.place();
            if self.trails_enabled {
                actor.push_trail_sample(&self.scene);
            }
        }

        for actor in self.actors.values_mut() {
            if !actor.seen_this_tick {
                actor.body.set_opacity(STALE_OPACITY);
                actor.label.set_opacity(STALE_OPACITY);
            }
            actor.seen_this_tick = false;
            if !self.trails_enabled {
                actor.trail.clear();
            }
        }

        self.actors.retain(|id, actor| {
            if actor.pending_removal {
                log::debug!("Removing entity {}", id);
            }
            !actor.pending_removal
        });
    }

    /// Set the global scale and rescale every body
    pub fn rescale(&mut self, global_scale: f64) {
        self.global_scale = global_scale;
        for (id, actor) in &mut self.actors {
            let style_scale = self.styles.get(id).map_or(1.0, |entry| entry.visual.scale);
            actor.scale = style_scale * global_scale;
            actor.place();
        }
    }
}

/// Apply a style to an entity, rebuilding the body only on a name change
fn apply_visual(
    scene: &Scene,
    locator: &dyn AssetLocator,
    global_scale: f64,
    actor: &mut ActorContact,
    visual: &ContactVisual,
) {
    if actor.applied_style.as_deref() != Some(visual.name.as_str()) {
        actor.applied_style = Some(visual.name.clone());
        let geometry = body_geometry(locator, actor.contact.contact_type, &visual.name);
        actor.body = scene.add(geometry, Appearance::uncolored());
        actor.scale = visual.scale * global_scale;
        log::debug!("Entity {} rebuilt with style '{}'", actor.contact.id, visual.name);
    }

    actor.body.set_opacity(visual.opacity);
    actor.label.set_opacity(visual.opacity);
    if visual.visual_mode == VisualMode::Color {
        actor.body.set_color(visual.color.to_rgb());
    }
    actor.color = visual.color;
}

fn unit_sphere() -> Geometry {
    Geometry::Sphere { center: Vec3::zeros(), radius: 1.0 }
}

fn body_geometry(locator: &dyn AssetLocator, contact_type: ContactType, name: &str) -> Geometry {
    match contact_type {
        ContactType::Mesh => match locator.locate_model(name) {
            Ok(assets) => match assets.model_file {
                Some(model_file) => Geometry::Model {
                    model_file,
                    texture_file: assets.texture_file,
                    rotate: assets.rotate,
                },
                None => {
                    log::warn!("Model '{}' has no mesh file; drawing a sphere", name);
                    unit_sphere()
                }
            },
            Err(e) => {
                log::warn!("Model '{}' unavailable: {}; drawing a sphere", name, e);
                unit_sphere()
            }
        },
        ContactType::Aircraft => Geometry::Pyramid { size: AIRCRAFT_SIZE },
        ContactType::Sphere | ContactType::Other => unit_sphere(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, ModelAssets, TerrainAssets};
    use crate::render::HeadlessRenderer;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct ModelLocator;

    impl AssetLocator for ModelLocator {
        fn locate_terrain(&self, name: &str) -> Result<TerrainAssets, AssetError> {
            Err(AssetError::NotFound(name.to_string()))
        }

        fn locate_model(&self, name: &str) -> Result<ModelAssets, AssetError> {
            if name == "zephyr" {
                Ok(ModelAssets {
                    model_file: Some(PathBuf::from("zephyr.obj")),
                    texture_file: None,
                    rotate: Vec3::new(0.0, 0.0, 90.0),
                })
            } else {
                Err(AssetError::NotFound(name.to_string()))
            }
        }
    }

    fn setup() -> (Rc<RefCell<HeadlessRenderer>>, EntityRegistry) {
        let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
        let registry = EntityRegistry::new(Scene::new(renderer.clone()), Rc::new(ModelLocator));
        (renderer, registry)
    }

    fn at(id: i32, x: f64) -> Contact {
        Contact::new(id, Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_new_active_contact_is_tracked() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0), at(2, 5.0).inactive()]);

        assert_eq!(registry.len(), 1);
        let actor = registry.get(1).unwrap();
        let r = renderer.borrow();
        let body = r.get(actor.body().id()).unwrap();
        assert_eq!(body.appearance.opacity, DEFAULT_OPACITY);
        assert_eq!(body.appearance.color, Some(DEFAULT_COLOR.to_rgb()));
        let label = r.get(actor.label().id()).unwrap();
        assert_eq!(label.geometry, Geometry::Label { text: "1".into() });
        assert_eq!(label.transform.position, Vec3::new(0.0, 0.0, LABEL_HEIGHT));
    }

    #[test]
    fn test_pose_follows_latest_contact() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0)]);
        registry.upsert(&[at(1, 42.0)]);

        let actor = registry.get(1).unwrap();
        let body = renderer.borrow().get(actor.body().id()).unwrap().clone();
        assert_eq!(body.transform.position, Vec3::new(42.0, 0.0, 0.0));
    }

    #[test]
    fn test_absent_entity_is_dimmed_not_removed() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0), at(2, 0.0)]);
        registry.upsert(&[at(1, 1.0)]);

        assert_eq!(registry.len(), 2);
        let stale = registry.get(2).unwrap();
        let r = renderer.borrow();
        assert_eq!(r.get(stale.body().id()).unwrap().appearance.opacity, STALE_OPACITY);
        assert_eq!(r.get(stale.label().id()).unwrap().appearance.opacity, STALE_OPACITY);
    }

    #[test]
    fn test_flagged_entity_releases_every_handle() {
        let (renderer, mut registry) = setup();
        registry.set_trails_enabled(true);
        registry.upsert(&[at(1, 0.0)]);
        registry.upsert(&[at(1, 1.0)]);
        assert_eq!(renderer.borrow().primitive_count(), 4);

        let frames = [Frame::new(0.0, vec![at(1, 1.0).inactive()])];
        assert_eq!(registry.flag_inactive(&frames), 1);
        registry.upsert(&[]);

        assert!(registry.is_empty());
        assert_eq!(renderer.borrow().primitive_count(), 0);
    }

    #[test]
    fn test_disabling_trails_prunes_absent_entities_too() {
        let (renderer, mut registry) = setup();
        registry.set_trails_enabled(true);
        registry.upsert(&[at(1, 0.0), at(2, 0.0)]);
        registry.upsert(&[at(1, 1.0), at(2, 1.0)]);
        assert_eq!(registry.get(2).unwrap().trail_len(), 2);

        registry.set_trails_enabled(false);
        registry.upsert(&[at(1, 2.0)]);

        assert_eq!(registry.get(1).unwrap().trail_len(), 0);
        assert_eq!(registry.get(2).unwrap().trail_len(), 0);
        assert_eq!(renderer.borrow().count_where(|g| matches!(g, Geometry::TrailPoint { .. })), 0);
    }

    #[test]
    fn test_style_rebuilds_only_on_name_change() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0).with_type(ContactType::Mesh)]);

        let mut visual = ContactVisual::new(1, "zephyr", Color::new(0, 255, 0));
        visual.opacity = 0.8;
        registry.set_visual(visual.clone());
        assert!(registry.is_style_dirty(1));
        registry.upsert(&[at(1, 0.0).with_type(ContactType::Mesh)]);
        assert!(!registry.is_style_dirty(1));

        let added_after_first = renderer.borrow().added_count();
        let body_id = registry.get(1).unwrap().body().id();
        {
            let r = renderer.borrow();
            let body = r.get(body_id).unwrap();
            assert!(matches!(body.geometry, Geometry::Model { .. }));
            assert_eq!(body.appearance.color, Some(Color::new(0, 255, 0).to_rgb()));
            assert_eq!(body.appearance.opacity, 0.8);
        }

        // Same name again: dirty but no rebuild
        visual.color = Color::new(0, 0, 255);
        registry.set_visual(visual);
        registry.upsert(&[at(1, 0.0).with_type(ContactType::Mesh)]);

        assert_eq!(renderer.borrow().added_count(), added_after_first);
        assert_eq!(registry.get(1).unwrap().body().id(), body_id);
        assert_eq!(registry.get(1).unwrap().color(), Color::new(0, 0, 255));
        assert_eq!(registry.get(1).unwrap().applied_style(), Some("zephyr"));
    }

    #[test]
    fn test_missing_model_degrades_to_sphere() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0).with_type(ContactType::Mesh)]);
        registry.set_visual(ContactVisual::new(1, "unknown", Color::WHITE));
        registry.upsert(&[at(1, 0.0).with_type(ContactType::Mesh)]);

        let id = registry.get(1).unwrap().body().id();
        assert!(matches!(
            renderer.borrow().get(id).unwrap().geometry,
            Geometry::Sphere { .. }
        ));
    }

    #[test]
    fn test_aircraft_style_builds_pyramid() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(3, 0.0).with_type(ContactType::Aircraft)]);
        registry.set_visual(ContactVisual::new(3, "fixed-wing", Color::WHITE));
        registry.upsert(&[at(3, 0.0).with_type(ContactType::Aircraft)]);

        let id = registry.get(3).unwrap().body().id();
        assert_eq!(renderer.borrow().get(id).unwrap().geometry, Geometry::Pyramid { size: AIRCRAFT_SIZE });
    }

    #[test]
    fn test_rescale_uses_style_scale() {
        let (renderer, mut registry) = setup();
        registry.upsert(&[at(1, 0.0), at(2, 0.0)]);
        let mut visual = ContactVisual::new(1, "ball", Color::WHITE);
        visual.scale = 3.0;
        registry.set_visual(visual);
        registry.upsert(&[at(1, 0.0), at(2, 0.0)]);

        registry.rescale(2.0);
        let r = renderer.borrow();
        assert_eq!(r.get(registry.get(1).unwrap().body().id()).unwrap().transform.scale, 6.0);
        assert_eq!(r.get(registry.get(2).unwrap().body().id()).unwrap().transform.scale, 2.0);
    }

    proptest! {
        #[test]
        fn prop_trail_never_exceeds_capacity(updates in 1usize..60) {
            let (renderer, mut registry) = setup();
            registry.set_trails_enabled(true);
            for i in 0..updates {
                registry.upsert(&[at(1, i as f64)]);
                prop_assert!(registry.get(1).unwrap().trail_len() <= TRAIL_CAPACITY);
            }
            prop_assert_eq!(registry.get(1).unwrap().trail_len(), updates.min(TRAIL_CAPACITY));
            let trail_points = renderer.borrow().count_where(|g| matches!(g, Geometry::TrailPoint { .. }));
            prop_assert_eq!(trail_points, updates.min(TRAIL_CAPACITY));
        }
    }
}
