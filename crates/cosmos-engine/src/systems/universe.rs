//! Procedural generation engine.
//!
//! Owns every piece of celestial content and the policy for rebuilding it.
//! The foreground content lives in one `Epoch` that is replaced wholesale on
//! a full rebuild; the parallax backdrop and the galaxy field persist across
//! rebuilds and are only regenerated when the quality level changes.
//!
//! All content hangs from one root transform that drifts about Y and is
//! offset by the controller's warp travel.

use glam::{Mat4, Quat, Vec3};

use crate::api::config::Toggles;
use crate::api::types::{NodeId, QualityLevel};
use crate::assets::profiles::QualityProfile;
use crate::core::math::face_toward;
use crate::renderer::resources::ResourcePool;
use crate::renderer::traits::DrawItem;
use crate::systems::backdrop::Backdrop;
use crate::systems::epoch::Epoch;
use crate::systems::galaxies::GalaxyField;
use crate::systems::render::collect_draws;
use crate::systems::rng::Rng;
use crate::systems::shooting_stars::ShootingStars;
use crate::systems::{landmarks, nebulae, planets, starfield};

const ROOT_SPIN_RATE: f32 = 0.01;
const ROOT_SPIN_PER_VELOCITY: f32 = 0.001;

/// Foreground content of one generation pass, with typed handles into it.
#[derive(Debug)]
pub struct EpochContent {
    pub epoch: Epoch,
    pub quality: QualityLevel,
    pub shells: Vec<NodeId>,
    pub nebulae: Vec<NodeId>,
    pub planets: Vec<NodeId>,
    pub sun: NodeId,
    pub milky_way: Option<NodeId>,
    pub constellations: Option<NodeId>,
    pub shooting: ShootingStars,
}

impl EpochContent {
    fn build(pool: &ResourcePool, rng: &mut Rng, quality: QualityLevel, toggles: &Toggles) -> Self {
        let profile = QualityProfile::for_level(quality);
        let mut epoch = Epoch::new(pool);

        landmarks::build_ether(&mut epoch);
        let sun = landmarks::build_sun(&mut epoch);
        let shells = starfield::build_shells(&mut epoch, rng, profile);
        let nebulae = nebulae::build(&mut epoch, rng, profile);
        landmarks::build_black_hole(&mut epoch, profile);
        landmarks::build_portal(&mut epoch);
        let planets = planets::build(
            &mut epoch,
            rng,
            toggles.planet_realism,
            landmarks::sun_direction(),
        );
        let milky_way = toggles
            .milky_way
            .then(|| landmarks::build_milky_way(&mut epoch));
        let constellations = shells
            .first()
            .and_then(|shell| starfield::build_constellations(&mut epoch, rng, *shell));

        let mut content = Self {
            epoch,
            quality,
            shells,
            nebulae,
            planets,
            sun,
            milky_way,
            constellations,
            shooting: ShootingStars::new(),
        };
        content.set_constellations_visible(toggles.constellations);
        content
    }

    fn set_constellations_visible(&mut self, visible: bool) {
        if let Some(node) = self.constellations.and_then(|id| self.epoch.scene.get_mut(id)) {
            node.visible = visible;
        }
    }

    /// Stars across all shells.
    pub fn star_count(&self) -> usize {
        self.shells
            .iter()
            .filter_map(|id| self.epoch.scene.get(*id))
            .filter_map(|n| n.mesh.as_ref())
            .map(|m| m.geometry.vertex_count())
            .sum()
    }
}

pub struct UniverseGenerator {
    pool: ResourcePool,
    rng: Rng,
    content: Option<EpochContent>,
    backdrop: Option<Backdrop>,
    galaxies: Option<GalaxyField>,
    time: f32,
    spin: f32,
    offset: Vec3,
    generation: u32,
}

impl UniverseGenerator {
    pub fn new(pool: &ResourcePool, seed: u64) -> Self {
        Self {
            pool: pool.clone(),
            rng: Rng::new(seed),
            content: None,
            backdrop: None,
            galaxies: None,
            time: 0.0,
            spin: 0.0,
            offset: Vec3::ZERO,
            generation: 0,
        }
    }

    /// Full rebuild of the foreground epoch. The backdrop and galaxy field
    /// are rebuilt only if `quality` differs from the one they were built for.
    ///
    /// The new epoch is built completely before the old one is dropped, and
    /// both happen inside this call, so a frame never sees a mix of the two.
    pub fn generate(&mut self, quality: QualityLevel, toggles: &Toggles) {
        let next = EpochContent::build(&self.pool, &mut self.rng, quality, toggles);
        let previous = self.content.replace(next);
        drop(previous);

        if self.backdrop.as_ref().map(|b| b.quality()) != Some(quality) {
            let backdrop = Backdrop::build(&self.pool, &mut self.rng, quality);
            drop(self.backdrop.replace(backdrop));
        }
        if self.galaxies.as_ref().map(|g| g.quality()) != Some(quality) {
            let galaxies = GalaxyField::build(&self.pool, &mut self.rng, quality);
            drop(self.galaxies.replace(galaxies));
        }

        self.generation += 1;
        log::info!(
            "generated epoch {} at {:?}: {} stars, {} live resources",
            self.generation,
            quality,
            self.star_count(),
            self.pool.live_count()
        );
    }

    /// Per-frame step: drift the root, push time/energy into materials,
    /// keep the sun facing the camera, run shooting stars, trail the backdrop.
    pub fn update(
        &mut self,
        dt: f32,
        velocity: f32,
        camera_position: Vec3,
        energy: f32,
        events_enabled: bool,
    ) {
        self.time += dt;
        self.spin += dt * ROOT_SPIN_RATE + velocity * ROOT_SPIN_PER_VELOCITY;
        let root_inverse = self.root_matrix().inverse();

        if let Some(content) = self.content.as_mut() {
            content.epoch.advance(dt, self.time, energy);

            let local_camera = root_inverse.transform_point3(camera_position);
            if let Some(sun) = content.epoch.scene.get_mut(content.sun) {
                sun.rotation = face_toward(sun.position, local_camera);
            }

            if events_enabled {
                content.shooting.maybe_spawn(&mut content.epoch, &mut self.rng, energy);
            }
            content.shooting.update(&mut content.epoch, dt);
        }

        if let Some(galaxies) = self.galaxies.as_mut() {
            galaxies.update(self.time);
        }
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.update(camera_position, self.time);
        }
    }

    /// Reposition the content root (warp travel).
    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    /// Show or hide constellation lines without a rebuild.
    pub fn set_constellations_visible(&mut self, visible: bool) {
        if let Some(content) = self.content.as_mut() {
            content.set_constellations_visible(visible);
        }
    }

    /// Root transform: drift about Y, then warp offset.
    pub fn root_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.spin), self.offset)
    }

    /// Append all visible content to `out`.
    pub fn collect_draws<'a>(&'a self, out: &mut Vec<DrawItem<'a>>) {
        let root = self.root_matrix();
        if let Some(galaxies) = self.galaxies.as_ref() {
            collect_draws(&galaxies.epoch.scene, root, out);
        }
        if let Some(backdrop) = self.backdrop.as_ref() {
            collect_draws(&backdrop.epoch.scene, root, out);
        }
        if let Some(content) = self.content.as_ref() {
            collect_draws(&content.epoch.scene, root, out);
        }
    }

    // -- Accessors --

    pub fn content(&self) -> Option<&EpochContent> {
        self.content.as_ref()
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.backdrop.as_ref()
    }

    pub fn galaxies(&self) -> Option<&GalaxyField> {
        self.galaxies.as_ref()
    }

    pub fn star_count(&self) -> usize {
        self.content.as_ref().map_or(0, |c| c.star_count())
    }

    pub fn shooting_star_count(&self) -> usize {
        self.content.as_ref().map_or(0, |c| c.shooting.len())
    }

    pub fn shooting_stars_spawned(&self) -> u64 {
        self.content.as_ref().map_or(0, |c| c.shooting.spawned_total())
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Number of completed generation passes.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop all content, releasing every resource.
    pub fn clear(&mut self) {
        self.content = None;
        self.backdrop = None;
        self.galaxies = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::api::types::ResourceId;

    fn live_ids(gen: &UniverseGenerator) -> HashSet<ResourceId> {
        let mut out = Vec::new();
        gen.collect_draws(&mut out);
        out.iter()
            .flat_map(|d| [d.geometry.id(), d.material.id()])
            .collect()
    }

    #[test]
    fn first_generate_builds_everything() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.generate(QualityLevel::Medium, &Toggles::default());
        let content = gen.content().unwrap();
        assert_eq!(content.shells.len(), 2);
        assert_eq!(content.nebulae.len(), 3);
        assert_eq!(content.planets.len(), 3);
        assert!(content.milky_way.is_some());
        assert!(content.constellations.is_some());
        assert_eq!(gen.star_count(), 8000);
        assert_eq!(gen.galaxies().unwrap().galaxies().len(), 30);
        assert_eq!(gen.backdrop().unwrap().star_count(), 8000);
        assert_eq!(gen.generation(), 1);
    }

    #[test]
    fn milky_way_toggle_is_respected() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        let toggles = Toggles {
            milky_way: false,
            ..Toggles::default()
        };
        gen.generate(QualityLevel::Low, &toggles);
        let content = gen.content().unwrap();
        assert!(content.milky_way.is_none());
        assert!(content.epoch.scene.find_by_tag("milky-way").is_none());
    }

    #[test]
    fn quality_rebuild_disposes_prior_epoch_exactly_once() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.generate(QualityLevel::Medium, &Toggles::default());
        pool.drain_released();
        let before: HashSet<ResourceId> = live_ids(&gen);
        let live_before = pool.live_count();
        assert_eq!(before.len(), live_before);

        gen.generate(QualityLevel::High, &Toggles::default());
        let released = pool.drain_released();
        let released_set: HashSet<ResourceId> = released.iter().copied().collect();
        // no duplicates, and everything from the old epoch is gone
        assert_eq!(released.len(), released_set.len());
        assert_eq!(released_set, before);
        assert!(before.iter().all(|id| !pool.is_live(*id)));
        assert_eq!(pool.live_count(), live_ids(&gen).len());
    }

    #[test]
    fn toggle_rebuild_keeps_background() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.generate(QualityLevel::Low, &Toggles::default());
        let background: Vec<ResourceId> = {
            let mut ids = Vec::new();
            let backdrop = &gen.backdrop().unwrap().epoch.scene;
            let galaxies = &gen.galaxies().unwrap().epoch.scene;
            for scene in [backdrop, galaxies] {
                for n in scene.iter() {
                    let m = n.mesh.as_ref().unwrap();
                    ids.push(m.geometry.id());
                    ids.push(m.material.id());
                }
            }
            ids
        };

        let toggles = Toggles {
            planet_realism: false,
            ..Toggles::default()
        };
        gen.generate(QualityLevel::Low, &toggles);
        assert!(background.iter().all(|id| pool.is_live(*id)));
        assert!(gen.content().unwrap().epoch.scene.find_by_tag("planet-flat").is_some());
    }

    #[test]
    fn constellation_visibility_without_rebuild() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        let toggles = Toggles {
            constellations: false,
            ..Toggles::default()
        };
        gen.generate(QualityLevel::Low, &toggles);
        let id = gen.content().unwrap().constellations.unwrap();
        assert!(!gen.content().unwrap().epoch.scene.get(id).unwrap().visible);
        let allocated = pool.allocated_total();
        gen.set_constellations_visible(true);
        assert!(gen.content().unwrap().epoch.scene.get(id).unwrap().visible);
        assert_eq!(pool.allocated_total(), allocated);
    }

    #[test]
    fn spawn_rate_at_rest() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 1234);
        gen.generate(QualityLevel::Medium, &Toggles::default());
        for _ in 0..1000 {
            gen.update(1.0 / 60.0, 0.0, Vec3::new(0.0, 0.0, 100.0), 0.0, true);
        }
        let spawned = gen.shooting_stars_spawned();
        assert!((1..=30).contains(&spawned), "spawned {}", spawned);
    }

    #[test]
    fn events_disabled_spawns_nothing() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 1234);
        gen.generate(QualityLevel::Low, &Toggles::default());
        for _ in 0..1000 {
            gen.update(1.0 / 60.0, 0.0, Vec3::ZERO, 1.0, false);
        }
        assert_eq!(gen.shooting_stars_spawned(), 0);
    }

    #[test]
    fn sun_tracks_camera() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.generate(QualityLevel::Low, &Toggles::default());
        gen.set_offset(Vec3::new(10.0, -20.0, 30.0));
        let camera = Vec3::new(40.0, 50.0, 120.0);
        gen.update(0.5, 0.3, camera, 0.0, false);

        let content = gen.content().unwrap();
        let sun = content.epoch.scene.get(content.sun).unwrap();
        let world = gen.root_matrix() * sun.local_matrix();
        let normal = world.transform_vector3(Vec3::Z).normalize();
        let to_camera = (camera - world.transform_point3(Vec3::ZERO)).normalize();
        assert!(normal.dot(to_camera) > 0.999);
    }

    #[test]
    fn root_drifts_with_time_and_velocity() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.update(1.0, 2.0, Vec3::ZERO, 0.0, false);
        assert!((gen.spin() - (0.01 + 0.002)).abs() < 1e-6);
    }

    #[test]
    fn clear_releases_all() {
        let pool = ResourcePool::new();
        let mut gen = UniverseGenerator::new(&pool, 42);
        gen.generate(QualityLevel::Low, &Toggles::default());
        assert!(pool.live_count() > 0);
        gen.clear();
        assert_eq!(pool.live_count(), 0);
    }
}
